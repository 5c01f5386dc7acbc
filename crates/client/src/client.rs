//! The FHIR Resource Client

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value as JsonValue;

use crate::auth;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::query::QueryParams;

const USER_AGENT: &str = "humos-fhir-client/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const FHIR_JSON: &str = "application/fhir+json";

/// Read-only client for a FHIR REST server.
///
/// Every operation is an independent GET returning the raw response body
/// as untyped JSON. When `client_id` and `private_key_path` are configured
/// a bearer token is acquired lazily on the first call and cached for the
/// client's lifetime; there is no expiry check or renewal, so a call after
/// the token lapses surfaces the server's 401 to the caller.
#[derive(Debug)]
pub struct FhirClient {
    http: reqwest::Client,
    config: ClientConfig,
    base_url: String,
    // Racing acquisitions overwrite each other; both tokens represent the
    // same identity, so no mutual exclusion.
    token: ArcSwapOption<String>,
}

impl FhirClient {
    /// Build a client from the given configuration.
    ///
    /// Fails only on inconsistent configuration or transport construction;
    /// the base URL is not probed for reachability.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        if config.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must not be empty".into()));
        }
        if config.client_id.is_some() != config.private_key_path.is_some() {
            return Err(Error::Config(
                "client_id and private_key_path must be configured together".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FHIR_JSON));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            http,
            config,
            base_url,
            token: ArcSwapOption::empty(),
        })
    }

    /// Generic escape hatch: GET `{path}?<query>` under the base URL.
    pub async fn request(&self, path: &str, params: QueryParams) -> Result<JsonValue, Error> {
        let url = format!("{}/{}{}", self.base_url, path, params.to_query_string());

        let mut req = self.http.get(&url);
        if let Some(token) = self.bearer_token().await? {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status();
        if self.config.debug {
            tracing::debug!(%path, %status, "FHIR request");
        }
        if !status.is_success() {
            return Err(Error::Http {
                status,
                path: path.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// GET `metadata` — the server's CapabilityStatement.
    pub async fn capability_statement(&self) -> Result<JsonValue, Error> {
        self.request("metadata", QueryParams::new()).await
    }

    /// Search `Patient` with the given parameters.
    pub async fn search_patients(&self, params: QueryParams) -> Result<JsonValue, Error> {
        self.request("Patient", params).await
    }

    /// GET `Patient/{id}`. No existence pre-check; a missing patient
    /// surfaces as `Error::Http` with the server's 404.
    pub async fn patient(&self, id: &str) -> Result<JsonValue, Error> {
        self.request(&format!("Patient/{}", id), QueryParams::new())
            .await
    }

    /// Search `Observation` with the given parameters.
    pub async fn search_observations(&self, params: QueryParams) -> Result<JsonValue, Error> {
        self.request("Observation", params).await
    }

    /// Observations for one patient, merged with extra parameters.
    pub async fn patient_observations(
        &self,
        patient_id: &str,
        extra: QueryParams,
    ) -> Result<JsonValue, Error> {
        self.patient_scoped("Observation", patient_id, extra).await
    }

    /// Search `Condition` with the given parameters.
    pub async fn search_conditions(&self, params: QueryParams) -> Result<JsonValue, Error> {
        self.request("Condition", params).await
    }

    /// Conditions for one patient, merged with extra parameters.
    pub async fn patient_conditions(
        &self,
        patient_id: &str,
        extra: QueryParams,
    ) -> Result<JsonValue, Error> {
        self.patient_scoped("Condition", patient_id, extra).await
    }

    /// Search `MedicationRequest` with the given parameters.
    pub async fn search_medications(&self, params: QueryParams) -> Result<JsonValue, Error> {
        self.request("MedicationRequest", params).await
    }

    /// Medication requests for one patient, merged with extra parameters.
    pub async fn patient_medications(
        &self,
        patient_id: &str,
        extra: QueryParams,
    ) -> Result<JsonValue, Error> {
        self.patient_scoped("MedicationRequest", patient_id, extra)
            .await
    }

    /// Search `Immunization` with the given parameters.
    pub async fn search_immunizations(&self, params: QueryParams) -> Result<JsonValue, Error> {
        self.request("Immunization", params).await
    }

    /// Immunization records for one patient, merged with extra parameters.
    pub async fn patient_immunizations(
        &self,
        patient_id: &str,
        extra: QueryParams,
    ) -> Result<JsonValue, Error> {
        self.patient_scoped("Immunization", patient_id, extra).await
    }

    /// Search `AllergyIntolerance` with the given parameters.
    pub async fn search_allergies(&self, params: QueryParams) -> Result<JsonValue, Error> {
        self.request("AllergyIntolerance", params).await
    }

    /// Allergy records for one patient, merged with extra parameters.
    pub async fn patient_allergies(
        &self,
        patient_id: &str,
        extra: QueryParams,
    ) -> Result<JsonValue, Error> {
        self.patient_scoped("AllergyIntolerance", patient_id, extra)
            .await
    }

    /// Procedures for one patient, merged with extra parameters.
    pub async fn patient_procedures(
        &self,
        patient_id: &str,
        extra: QueryParams,
    ) -> Result<JsonValue, Error> {
        self.patient_scoped("Procedure", patient_id, extra).await
    }

    /// Diagnostic reports for one patient, merged with extra parameters.
    pub async fn patient_diagnostic_reports(
        &self,
        patient_id: &str,
        extra: QueryParams,
    ) -> Result<JsonValue, Error> {
        self.patient_scoped("DiagnosticReport", patient_id, extra)
            .await
    }

    /// Search a resource scoped to one patient. The `patient` filter is set
    /// last, so it is always present and wins over a caller-supplied value.
    async fn patient_scoped(
        &self,
        resource: &str,
        patient_id: &str,
        extra: QueryParams,
    ) -> Result<JsonValue, Error> {
        self.request(resource, extra.set("patient", patient_id))
            .await
    }

    /// Lazily acquire and cache the bearer token when auth is configured.
    async fn bearer_token(&self) -> Result<Option<Arc<String>>, Error> {
        let (Some(client_id), Some(key_path)) =
            (&self.config.client_id, &self.config.private_key_path)
        else {
            return Ok(None);
        };

        if let Some(token) = self.token.load_full() {
            return Ok(Some(token));
        }

        let assertion = auth::sign_assertion(client_id, &self.base_url, key_path)?;
        let token = Arc::new(auth::fetch_token(&self.http, &self.base_url, &assertion).await?);
        self.token.store(Some(token.clone()));
        Ok(Some(token))
    }
}
