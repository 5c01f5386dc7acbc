//! Bearer-token acquisition via the OAuth2 JWT client-assertion flow
//! (RFC 7523, `private_key_jwt`).
//!
//! FHIR servers disagree on where their token endpoint lives, so a fixed
//! list of candidate paths is probed in order and the first one that
//! returns an `access_token` wins.

use std::path::Path;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Candidate token endpoints, probed in order relative to the base URL.
pub(crate) const TOKEN_ENDPOINTS: [&str; 4] =
    ["/auth/token", "/oauth/token", "/token", "/oauth2/token"];

const ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 300;

/// Claims of the signed client assertion.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    /// Claims for `client_id` against `base_url`, issued now.
    pub fn new(client_id: &str, base_url: &str) -> Self {
        Self::issued_at(client_id, base_url, Utc::now().timestamp())
    }

    fn issued_at(client_id: &str, base_url: &str, now: i64) -> Self {
        Self {
            iss: client_id.to_string(),
            sub: client_id.to_string(),
            aud: format!("{}/auth/token", base_url),
            jti: format!("{}-{}", client_id, now),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }
}

/// Client-credentials grant body POSTed to each candidate endpoint.
#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_assertion_type: &'a str,
    client_assertion: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Read the PEM private key at `key_path` and sign an RS256 assertion.
pub(crate) fn sign_assertion(
    client_id: &str,
    base_url: &str,
    key_path: &Path,
) -> Result<String, Error> {
    let pem = std::fs::read(key_path).map_err(|source| Error::KeyRead {
        path: key_path.display().to_string(),
        source,
    })?;
    let key = EncodingKey::from_rsa_pem(&pem)?;
    let claims = AssertionClaims::new(client_id, base_url);
    Ok(jsonwebtoken::encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &key,
    )?)
}

/// Probe the candidate endpoints in order; return the first token granted.
pub(crate) async fn fetch_token(
    http: &reqwest::Client,
    base_url: &str,
    assertion: &str,
) -> Result<String, Error> {
    let body = TokenRequest {
        grant_type: "client_credentials",
        client_assertion_type: ASSERTION_TYPE,
        client_assertion: assertion,
    };

    let mut last_endpoint = String::new();
    let mut last_error = String::new();

    for candidate in TOKEN_ENDPOINTS {
        let endpoint = format!("{}{}", base_url, candidate);
        match try_endpoint(http, &endpoint, &body).await {
            Ok(token) => {
                tracing::debug!(%endpoint, "acquired access token");
                return Ok(token);
            }
            Err(message) => {
                tracing::debug!(%endpoint, %message, "token endpoint failed");
                last_endpoint = endpoint;
                last_error = message;
            }
        }
    }

    Err(Error::Authentication {
        endpoint: last_endpoint,
        message: last_error,
    })
}

async fn try_endpoint(
    http: &reqwest::Client,
    endpoint: &str,
    body: &TokenRequest<'_>,
) -> Result<String, String> {
    let response = http
        .post(endpoint)
        .json(body)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("token endpoint returned {}", status));
    }

    let parsed: TokenResponse = response.json().await.map_err(|e| e.to_string())?;
    parsed
        .access_token
        .ok_or_else(|| "no access_token in response".to_string())
}
