//! Integration tests for the FHIR client.
//!
//! These exercise the HTTP surface against a wiremock server: request
//! construction, header handling, the token-endpoint probe sequence, and
//! error propagation.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fhir_client::{ClientConfig, Error, FhirClient, QueryParams};

const KEY_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/client-key.pem");

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn anonymous_client(server: &MockServer) -> FhirClient {
    FhirClient::new(ClientConfig::new(server.uri())).expect("client construction failed")
}

fn authenticated_client(server: &MockServer) -> FhirClient {
    let config = ClientConfig::new(server.uri()).with_auth("demo-client", KEY_PATH);
    FhirClient::new(config).expect("client construction failed")
}

fn searchset(total: u64) -> serde_json::Value {
    json!({"resourceType": "Bundle", "type": "searchset", "total": total, "entry": []})
}

/// Mount a 200 token response at `endpoint` granting `token`.
async fn mount_token(server: &MockServer, endpoint: &str, token: &str, expected_hits: u64) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": 300
        })))
        .expect(expected_hits)
        .mount(server)
        .await;
}

/// Mount a 404 at `endpoint`, optionally pinning the expected hit count.
async fn mount_token_failure(server: &MockServer, endpoint: &str, expected_hits: u64) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(404))
        .expect(expected_hits)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Anonymous requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn metadata_sends_fhir_accept_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata"))
        .and(header("accept", "application/fhir+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceType": "CapabilityStatement",
            "status": "active"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    let body = client.capability_statement().await.unwrap();
    assert_eq!(body["resourceType"], "CapabilityStatement");
}

#[tokio::test]
async fn anonymous_client_sends_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Patient"))
        .respond_with(ResponseTemplate::new(200).set_body_json(searchset(0)))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    client
        .search_patients(QueryParams::new().set("name", "Smith"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "no token endpoint should be contacted");
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn patient_and_generic_request_are_equivalent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Patient/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceType": "Patient",
            "id": "123"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    let via_convenience = client.patient("123").await.unwrap();
    let via_escape_hatch = client.request("Patient/123", QueryParams::new()).await.unwrap();
    assert_eq!(via_convenience, via_escape_hatch);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), requests[1].url.path());
    assert_eq!(requests[0].url.query(), None);
    assert_eq!(requests[1].url.query(), None);
}

#[tokio::test]
async fn patient_observations_appends_patient_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Observation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(searchset(0)))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    client
        .patient_observations("p1", QueryParams::new().set("_count", 5))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("_count=5&patient=p1"));
}

#[tokio::test]
async fn caller_supplied_patient_filter_is_overridden() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Condition"))
        .respond_with(ResponseTemplate::new(200).set_body_json(searchset(0)))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    client
        .patient_conditions("p1", QueryParams::new().set("patient", "someone-else"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("patient=p1"));
}

#[tokio::test]
async fn scoped_fetches_target_the_expected_resource_paths() {
    let server = MockServer::start().await;
    for resource in ["MedicationRequest", "Immunization", "AllergyIntolerance", "Procedure", "DiagnosticReport"] {
        Mock::given(method("GET"))
            .and(path(format!("/{}", resource)))
            .respond_with(ResponseTemplate::new(200).set_body_json(searchset(0)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = anonymous_client(&server);
    let extra = || QueryParams::new();
    client.patient_medications("p1", extra()).await.unwrap();
    client.patient_immunizations("p1", extra()).await.unwrap();
    client.patient_allergies("p1", extra()).await.unwrap();
    client.patient_procedures("p1", extra()).await.unwrap();
    client.patient_diagnostic_reports("p1", extra()).await.unwrap();

    for request in server.received_requests().await.unwrap() {
        assert_eq!(request.url.query(), Some("patient=p1"));
    }
}

#[tokio::test]
async fn search_operations_pass_params_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Observation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(searchset(3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    let body = client
        .search_observations(QueryParams::new().set("code", "8867-4").set("_count", 10))
        .await
        .unwrap();
    assert_eq!(body["total"], 3);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("code=8867-4&_count=10"));
}

#[tokio::test]
async fn non_2xx_surfaces_as_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Patient/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "resourceType": "OperationOutcome"
        })))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    let err = client.patient("missing").await.unwrap_err();
    match err {
        Error::Http { status, path } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(path, "Patient/missing");
        }
        other => panic!("expected Http error, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn empty_base_url_is_rejected() {
    let err = FhirClient::new(ClientConfig::new("")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn partial_auth_config_is_rejected() {
    let mut config = ClientConfig::new("https://fhir.example");
    config.client_id = Some("demo-client".into());
    let err = FhirClient::new(config).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_token_endpoint_wins_and_token_is_cached() {
    let server = MockServer::start().await;
    mount_token(&server, "/auth/token", "tok-1", 1).await;
    mount_token_failure(&server, "/oauth/token", 0).await;
    mount_token_failure(&server, "/token", 0).await;
    mount_token_failure(&server, "/oauth2/token", 0).await;
    Mock::given(method("GET"))
        .and(path("/Patient"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(searchset(0)))
        .expect(2)
        .mount(&server)
        .await;

    let client = authenticated_client(&server);
    client.search_patients(QueryParams::new()).await.unwrap();
    // Second call must reuse the cached token, not re-authenticate.
    client.search_patients(QueryParams::new()).await.unwrap();
}

#[tokio::test]
async fn probe_falls_through_endpoints_in_order() {
    let server = MockServer::start().await;
    mount_token_failure(&server, "/auth/token", 1).await;
    mount_token_failure(&server, "/oauth/token", 1).await;
    mount_token_failure(&server, "/token", 1).await;
    mount_token(&server, "/oauth2/token", "tok-4", 1).await;
    Mock::given(method("GET"))
        .and(path("/Patient"))
        .and(header("authorization", "Bearer tok-4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(searchset(0)))
        .expect(1)
        .mount(&server)
        .await;

    let client = authenticated_client(&server);
    client.search_patients(QueryParams::new()).await.unwrap();

    let token_posts: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method == "POST")
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        token_posts,
        vec!["/auth/token", "/oauth/token", "/token", "/oauth2/token"]
    );
}

#[tokio::test]
async fn exhausted_probe_reports_last_endpoint() {
    let server = MockServer::start().await;
    for endpoint in ["/auth/token", "/oauth/token", "/token", "/oauth2/token"] {
        mount_token_failure(&server, endpoint, 1).await;
    }

    let client = authenticated_client(&server);
    let err = client.search_patients(QueryParams::new()).await.unwrap_err();
    match err {
        Error::Authentication { endpoint, message } => {
            assert!(endpoint.ends_with("/oauth2/token"), "endpoint: {}", endpoint);
            assert!(message.contains("404"), "message: {}", message);
        }
        other => panic!("expected Authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn token_response_without_access_token_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&server)
        .await;
    for endpoint in ["/oauth/token", "/token", "/oauth2/token"] {
        mount_token_failure(&server, endpoint, 1).await;
    }

    let client = authenticated_client(&server);
    let err = client.search_patients(QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
}

#[tokio::test]
async fn missing_private_key_surfaces_before_any_request() {
    let server = MockServer::start().await;

    let config = ClientConfig::new(server.uri()).with_auth("demo-client", "/nonexistent/key.pem");
    let client = FhirClient::new(config).unwrap();

    let err = client.search_patients(QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, Error::KeyRead { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
