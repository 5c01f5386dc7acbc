//! Client configuration

use std::path::PathBuf;

/// Base URL used when `FHIR_MCP_SERVER_URL` is not set.
pub const DEFAULT_FHIR_SERVER: &str = "https://hapi.fhir.org/baseR4";

/// Client configuration, immutable after construction.
///
/// Authentication is enabled only when both `client_id` and
/// `private_key_path` are present; a client configured with neither issues
/// anonymous requests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub client_id: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub debug: bool,
}

impl ClientConfig {
    /// Anonymous configuration for the given FHIR base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: None,
            private_key_path: None,
            debug: false,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("FHIR_MCP_SERVER_URL")
                .unwrap_or_else(|_| DEFAULT_FHIR_SERVER.into()),
            client_id: std::env::var("FHIR_CLIENT_ID").ok(),
            private_key_path: std::env::var("PRIVATE_KEY_PATH").ok().map(PathBuf::from),
            debug: std::env::var("FHIR_CLIENT_DEBUG")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "t" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// Enable the JWT client-assertion flow with the given identity.
    pub fn with_auth(mut self, client_id: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        self.client_id = Some(client_id.into());
        self.private_key_path = Some(key_path.into());
        self
    }

    /// Log every request path and response status at debug level.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
