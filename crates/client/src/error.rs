use reqwest::StatusCode;
use thiserror::Error;

/// FHIR client error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status} for {path}")]
    Http { status: StatusCode, path: String },

    #[error("Failed to read private key at {path}: {source}")]
    KeyRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to sign client assertion: {0}")]
    Assertion(#[from] jsonwebtoken::errors::Error),

    #[error("Authentication failed at {endpoint}: {message}")]
    Authentication { endpoint: String, message: String },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}
