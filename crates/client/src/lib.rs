//! fhir-client: Read-only FHIR REST client
//!
//! Wraps an HTTP transport to a FHIR-compliant server: resource-specific
//! search and read convenience calls, insertion-ordered query-string
//! building, and optional bearer-token authentication via the OAuth2 JWT
//! client-assertion flow with multi-endpoint token probing.

mod auth;
mod client;
pub mod config;
pub mod error;
pub mod query;

pub use client::FhirClient;
pub use config::ClientConfig;
pub use error::Error;
pub use query::QueryParams;
