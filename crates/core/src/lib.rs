//! fhir-core: Untyped FHIR document helpers
//!
//! FHIR responses are passed through as opaque JSON. This crate provides a
//! read-only view over search Bundles and best-effort display summaries for
//! the handful of resource types the demo inspects.

pub mod bundle;
pub mod summary;

pub use bundle::BundleView;
