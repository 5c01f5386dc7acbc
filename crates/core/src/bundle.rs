use serde_json::Value;

/// Borrowed read-only view over a FHIR Bundle kept as opaque JSON.
///
/// The client never validates response shapes, so every accessor is
/// best-effort: a malformed or non-Bundle document simply yields nothing.
#[derive(Debug, Clone, Copy)]
pub struct BundleView<'a> {
    raw: &'a Value,
}

impl<'a> BundleView<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    /// Whether the document declares itself a Bundle.
    pub fn is_bundle(&self) -> bool {
        self.raw.get("resourceType").and_then(Value::as_str) == Some("Bundle")
    }

    /// Server-reported total match count, if present.
    pub fn total(&self) -> Option<u64> {
        self.raw.get("total").and_then(Value::as_u64)
    }

    /// Iterate over the resources inside `entry`, skipping entries
    /// without a `resource` field.
    pub fn resources(self) -> impl Iterator<Item = &'a Value> {
        self.raw
            .get("entry")
            .and_then(Value::as_array)
            .map(|entries| entries.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| entry.get("resource"))
    }

    /// True when the bundle has no usable entries.
    pub fn is_empty(&self) -> bool {
        self.resources().next().is_none()
    }

    /// URL of the `next` pagination link, if the server provided one.
    pub fn next_url(&self) -> Option<&'a str> {
        self.raw
            .get("link")
            .and_then(Value::as_array)?
            .iter()
            .find(|link| link.get("relation").and_then(Value::as_str) == Some("next"))?
            .get("url")
            .and_then(Value::as_str)
    }
}
