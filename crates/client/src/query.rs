//! Query-string construction

/// Insertion-ordered query parameter mapping.
///
/// Keys render in the order they were first set; re-setting a key removes
/// the old entry and appends the new value, so the last write wins.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    entries: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter. Accepts any scalar that renders as a string.
    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let key = key.into();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, value.to_string()));
        self
    }

    /// Set a parameter only when a value is present; `None` is dropped.
    pub fn set_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `?k1=v1&k2=v2` with keys and values percent-encoded
    /// independently. An empty mapping renders as the empty string.
    pub fn to_query_string(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("?{}", rendered.join("&"))
    }
}
