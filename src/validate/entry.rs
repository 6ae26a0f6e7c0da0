//! Search result entries as seen by the validator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the validator needs from a search result: an identifier for logging
/// and the provider that selects the status mapping.
pub trait SearchResultEntry {
    /// Stable identifier, used only in logs
    fn identifier(&self) -> &str;
    /// Provider name selecting the status mapping
    fn provider(&self) -> &str;
}

/// A search result as exchanged with the search layer.
///
/// Fields beyond `identifier`, `provider` and `url` are carried through
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result identifier
    pub identifier: String,
    /// Content provider the result came from
    pub provider: String,
    /// Image URL whose liveness is checked
    pub url: String,
    /// Remaining fields, passed through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchResult {
    /// Creates a result with no extra fields.
    pub fn new(
        identifier: impl Into<String>,
        provider: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            provider: provider.into(),
            url: url.into(),
            extra: Map::new(),
        }
    }
}

impl SearchResultEntry for SearchResult {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn provider(&self) -> &str {
        &self.provider
    }
}
