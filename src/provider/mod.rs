//! Provider-specific HTTP status classification.
//!
//! Each content provider gets a [`StatusMapping`] with two disjoint sets of
//! statuses: `live` and `unknown`. Anything else, including redirects and the
//! `-1` probe-failure sentinel, is dead.
//!
//! The `unknown` set exists because origins that rate-limit or block us
//! answer with statuses (403, 429, sometimes 500) that say nothing about
//! whether the media still exists.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{
    HTTP_STATUS_FORBIDDEN, HTTP_STATUS_INTERNAL_SERVER_ERROR, HTTP_STATUS_OK,
    HTTP_STATUS_TOO_MANY_REQUESTS,
};
use crate::error_handling::{InitializationError, ValidationError};

/// Liveness status of a URL: an HTTP status code, or `-1` when the probe got
/// no usable response.
pub type LinkStatus = i32;

/// Classification of a [`LinkStatus`] for a given provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The media is reachable
    Live,
    /// The response is ambiguous (rate limiting, blocking)
    Unknown,
    /// The media is gone, redirects elsewhere, or the origin did not answer
    Dead,
}

/// Status sets for a single provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMapping {
    /// Statuses meaning the link is live
    #[serde(default = "default_live")]
    pub live: BTreeSet<LinkStatus>,
    /// Statuses meaning liveness could not be determined
    #[serde(default)]
    pub unknown: BTreeSet<LinkStatus>,
}

fn default_live() -> BTreeSet<LinkStatus> {
    BTreeSet::from([HTTP_STATUS_OK])
}

impl StatusMapping {
    /// Creates a mapping from its live and unknown status sets.
    pub fn new(
        live: impl IntoIterator<Item = LinkStatus>,
        unknown: impl IntoIterator<Item = LinkStatus>,
    ) -> Self {
        Self {
            live: live.into_iter().collect(),
            unknown: unknown.into_iter().collect(),
        }
    }

    /// Classifies `status`. `unknown` is checked first so an overlapping
    /// entry never hides rate limiting.
    pub fn classify(&self, status: LinkStatus) -> Liveness {
        if self.unknown.contains(&status) {
            Liveness::Unknown
        } else if self.live.contains(&status) {
            Liveness::Live
        } else {
            Liveness::Dead
        }
    }

    fn check_disjoint(&self) -> Result<(), String> {
        let overlap: Vec<_> = self.live.intersection(&self.unknown).collect();
        if overlap.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "statuses {:?} are listed as both live and unknown",
                overlap
            ))
        }
    }
}

impl Default for StatusMapping {
    fn default() -> Self {
        Self::new(
            [HTTP_STATUS_OK],
            [HTTP_STATUS_FORBIDDEN, HTTP_STATUS_TOO_MANY_REQUESTS],
        )
    }
}

/// Table of status mappings keyed by provider name.
///
/// A provider missing from the table only classifies if a default mapping was
/// configured explicitly; otherwise it is a configuration error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatusMappings {
    #[serde(default)]
    default: Option<StatusMapping>,
    #[serde(default)]
    providers: HashMap<String, StatusMapping>,
}

impl ProviderStatusMappings {
    /// An empty table with no default: every provider must be listed.
    pub fn strict() -> Self {
        Self::default()
    }

    /// The built-in table.
    ///
    /// Default `{live: 200, unknown: 403, 429}`. Flickr and Thingiverse also
    /// answer 500 when throttling, so it is unknown for them too.
    pub fn builtin() -> Self {
        let throttles_with_500 = StatusMapping::new(
            [HTTP_STATUS_OK],
            [
                HTTP_STATUS_FORBIDDEN,
                HTTP_STATUS_TOO_MANY_REQUESTS,
                HTTP_STATUS_INTERNAL_SERVER_ERROR,
            ],
        );
        Self::strict()
            .with_default(StatusMapping::default())
            .with_provider("flickr", throttles_with_500.clone())
            .with_provider("thingiverse", throttles_with_500)
    }

    /// Sets the mapping used for providers without their own entry.
    pub fn with_default(mut self, mapping: StatusMapping) -> Self {
        self.default = Some(mapping);
        self
    }

    /// Adds or replaces the mapping for `provider`.
    pub fn with_provider(mut self, provider: impl Into<String>, mapping: StatusMapping) -> Self {
        self.providers.insert(provider.into(), mapping);
        self
    }

    /// Returns the mapping that applies to `provider`.
    pub fn mapping_for(&self, provider: &str) -> Result<&StatusMapping, ValidationError> {
        self.providers
            .get(provider)
            .or(self.default.as_ref())
            .ok_or_else(|| ValidationError::UnknownProvider(provider.to_string()))
    }

    /// Classifies `status` under `provider`'s mapping.
    pub fn classify(
        &self,
        provider: &str,
        status: LinkStatus,
    ) -> Result<Liveness, ValidationError> {
        Ok(self.mapping_for(provider)?.classify(status))
    }

    /// Parses a table from JSON:
    /// `{"default": {"live": [200], "unknown": [429]}, "providers": {"flickr": {...}}}`.
    pub fn from_json_str(json: &str) -> Result<Self, InitializationError> {
        let mappings: Self = serde_json::from_str(json).map_err(|e| {
            InitializationError::ProviderMappingError(format!("invalid mapping JSON: {e}"))
        })?;
        mappings.validate()?;
        Ok(mappings)
    }

    /// Reads and parses a JSON table from disk.
    pub fn load(path: &Path) -> Result<Self, InitializationError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            InitializationError::ProviderMappingError(format!(
                "cannot read {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), InitializationError> {
        if let Some(default) = &self.default {
            default.check_disjoint().map_err(|e| {
                InitializationError::ProviderMappingError(format!("default mapping: {e}"))
            })?;
        }
        for (provider, mapping) in &self.providers {
            mapping.check_disjoint().map_err(|e| {
                InitializationError::ProviderMappingError(format!("provider '{provider}': {e}"))
            })?;
        }
        Ok(())
    }
}
