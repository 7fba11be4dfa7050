//! Search engine configuration.
//!
//! Defaults match the values most deployments run with; every field can be
//! overridden from the environment with [`SearchConfig::from_env`] or deserialized
//! from an application config file.

use serde::{Deserialize, Serialize};

pub const MAX_NESTED_DEPTH_ENV: &str = "SEARCH_MAX_NESTED_DEPTH";
/// Older name for [`MAX_NESTED_DEPTH_ENV`], read when the new one is unset.
pub const LEGACY_MAX_NESTED_DEPTH_ENV: &str = "LI_SEARCH_MAX_NESTED_DEPTH";
pub const DEFAULT_PAGE_SIZE_ENV: &str = "SEARCH_DEFAULT_PAGE_SIZE";
pub const MAX_PAGE_SIZE_ENV: &str = "SEARCH_MAX_PAGE_SIZE";
pub const CASE_SENSITIVE_ENV: &str = "SEARCH_CASE_SENSITIVE";
pub const PIVOT_NULL_FILTERS_ENV: &str = "SEARCH_PIVOT_NULL_FILTERS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Deepest allowed `nested` filter group
    pub max_nested_depth: usize,
    /// Page size used when the request names none
    pub default_page_size: u64,
    /// Largest page size a request may ask for
    pub max_page_size: u64,
    /// Whether full-text search compares case-sensitively unless the request says otherwise
    pub case_sensitive: bool,
    /// Whether `in [null, ...]` is allowed against pivot columns
    pub pivot_null_filters: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_nested_depth: 15,
            default_page_size: 30,
            max_page_size: 30,
            case_sensitive: false,
            pivot_null_filters: true,
        }
    }
}

impl SearchConfig {
    /// Defaults overridden by `SEARCH_*` environment variables.
    ///
    /// Values that fail to parse are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let depth_key = if lookup(MAX_NESTED_DEPTH_ENV).is_some() {
            MAX_NESTED_DEPTH_ENV
        } else {
            LEGACY_MAX_NESTED_DEPTH_ENV
        };
        override_with(&lookup, depth_key, &mut config.max_nested_depth);
        override_with(&lookup, DEFAULT_PAGE_SIZE_ENV, &mut config.default_page_size);
        override_with(&lookup, MAX_PAGE_SIZE_ENV, &mut config.max_page_size);
        override_with(&lookup, CASE_SENSITIVE_ENV, &mut config.case_sensitive);
        override_with(&lookup, PIVOT_NULL_FILTERS_ENV, &mut config.pivot_null_filters);

        if config.default_page_size > config.max_page_size {
            tracing::warn!(
                default_page_size = config.default_page_size,
                max_page_size = config.max_page_size,
                "default page size exceeds the maximum, clamping"
            );
            config.default_page_size = config.max_page_size;
        }
        config
    }

    /// Effective page size for a requested size.
    #[must_use]
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.default_page_size).clamp(1, self.max_page_size.max(1))
    }
}

fn override_with<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    let Some(raw) = lookup(key) else { return };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(key, value = %raw, "ignoring invalid search configuration value"),
    }
}
