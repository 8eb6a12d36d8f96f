//! Datastore configuration
//!
//! Values resolve in order: environment variable, explicit property map,
//! built-in default. Only variables that are set and parse override.

use std::collections::BTreeMap;

/// Re-run the request filter over the assembled `get` answer
pub const ENV_REAPPLY_FILTER_ON_GET: &str = "NC_REAPPLY_FILTER_ON_GET";
pub const ENV_POST_EDIT_VALIDATION: &str = "NC_POST_EDIT_VALIDATION";
pub const ENV_MAX_DERIVED_EDIT_DEPTH: &str = "NC_MAX_DERIVED_EDIT_DEPTH";
pub const ENV_NBI_NOTIFICATIONS: &str = "NC_NBI_NOTIFICATIONS";

pub const DEFAULT_MAX_DERIVED_EDIT_DEPTH: usize = 32;

/// Explicit key/value configuration, keyed like the environment variables
pub type Properties = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStoreConfig {
    /// Run the edit validator on every materialized diff
    pub post_edit_validation: bool,
    /// Filter the `get` answer again after state attributes are merged in
    pub reapply_filter_on_get: bool,
    /// Deepest allowed chain of validator-derived edits
    pub max_derived_edit_depth: usize,
    /// Produce northbound config-change notifications
    pub nbi_notifications_enabled: bool,
}

impl Default for DataStoreConfig {
    fn default() -> Self {
        Self {
            post_edit_validation: true,
            reapply_filter_on_get: false,
            max_derived_edit_depth: DEFAULT_MAX_DERIVED_EDIT_DEPTH,
            nbi_notifications_enabled: true,
        }
    }
}

impl DataStoreConfig {
    /// Resolve from the process environment, then `properties`
    pub fn from_env(properties: &Properties) -> Self {
        Self::resolve(|key| std::env::var(key).ok(), properties)
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve<F>(env: F, properties: &Properties) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| -> Option<String> {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| properties.get(key).cloned())
        };
        let defaults = Self::default();

        Self {
            post_edit_validation: lookup(ENV_POST_EDIT_VALIDATION)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.post_edit_validation),
            reapply_filter_on_get: lookup(ENV_REAPPLY_FILTER_ON_GET)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.reapply_filter_on_get),
            max_derived_edit_depth: lookup(ENV_MAX_DERIVED_EDIT_DEPTH)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_derived_edit_depth),
            nbi_notifications_enabled: lookup(ENV_NBI_NOTIFICATIONS)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.nbi_notifications_enabled),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
