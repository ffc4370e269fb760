/// Application-level constants
pub const APP_NAME: &str = "Frontdesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Registry used when nothing is configured (the Flask dev server default).
pub const DEFAULT_REGISTRY_URL: &str = "http://127.0.0.1:5000";

/// Per-request timeout used when nothing is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_REGISTRY_URL: &str = "FRONTDESK_REGISTRY_URL";
pub const ENV_TIMEOUT_SECS: &str = "FRONTDESK_TIMEOUT_SECS";
pub const ENV_KEEP_FILTERS: &str = "FRONTDESK_KEEP_FILTERS";

/// Log filter applied when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "frontdesk=info,frontdesk_lib=info,warn"
}

/// What happens to the active filter selection when the patient list
/// is reloaded after a status update, bed assignment or deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterRetention {
    /// Drop every filter and show the full list (front-desk default).
    #[default]
    Reset,
    /// Re-apply the current filter to the fresh list.
    Preserve,
}

/// Runtime configuration for a patient console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub registry_url: String,
    pub timeout_secs: u64,
    pub filter_retention: FilterRetention,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            filter_retention: FilterRetention::Reset,
        }
    }
}

impl ConsoleConfig {
    /// Build from `FRONTDESK_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let registry_url = lookup(ENV_REGISTRY_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.registry_url);

        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(value = %raw, "Ignoring invalid {ENV_TIMEOUT_SECS}");
                    defaults.timeout_secs
                }
            },
            None => defaults.timeout_secs,
        };

        let filter_retention = match lookup(ENV_KEEP_FILTERS).as_deref().map(str::trim) {
            Some("1") | Some("true") | Some("yes") => FilterRetention::Preserve,
            _ => FilterRetention::Reset,
        };

        Self {
            registry_url,
            timeout_secs,
            filter_retention,
        }
    }
}
