use serde::{Deserialize, Serialize};

/// Host-side policy knobs for delegate evaluation.
///
/// Loaded from the host's TOML configuration; every field has a default so
/// a missing section behaves sensibly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelegateConfig {
    /// When a hook implementation errors, apply the hook's default outcome
    /// (`authorize` → allow) instead of failing closed. Off by default.
    pub degrade_on_error: bool,
    /// Status applied to boolean deny verdicts.
    pub deny_status: u16,
    /// Backend selected when the `source` hook is absent.
    pub default_source: String,
}

impl Default for DelegateConfig {
    fn default() -> Self {
        Self {
            degrade_on_error: false,
            deny_status: 403,
            default_source: "filesystem".to_string(),
        }
    }
}

impl DelegateConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
