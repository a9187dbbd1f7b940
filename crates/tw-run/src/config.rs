// config.rs — Governance configuration.
//
// GovernanceConfig is built once at process start and then only read.
// Components receive it (or values derived from it) by reference; nothing
// below the binary reads the process environment.
//
// Sources, later ones winning:
//   1. built-in defaults
//   2. a TOML file (`GovernanceConfig::load`)
//   3. environment-style overrides (`with_overrides`, `from_env`)

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tw_lifecycle::{TagScope, Thresholds};

use crate::error::ConfigError;

pub const ENV_PROJECT: &str = "PROJECT";
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
pub const ENV_WARNING_DAYS: &str = "WARNING_DAYS";
pub const ENV_TERMINATION_DAYS: &str = "TERMINATION_DAYS";
pub const ENV_AUTO_TERMINATION: &str = "ENABLE_AUTO_TERMINATION";
pub const ENV_MONTHLY_BUDGET: &str = "MONTHLY_BUDGET";
pub const ENV_OWNER_EMAIL: &str = "OWNER_EMAIL";
pub const ENV_WEBHOOK_URL: &str = "NOTIFY_WEBHOOK_URL";
pub const ENV_CALL_TIMEOUT_SECS: &str = "CALL_TIMEOUT_SECS";

/// Configuration for governance runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Project scope: resources and costs are filtered by `Project = <project>`.
    #[serde(default = "default_label")]
    pub project: String,

    /// Environment label used in notification text.
    #[serde(default = "default_label")]
    pub environment: String,

    /// Warning window in days.
    #[serde(default = "default_warning_days")]
    pub warning_days: u32,

    /// Termination window in days, measured from creation.
    #[serde(default = "default_termination_days")]
    pub termination_days: u32,

    /// Dispose of expired resources automatically. Off by default: expired
    /// resources are then only reported for manual action.
    #[serde(default)]
    pub auto_termination: bool,

    /// Monthly budget the trailing spend is compared against.
    #[serde(default = "default_monthly_budget")]
    pub monthly_budget: f64,

    /// Owner reported for resources without an `Owner` tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_contact: Option<String>,

    /// Webhook that receives rendered notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Upper bound on any single external call.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            project: default_label(),
            environment: default_label(),
            warning_days: default_warning_days(),
            termination_days: default_termination_days(),
            auto_termination: false,
            monthly_budget: default_monthly_budget(),
            owner_contact: None,
            webhook_url: None,
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

// Serde default functions
fn default_label() -> String {
    "unknown".to_string()
}

fn default_warning_days() -> u32 {
    30
}

fn default_termination_days() -> u32 {
    60
}

fn default_monthly_budget() -> f64 {
    200.0
}

fn default_call_timeout_secs() -> u64 {
    10
}

impl GovernanceConfig {
    /// Load a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply environment-style overrides from `lookup` (key → value).
    ///
    /// Unset keys keep their current value. Malformed numbers are rejected.
    /// `ENABLE_AUTO_TERMINATION` is on only for the value `true` (any case).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_PROJECT) {
            self.project = v;
        }
        if let Some(v) = lookup(ENV_ENVIRONMENT) {
            self.environment = v;
        }
        if let Some(v) = lookup(ENV_WARNING_DAYS) {
            self.warning_days = parse_value(ENV_WARNING_DAYS, &v)?;
        }
        if let Some(v) = lookup(ENV_TERMINATION_DAYS) {
            self.termination_days = parse_value(ENV_TERMINATION_DAYS, &v)?;
        }
        if let Some(v) = lookup(ENV_AUTO_TERMINATION) {
            self.auto_termination = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = lookup(ENV_MONTHLY_BUDGET) {
            let budget: f64 = parse_value(ENV_MONTHLY_BUDGET, &v)?;
            if !budget.is_finite() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_MONTHLY_BUDGET.to_string(),
                    value: v,
                    reason: "must be a finite number".to_string(),
                });
            }
            self.monthly_budget = budget;
        }
        if let Some(v) = lookup(ENV_OWNER_EMAIL).filter(|v| !v.trim().is_empty()) {
            self.owner_contact = Some(v);
        }
        if let Some(v) = lookup(ENV_WEBHOOK_URL).filter(|v| !v.trim().is_empty()) {
            self.webhook_url = Some(v);
        }
        if let Some(v) = lookup(ENV_CALL_TIMEOUT_SECS) {
            self.call_timeout_secs = parse_value(ENV_CALL_TIMEOUT_SECS, &v)?;
        }
        Ok(self)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            warning_days: i64::from(self.warning_days),
            termination_days: i64::from(self.termination_days),
        }
    }

    pub fn scope(&self) -> TagScope {
        TagScope::project(self.project.clone())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}
