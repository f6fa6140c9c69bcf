use std::env;

use tracing::{info, warn};

/// Process-wide settings, read once at startup and handed to whatever needs them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub anthropic: AnthropicConfig,
    pub company_name: String,
    pub pulse_name: String,
    pub pulse_version: String,
    pub environment: String,
    pub debug: bool,
    pub history_limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub http_timeout_ms: Option<u64>,
}

impl AnthropicConfig {
    pub const DEFAULT_MODEL: &'static str = "claude-sonnet-4-20250514";
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";

    const API_KEY_VARS: [&'static str; 1] = ["ANTHROPIC_API_KEY"];
    const MODEL_VARS: [&'static str; 2] = ["ANTHROPIC_MODEL", "PULSE_MODEL"];
    const BASE_URL_VARS: [&'static str; 1] = ["ANTHROPIC_BASE_URL"];
    const TIMEOUT_VARS: [&'static str; 1] = ["ANTHROPIC_HTTP_TIMEOUT_MS"];

    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_key: read_var(lookup, &Self::API_KEY_VARS),
            model: read_var(lookup, &Self::MODEL_VARS)
                .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            base_url: read_var(lookup, &Self::BASE_URL_VARS)
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            http_timeout_ms: read_var(lookup, &Self::TIMEOUT_VARS)
                .and_then(|value| value.parse().ok()),
        }
    }

    /// A key made only of whitespace counts as absent.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map_or(false, |key| !key.trim().is_empty())
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            http_timeout_ms: None,
        }
    }
}

impl AppConfig {
    const DEFAULT_COMPANY: &'static str = "Beechwood Corporation";
    const DEFAULT_PULSE_NAME: &'static str = "PULSE";
    const DEFAULT_PULSE_VERSION: &'static str = "0.1.0";

    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug = read_var(lookup, &["DEBUG"])
            .map(|value| value == "True")
            .unwrap_or(true);

        Self {
            anthropic: AnthropicConfig::from_lookup(lookup),
            company_name: read_var(lookup, &["COMPANY_NAME"])
                .unwrap_or_else(|| Self::DEFAULT_COMPANY.to_string()),
            pulse_name: read_var(lookup, &["PULSE_NAME"])
                .unwrap_or_else(|| Self::DEFAULT_PULSE_NAME.to_string()),
            pulse_version: read_var(lookup, &["PULSE_VERSION"])
                .unwrap_or_else(|| Self::DEFAULT_PULSE_VERSION.to_string()),
            environment: read_var(lookup, &["ENVIRONMENT"])
                .unwrap_or_else(|| "development".to_string()),
            debug,
            history_limit: read_var(lookup, &["AGENT_HISTORY_LIMIT"])
                .and_then(|value| value.parse::<usize>().ok())
                .filter(|limit| *limit > 0),
        }
    }

    /// Names of required settings that are missing or empty.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.anthropic.has_api_key() {
            missing.push("ANTHROPIC_API_KEY");
        }
        missing
    }

    /// Presence check only; the process keeps running when keys are missing.
    pub fn validate(&self) -> bool {
        let missing = self.missing_keys();
        if missing.is_empty() {
            info!(environment = %self.environment, "Configuration loaded");
            return true;
        }

        warn!(?missing, "Some configuration values are missing");
        false
    }

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn default_log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            anthropic: AnthropicConfig::default(),
            company_name: Self::DEFAULT_COMPANY.to_string(),
            pulse_name: Self::DEFAULT_PULSE_NAME.to_string(),
            pulse_version: Self::DEFAULT_PULSE_VERSION.to_string(),
            environment: "development".to_string(),
            debug: true,
            history_limit: None,
        }
    }
}

fn read_var<F>(lookup: &F, candidates: &[&'static str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    candidates.iter().find_map(|key| lookup(key))
}
