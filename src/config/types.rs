//! Configuration data model.
//!
//! `FileConfig` mirrors the TOML layout; `Config` is the resolved form the
//! rest of the bot consumes.

use serde::Deserialize;

use crate::access::{AllowList, IdentityEntry};

use super::defaults::{
    DEFAULT_POLL_TIMEOUT_SECS, DEFAULT_RUNTIME_CALL_TIMEOUT_SECS, DEFAULT_TELEGRAM_API_BASE_URL,
};
use super::sources::ConfigSource;

/// Which container engine CLI to drive.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineChoice {
    /// Probe `docker`, then `podman`.
    #[default]
    Auto,
    Docker,
    Podman,
}

impl EngineChoice {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "docker" => Some(Self::Docker),
            "podman" => Some(Self::Podman),
            _ => None,
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub allow_list: AllowList,
    pub runtime: RuntimeConfig,
}

/// Resolved chat transport settings.
#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub api_base_url: String,
    pub poll_timeout_secs: u64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

/// Container engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub engine: EngineChoice,
    /// Upper bound for any single engine call.
    pub call_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineChoice::Auto,
            call_timeout_secs: DEFAULT_RUNTIME_CALL_TIMEOUT_SECS,
        }
    }
}

/// Config plus non-fatal diagnostics gathered while loading it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// Where the file layer came from.
    pub source: ConfigSource,
    pub diagnostics: ConfigDiagnostics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    pub deprecations: Vec<String>,
}

// ---------------------------------------------------------------------------
// On-disk layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct FileConfig {
    pub telegram: TelegramFileConfig,
    pub access: AccessFileConfig,
    pub runtime: RuntimeFileConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct TelegramFileConfig {
    pub token: String,
    pub token_env: Option<String>,
    pub token_file: Option<String>,
    pub api_base_url: String,
    pub poll_timeout_secs: u64,
}

impl Default for TelegramFileConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            token_env: None,
            token_file: None,
            api_base_url: DEFAULT_TELEGRAM_API_BASE_URL.to_string(),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct AccessFileConfig {
    pub allowed_users: Vec<IdentityEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct RuntimeFileConfig {
    pub engine: EngineChoice,
    pub call_timeout_secs: u64,
}

impl Default for RuntimeFileConfig {
    fn default() -> Self {
        Self {
            engine: EngineChoice::Auto,
            call_timeout_secs: DEFAULT_RUNTIME_CALL_TIMEOUT_SECS,
        }
    }
}
