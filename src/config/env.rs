//! Environment override and legacy env-alias handling.
//!
//! Canonical `DOCKHAND_*` variables take precedence. The bare
//! `TELEGRAM_BOT_TOKEN` / `ALLOWED_USERS` names used by older deployments are
//! accepted and surfaced via diagnostics.

use crate::access::AllowList;
use crate::error::ConfigError;

use super::types::EngineChoice;
use super::{Config, ConfigDiagnostics};

pub(super) const TOKEN_ENV: &str = "DOCKHAND_TELEGRAM_TOKEN";
pub(super) const LEGACY_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub(super) const ALLOWED_USERS_ENV: &str = "DOCKHAND_ALLOWED_USERS";
pub(super) const LEGACY_ALLOWED_USERS_ENV: &str = "ALLOWED_USERS";
pub(super) const ENGINE_ENV: &str = "DOCKHAND_ENGINE";
pub(super) const RUNTIME_TIMEOUT_ENV: &str = "DOCKHAND_RUNTIME_TIMEOUT_SECS";

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(raw) = env_with_legacy(env_lookup, ALLOWED_USERS_ENV, LEGACY_ALLOWED_USERS_ENV) {
        config.allow_list = AllowList::parse_csv(&raw);
    }
    if let Some(raw) = env_lookup(ENGINE_ENV).filter(|v| !v.trim().is_empty()) {
        config.runtime.engine = EngineChoice::parse(&raw).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "invalid {ENGINE_ENV} value `{raw}`: expected auto, docker, or podman"
            ))
        })?;
    }
    if let Some(timeout) = env_lookup(RUNTIME_TIMEOUT_ENV) {
        let parsed = timeout.trim().parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid {RUNTIME_TIMEOUT_ENV} value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        // Clamp so a zero never turns into an instant failure on every call.
        config.runtime.call_timeout_secs = parsed.max(1);
    }
    Ok(())
}

/// Resolve a value from canonical env var or, if absent, its legacy alias.
pub(super) fn env_with_legacy<FEnv>(
    env_lookup: &FEnv,
    canonical: &str,
    legacy: &str,
) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(canonical).or_else(|| env_lookup(legacy))
}

/// Runtime token override from env vars, including the legacy alias.
pub(super) fn token_override_with<FEnv>(env_lookup: &FEnv) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_with_legacy(env_lookup, TOKEN_ENV, LEGACY_TOKEN_ENV)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Record diagnostics for legacy env alias usage when canonical vars are absent.
pub(super) fn collect_legacy_env_warnings<FEnv>(
    diagnostics: &mut ConfigDiagnostics,
    env_lookup: &FEnv,
) where
    FEnv: Fn(&str) -> Option<String>,
{
    for (canonical, legacy) in [
        (TOKEN_ENV, LEGACY_TOKEN_ENV),
        (ALLOWED_USERS_ENV, LEGACY_ALLOWED_USERS_ENV),
    ] {
        if env_lookup(canonical).is_none() && env_lookup(legacy).is_some() {
            diagnostics.deprecations.push(format!(
                "Detected legacy env var `{legacy}`. Use {canonical} instead."
            ));
        }
    }
    diagnostics.deprecations.sort();
    diagnostics.deprecations.dedup();
}
