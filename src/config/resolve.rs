//! Turn the parsed file layout into a resolved `Config`.

use crate::access::{AllowList, Identity};
use crate::error::ConfigError;

use super::types::{FileConfig, RuntimeConfig, TelegramConfig, TelegramFileConfig};
use super::Config;

pub(super) fn resolve_config_from_file_config<FEnv, FRead>(
    parsed: FileConfig,
    token_override: Option<String>,
    env_lookup: &FEnv,
    read_file: FRead,
) -> Result<Config, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
    FRead: Fn(&str) -> Result<String, ConfigError>,
{
    validate_token_sources(&parsed.telegram)?;
    let token = match token_override {
        Some(token) => token,
        None => resolve_token(&parsed.telegram, env_lookup, read_file)?,
    };
    if token.is_empty() {
        return Err(ConfigError::MissingCredential);
    }

    let api_base_url = normalized_string(&parsed.telegram.api_base_url).ok_or_else(|| {
        ConfigError::Invalid("telegram.api_base_url must not be empty".to_string())
    })?;

    let allowed: Vec<Identity> = parsed
        .access
        .allowed_users
        .into_iter()
        .map(Identity::from)
        .collect();
    if let Some(pos) = allowed.iter().position(|id| id.as_str().is_empty()) {
        return Err(ConfigError::Invalid(format!(
            "access.allowed_users[{pos}] must not be blank"
        )));
    }

    Ok(Config {
        telegram: TelegramConfig {
            token,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            poll_timeout_secs: parsed.telegram.poll_timeout_secs,
        },
        allow_list: AllowList::new(allowed),
        runtime: RuntimeConfig {
            engine: parsed.runtime.engine,
            call_timeout_secs: parsed.runtime.call_timeout_secs.max(1),
        },
    })
}

fn resolve_token<FEnv, FRead>(
    telegram: &TelegramFileConfig,
    env_lookup: &FEnv,
    read_file: FRead,
) -> Result<String, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
    FRead: Fn(&str) -> Result<String, ConfigError>,
{
    if let Some(env_name) = normalized_option(&telegram.token_env) {
        return Ok(env_lookup(&env_name).unwrap_or_default().trim().to_string());
    }
    if let Some(path) = normalized_option(&telegram.token_file) {
        return Ok(read_file(&path)?.trim().to_string());
    }
    Ok(telegram.token.trim().to_string())
}

fn validate_token_sources(telegram: &TelegramFileConfig) -> Result<(), ConfigError> {
    let mut configured = Vec::new();
    if normalized_string(&telegram.token).is_some() {
        configured.push("token");
    }
    if normalized_option(&telegram.token_env).is_some() {
        configured.push("token_env");
    }
    if normalized_option(&telegram.token_file).is_some() {
        configured.push("token_file");
    }
    if configured.len() > 1 {
        return Err(ConfigError::Invalid(format!(
            "only one of telegram.token, telegram.token_env, and telegram.token_file may be set (found: {})",
            configured.join(", ")
        )));
    }
    Ok(())
}

fn normalized_option(value: &Option<String>) -> Option<String> {
    value.as_deref().and_then(normalized_string)
}

fn normalized_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
