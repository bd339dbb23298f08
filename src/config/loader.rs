//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::env::{apply_runtime_env_overrides, collect_legacy_env_warnings, token_override_with};
use super::resolve::resolve_config_from_file_config;
use super::sources::{config_root_dir, read_config_text_with_sources};
use super::types::FileConfig;
use super::{Config, ConfigDiagnostics, LoadedConfig};

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    Ok(load_config_with_diagnostics(path_override)?.config)
}

/// Load configuration and return compatibility diagnostics.
pub fn load_config_with_diagnostics(
    path_override: Option<&str>,
) -> Result<LoadedConfig, ConfigError> {
    load_config_with_diagnostics_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_with_diagnostics_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let parsed: FileConfig = toml::from_str(&config_text)?;
    let mut config = resolve_config_from_file_config(
        parsed,
        token_override_with(&env_lookup),
        &env_lookup,
        |path| {
            read_file(Path::new(path)).map_err(|e| {
                ConfigError::Invalid(format!("failed to read telegram.token_file `{path}`: {e}"))
            })
        },
    )?;
    apply_runtime_env_overrides(&mut config, &env_lookup)?;

    let mut diagnostics = ConfigDiagnostics::default();
    collect_legacy_env_warnings(&mut diagnostics, &env_lookup);

    Ok(LoadedConfig {
        config,
        source,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Identity;
    use crate::config::{ConfigSource, EngineChoice};
    use std::collections::HashMap;
    use std::io;

    fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load_with(
        file: Option<&str>,
        env: HashMap<String, String>,
    ) -> Result<LoadedConfig, ConfigError> {
        let text = file.map(str::to_string);
        load_config_with_diagnostics_from_sources(
            text.as_ref().map(|_| "/etc/dockhand.toml"),
            |path| match (&text, path) {
                (Some(body), p) if p == Path::new("/etc/dockhand.toml") => Ok(body.clone()),
                (_, p) if p == Path::new("/run/secrets/token") => Ok("file-token\n".to_string()),
                _ => Err(io::Error::new(io::ErrorKind::NotFound, "missing")),
            },
            |name| env.get(name).cloned(),
            || None,
        )
    }

    #[test]
    fn missing_token_is_fatal_credential_error() {
        let err = load_with(None, HashMap::new()).expect_err("no token anywhere");
        assert!(matches!(err, ConfigError::MissingCredential), "got: {err}");
    }

    #[test]
    fn file_config_is_resolved() {
        let loaded = load_with(
            Some(
                r#"
[telegram]
token = "abc:def"
api_base_url = "http://localhost:8081/"
poll_timeout_secs = 5

[access]
allowed_users = [42, "1001"]

[runtime]
engine = "podman"
call_timeout_secs = 0
"#,
            ),
            HashMap::new(),
        )
        .unwrap();
        let config = loaded.config;
        assert_eq!(config.telegram.token, "abc:def");
        assert_eq!(config.telegram.api_base_url, "http://localhost:8081");
        assert_eq!(config.telegram.poll_timeout_secs, 5);
        assert!(config.allow_list.contains(&Identity::from(42)));
        assert!(config.allow_list.contains(&Identity::from(1001)));
        assert_eq!(config.runtime.engine, EngineChoice::Podman);
        assert_eq!(config.runtime.call_timeout_secs, 1);
        assert_eq!(
            loaded.source,
            ConfigSource::Explicit(PathBuf::from("/etc/dockhand.toml"))
        );
    }

    #[test]
    fn legacy_env_names_still_work_with_warning() {
        let loaded = load_with(
            None,
            env_map(&[("TELEGRAM_BOT_TOKEN", "legacy"), ("ALLOWED_USERS", "7,8")]),
        )
        .unwrap();
        assert_eq!(loaded.config.telegram.token, "legacy");
        assert_eq!(loaded.config.allow_list.len(), 2);
        assert_eq!(loaded.diagnostics.deprecations.len(), 2);
        assert_eq!(loaded.source, ConfigSource::BuiltInDefaults);
    }

    #[test]
    fn env_overrides_beat_file_values() {
        let loaded = load_with(
            Some("[telegram]\ntoken = \"file\"\n[access]\nallowed_users = [1]\n"),
            env_map(&[
                ("DOCKHAND_TELEGRAM_TOKEN", "env"),
                ("DOCKHAND_ALLOWED_USERS", "2"),
                ("DOCKHAND_ENGINE", "docker"),
                ("DOCKHAND_RUNTIME_TIMEOUT_SECS", "12"),
            ]),
        )
        .unwrap();
        let config = loaded.config;
        assert_eq!(config.telegram.token, "env");
        assert!(!config.allow_list.contains(&Identity::from(1)));
        assert!(config.allow_list.contains(&Identity::from(2)));
        assert_eq!(config.runtime.engine, EngineChoice::Docker);
        assert_eq!(config.runtime.call_timeout_secs, 12);
        assert!(loaded.diagnostics.deprecations.is_empty());
    }

    #[test]
    fn token_file_and_token_env_are_supported() {
        let loaded = load_with(
            Some("[telegram]\ntoken_file = \"/run/secrets/token\"\n"),
            HashMap::new(),
        )
        .unwrap();
        assert_eq!(loaded.config.telegram.token, "file-token");

        let loaded = load_with(
            Some("[telegram]\ntoken_env = \"MY_BOT\"\n"),
            env_map(&[("MY_BOT", " from-env ")]),
        )
        .unwrap();
        assert_eq!(loaded.config.telegram.token, "from-env");
    }

    #[test]
    fn conflicting_token_sources_are_rejected() {
        let err = load_with(
            Some("[telegram]\ntoken = \"a\"\ntoken_env = \"B\"\n"),
            HashMap::new(),
        )
        .expect_err("two token sources");
        assert!(err.to_string().contains("only one of"), "got: {err}");
    }

    #[test]
    fn bad_engine_and_timeout_env_values_are_invalid() {
        let err = load_with(
            None,
            env_map(&[("DOCKHAND_TELEGRAM_TOKEN", "t"), ("DOCKHAND_ENGINE", "lxc")]),
        )
        .expect_err("unknown engine");
        assert!(err.to_string().contains("DOCKHAND_ENGINE"));

        let err = load_with(
            None,
            env_map(&[
                ("DOCKHAND_TELEGRAM_TOKEN", "t"),
                ("DOCKHAND_RUNTIME_TIMEOUT_SECS", "soon"),
            ]),
        )
        .expect_err("non-numeric timeout");
        assert!(err.to_string().contains("DOCKHAND_RUNTIME_TIMEOUT_SECS"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = load_with(
            Some("[telegram]\ntoken = \"t\"\nbogus = 1\n"),
            HashMap::new(),
        )
        .expect_err("unknown key");
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn blank_allow_list_entries_are_invalid() {
        let err = load_with(
            Some("[telegram]\ntoken = \"t\"\n[access]\nallowed_users = [42, \"  \"]\n"),
            HashMap::new(),
        )
        .expect_err("blank entry");
        assert!(matches!(err, ConfigError::Invalid(_)), "got: {err}");
        assert!(err.to_string().contains("allowed_users[1]"));
    }
}
