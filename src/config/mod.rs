//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`DOCKHAND_TELEGRAM_TOKEN`, `DOCKHAND_ALLOWED_USERS`,
//!    `DOCKHAND_ENGINE`, `DOCKHAND_RUNTIME_TIMEOUT_SECS`) with the legacy
//!    `TELEGRAM_BOT_TOKEN` / `ALLOWED_USERS` fallback.
//! 2. TOML file specified via --config CLI flag
//! 3. ./dockhand.toml in the current directory
//! 4. $XDG_CONFIG_HOME/dockhand/dockhand.toml (or ~/.config/dockhand/dockhand.toml)
//! 5. Built-in defaults
//!
//! The bot token has no default; failing to resolve one is a startup error.

mod defaults;
mod env;
mod loader;
mod resolve;
mod sources;
mod types;

pub use loader::{load_config, load_config_with_diagnostics};
pub use sources::{config_root_dir, ConfigSource};
pub use types::{
    Config, ConfigDiagnostics, EngineChoice, LoadedConfig, RuntimeConfig, TelegramConfig,
};
