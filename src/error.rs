//! Unified error types for the bot.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
    /// No bot credential could be resolved from env, file, or config.
    MissingCredential,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
            Self::MissingCredential => write!(
                f,
                "missing bot token: set DOCKHAND_TELEGRAM_TOKEN or telegram.token in the config file"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// RuntimeError
// ---------------------------------------------------------------------------

/// Errors from the container engine adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// No container matches the requested identifier.
    NotFound(String),
    /// The engine refused the operation (already stopped, ambiguous id, ...).
    Rejected(String),
    /// The engine call did not finish within the configured limit.
    Timeout(String),
    /// The engine binary or daemon could not be reached.
    Unavailable(String),
    /// The engine answered with output we could not interpret.
    Malformed(String),
}

impl RuntimeError {
    /// Short machine-friendly label used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Rejected(_) => "rejected",
            Self::Timeout(_) => "timeout",
            Self::Unavailable(_) => "unavailable",
            Self::Malformed(_) => "malformed",
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "NotFound: no such container `{id}`"),
            Self::Rejected(msg) => write!(f, "rejected: {msg}"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
            Self::Unavailable(msg) => write!(f, "unavailable: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed engine output: {msg}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

// ---------------------------------------------------------------------------
// ChannelError
// ---------------------------------------------------------------------------

/// Errors from the chat transport.
#[derive(Debug)]
pub enum ChannelError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the bot API.
    Status(u16, String),
    /// The bot API answered `ok: false`.
    Api(String),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status(code, body) => write!(f, "status {code}: {body}"),
            Self::Api(msg) => write!(f, "bot api: {msg}"),
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<reqwest::Error> for ChannelError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}
