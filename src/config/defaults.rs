//! Default configuration constants.

/// Telegram Bot API endpoint.
pub(super) const DEFAULT_TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";
/// Long-poll window passed to `getUpdates`.
pub(super) const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
/// Upper bound for one container engine call.
pub(super) const DEFAULT_RUNTIME_CALL_TIMEOUT_SECS: u64 = 30;
/// File name searched in the working directory and the config root.
pub(super) const CONFIG_FILE_NAME: &str = "dockhand.toml";
/// Directory under the config root holding the global config.
pub(super) const CONFIG_DIR_NAME: &str = "dockhand";
