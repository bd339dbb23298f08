//! Build provenance recorded by `build.rs`.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `git describe` of the source tree, or `unknown` outside a checkout.
pub const GIT_COMMIT: &str = env!("DOCKHAND_GIT_COMMIT");

const BUILT_UNIX: &str = env!("DOCKHAND_BUILT_UNIX");

/// Build time in seconds since the Unix epoch.
pub fn built_unix() -> Option<u64> {
    BUILT_UNIX.parse().ok().filter(|secs| *secs > 0)
}

/// `User-Agent` sent with every Bot API request.
pub fn user_agent() -> String {
    format!("dockhand/{VERSION} (+{GIT_COMMIT})")
}

/// First line of the `--check` report.
pub fn describe() -> String {
    match built_unix() {
        Some(secs) => format!("dockhand {VERSION} (commit {GIT_COMMIT}, built at unix {secs})"),
        None => format!("dockhand {VERSION} (commit {GIT_COMMIT})"),
    }
}
