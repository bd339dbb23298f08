//! Container runtime adapter.
//!
//! [`RuntimeClient`] is the narrow capability surface the dispatcher drives;
//! it performs no authorization and no formatting. [`EngineClient`] backs it
//! with the docker or podman CLI.

use crate::error::RuntimeError;
use async_trait::async_trait;
use std::fmt;

mod engine;
mod process;

pub use engine::EngineClient;
pub use process::{Engine, EngineKind};

/// Length of the short container id shown to operators.
pub const SHORT_ID_LEN: usize = 12;

/// Lifecycle state reported by the engine.
///
/// Unknown states are kept verbatim in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    Other(String),
}

impl ContainerStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "restarting" => Self::Restarting,
            "removing" => Self::Removing,
            "exited" | "stopped" => Self::Exited,
            "dead" => Self::Dead,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Restarting => "restarting",
            Self::Removing => "removing",
            Self::Exited => "exited",
            Self::Dead => "dead",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of `list_containers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub short_id: String,
    pub name: String,
    /// Classified state; drives the running/stopped split only.
    pub status: ContainerStatus,
    /// Status exactly as the engine reported it, shown to users.
    pub status_text: String,
}

impl ContainerSummary {
    pub fn new(id: &str, name: impl Into<String>, status: ContainerStatus) -> Self {
        let status_text = status.as_str().to_string();
        Self {
            short_id: short_id(id),
            name: name.into(),
            status,
            status_text,
        }
    }

    /// Classify `raw` but keep its original spelling for display.
    pub fn with_raw_status(id: &str, name: impl Into<String>, raw: &str) -> Self {
        Self {
            status_text: raw.trim().to_string(),
            ..Self::new(id, name, ContainerStatus::parse(raw))
        }
    }
}

/// A container the engine resolved from a user-supplied identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    pub id: String,
    pub name: String,
}

/// Truncate an engine id (optionally `sha256:`-prefixed) to its short form.
pub fn short_id(id: &str) -> String {
    let bare = id.trim().trim_start_matches("sha256:");
    bare.chars().take(SHORT_ID_LEN).collect()
}

/// Container engine operations available to the dispatcher.
///
/// Tests substitute recording fakes; production uses [`EngineClient`].
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    /// List containers; an empty engine yields an empty vec, not an error.
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerSummary>, RuntimeError>;

    /// Resolve `id` with the engine's own matching rules (id, id prefix, name).
    async fn get_container(&self, id: &str) -> Result<ContainerHandle, RuntimeError>;

    async fn start(&self, handle: &ContainerHandle) -> Result<(), RuntimeError>;

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), RuntimeError>;

    async fn restart(&self, handle: &ContainerHandle) -> Result<(), RuntimeError>;
}
