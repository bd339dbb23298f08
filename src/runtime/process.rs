//! Process helpers for driving the container engine CLI.

use crate::config::EngineChoice;
use crate::error::RuntimeError;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

/// Structured process output for one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Engine CLI frontend selected at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    pub command: String,
    pub kind: EngineKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Docker,
    Podman,
}

impl Engine {
    pub fn docker() -> Self {
        Self {
            command: "docker".to_string(),
            kind: EngineKind::Docker,
        }
    }

    pub fn podman() -> Self {
        Self {
            command: "podman".to_string(),
            kind: EngineKind::Podman,
        }
    }
}

/// Wrap an engine call with a hard deadline.
pub(super) async fn run_with_timeout<T>(
    fut: impl std::future::Future<Output = Result<T, RuntimeError>>,
    limit: Duration,
    timeout_context: &str,
) -> Result<T, RuntimeError> {
    match timeout(limit, fut).await {
        Ok(out) => out,
        Err(_) => Err(RuntimeError::Timeout(format!(
            "{timeout_context} after {}",
            format_duration(limit)
        ))),
    }
}

/// Human-oriented timeout formatting used in error messages.
pub(super) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();
    if secs == 0 {
        return format!("{millis}ms");
    }
    if millis == 0 {
        if secs % 3600 == 0 {
            return format!("{}h", secs / 3600);
        }
        if secs % 60 == 0 {
            return format!("{}m", secs / 60);
        }
        return format!("{secs}s");
    }
    format!("{secs}.{millis:03}s")
}

/// Spawn and wait for a process.
pub(super) async fn run_process(program: &str, args: &[&str]) -> Result<ExecOutput, RuntimeError> {
    let mut cmd = Command::new(program);
    // Timeouts drop the future; the child must not outlive it.
    cmd.kill_on_drop(true);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let output = cmd
        .output()
        .await
        .map_err(|e| RuntimeError::Unavailable(format!("{program}: {e}")))?;

    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Convert a non-zero exit into the matching runtime error.
///
/// `target` is the container identifier the call was about, if any.
pub(super) fn ensure_success(
    output: ExecOutput,
    target: Option<&str>,
    context: &str,
) -> Result<ExecOutput, RuntimeError> {
    if output.exit_code == 0 {
        return Ok(output);
    }

    let mut details = if output.stderr.trim().is_empty() {
        output.stdout.trim().to_string()
    } else {
        output.stderr.trim().to_string()
    };
    if details.is_empty() {
        details = format!("command exited with {}", output.exit_code);
    }

    let lowered = details.to_ascii_lowercase();
    if let Some(target) = target {
        if lowered.contains("no such container") || lowered.contains("no such object") {
            return Err(RuntimeError::NotFound(target.to_string()));
        }
    }
    if lowered.contains("cannot connect to the docker daemon")
        || lowered.contains("is the docker daemon running")
        || lowered.contains("unable to connect to podman")
    {
        return Err(RuntimeError::Unavailable(format!("{context}: {details}")));
    }
    Err(RuntimeError::Rejected(format!("{context}: {details}")))
}

/// Resolve the engine frontend for the configured choice.
pub(super) async fn detect_engine(choice: EngineChoice) -> Result<Engine, RuntimeError> {
    match choice {
        EngineChoice::Docker => return require_engine(Engine::docker()).await,
        EngineChoice::Podman => return require_engine(Engine::podman()).await,
        EngineChoice::Auto => {}
    }

    if let Some(version) = probe_version("docker").await? {
        return Ok(Engine {
            command: "docker".to_string(),
            kind: docker_frontend_kind(&version),
        });
    }
    if probe_version("podman").await?.is_some() {
        return Ok(Engine::podman());
    }

    Err(RuntimeError::Unavailable(
        "neither `docker` nor `podman` was found in PATH".into(),
    ))
}

async fn require_engine(mut engine: Engine) -> Result<Engine, RuntimeError> {
    match probe_version(&engine.command).await? {
        Some(version) => {
            if engine.kind == EngineKind::Docker {
                engine.kind = docker_frontend_kind(&version);
            }
            Ok(engine)
        }
        None => Err(RuntimeError::Unavailable(format!(
            "`{}` was not found in PATH",
            engine.command
        ))),
    }
}

async fn probe_version(command: &str) -> Result<Option<String>, RuntimeError> {
    let output = match Command::new(command).arg("--version").output().await {
        Ok(out) => out,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(RuntimeError::Unavailable(format!(
                "failed to probe {command}: {e}"
            )))
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    Ok(Some(format!("{stdout}\n{stderr}")))
}

/// Infer frontend compatibility when a `docker` binary is present.
pub(super) fn docker_frontend_kind(version_output: &str) -> EngineKind {
    if version_output.to_ascii_lowercase().contains("podman") {
        EngineKind::Podman
    } else {
        EngineKind::Docker
    }
}
