//! CLI-backed [`RuntimeClient`] for docker and podman.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Duration;
use tracing::debug;

use super::process::{detect_engine, ensure_success, run_process, run_with_timeout, Engine};
use super::{ContainerHandle, ContainerStatus, ContainerSummary, RuntimeClient};
use crate::config::{EngineChoice, RuntimeConfig};
use crate::error::RuntimeError;

/// Grace period the engine gives a container before killing it on stop.
const ENGINE_STOP_GRACE: Duration = Duration::from_secs(10);

/// Headroom past the slowest engine call before the dispatcher gives up.
const DISPATCH_SLACK: Duration = Duration::from_secs(5);

/// Drives the engine CLI; holds no per-container state.
#[derive(Debug, Clone)]
pub struct EngineClient {
    engine: Engine,
    call_timeout: Duration,
}

impl EngineClient {
    pub fn new(engine: Engine, call_timeout: Duration) -> Self {
        Self {
            engine,
            call_timeout,
        }
    }

    /// Probe PATH for the configured engine frontend.
    pub async fn detect(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let engine = detect_engine(config.engine).await?;
        Ok(Self::new(
            engine,
            Duration::from_secs(config.call_timeout_secs.max(1)),
        ))
    }

    /// Client for the configured frontend without probing PATH.
    ///
    /// Used when startup detection fails; calls then surface as `Unavailable`.
    pub fn undetected(config: &RuntimeConfig) -> Self {
        let engine = match config.engine {
            EngineChoice::Podman => Engine::podman(),
            EngineChoice::Auto | EngineChoice::Docker => Engine::docker(),
        };
        Self::new(engine, Duration::from_secs(config.call_timeout_secs.max(1)))
    }

    /// Upper bound for one dispatched runtime call, including the stop grace.
    pub fn dispatch_deadline(&self) -> Duration {
        self.call_timeout + ENGINE_STOP_GRACE + DISPATCH_SLACK
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({:?}, timeout {}s)",
            self.engine.command,
            self.engine.kind,
            self.call_timeout.as_secs()
        )
    }

    async fn run(
        &self,
        args: &[&str],
        target: Option<&str>,
        limit: Duration,
    ) -> Result<String, RuntimeError> {
        let verb: Vec<&str> = args.iter().copied().take_while(|a| *a != "--").take(2).collect();
        let context = format!("{} {}", self.engine.command, verb.join(" "));
        debug!(engine = %self.engine.command, ?args, "running engine command");
        let output = run_with_timeout(
            run_process(&self.engine.command, args),
            limit,
            &format!("timed out waiting for `{context}`"),
        )
        .await?;
        Ok(ensure_success(output, target, &context)?.stdout)
    }

    async fn lifecycle(&self, verb: &str, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        let limit = match verb {
            "stop" | "restart" => self.call_timeout + ENGINE_STOP_GRACE,
            _ => self.call_timeout,
        };
        self.run(&[verb, "--", handle.id.as_str()], Some(&handle.id), limit)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl RuntimeClient for EngineClient {
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let mut args = vec!["ps"];
        if include_stopped {
            args.push("--all");
        }
        args.extend(["--no-trunc", "--format", "{{json .}}"]);
        let stdout = self.run(&args, None, self.call_timeout).await?;
        parse_ps_output(&stdout)
    }

    async fn get_container(&self, id: &str) -> Result<ContainerHandle, RuntimeError> {
        let stdout = self
            .run(&inspect_args(id), Some(id), self.call_timeout)
            .await?;
        parse_inspect_output(&stdout, id)
    }

    async fn start(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        self.lifecycle("start", handle).await
    }

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        self.lifecycle("stop", handle).await
    }

    async fn restart(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        self.lifecycle("restart", handle).await
    }
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

/// `container inspect` argv; `--` keeps a user-typed id from parsing as a flag.
fn inspect_args(id: &str) -> [&str; 6] {
    ["container", "inspect", "--format", "{{json .}}", "--", id]
}

/// One `ps` row; docker and podman disagree on key casing and shapes.
#[derive(Debug, Deserialize)]
struct PsRow {
    #[serde(rename = "ID", alias = "Id")]
    id: String,
    #[serde(rename = "Names", default)]
    names: PsNames,
    #[serde(rename = "State", default)]
    state: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PsNames {
    One(String),
    Many(Vec<String>),
}

impl Default for PsNames {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl PsNames {
    fn primary(&self) -> String {
        let first = match self {
            Self::One(joined) => joined.split(',').next().unwrap_or_default(),
            Self::Many(names) => names.first().map(String::as_str).unwrap_or_default(),
        };
        first.trim().trim_start_matches('/').to_string()
    }
}

impl From<PsRow> for ContainerSummary {
    fn from(row: PsRow) -> Self {
        let name = row.names.primary();
        match &row.state {
            serde_json::Value::String(raw) => ContainerSummary::with_raw_status(&row.id, name, raw),
            serde_json::Value::Null => {
                ContainerSummary::new(&row.id, name, ContainerStatus::Other("unknown".into()))
            }
            other => ContainerSummary::new(&row.id, name, ContainerStatus::Other(other.to_string())),
        }
    }
}

/// Parse `ps --format '{{json .}}'` (one object per line) or a JSON array.
fn parse_ps_output(stdout: &str) -> Result<Vec<ContainerSummary>, RuntimeError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        let rows: Vec<PsRow> = serde_json::from_str(trimmed)
            .map_err(|e| RuntimeError::Malformed(format!("ps array: {e}")))?;
        return Ok(rows.into_iter().map(ContainerSummary::from).collect());
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str::<PsRow>(line)
                .map(ContainerSummary::from)
                .map_err(|e| RuntimeError::Malformed(format!("ps row: {e}")))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct InspectDoc {
    #[serde(rename = "Id", alias = "ID")]
    id: String,
    #[serde(rename = "Name", default)]
    name: String,
}

/// Parse `container inspect --format '{{json .}}'`; podman may wrap it in an array.
fn parse_inspect_output(stdout: &str, requested: &str) -> Result<ContainerHandle, RuntimeError> {
    let trimmed = stdout.trim();
    let doc: InspectDoc = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<InspectDoc>>(trimmed)
            .map_err(|e| RuntimeError::Malformed(format!("inspect: {e}")))?
            .into_iter()
            .next()
            .ok_or_else(|| RuntimeError::NotFound(requested.to_string()))?
    } else {
        serde_json::from_str(trimmed)
            .map_err(|e| RuntimeError::Malformed(format!("inspect: {e}")))?
    };
    Ok(ContainerHandle {
        id: doc.id,
        name: doc.name.trim_start_matches('/').to_string(),
    })
}
