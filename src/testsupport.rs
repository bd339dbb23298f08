//! Shared test fixtures: a recording fake runtime and a log capture helper.

use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::RuntimeError;
use crate::runtime::{ContainerHandle, ContainerSummary, RuntimeClient};

/// One call observed by [`FakeRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    List { include_stopped: bool },
    Get(String),
    Start(String),
    Stop(String),
    Restart(String),
}

/// In-memory runtime that records every call.
///
/// Lookups match the short id, an unambiguous short-id prefix, or the name.
#[derive(Default)]
pub struct FakeRuntime {
    containers: Vec<ContainerSummary>,
    calls: StdMutex<Vec<RuntimeCall>>,
    list_error: Option<RuntimeError>,
    lifecycle_error: Option<RuntimeError>,
    hang: bool,
    delay: Option<Duration>,
}

impl FakeRuntime {
    pub fn with_containers(containers: Vec<ContainerSummary>) -> Self {
        Self {
            containers,
            ..Self::default()
        }
    }

    /// Make `list_containers` fail with `err`.
    pub fn failing_list(mut self, err: RuntimeError) -> Self {
        self.list_error = Some(err);
        self
    }

    /// Make start/stop/restart fail with `err` after a successful lookup.
    pub fn failing_lifecycle(mut self, err: RuntimeError) -> Self {
        self.lifecycle_error = Some(err);
        self
    }

    /// Make every call block forever.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Make every call take `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    async fn record(&self, call: RuntimeCall) {
        self.calls.lock().expect("calls lock").push(call);
        if self.hang {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn lifecycle_result(&self) -> Result<(), RuntimeError> {
        match &self.lifecycle_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RuntimeClient for FakeRuntime {
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerSummary>, RuntimeError> {
        self.record(RuntimeCall::List { include_stopped }).await;
        if let Some(err) = &self.list_error {
            return Err(err.clone());
        }
        Ok(self
            .containers
            .iter()
            .filter(|c| include_stopped || c.status.is_running())
            .cloned()
            .collect())
    }

    async fn get_container(&self, id: &str) -> Result<ContainerHandle, RuntimeError> {
        self.record(RuntimeCall::Get(id.to_string())).await;
        let matches: Vec<&ContainerSummary> = self
            .containers
            .iter()
            .filter(|c| c.name == id || c.short_id.starts_with(id))
            .collect();
        match matches.as_slice() {
            [only] => Ok(ContainerHandle {
                id: only.short_id.clone(),
                name: only.name.clone(),
            }),
            [] => Err(RuntimeError::NotFound(id.to_string())),
            _ => Err(RuntimeError::Rejected(format!(
                "multiple IDs found with provided prefix: {id}"
            ))),
        }
    }

    async fn start(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Start(handle.id.clone())).await;
        self.lifecycle_result()
    }

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Stop(handle.id.clone())).await;
        self.lifecycle_result()
    }

    async fn restart(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Restart(handle.id.clone())).await;
        self.lifecycle_result()
    }
}

/// Cloneable in-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer {
    bytes: Arc<StdMutex<Vec<u8>>>,
}

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().expect("log lock")).to_string()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `fut` with a thread-local subscriber and return its formatted output.
///
/// Only valid on a current-thread runtime (the `#[tokio::test]` default).
pub async fn capture_logs<F: Future>(fut: F) -> (F::Output, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    let output = fut.await;
    drop(guard);
    (output, buffer.contents())
}
