//! Authorization-gated command dispatcher.
//!
//! Every inbound command runs the same pipeline:
//! 1. authorize against the allow-list,
//! 2. validate arity,
//! 3. execute against the injected [`RuntimeClient`],
//! 4. translate the outcome into one reply string.
//!
//! Engine failures are logged with the command, container, and cause; the
//! requester only ever sees the fixed text from [`reply`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::access::{AccessGate, Identity};
use crate::error::RuntimeError;
use crate::runtime::RuntimeClient;

mod command;
pub mod reply;

pub use command::CommandKind;

/// Outcome of one command, before translation to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Success(String),
    AccessDenied,
    MissingArgument,
    RuntimeError(CommandFailure),
}

/// Server-side detail of a failed runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub command: CommandKind,
    pub container: Option<String>,
    pub cause: RuntimeError,
}

impl CommandResult {
    /// The text sent back to the requester.
    pub fn reply_text(&self) -> String {
        match self {
            Self::Success(text) => text.clone(),
            Self::AccessDenied => reply::ACCESS_DENIED.to_string(),
            Self::MissingArgument => reply::MISSING_CONTAINER_ID.to_string(),
            Self::RuntimeError(failure) => reply::failure_text(failure.command).to_string(),
        }
    }
}

/// Maps commands to runtime calls behind the access gate.
///
/// Holds only immutable state, so one instance is shared across tasks.
pub struct CommandDispatcher {
    gate: AccessGate,
    runtime: Arc<dyn RuntimeClient>,
    call_timeout: Option<Duration>,
}

impl CommandDispatcher {
    pub fn new(gate: AccessGate, runtime: Arc<dyn RuntimeClient>) -> Self {
        Self {
            gate,
            runtime,
            call_timeout: None,
        }
    }

    /// Bound every runtime call; expiry is reported as a runtime failure.
    pub fn with_call_timeout(mut self, limit: Duration) -> Self {
        self.call_timeout = Some(limit);
        self
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Run the full pipeline and return the reply text.
    pub async fn dispatch(
        &self,
        identity: &Identity,
        kind: CommandKind,
        args: &[String],
    ) -> String {
        self.handle(identity, kind, args).await.reply_text()
    }

    /// Run the full pipeline and return the structured outcome.
    pub async fn handle(
        &self,
        identity: &Identity,
        kind: CommandKind,
        args: &[String],
    ) -> CommandResult {
        if !self.gate.is_authorized(identity) {
            warn!(identity = %identity, command = %kind, "access denied");
            return CommandResult::AccessDenied;
        }

        let container = first_argument(args);
        if kind.requires_container() && container.is_none() {
            return CommandResult::MissingArgument;
        }

        let outcome = match (kind, container) {
            (CommandKind::Help, _) => Ok(reply::HELP_TEXT.to_string()),
            (CommandKind::List, _) => self.list().await,
            (_, Some(id)) => self.lifecycle(kind, id).await,
            (_, None) => return CommandResult::MissingArgument,
        };

        match outcome {
            Ok(text) => {
                info!(
                    identity = %identity,
                    command = %kind,
                    container = %container.unwrap_or("-"),
                    "command completed"
                );
                CommandResult::Success(text)
            }
            Err(cause) => {
                error!(
                    identity = %identity,
                    command = %kind,
                    container = %container.unwrap_or("-"),
                    error_kind = cause.kind(),
                    cause = %cause,
                    "command failed"
                );
                CommandResult::RuntimeError(CommandFailure {
                    command: kind,
                    container: container.map(str::to_string),
                    cause,
                })
            }
        }
    }

    async fn list(&self) -> Result<String, RuntimeError> {
        let containers = self
            .guarded(self.runtime.list_containers(true), "list containers")
            .await?;
        Ok(reply::render_container_list(&containers))
    }

    async fn lifecycle(&self, kind: CommandKind, id: &str) -> Result<String, RuntimeError> {
        let handle = self
            .guarded(self.runtime.get_container(id), "resolve container")
            .await?;
        match kind {
            CommandKind::Start => self.guarded(self.runtime.start(&handle), "start").await?,
            CommandKind::Stop => self.guarded(self.runtime.stop(&handle), "stop").await?,
            CommandKind::Restart => {
                self.guarded(self.runtime.restart(&handle), "restart").await?
            }
            CommandKind::Help | CommandKind::List => {}
        }
        Ok(reply::lifecycle_success(kind, id))
    }

    async fn guarded<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, RuntimeError>>,
        what: &str,
    ) -> Result<T, RuntimeError> {
        let Some(limit) = self.call_timeout else {
            return fut.await;
        };
        match tokio::time::timeout(limit, fut).await {
            Ok(out) => out,
            Err(_) => Err(RuntimeError::Timeout(format!(
                "{what} did not finish within {}s",
                limit.as_secs_f32()
            ))),
        }
    }
}

/// The container identifier: first non-blank token, extra tokens ignored.
fn first_argument(args: &[String]) -> Option<&str> {
    args.iter()
        .map(|arg| arg.trim())
        .find(|arg| !arg.is_empty())
}
