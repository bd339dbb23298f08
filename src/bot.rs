//! Serve loop: pull commands from the channel, run each one as its own task.
//!
//! A slow or hung engine call only holds up the task that issued it; polling
//! and every other command keep going.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::channel::{InboundCommand, MessageChannel};
use crate::dispatch::{CommandDispatcher, CommandKind};

/// Pause after a failed poll before asking the transport again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

pub struct Bot {
    channel: Arc<dyn MessageChannel>,
    dispatcher: Arc<CommandDispatcher>,
    poll_retry_delay: Duration,
}

impl Bot {
    pub fn new(channel: Arc<dyn MessageChannel>, dispatcher: Arc<CommandDispatcher>) -> Self {
        Self {
            channel,
            dispatcher,
            poll_retry_delay: POLL_RETRY_DELAY,
        }
    }

    #[cfg(test)]
    fn with_poll_retry_delay(mut self, delay: Duration) -> Self {
        self.poll_retry_delay = delay;
        self
    }

    /// Poll until `shutdown` resolves, then wait for in-flight commands.
    ///
    /// Every command accepted before shutdown still gets its reply; only
    /// polling for new ones stops.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut tasks = JoinSet::new();
        info!("listening for commands");
        loop {
            while let Some(done) = tasks.try_join_next() {
                log_task_exit(done);
            }
            tokio::select! {
                _ = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown requested; no longer polling");
                    break;
                }
                batch = self.channel.next_batch() => match batch {
                    Ok(commands) => {
                        for command in commands {
                            self.spawn_command(&mut tasks, command);
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "polling for updates failed");
                        tokio::time::sleep(self.poll_retry_delay).await;
                    }
                },
            }
        }
        while let Some(done) = tasks.join_next().await {
            log_task_exit(done);
        }
        info!("all in-flight commands finished");
    }

    /// Handle one command on its own task tracked by `tasks`.
    fn spawn_command(&self, tasks: &mut JoinSet<()>, command: InboundCommand) {
        let channel = Arc::clone(&self.channel);
        let dispatcher = Arc::clone(&self.dispatcher);
        tasks.spawn(async move {
            handle_inbound(channel.as_ref(), &dispatcher, command).await;
        });
    }
}

fn log_task_exit(result: Result<(), tokio::task::JoinError>) {
    if let Err(err) = result {
        error!(error = %err, "command task aborted");
    }
}

/// Dispatch one inbound command and send its single reply.
///
/// Names outside the command surface are dropped without a reply.
pub async fn handle_inbound(
    channel: &dyn MessageChannel,
    dispatcher: &CommandDispatcher,
    command: InboundCommand,
) {
    let Some(kind) = CommandKind::from_name(&command.command_name) else {
        debug!(command = %command.command_name, "ignoring unknown command");
        return;
    };
    let reply = dispatcher
        .dispatch(&command.identity, kind, &command.args)
        .await;
    if let Err(err) = channel.send(&command.reply_to, &reply).await {
        error!(
            identity = %command.identity,
            command = %kind,
            error = %err,
            "failed to deliver reply"
        );
    }
}
