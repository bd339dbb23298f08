//! End-to-end command scenarios through the public API with an in-memory
//! runtime and transport.

use async_trait::async_trait;
use dockhand::access::{AccessGate, AllowList, Identity};
use dockhand::bot::handle_inbound;
use dockhand::channel::{parse_command_text, InboundCommand, MessageChannel, ReplyTarget};
use dockhand::dispatch::{reply, CommandDispatcher, CommandKind, CommandResult};
use dockhand::error::{ChannelError, RuntimeError};
use dockhand::runtime::{
    ContainerHandle, ContainerStatus, ContainerSummary, RuntimeClient,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ScriptedRuntime {
    containers: Vec<ContainerSummary>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRuntime {
    fn with(containers: Vec<ContainerSummary>) -> Self {
        Self {
            containers,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RuntimeClient for ScriptedRuntime {
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerSummary>, RuntimeError> {
        self.record(format!("list all={include_stopped}"));
        Ok(self.containers.clone())
    }

    async fn get_container(&self, id: &str) -> Result<ContainerHandle, RuntimeError> {
        self.record(format!("get {id}"));
        self.containers
            .iter()
            .find(|c| c.short_id.starts_with(id) || c.name == id)
            .map(|c| ContainerHandle {
                id: c.short_id.clone(),
                name: c.name.clone(),
            })
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))
    }

    async fn start(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        self.record(format!("start {}", handle.id));
        Ok(())
    }

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        self.record(format!("stop {}", handle.id));
        Ok(())
    }

    async fn restart(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        self.record(format!("restart {}", handle.id));
        Err(RuntimeError::Rejected("container is marked for removal".into()))
    }
}

#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    async fn next_batch(&self) -> Result<Vec<InboundCommand>, ChannelError> {
        Ok(Vec::new())
    }

    async fn send(&self, target: &ReplyTarget, text: &str) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((target.chat_id, text.to_string()));
        Ok(())
    }
}

fn web() -> ContainerSummary {
    ContainerSummary::new("abc123", "web", ContainerStatus::Running)
}

fn setup(containers: Vec<ContainerSummary>) -> (Arc<ScriptedRuntime>, CommandDispatcher) {
    let runtime = Arc::new(ScriptedRuntime::with(containers));
    let gate = AccessGate::new(AllowList::parse_csv("42"));
    (runtime.clone(), CommandDispatcher::new(gate, runtime))
}

fn command(from: i64, text: &str) -> InboundCommand {
    let (command_name, args) = parse_command_text(text, None).unwrap();
    InboundCommand {
        identity: Identity::from(from),
        reply_to: ReplyTarget {
            chat_id: from,
            message_id: Some(7),
        },
        command_name,
        args,
    }
}

#[tokio::test]
async fn authorized_list_shows_running_container() {
    let (runtime, dispatcher) = setup(vec![web()]);
    let channel = RecordingChannel::default();

    handle_inbound(&channel, &dispatcher, command(42, "/list")).await;

    let sent = channel.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    let text = &sent[0].1;
    for needle in ["abc123", "web", "running", reply::RUNNING_GLYPH, reply::SEPARATOR] {
        assert!(text.contains(needle), "missing {needle:?} in {text}");
    }
    assert_eq!(runtime.calls(), vec!["list all=true".to_string()]);
}

#[tokio::test]
async fn stranger_cannot_stop_a_container() {
    let (runtime, dispatcher) = setup(vec![web()]);
    let channel = RecordingChannel::default();

    handle_inbound(&channel, &dispatcher, command(99, "/stop_container abc123")).await;

    let sent = channel.sent.lock().unwrap().clone();
    assert_eq!(sent, vec![(99, reply::ACCESS_DENIED.to_string())]);
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn unknown_container_gets_generic_failure() {
    let (runtime, dispatcher) = setup(vec![web()]);
    let result = dispatcher
        .handle(
            &Identity::from(42),
            CommandKind::Start,
            &["ghost".to_string()],
        )
        .await;

    match &result {
        CommandResult::RuntimeError(failure) => {
            assert_eq!(failure.cause, RuntimeError::NotFound("ghost".into()));
            assert_eq!(failure.container.as_deref(), Some("ghost"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(result.reply_text(), reply::failure_text(CommandKind::Start));
    assert_eq!(runtime.calls(), vec!["get ghost".to_string()]);
}

#[tokio::test]
async fn lifecycle_by_name_acts_on_resolved_id() {
    let (runtime, dispatcher) = setup(vec![web()]);
    let channel = RecordingChannel::default();

    handle_inbound(&channel, &dispatcher, command(42, "/stop_container web")).await;
    handle_inbound(&channel, &dispatcher, command(42, "/restart_container abc")).await;
    handle_inbound(&channel, &dispatcher, command(42, "/start_container")).await;

    let sent = channel.sent.lock().unwrap().clone();
    assert_eq!(sent[0].1, "Container web stopped successfully.");
    assert_eq!(sent[1].1, reply::failure_text(CommandKind::Restart));
    assert!(!sent[1].1.contains("removal"));
    assert_eq!(sent[2].1, reply::MISSING_CONTAINER_ID);
    assert_eq!(
        runtime.calls(),
        vec![
            "get web".to_string(),
            "stop abc123".to_string(),
            "get abc".to_string(),
            "restart abc123".to_string(),
        ]
    );
}

#[tokio::test]
async fn stopped_containers_use_the_stopped_glyph() {
    let (_, dispatcher) = setup(vec![
        web(),
        ContainerSummary::new("def456", "db", ContainerStatus::Exited),
        ContainerSummary::new("fed789", "cache", ContainerStatus::Other("weird".into())),
    ]);
    let text = dispatcher
        .dispatch(&Identity::from(42), CommandKind::List, &[])
        .await;
    assert_eq!(text.matches(reply::RUNNING_GLYPH).count(), 1);
    assert_eq!(text.matches(reply::STOPPED_GLYPH).count(), 2);
    assert_eq!(text.matches(reply::SEPARATOR).count(), 3);
}
