//! User-facing reply text.
//!
//! Failure strings are fixed per command and never carry engine detail.

use super::CommandKind;
use crate::runtime::ContainerSummary;

pub const ACCESS_DENIED: &str = "Sorry, you do not have access to this bot.";
pub const MISSING_CONTAINER_ID: &str = "Please specify a container ID.";
pub const NO_CONTAINERS: &str = "No containers found.";
pub const RUNNING_GLYPH: &str = "🟢";
pub const STOPPED_GLYPH: &str = "🔴";
pub const SEPARATOR: &str = "-------------------";

const LIST_HEADER: &str = "Containers:";

pub const HELP_TEXT: &str = "Hi! I manage the Docker containers on this host.\n\
Available commands:\n\
/list - Show all containers\n\
/start_container <container_id> - Start a container\n\
/stop_container <container_id> - Stop a container\n\
/restart_container <container_id> - Restart a container";

/// Fixed failure reply for a command whose runtime call failed.
pub fn failure_text(kind: CommandKind) -> &'static str {
    match kind {
        CommandKind::List => "An error occurred while listing containers.",
        CommandKind::Start => "An error occurred while starting the container.",
        CommandKind::Stop => "An error occurred while stopping the container.",
        CommandKind::Restart => "An error occurred while restarting the container.",
        CommandKind::Help => "An error occurred while handling the command.",
    }
}

/// Confirmation echoing the identifier the user typed.
pub fn lifecycle_success(kind: CommandKind, container: &str) -> String {
    format!(
        "Container {container} {} successfully.",
        kind.completed_verb()
    )
}

/// Two-way split: running is active, every other status is inactive.
pub fn status_glyph(summary: &ContainerSummary) -> &'static str {
    if summary.status.is_running() {
        RUNNING_GLYPH
    } else {
        STOPPED_GLYPH
    }
}

/// Render the `/list` reply; an empty slice yields [`NO_CONTAINERS`].
pub fn render_container_list(containers: &[ContainerSummary]) -> String {
    if containers.is_empty() {
        return NO_CONTAINERS.to_string();
    }
    let mut message = format!("{LIST_HEADER}\n\n");
    for container in containers {
        message.push_str(&format!(
            "{} ID: {}\nName: {}\nStatus: {}\n{SEPARATOR}\n",
            status_glyph(container),
            container.short_id,
            container.name,
            container.status_text
        ));
    }
    message
}
