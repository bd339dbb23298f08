//! The fixed command surface exposed to chat users.

use std::fmt;

/// Commands the bot answers; anything else is ignored by the serve loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `/start`: usage text.
    Help,
    /// `/list`: every container, running or not.
    List,
    /// `/start_container <id>`
    Start,
    /// `/stop_container <id>`
    Stop,
    /// `/restart_container <id>`
    Restart,
}

impl CommandKind {
    pub const ALL: [CommandKind; 5] = [
        CommandKind::Help,
        CommandKind::List,
        CommandKind::Start,
        CommandKind::Stop,
        CommandKind::Restart,
    ];

    /// Chat command name without the leading slash.
    pub fn name(self) -> &'static str {
        match self {
            Self::Help => "start",
            Self::List => "list",
            Self::Start => "start_container",
            Self::Stop => "stop_container",
            Self::Restart => "restart_container",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('/');
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// True for the lifecycle commands that take one container identifier.
    pub fn requires_container(self) -> bool {
        matches!(self, Self::Start | Self::Stop | Self::Restart)
    }

    /// Past-tense verb echoed in success replies.
    pub fn completed_verb(self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Restart => "restarted",
            Self::Help | Self::List => "done",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(CommandKind::from_name("/list"), Some(CommandKind::List));
        assert_eq!(CommandKind::from_name("rm"), None);
        assert_eq!(CommandKind::from_name(""), None);
    }

    #[test]
    fn only_lifecycle_commands_take_an_id() {
        assert!(!CommandKind::Help.requires_container());
        assert!(!CommandKind::List.requires_container());
        assert!(CommandKind::Start.requires_container());
        assert!(CommandKind::Stop.requires_container());
        assert!(CommandKind::Restart.requires_container());
    }
}
