//! Chat transport boundary.
//!
//! The bot core only needs two things from a transport: a way to pull the
//! next inbound commands and a way to send one reply back.
//! - `telegram`: Telegram Bot API long-polling implementation.

use async_trait::async_trait;

use crate::access::Identity;
use crate::error::ChannelError;

pub mod telegram;

pub use telegram::TelegramChannel;

/// Where a reply for one inbound command goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    pub chat_id: i64,
    pub message_id: Option<i64>,
}

/// One command as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub identity: Identity,
    pub reply_to: ReplyTarget,
    /// Command name without the leading slash or `@bot` suffix.
    pub command_name: String,
    pub args: Vec<String>,
}

/// Transport used by the serve loop.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Wait for the next batch of commands; an empty batch is a normal idle poll.
    async fn next_batch(&self) -> Result<Vec<InboundCommand>, ChannelError>;

    async fn send(&self, target: &ReplyTarget, text: &str) -> Result<(), ChannelError>;
}

/// Split `/name[@bot] arg1 arg2` into a command name and argument tokens.
///
/// Returns `None` for text that is not a slash command, and for commands
/// addressed to a bot other than `bot_username` (matched case-insensitively).
/// An `@mention` is never accepted while our own username is unknown.
pub fn parse_command_text(
    text: &str,
    bot_username: Option<&str>,
) -> Option<(String, Vec<String>)> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next()?.strip_prefix('/')?;
    let (name, mention) = match head.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (head, None),
    };
    if name.is_empty() {
        return None;
    }
    if let Some(mention) = mention {
        let ours = bot_username.map(|own| own.trim_start_matches('@'))?;
        if !mention.eq_ignore_ascii_case(ours) {
            return None;
        }
    }
    Some((name.to_string(), tokens.map(str::to_string).collect()))
}
