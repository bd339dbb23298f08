//! Telegram Bot API transport over long polling.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{parse_command_text, InboundCommand, MessageChannel, ReplyTarget};
use crate::access::Identity;
use crate::build_info;
use crate::config::TelegramConfig;
use crate::error::ChannelError;

/// Bot API limit for one `sendMessage` text, in UTF-16 code units.
pub const MAX_MESSAGE_UNITS: usize = 4096;

/// Extra slack on top of the long-poll window before the HTTP client gives up.
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

pub struct TelegramChannel {
    http: reqwest::Client,
    /// `{api_base_url}/bot{token}`; never logged.
    endpoint: String,
    poll_timeout_secs: u64,
    next_offset: Mutex<Option<i64>>,
    /// Our own `@username`, learned from `getMe`; needed to tell which
    /// `/cmd@bot` mentions are ours.
    bot_username: OnceLock<String>,
}

impl TelegramChannel {
    pub fn new(config: &TelegramConfig) -> Result<Self, ChannelError> {
        let timeout = Duration::from_secs(config.poll_timeout_secs) + HTTP_TIMEOUT_SLACK;
        Ok(Self {
            http: build_http_client(timeout)?,
            endpoint: format!(
                "{}/bot{}",
                config.api_base_url.trim_end_matches('/'),
                config.token
            ),
            poll_timeout_secs: config.poll_timeout_secs,
            next_offset: Mutex::new(None),
            bot_username: OnceLock::new(),
        })
    }

    /// Fetch the bot's own username (`getMe`) and remember it for mention
    /// filtering. Doubles as the startup credential check.
    pub async fn get_me(&self) -> Result<String, ChannelError> {
        let response = self
            .http
            .get(format!("{}/getMe", self.endpoint))
            .send()
            .await?;
        let user: BotUser = read_result(response).await?;
        let username = user.username.unwrap_or_else(|| user.id.to_string());
        let _ = self.bot_username.set(username.clone());
        Ok(username)
    }

    pub fn bot_username(&self) -> Option<&str> {
        self.bot_username.get().map(String::as_str)
    }

    async fn send_chunk(&self, target: &ReplyTarget, text: &str) -> Result<(), ChannelError> {
        let body = SendMessage {
            chat_id: target.chat_id,
            text,
            reply_to_message_id: target.message_id,
            allow_sending_without_reply: true,
        };
        let response = self
            .http
            .post(format!("{}/sendMessage", self.endpoint))
            .json(&body)
            .send()
            .await?;
        let _: serde_json::Value = read_result(response).await?;
        Ok(())
    }
}

#[async_trait]
impl MessageChannel for TelegramChannel {
    async fn next_batch(&self) -> Result<Vec<InboundCommand>, ChannelError> {
        if self.bot_username().is_none() {
            if let Err(err) = self.get_me().await {
                warn!(error = %err, "getMe failed; commands with an @mention are ignored for now");
            }
        }
        let mut offset = self.next_offset.lock().await;
        let mut query = vec![
            ("timeout", self.poll_timeout_secs.to_string()),
            ("allowed_updates", r#"["message"]"#.to_string()),
        ];
        if let Some(value) = *offset {
            query.push(("offset", value.to_string()));
        }

        let response = self
            .http
            .get(format!("{}/getUpdates", self.endpoint))
            .query(&query)
            .send()
            .await?;
        let updates: Vec<Update> = read_result(response).await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            *offset = Some(last + 1);
        }
        let own = self.bot_username();
        Ok(updates
            .into_iter()
            .filter_map(|update| inbound_from_update(update, own))
            .collect())
    }

    async fn send(&self, target: &ReplyTarget, text: &str) -> Result<(), ChannelError> {
        for chunk in split_message(text, MAX_MESSAGE_UNITS) {
            self.send_chunk(target, &chunk).await?;
        }
        Ok(())
    }
}

/// Build an HTTP client whose timeout outlasts one long poll.
fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ChannelError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(build_info::user_agent())
        .build()?)
}

async fn read_result<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ChannelError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ChannelError::Status(status.as_u16(), body));
    }
    let envelope: ApiEnvelope<T> = response.json().await?;
    match (envelope.ok, envelope.result) {
        (true, Some(result)) => Ok(result),
        _ => Err(ChannelError::Api(
            envelope
                .description
                .unwrap_or_else(|| "response without result".to_string()),
        )),
    }
}

fn inbound_from_update(update: Update, bot_username: Option<&str>) -> Option<InboundCommand> {
    let message = update.message?;
    let Some(sender) = message.from else {
        debug!(update_id = update.update_id, "ignoring message without sender");
        return None;
    };
    let Some((command_name, args)) = parse_command_text(message.text.as_deref()?, bot_username)
    else {
        debug!(update_id = update.update_id, "ignoring non-command or foreign-bot message");
        return None;
    };
    Some(InboundCommand {
        identity: Identity::from(sender.id),
        reply_to: ReplyTarget {
            chat_id: message.chat.id,
            message_id: Some(message.message_id),
        },
        command_name,
        args,
    })
}

/// Split on line boundaries so each chunk stays within `limit` UTF-16 units.
///
/// A single line longer than `limit` is cut at character boundaries.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let units = |s: &str| s.encode_utf16().count();
    if units(text) <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.split_inclusive('\n') {
        if units(&current) + units(line) > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if units(line) <= limit {
            current.push_str(line);
            continue;
        }
        for ch in line.chars() {
            if units(&current) + ch.len_utf16() > limit && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current.push(ch);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
    from: Option<BotUser>,
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BotUser {
    id: i64,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<i64>,
    /// Still deliver the reply if the triggering message was deleted.
    allow_sending_without_reply: bool,
}
