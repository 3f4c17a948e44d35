//! Chat relay and per-user transcript.
//!
//! The relay is a single stateless text exchange: `GET <endpoint>?q=<text>`
//! answered with a plain-text reply. The transcript is one store document
//! per user, newest message first; an empty transcript shows the canned
//! greeting instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::store::{Store, MESSAGES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub sender: ChatSender,
}

impl ChatMessage {
    fn new(sender: ChatSender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            created_at: Utc::now(),
            sender,
        }
    }
}

/// The transcript document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatTranscript {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Stateless text relay client
#[derive(Debug, Clone)]
pub struct ChatRelay {
    endpoint: String,
    http: reqwest::blocking::Client,
}

impl ChatRelay {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// One request/response exchange; no session state between calls
    pub fn ask(&self, query: &str) -> Result<String> {
        tracing::debug!(endpoint = %self.endpoint, "relaying chat query");
        let reply = self
            .http
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()?
            .error_for_status()?
            .text()?;
        Ok(reply)
    }
}

/// Per-user transcript over the message store
#[derive(Debug, Clone)]
pub struct ChatLog {
    store: Store,
    user_id: String,
    user_email: String,
}

impl ChatLog {
    pub fn new(store: Store, user_id: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            user_email: user_email.into(),
        }
    }

    /// Messages newest first; the greeting when nothing was said yet
    pub fn history(&self) -> Result<Vec<ChatMessage>> {
        let transcript = self.load()?;
        if transcript.messages.is_empty() {
            return Ok(vec![self.greeting()]);
        }
        let mut messages = transcript.messages;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    /// Send one query through the relay, persisting both sides of the
    /// exchange. The user message is written before the relay call, so a
    /// relay failure still leaves the question in the transcript.
    pub fn exchange(&self, relay: &ChatRelay, text: &str) -> Result<ChatMessage> {
        self.append(ChatMessage::new(ChatSender::User, text))?;
        let reply = relay.ask(text)?;
        let message = ChatMessage::new(ChatSender::Bot, reply);
        self.append(message.clone())?;
        Ok(message)
    }

    fn greeting(&self) -> ChatMessage {
        ChatMessage::new(
            ChatSender::Bot,
            format!(
                "Hey there {}! 💪 Ready to do stuff? I'm your virtual todo buddy, \
                 here to help with all your queries. Ask away! 😅",
                self.user_email
            ),
        )
    }

    fn load(&self) -> Result<ChatTranscript> {
        Ok(self
            .store
            .read::<ChatTranscript>(MESSAGES, &self.user_id)?
            .unwrap_or_default())
    }

    fn append(&self, message: ChatMessage) -> Result<()> {
        let mut transcript = self.load()?;
        transcript.messages.push(message);
        self.store.write(MESSAGES, &self.user_id, &transcript)
    }
}
