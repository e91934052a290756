pub mod channels;
pub mod normalize;
pub mod questions;
pub mod round;
pub mod scores;

use std::fmt;

/// Numeric id of a chat participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A server-like grouping of channels. On Telegram this is the chat itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuildId(pub i64);

/// Where a message is posted: a chat and, for forum supergroups, a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId {
    pub chat: i64,
    pub thread: Option<i32>,
}

impl ChannelId {
    pub fn new(chat: i64, thread: Option<i32>) -> Self {
        Self { chat, thread }
    }

    pub fn guild(&self) -> GuildId {
        GuildId(self.chat)
    }
}

/// Author of an incoming message, as much of them as the engine needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub name: String,
}

impl Sender {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    /// Never empty. The first entry is shown when the round times out.
    pub answers: Vec<String>,
}

impl Question {
    pub fn new(prompt: String, answers: Vec<String>) -> Option<Self> {
        if answers.is_empty() {
            return None;
        }
        Some(Self { prompt, answers })
    }

    pub fn canonical_answer(&self) -> &str {
        &self.answers[0]
    }

    /// Whether `input` matches any accepted answer once both are normalized.
    pub fn is_correct(&self, input: &str) -> bool {
        let input = normalize::normalize(input);
        if input.is_empty() {
            return false;
        }
        self.answers
            .iter()
            .any(|answer| normalize::normalize(answer) == input)
    }
}
