use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{MessageId, ParseMode, User},
    utils::html,
};

use crate::error::ChatError;
use crate::trivia::{scores::UserDirectory, ChannelId, Sender};

/// What the game needs from the chat platform to talk back.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<(), ChatError>;

    async fn delete_message(&self, channel: ChannelId, message_id: i32) -> Result<(), ChatError>;
}

#[derive(Clone)]
pub struct TelegramChat {
    bot: Bot,
}

impl TelegramChat {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Sends `text` as a monospaced block.
    pub async fn send_preformatted(&self, channel: ChannelId, text: &str) -> Result<(), ChatError> {
        let mut request = self
            .bot
            .send_message(ChatId(channel.chat), format!("<pre>{}</pre>", html::escape(text)))
            .parse_mode(ParseMode::Html);
        if let Some(thread) = channel.thread {
            request = request.message_thread_id(thread);
        }
        request.await?;
        Ok(())
    }
}

#[async_trait]
impl ChatSink for TelegramChat {
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<(), ChatError> {
        let mut request = self.bot.send_message(ChatId(channel.chat), text);
        if let Some(thread) = channel.thread {
            request = request.message_thread_id(thread);
        }
        request.await?;
        Ok(())
    }

    async fn delete_message(&self, channel: ChannelId, message_id: i32) -> Result<(), ChatError> {
        self.bot
            .delete_message(ChatId(channel.chat), MessageId(message_id))
            .await?;
        Ok(())
    }
}

/// Looks users up among the members of one chat.
pub struct ChatMembers {
    bot: Bot,
    chat: ChatId,
}

impl ChatMembers {
    pub fn new(bot: Bot, channel: ChannelId) -> Self {
        Self {
            bot,
            chat: ChatId(channel.chat),
        }
    }
}

#[async_trait]
impl UserDirectory for ChatMembers {
    async fn display_name(&self, user: crate::trivia::UserId) -> Result<String, ChatError> {
        let member = self
            .bot
            .get_chat_member(self.chat, teloxide::types::UserId(user.0))
            .await?;
        Ok(display_name(&member.user))
    }
}

pub fn channel_of(msg: &Message) -> ChannelId {
    ChannelId::new(msg.chat.id.0, msg.thread_id)
}

/// `@username` when there is one, so winners get pinged. Used for both
/// announcements and the ranking so a player shows up the same everywhere.
pub fn display_name(user: &User) -> String {
    match &user.username {
        Some(username) => format!("@{}", username),
        None => user.full_name(),
    }
}

pub fn sender_of(user: &User) -> Sender {
    Sender::new(crate::trivia::UserId(user.id.0), display_name(user))
}
