//! Chat platform vocabulary
//!
//! Plain data describing what the chat platform shows and delivers:
//! message content (plain text or a structured embed), rendered messages
//! with their ordered reaction bar, and the events the engine listens to.
//! How these reach a real platform is an infrastructure concern.

use crate::core::ids::{ChannelId, GuildId, MessageId, UserId};
use serde::{Deserialize, Serialize};

/// One titled field in an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Structured message content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: Option<u32>,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn clear_fields(&mut self) {
        self.fields.clear();
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
    }

    pub fn set_footer(&mut self, footer: impl Into<String>) {
        self.footer = Some(footer.into());
    }
}

/// What a message displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "body")]
pub enum MessageContent {
    Text(String),
    Embed(Embed),
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text(text.into())
    }
}

impl From<Embed> for MessageContent {
    fn from(embed: Embed) -> Self {
        MessageContent::Embed(embed)
    }
}

/// A platform account as seen in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: UserId,
    /// Automated accounts (including ourselves).
    pub bot: bool,
}

impl ChatUser {
    pub fn human(id: UserId) -> Self {
        Self {
            id,
            bot: false,
        }
    }

    pub fn bot(id: UserId) -> Self {
        Self {
            id,
            bot: true,
        }
    }
}

/// A message as currently rendered on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author: ChatUser,
    pub content: MessageContent,
    /// Reaction symbols in the order they first appeared on the message.
    pub reactions: Vec<String>,
}

impl ChatMessage {
    /// Plain text body, empty for embeds.
    pub fn text(&self) -> &str {
        match &self.content {
            MessageContent::Text(text) => text,
            MessageContent::Embed(_) => "",
        }
    }

    pub fn embed(&self) -> Option<&Embed> {
        match &self.content {
            MessageContent::Embed(embed) => Some(embed),
            MessageContent::Text(_) => None,
        }
    }
}

/// A user attached a reaction to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub user: ChatUser,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub symbol: String,
}

/// Events delivered by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum ChatEvent {
    ReactionAdded(ReactionEvent),
    MessageCreated(ChatMessage),
    MessageEdited(ChatMessage),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: MessageContent) -> ChatMessage {
        ChatMessage {
            id: MessageId(1),
            channel_id: ChannelId(2),
            guild_id: None,
            author: ChatUser::human(UserId(3)),
            content,
            reactions: vec![],
        }
    }

    #[test]
    fn test_text_accessor() {
        let m = message(MessageContent::text("hello"));
        assert_eq!(m.text(), "hello");
        assert!(m.embed().is_none());
    }

    #[test]
    fn test_embed_accessor() {
        let m = message(Embed::new("Title", "desc").into());
        assert_eq!(m.text(), "");
        assert_eq!(m.embed().unwrap().title, "Title");
    }

    #[test]
    fn test_embed_fields() {
        let mut embed = Embed::new("t", "d").with_color(0x009fe3);
        embed.add_field("🍕 2", "Pizza", false);
        assert_eq!(embed.fields.len(), 1);
        embed.clear_fields();
        assert!(embed.fields.is_empty());
        assert_eq!(embed.color, Some(0x009fe3));
    }
}
