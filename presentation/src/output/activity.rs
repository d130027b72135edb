//! Console view of platform activity
//!
//! The reconciliation daemon re-renders every open poll once per tick, which
//! mostly rewrites the footer's refresh time. The view remembers the last
//! printed content of each message and drops edits that changed nothing but
//! the footer.

use super::console::ConsoleFormatter;
use pollbot_domain::{ChatMessage, MessageContent, MessageId};
use pollbot_infrastructure::PlatformActivity;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ActivityView {
    shown: HashMap<MessageId, MessageContent>,
}

impl ActivityView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatted output for `activity`, or `None` when nothing a reader
    /// would notice has changed.
    pub fn render(&mut self, activity: &PlatformActivity) -> Option<String> {
        match activity {
            PlatformActivity::MessageSent(message) => {
                self.remember(message);
            }
            PlatformActivity::MessageEdited(message) => {
                let previous = self.remember(message);
                if previous.is_some_and(|p| without_footer(&p) == without_footer(&message.content))
                {
                    return None;
                }
            }
            PlatformActivity::MessageDeleted { message, .. } => {
                self.shown.remove(message);
            }
            _ => {}
        }
        Some(ConsoleFormatter::format_activity(activity))
    }

    fn remember(&mut self, message: &ChatMessage) -> Option<MessageContent> {
        self.shown.insert(message.id, message.content.clone())
    }
}

fn without_footer(content: &MessageContent) -> MessageContent {
    match content {
        MessageContent::Embed(embed) => {
            let mut embed = embed.clone();
            embed.footer = None;
            MessageContent::Embed(embed)
        }
        text => text.clone(),
    }
}
