//! Console output formatter for platform activity and polls

use colored::Colorize;
use pollbot_domain::{ChatMessage, Embed, MessageContent, Poll, UserId};
use pollbot_infrastructure::PlatformActivity;

/// Formats what happens on the local platform for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One line (or block, for messages) per platform change.
    pub fn format_activity(activity: &PlatformActivity) -> String {
        match activity {
            PlatformActivity::MessageSent(message) => Self::format_message(message),
            PlatformActivity::MessageEdited(message) => format!(
                "{} {}",
                "edited".yellow(),
                Self::format_message(message)
            ),
            PlatformActivity::MessageDeleted { message, .. } => {
                format!("{} message {}", "deleted".red(), message).dimmed().to_string()
            }
            PlatformActivity::ReactionAdded {
                message,
                symbol,
                user,
            } => format!("{} reacted {} on {}", Self::user(*user), symbol, message)
                .dimmed()
                .to_string(),
            PlatformActivity::ReactionRemoved {
                message,
                symbol,
                user,
            } => format!(
                "{} reaction {} by {} on {}",
                "removed".red(),
                symbol,
                user,
                message
            )
            .dimmed()
            .to_string(),
            PlatformActivity::ReactionCleared { message, symbol } => {
                format!("{} all {} on {}", "cleared".red(), symbol, message)
                    .dimmed()
                    .to_string()
            }
        }
    }

    /// A message with its id, author and reaction bar.
    pub fn format_message(message: &ChatMessage) -> String {
        let author = if message.author.bot {
            "bot".magenta().bold().to_string()
        } else {
            Self::user(message.author.id)
        };
        let mut output = format!("{} {}: ", format!("[{}]", message.id).cyan(), author);

        match &message.content {
            MessageContent::Text(text) => output.push_str(text),
            MessageContent::Embed(embed) => {
                output.push('\n');
                output.push_str(&Self::indent(&Self::format_embed(embed), "  │ "));
            }
        }
        if !message.reactions.is_empty() {
            output.push_str(&format!("\n  {}", message.reactions.join(" ")));
        }
        output
    }

    pub fn format_embed(embed: &Embed) -> String {
        let mut output = Self::header(&embed.title);
        output.push('\n');
        output.push_str(&embed.description);
        for field in &embed.fields {
            output.push_str(&format!("\n\n{}\n{}", field.name.bold(), field.value));
        }
        if let Some(footer) = &embed.footer {
            output.push_str(&format!("\n\n{}", footer.dimmed()));
        }
        output
    }

    /// Table of polls for `/polls`.
    pub fn format_polls(polls: &[Poll]) -> String {
        if polls.is_empty() {
            return "No polls.".dimmed().to_string();
        }
        let mut output = Self::section_header("Polls");
        for poll in polls {
            let state = if poll.ended {
                "ended".red()
            } else {
                "open".green()
            };
            output.push_str(&format!(
                "  {:>4}  {:<6} message {:<6} ends {}  {}\n",
                poll.id,
                state,
                poll.message_id,
                poll.end_date.format("%H:%M:%S"),
                poll.title
            ));
        }
        output
    }

    fn user(user: UserId) -> String {
        format!("user {}", user).yellow().to_string()
    }

    fn header(title: &str) -> String {
        title.cyan().bold().to_string()
    }

    fn section_header(title: &str) -> String {
        format!("{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
