//! Console input parsing

use pollbot_domain::{MessageId, PollId, UserId};

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// `!createpoll <duration> <title...>`
    CreatePoll { duration: String, title: String },
    /// `!summonpoll <id>`
    SummonPoll(PollId),
    /// `react <message-id> <symbol>`
    React { message: MessageId, symbol: String },
    /// `say <text>`
    Say(String),
    /// `edit <message-id> <text>`
    Edit { message: MessageId, text: String },
    /// `/user <id>`
    SwitchUser(UserId),
    /// `/show <message-id>`
    Show(MessageId),
    Polls,
    Help,
    Quit,
    Empty,
    /// Input that could not be understood, with a hint.
    Invalid(String),
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ConsoleInput::Empty;
        }
        let (head, rest) = split_word(line);

        match head {
            "!createpoll" => {
                let (duration, title) = split_word(rest);
                if duration.is_empty() {
                    return ConsoleInput::Invalid("usage: !createpoll <duration> <title>".into());
                }
                ConsoleInput::CreatePoll {
                    duration: duration.to_string(),
                    title: title.to_string(),
                }
            }
            "!summonpoll" => match rest.parse() {
                Ok(id) => ConsoleInput::SummonPoll(PollId(id)),
                Err(_) => ConsoleInput::Invalid("usage: !summonpoll <poll-id>".into()),
            },
            "react" => {
                let (message, symbol) = split_word(rest);
                match (message.parse(), symbol) {
                    (Ok(id), symbol) if !symbol.is_empty() => ConsoleInput::React {
                        message: MessageId(id),
                        symbol: symbol.to_string(),
                    },
                    _ => ConsoleInput::Invalid("usage: react <message-id> <symbol>".into()),
                }
            }
            "say" if !rest.is_empty() => ConsoleInput::Say(rest.to_string()),
            "edit" => {
                let (message, text) = split_word(rest);
                match message.parse() {
                    Ok(id) if !text.is_empty() => ConsoleInput::Edit {
                        message: MessageId(id),
                        text: text.to_string(),
                    },
                    _ => ConsoleInput::Invalid("usage: edit <message-id> <text>".into()),
                }
            }
            "/user" => match rest.parse() {
                Ok(id) => ConsoleInput::SwitchUser(UserId(id)),
                Err(_) => ConsoleInput::Invalid("usage: /user <user-id>".into()),
            },
            "/show" => match rest.parse() {
                Ok(id) => ConsoleInput::Show(MessageId(id)),
                Err(_) => ConsoleInput::Invalid("usage: /show <message-id>".into()),
            },
            "/polls" => ConsoleInput::Polls,
            "/help" | "/h" | "/?" => ConsoleInput::Help,
            "/quit" | "/exit" | "/q" => ConsoleInput::Quit,
            _ => ConsoleInput::Invalid(format!(
                "Unknown input: {}. Type /help for available commands",
                head
            )),
        }
    }
}

/// First whitespace-delimited word, and the trimmed remainder.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    }
}
