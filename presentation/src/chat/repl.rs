//! REPL (Read-Eval-Print Loop) acting as a chat user
//!
//! Lines typed at the console become user actions on the
//! [`LocalChatPlatform`]; everything the platform does, including the bot's
//! own messages and reactions, is printed as it happens.

use super::command::ConsoleInput;
use crate::{ActivityView, ConsoleFormatter};
use colored::Colorize;
use pollbot_application::{CommandInvocation, CommandOutcome, PollCommands};
use pollbot_domain::{ChannelId, ChatUser, UserId};
use pollbot_infrastructure::{InMemoryPollRepository, LocalChatPlatform};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::debug;

/// Interactive console REPL
pub struct ChatRepl {
    platform: Arc<LocalChatPlatform>,
    repository: Arc<InMemoryPollRepository>,
    commands: PollCommands,
    channel: ChannelId,
    user: UserId,
}

impl ChatRepl {
    pub fn new(
        platform: Arc<LocalChatPlatform>,
        repository: Arc<InMemoryPollRepository>,
        commands: PollCommands,
        channel: ChannelId,
    ) -> Self {
        Self {
            platform,
            repository,
            commands,
            channel,
            user: UserId(42),
        }
    }

    /// Set the user to act as
    pub fn with_user(mut self, user: UserId) -> Self {
        self.user = user;
        self
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    /// Run until `/quit` or end of input
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.print_welcome();
        let printer = self.spawn_activity_printer();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if !self.handle(ConsoleInput::parse(&line)).await {
                break;
            }
        }

        printer.abort();
        println!("Bye!");
        Ok(())
    }

    fn spawn_activity_printer(&self) -> JoinHandle<()> {
        let mut activity = self.platform.activity();
        let mut view = ActivityView::new();
        tokio::spawn(async move {
            loop {
                match activity.recv().await {
                    Ok(event) => {
                        if let Some(line) = view.render(&event) {
                            println!("{}", line);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        println!("{}", format!("({} updates not shown)", skipped).dimmed());
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            Pollbot - Console Chat           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Acting as user {} in channel {}", self.user, self.channel);
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  !createpoll <duration> <title>  - Create a poll (e.g. 1d2h30m10s)");
        println!("  !summonpoll <poll-id>           - Move a poll to the bottom of the channel");
        println!("  react <message-id> <symbol>     - React to a message");
        println!("  say <text>                      - Send a message");
        println!("  edit <message-id> <text>        - Edit one of your messages");
        println!("  /user <id>                      - Act as another user");
        println!("  /show <message-id>              - Show a message");
        println!("  /polls                          - List polls");
        println!("  /help, /h, /?                   - Show this help");
        println!("  /quit, /exit, /q                - Exit");
        println!();
    }

    /// Apply one line of input. Returns false when the REPL should exit.
    pub async fn handle(&mut self, input: ConsoleInput) -> bool {
        match input {
            ConsoleInput::Empty => {}
            ConsoleInput::Quit => return false,
            ConsoleInput::Help => Self::print_help(),
            ConsoleInput::Invalid(hint) => println!("{}", hint.yellow()),
            ConsoleInput::SwitchUser(user) => {
                self.user = user;
                println!("Now acting as user {}", user);
            }
            ConsoleInput::Say(text) => {
                self.platform.post(self.user, self.channel, &text).await;
            }
            ConsoleInput::React { message, symbol } => {
                if let Err(e) = self
                    .platform
                    .react(self.user, self.channel, message, &symbol)
                    .await
                {
                    eprintln!("{} {}", "Error:".red(), e);
                }
            }
            ConsoleInput::Edit { message, text } => {
                if let Err(e) = self
                    .platform
                    .edit_as(self.user, self.channel, message, &text)
                    .await
                {
                    eprintln!("{} {}", "Error:".red(), e);
                }
            }
            ConsoleInput::Show(message) => match self.platform.message(message).await {
                Some(message) => println!("{}", ConsoleFormatter::format_message(&message)),
                None => println!("Message {} does not exist", message),
            },
            ConsoleInput::Polls => {
                let polls = self.repository.all_polls().await;
                println!("{}", ConsoleFormatter::format_polls(&polls));
            }
            ConsoleInput::CreatePoll { duration, title } => {
                let invocation = self
                    .invoke(&format!("!createpoll {} {}", duration, title))
                    .await;
                let outcome = self.commands.create_poll(&invocation, &duration, &title).await;
                Self::report(outcome);
            }
            ConsoleInput::SummonPoll(poll) => {
                let invocation = self.invoke(&format!("!summonpoll {}", poll)).await;
                let outcome = self.commands.summon_poll(&invocation, poll).await;
                Self::report(outcome);
            }
        }
        true
    }

    /// Post the command text as the acting user, as a chat client would.
    async fn invoke(&self, text: &str) -> CommandInvocation {
        let message = self.platform.post(self.user, self.channel, text.trim()).await;
        CommandInvocation {
            author: ChatUser::human(self.user),
            guild_id: self.platform.guild(),
            channel_id: self.channel,
            message_id: message.id,
        }
    }

    fn report(outcome: CommandOutcome) {
        match outcome {
            CommandOutcome::Completed(poll) => debug!("Command completed for poll {}", poll),
            CommandOutcome::Failed(reason) => debug!("Command failed: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollbot_application::{PollContext, PollRepository};
    use pollbot_domain::{GuildId, MessageId, PollId};

    const CHANNEL: ChannelId = ChannelId(100);

    async fn repl() -> ChatRepl {
        let platform = Arc::new(LocalChatPlatform::new(UserId(1), Some(GuildId(1))));
        let repository = Arc::new(InMemoryPollRepository::new());
        repository.register_guild(GuildId(1)).await.unwrap();
        let ctx = PollContext::new(repository.clone(), platform.clone());
        ChatRepl::new(platform, repository, PollCommands::new(ctx), CHANNEL).with_user(UserId(5))
    }

    #[tokio::test]
    async fn test_quit_stops_and_others_continue() {
        let mut repl = repl().await;
        assert!(repl.handle(ConsoleInput::Help).await);
        assert!(repl.handle(ConsoleInput::Empty).await);
        assert!(!repl.handle(ConsoleInput::Quit).await);
    }

    #[tokio::test]
    async fn test_say_posts_as_acting_user() {
        let mut repl = repl().await;
        repl.handle(ConsoleInput::SwitchUser(UserId(9))).await;
        repl.handle(ConsoleInput::Say("hello".into())).await;

        let messages = repl.platform.channel_messages(CHANNEL).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].author.id, UserId(9));
        assert_eq!(messages[0].text(), "hello");
    }

    #[tokio::test]
    async fn test_create_poll_replaces_command_message_with_poll() {
        let mut repl = repl().await;
        repl.handle(ConsoleInput::CreatePoll {
            duration: "1h".into(),
            title: "Lunch?".into(),
        })
        .await;

        let polls = repl.repository.all_polls().await;
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].title, "Lunch?");
        let messages = repl.platform.channel_messages(CHANNEL).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, polls[0].message_id);
    }

    #[tokio::test]
    async fn test_failed_command_is_answered_in_channel() {
        let mut repl = repl().await;
        repl.handle(ConsoleInput::SummonPoll(PollId(3))).await;

        let messages = repl.platform.channel_messages(CHANNEL).await;
        assert_eq!(
            messages.last().unwrap().text(),
            "Poll with ID 3 could not be found."
        );
    }

    #[tokio::test]
    async fn test_react_to_missing_message_keeps_running() {
        let mut repl = repl().await;
        assert!(
            repl.handle(ConsoleInput::React {
                message: MessageId(999),
                symbol: "🍕".into(),
            })
            .await
        );
        assert!(repl.repository.poll(PollId(1)).await.unwrap().is_none());
    }
}
