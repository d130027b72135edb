//! In-process chat platform.
//!
//! [`LocalChatPlatform`] implements the [`ChatTransport`] port against an
//! in-memory message store, and lets a driver (the console REPL, or a test)
//! act as human users: posting, editing and reacting. It behaves like a
//! hosted platform where it matters to polls:
//!
//! - reactions keep the order in which each symbol first appeared, and a
//!   symbol disappears once nobody is reacting with it
//! - reactions are validated; unknown emoji are refused
//! - every user action is published on an event feed, which dialogs wait on
//!   and the dispatcher routes from
//!
//! Every change is also published as a [`PlatformActivity`] so a console
//! can show what the bot is doing.

use async_trait::async_trait;
use futures::Stream;
use pollbot_application::ports::chat_transport::{
    ChatTransport, EventFilter, TransportError, WaitOutcome,
};
use pollbot_domain::{
    ChannelId, ChatEvent, ChatMessage, ChatUser, GuildId, MessageContent, MessageId,
    ReactionEvent, UserId,
};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{trace, warn};

const FEED_CAPACITY: usize = 256;

static CUSTOM_EMOJI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<a?:\w+:\d+>$").expect("custom emoji pattern is valid"));

/// Whether the platform accepts `symbol` as a reaction.
///
/// Custom emoji use the `<:name:id>` form. Anything else must be a single
/// token containing at least one non-ASCII character, which rules out
/// words and `:shortcodes:`.
pub fn is_known_emoji(symbol: &str) -> bool {
    if CUSTOM_EMOJI.is_match(symbol) {
        return true;
    }
    !symbol.is_empty()
        && !symbol.chars().any(char::is_whitespace)
        && symbol.chars().any(|c| !c.is_ascii())
}

/// Something that happened on the platform, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformActivity {
    MessageSent(ChatMessage),
    MessageEdited(ChatMessage),
    MessageDeleted {
        channel: ChannelId,
        message: MessageId,
    },
    ReactionAdded {
        message: MessageId,
        symbol: String,
        user: UserId,
    },
    ReactionRemoved {
        message: MessageId,
        symbol: String,
        user: UserId,
    },
    ReactionCleared {
        message: MessageId,
        symbol: String,
    },
}

#[derive(Debug, Clone)]
struct Reaction {
    symbol: String,
    users: Vec<UserId>,
}

#[derive(Debug, Clone)]
struct StoredMessage {
    message: ChatMessage,
    reactions: Vec<Reaction>,
}

impl StoredMessage {
    fn snapshot(&self) -> ChatMessage {
        let mut message = self.message.clone();
        message.reactions = self
            .reactions
            .iter()
            .map(|reaction| reaction.symbol.clone())
            .collect();
        message
    }

    /// Returns false if `user` already had this reaction.
    fn add_reaction(&mut self, symbol: &str, user: UserId) -> bool {
        match self.reactions.iter_mut().find(|r| r.symbol == symbol) {
            Some(reaction) if reaction.users.contains(&user) => false,
            Some(reaction) => {
                reaction.users.push(user);
                true
            }
            None => {
                self.reactions.push(Reaction {
                    symbol: symbol.to_string(),
                    users: vec![user],
                });
                true
            }
        }
    }

    fn remove_reaction(&mut self, symbol: &str, user: UserId) -> bool {
        let Some(index) = self.reactions.iter().position(|r| r.symbol == symbol) else {
            return false;
        };
        let reaction = &mut self.reactions[index];
        let before = reaction.users.len();
        reaction.users.retain(|u| *u != user);
        let removed = reaction.users.len() != before;
        if reaction.users.is_empty() {
            self.reactions.remove(index);
        }
        removed
    }
}

#[derive(Default)]
struct PlatformState {
    messages: BTreeMap<MessageId, StoredMessage>,
    next_message: u64,
}

impl PlatformState {
    fn get_mut(
        &mut self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<&mut StoredMessage, TransportError> {
        self.messages
            .get_mut(&message)
            .filter(|stored| stored.message.channel_id == channel)
            .ok_or(TransportError::MessageNotFound(message))
    }

    fn allocate_id(&mut self) -> MessageId {
        self.next_message += 1;
        MessageId(self.next_message)
    }
}

/// A single-guild chat platform living in this process.
pub struct LocalChatPlatform {
    bot: UserId,
    guild: Option<GuildId>,
    admins: RwLock<HashSet<UserId>>,
    state: Mutex<PlatformState>,
    events: broadcast::Sender<ChatEvent>,
    activity: broadcast::Sender<PlatformActivity>,
}

impl LocalChatPlatform {
    pub fn new(bot: UserId, guild: Option<GuildId>) -> Self {
        let (events, _) = broadcast::channel(FEED_CAPACITY);
        let (activity, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            bot,
            guild,
            admins: RwLock::new(HashSet::new()),
            state: Mutex::new(PlatformState::default()),
            events,
            activity,
        }
    }

    pub fn with_admins(self, admins: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            admins: RwLock::new(admins.into_iter().collect()),
            ..self
        }
    }

    pub fn guild(&self) -> Option<GuildId> {
        self.guild
    }

    pub async fn grant_admin(&self, user: UserId) {
        self.admins.write().await.insert(user);
    }

    /// Receive every platform event from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// The event feed as a stream, ending when the platform is dropped.
    pub fn event_stream(&self) -> impl Stream<Item = ChatEvent> + Send + 'static {
        futures::stream::unfold(self.events.subscribe(), |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Event stream lagged, {} event(s) dropped", skipped);
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
    }

    /// Receive every platform change from now on, for display.
    pub fn activity(&self) -> broadcast::Receiver<PlatformActivity> {
        self.activity.subscribe()
    }

    /// Look up a message by id alone.
    pub async fn message(&self, message: MessageId) -> Option<ChatMessage> {
        let state = self.state.lock().await;
        state.messages.get(&message).map(StoredMessage::snapshot)
    }

    /// Users currently reacting with `symbol` on a message.
    pub async fn reactors(&self, message: MessageId, symbol: &str) -> Vec<UserId> {
        let state = self.state.lock().await;
        state
            .messages
            .get(&message)
            .and_then(|stored| stored.reactions.iter().find(|r| r.symbol == symbol))
            .map(|reaction| reaction.users.clone())
            .unwrap_or_default()
    }

    /// All messages in a channel, oldest first.
    pub async fn channel_messages(&self, channel: ChannelId) -> Vec<ChatMessage> {
        let state = self.state.lock().await;
        state
            .messages
            .values()
            .filter(|stored| stored.message.channel_id == channel)
            .map(StoredMessage::snapshot)
            .collect()
    }

    // ==================== Acting as a user ====================

    /// Post a message as `user`.
    pub async fn post(&self, user: UserId, channel: ChannelId, text: &str) -> ChatMessage {
        self.store_message(ChatUser::human(user), channel, MessageContent::text(text))
            .await
    }

    /// Edit a message `user` wrote earlier.
    pub async fn edit_as(
        &self,
        user: UserId,
        channel: ChannelId,
        message: MessageId,
        text: &str,
    ) -> Result<ChatMessage, TransportError> {
        let edited = {
            let mut state = self.state.lock().await;
            let stored = state.get_mut(channel, message)?;
            if stored.message.author.id != user {
                return Err(TransportError::Other(format!(
                    "user {user} cannot edit message {message}"
                )));
            }
            stored.message.content = MessageContent::text(text);
            stored.snapshot()
        };
        self.publish(ChatEvent::MessageEdited(edited.clone()));
        self.record(PlatformActivity::MessageEdited(edited.clone()));
        Ok(edited)
    }

    /// Add a reaction as `user`.
    pub async fn react(
        &self,
        user: UserId,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), TransportError> {
        self.react_as(ChatUser::human(user), channel, message, symbol)
            .await
    }

    // ==================== Internals ====================

    async fn store_message(
        &self,
        author: ChatUser,
        channel: ChannelId,
        content: MessageContent,
    ) -> ChatMessage {
        let message = {
            let mut state = self.state.lock().await;
            let message = ChatMessage {
                id: state.allocate_id(),
                channel_id: channel,
                guild_id: self.guild,
                author,
                content,
                reactions: Vec::new(),
            };
            state.messages.insert(
                message.id,
                StoredMessage {
                    message: message.clone(),
                    reactions: Vec::new(),
                },
            );
            message
        };
        self.publish(ChatEvent::MessageCreated(message.clone()));
        self.record(PlatformActivity::MessageSent(message.clone()));
        message
    }

    async fn react_as(
        &self,
        user: ChatUser,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), TransportError> {
        if !is_known_emoji(symbol) {
            return Err(TransportError::UnknownEmoji(symbol.to_string()));
        }
        let added = {
            let mut state = self.state.lock().await;
            state.get_mut(channel, message)?.add_reaction(symbol, user.id)
        };
        if !added {
            return Ok(());
        }
        self.record(PlatformActivity::ReactionAdded {
            message,
            symbol: symbol.to_string(),
            user: user.id,
        });
        self.publish(ChatEvent::ReactionAdded(ReactionEvent {
            user,
            guild_id: self.guild,
            channel_id: channel,
            message_id: message,
            symbol: symbol.to_string(),
        }));
        Ok(())
    }

    fn publish(&self, event: ChatEvent) {
        trace!("Event: {:?}", event);
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn record(&self, activity: PlatformActivity) {
        let _ = self.activity.send(activity);
    }
}

#[async_trait]
impl ChatTransport for LocalChatPlatform {
    fn bot_user(&self) -> UserId {
        self.bot
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        content: MessageContent,
    ) -> Result<ChatMessage, TransportError> {
        Ok(self
            .store_message(ChatUser::bot(self.bot), channel, content)
            .await)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: MessageContent,
    ) -> Result<(), TransportError> {
        let edited = {
            let mut state = self.state.lock().await;
            let stored = state.get_mut(channel, message)?;
            stored.message.content = content;
            stored.snapshot()
        };
        self.publish(ChatEvent::MessageEdited(edited.clone()));
        self.record(PlatformActivity::MessageEdited(edited));
        Ok(())
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), TransportError> {
        {
            let mut state = self.state.lock().await;
            state.get_mut(channel, message)?;
            state.messages.remove(&message);
        }
        self.record(PlatformActivity::MessageDeleted { channel, message });
        Ok(())
    }

    async fn fetch_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<ChatMessage, TransportError> {
        let mut state = self.state.lock().await;
        Ok(state.get_mut(channel, message)?.snapshot())
    }

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), TransportError> {
        self.react_as(ChatUser::bot(self.bot), channel, message, symbol)
            .await
    }

    async fn remove_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
        user: UserId,
    ) -> Result<(), TransportError> {
        let removed = {
            let mut state = self.state.lock().await;
            state.get_mut(channel, message)?.remove_reaction(symbol, user)
        };
        if removed {
            self.record(PlatformActivity::ReactionRemoved {
                message,
                symbol: symbol.to_string(),
                user,
            });
        }
        Ok(())
    }

    async fn clear_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), TransportError> {
        {
            let mut state = self.state.lock().await;
            state
                .get_mut(channel, message)?
                .reactions
                .retain(|reaction| reaction.symbol != symbol);
        }
        self.record(PlatformActivity::ReactionCleared {
            message,
            symbol: symbol.to_string(),
        });
        Ok(())
    }

    async fn is_admin(&self, guild: Option<GuildId>, user: UserId) -> Result<bool, TransportError> {
        // Admin is a guild capability; direct messages have none
        if guild.is_none() || guild != self.guild {
            return Ok(false);
        }
        Ok(self.admins.read().await.contains(&user))
    }

    async fn wait_for(
        &self,
        filter: EventFilter,
        timeout: Duration,
    ) -> Result<WaitOutcome<ChatEvent>, TransportError> {
        let mut rx = self.events.subscribe();
        let matched = tokio::time::timeout(timeout, async move {
            loop {
                match rx.recv().await {
                    Ok(event) if filter(&event) => return Ok(event),
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Waiter lagged, {} event(s) dropped", skipped);
                    }
                    Err(RecvError::Closed) => return Err(TransportError::Closed),
                }
            }
        })
        .await;

        match matched {
            Ok(Ok(event)) => Ok(WaitOutcome::Received(event)),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(WaitOutcome::TimedOut),
        }
    }
}
