//! Mocks shared by the use case tests

use super::context::PollContext;
use crate::config::PollSettings;
use crate::ports::chat_transport::{ChatTransport, EventFilter, TransportError, WaitOutcome};
use crate::ports::clock::ManualClock;
use crate::ports::poll_event_logger::{PollEvent, PollEventLogger};
use crate::ports::poll_repository::{PollRepository, RepositoryError};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use pollbot_domain::{
    ChannelId, ChatEvent, ChatMessage, ChatUser, Choice, ChoiceId, GuildId, InternalGuildId,
    InternalUserId, MessageContent, MessageId, NewPoll, Poll, PollId, ReactionEvent, UserId,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BOT: UserId = UserId(1);
pub const GUILD: GuildId = GuildId(500);
pub const CHANNEL: ChannelId = ChannelId(10);

static USER_MESSAGE_IDS: AtomicU64 = AtomicU64::new(100_000);

pub fn created(user: UserId, channel: ChannelId, text: &str) -> ChatEvent {
    ChatEvent::MessageCreated(ChatMessage {
        id: MessageId(USER_MESSAGE_IDS.fetch_add(1, Ordering::SeqCst)),
        channel_id: channel,
        guild_id: Some(GUILD),
        author: ChatUser::human(user),
        content: MessageContent::text(text),
        reactions: vec![],
    })
}

pub fn edited(id: MessageId, user: UserId, channel: ChannelId, text: &str) -> ChatEvent {
    ChatEvent::MessageEdited(ChatMessage {
        id,
        channel_id: channel,
        guild_id: Some(GUILD),
        author: ChatUser::human(user),
        content: MessageContent::text(text),
        reactions: vec![],
    })
}

pub fn reaction(user: UserId, message: MessageId, symbol: &str) -> ReactionEvent {
    ReactionEvent {
        user: ChatUser::human(user),
        guild_id: Some(GUILD),
        channel_id: CHANNEL,
        message_id: message,
        symbol: symbol.to_string(),
    }
}

pub fn reacted(user: UserId, message: MessageId, symbol: &str) -> ChatEvent {
    ChatEvent::ReactionAdded(reaction(user, message, symbol))
}

// ==================== Repository ====================

#[derive(Default)]
struct RepoState {
    users: HashMap<UserId, InternalUserId>,
    guilds: HashMap<GuildId, InternalGuildId>,
    polls: HashMap<PollId, Poll>,
    choices: Vec<Choice>,
    responses: Vec<(InternalUserId, ChoiceId)>,
    next_id: i64,
}

impl RepoState {
    fn next(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MockRepository {
    state: Mutex<RepoState>,
}

#[async_trait]
impl PollRepository for MockRepository {
    async fn user_id(&self, user: UserId) -> Result<InternalUserId, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if let Some(id) = state.users.get(&user) {
            return Ok(*id);
        }
        let id = InternalUserId(state.next());
        state.users.insert(user, id);
        Ok(id)
    }

    async fn register_guild(&self, guild: GuildId) -> Result<InternalGuildId, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if let Some(id) = state.guilds.get(&guild) {
            return Ok(*id);
        }
        let id = InternalGuildId(state.next());
        state.guilds.insert(guild, id);
        Ok(id)
    }

    async fn guild_id(&self, guild: GuildId) -> Result<Option<InternalGuildId>, RepositoryError> {
        Ok(self.state.lock().unwrap().guilds.get(&guild).copied())
    }

    async fn create_poll(&self, poll: NewPoll) -> Result<Poll, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let stored = Poll {
            id: PollId(state.next()),
            creator: poll.creator,
            channel_id: poll.channel_id,
            message_id: poll.message_id,
            guild: poll.guild,
            title: poll.title,
            end_date: poll.end_date,
            ended: false,
        };
        state.polls.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn poll(&self, id: PollId) -> Result<Option<Poll>, RepositoryError> {
        Ok(self.state.lock().unwrap().polls.get(&id).cloned())
    }

    async fn poll_by_message(&self, message: MessageId) -> Result<Option<Poll>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .polls
            .values()
            .find(|p| p.message_id == message)
            .cloned())
    }

    async fn open_polls(&self) -> Result<Vec<Poll>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut open: Vec<Poll> = state.polls.values().filter(|p| !p.ended).cloned().collect();
        open.sort_by_key(|p| p.id);
        Ok(open)
    }

    async fn update_end_date(
        &self,
        id: PollId,
        end_date: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        match state.polls.get_mut(&id) {
            Some(poll) => {
                poll.end_date = end_date;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("poll {id}"))),
        }
    }

    async fn update_message_id(
        &self,
        id: PollId,
        message: MessageId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        match state.polls.get_mut(&id) {
            Some(poll) => {
                poll.message_id = message;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("poll {id}"))),
        }
    }

    async fn set_ended(&self, id: PollId) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Ok(match state.polls.get_mut(&id) {
            Some(poll) if !poll.ended => {
                poll.ended = true;
                true
            }
            _ => false,
        })
    }

    async fn delete_poll(&self, id: PollId) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let removed = state.polls.remove(&id).is_some();
        let gone: HashSet<ChoiceId> = state
            .choices
            .iter()
            .filter(|c| c.poll_id == id)
            .map(|c| c.id)
            .collect();
        state.choices.retain(|c| c.poll_id != id);
        state.responses.retain(|(_, choice)| !gone.contains(choice));
        Ok(removed)
    }

    async fn create_choice(
        &self,
        poll: PollId,
        symbol: &str,
        text: &str,
    ) -> Result<Choice, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if !state.polls.contains_key(&poll) {
            return Err(RepositoryError::NotFound(format!("poll {poll}")));
        }
        if state
            .choices
            .iter()
            .any(|c| c.poll_id == poll && c.symbol == symbol)
        {
            return Err(RepositoryError::Conflict(format!("choice {symbol}")));
        }
        let choice = Choice {
            id: ChoiceId(state.next()),
            poll_id: poll,
            symbol: symbol.to_string(),
            text: text.to_string(),
        };
        state.choices.push(choice.clone());
        Ok(choice)
    }

    async fn choice(&self, poll: PollId, symbol: &str) -> Result<Option<Choice>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .choices
            .iter()
            .find(|c| c.poll_id == poll && c.symbol == symbol)
            .cloned())
    }

    async fn choices(&self, poll: PollId) -> Result<Vec<Choice>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .choices
            .iter()
            .filter(|c| c.poll_id == poll)
            .cloned()
            .collect())
    }

    async fn has_response(
        &self,
        user: InternalUserId,
        choice: ChoiceId,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .responses
            .contains(&(user, choice)))
    }

    async fn create_response(
        &self,
        user: InternalUserId,
        choice: ChoiceId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.responses.contains(&(user, choice)) {
            return Err(RepositoryError::Conflict("response".into()));
        }
        state.responses.push((user, choice));
        Ok(())
    }

    async fn delete_response(
        &self,
        user: InternalUserId,
        choice: ChoiceId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.responses.len();
        state.responses.retain(|r| *r != (user, choice));
        if state.responses.len() == before {
            return Err(RepositoryError::Conflict("Response did not exist".into()));
        }
        Ok(())
    }

    async fn voters(&self, choice: ChoiceId) -> Result<Vec<UserId>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .responses
            .iter()
            .filter(|(_, c)| *c == choice)
            .filter_map(|(user, _)| {
                state
                    .users
                    .iter()
                    .find(|(_, internal)| *internal == user)
                    .map(|(platform, _)| *platform)
            })
            .collect())
    }
}

// ==================== Transport ====================

/// Records every call and answers `wait_for` from a scripted queue.
pub struct MockTransport {
    next_id: AtomicU64,
    messages: Mutex<HashMap<MessageId, ChatMessage>>,
    sent: Mutex<Vec<ChatMessage>>,
    calls: Mutex<Vec<String>>,
    events: Mutex<VecDeque<ChatEvent>>,
    admins: Mutex<HashSet<UserId>>,
    failures: Mutex<HashMap<&'static str, usize>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1_000),
            messages: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            events: Mutex::new(VecDeque::new()),
            admins: Mutex::new(HashSet::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Make the next call to `operation` (e.g. "clear_reaction") fail.
    pub fn fail_next(&self, operation: &'static str) {
        *self.failures.lock().unwrap().entry(operation).or_insert(0) += 1;
    }

    fn injected_failure(&self, operation: &'static str) -> Result<(), TransportError> {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(operation) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(TransportError::Other(format!("{operation} unavailable")))
            }
            _ => Ok(()),
        }
    }

    /// Id the next posted message will receive.
    pub fn next_message_id(&self) -> MessageId {
        MessageId(self.next_id.load(Ordering::SeqCst))
    }

    pub fn push_event(&self, event: ChatEvent) {
        self.events.lock().unwrap().push_back(event);
    }

    pub fn grant_admin(&self, user: UserId) {
        self.admins.lock().unwrap().insert(user);
    }

    pub fn live_messages(&self) -> Vec<MessageId> {
        let mut ids: Vec<MessageId> = self.messages.lock().unwrap().keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn message(&self, id: MessageId) -> Option<ChatMessage> {
        self.messages.lock().unwrap().get(&id).cloned()
    }

    pub fn reactions_on(&self, id: MessageId) -> Vec<String> {
        self.message(id).map(|m| m.reactions).unwrap_or_default()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.text().to_string())
            .collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn with_message<T>(
        &self,
        id: MessageId,
        f: impl FnOnce(&mut ChatMessage) -> T,
    ) -> Result<T, TransportError> {
        let mut messages = self.messages.lock().unwrap();
        messages
            .get_mut(&id)
            .map(f)
            .ok_or(TransportError::MessageNotFound(id))
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    fn bot_user(&self) -> UserId {
        BOT
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        content: MessageContent,
    ) -> Result<ChatMessage, TransportError> {
        let message = ChatMessage {
            id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            channel_id: channel,
            guild_id: Some(GUILD),
            author: ChatUser::bot(BOT),
            content,
            reactions: vec![],
        };
        self.record(format!("send:{}", message.id));
        self.messages
            .lock()
            .unwrap()
            .insert(message.id, message.clone());
        self.sent.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn edit_message(
        &self,
        _channel: ChannelId,
        message: MessageId,
        content: MessageContent,
    ) -> Result<(), TransportError> {
        self.record(format!("edit:{message}"));
        self.with_message(message, |m| m.content = content)
    }

    async fn delete_message(
        &self,
        _channel: ChannelId,
        message: MessageId,
    ) -> Result<(), TransportError> {
        self.record(format!("delete:{message}"));
        self.messages
            .lock()
            .unwrap()
            .remove(&message)
            .map(|_| ())
            .ok_or(TransportError::MessageNotFound(message))
    }

    async fn fetch_message(
        &self,
        _channel: ChannelId,
        message: MessageId,
    ) -> Result<ChatMessage, TransportError> {
        self.with_message(message, |m| m.clone())
    }

    async fn add_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), TransportError> {
        self.injected_failure("add_reaction")?;
        // Word-like symbols stand in for emoji the platform does not know
        if symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TransportError::UnknownEmoji(symbol.to_string()));
        }
        self.record(format!("react:{message}:{symbol}"));
        self.with_message(message, |m| {
            if !m.reactions.iter().any(|s| s == symbol) {
                m.reactions.push(symbol.to_string());
            }
        })
    }

    async fn remove_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        symbol: &str,
        user: UserId,
    ) -> Result<(), TransportError> {
        self.record(format!("unreact:{message}:{symbol}:{user}"));
        self.with_message(message, |_| ())
    }

    async fn clear_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), TransportError> {
        self.injected_failure("clear_reaction")?;
        self.record(format!("clear:{message}:{symbol}"));
        self.with_message(message, |m| m.reactions.retain(|s| s != symbol))
    }

    async fn is_admin(&self, _guild: Option<GuildId>, user: UserId) -> Result<bool, TransportError> {
        Ok(self.admins.lock().unwrap().contains(&user))
    }

    async fn wait_for(
        &self,
        filter: EventFilter,
        _timeout: Duration,
    ) -> Result<WaitOutcome<ChatEvent>, TransportError> {
        let mut events = self.events.lock().unwrap();
        while let Some(event) = events.pop_front() {
            if filter(&event) {
                return Ok(WaitOutcome::Received(event));
            }
        }
        Ok(WaitOutcome::TimedOut)
    }
}

// ==================== Event log ====================

#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn event_types(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl PollEventLogger for RecordingLogger {
    fn log(&self, event: PollEvent) {
        self.events
            .lock()
            .unwrap()
            .push(event.event_type.to_string());
    }
}

// ==================== Fixture ====================

pub struct Fixture {
    pub ctx: PollContext,
    pub transport: Arc<MockTransport>,
    pub clock: Arc<ManualClock>,
    pub logger: Arc<RecordingLogger>,
}

impl Fixture {
    pub fn new() -> Self {
        let transport = Arc::new(MockTransport::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
        ));
        let logger = Arc::new(RecordingLogger::default());
        let ctx = PollContext::new(Arc::new(MockRepository::default()), transport.clone())
            .with_clock(clock.clone())
            .with_settings(PollSettings::default())
            .with_event_logger(logger.clone());
        Self {
            ctx,
            transport,
            clock,
            logger,
        }
    }

    /// A poll created by user 2, ending in an hour, with its message posted.
    pub async fn open_poll(&self) -> Poll {
        let guild = self.ctx.repository.register_guild(GUILD).await.unwrap();
        let creator = self.ctx.repository.user_id(UserId(2)).await.unwrap();
        let message = self
            .transport
            .send_message(
                CHANNEL,
                pollbot_domain::poll::content::open_poll_embed(
                    "Lunch?",
                    self.ctx.now() + TimeDelta::hours(1),
                )
                .into(),
            )
            .await
            .unwrap();
        self.ctx
            .repository
            .create_poll(NewPoll {
                creator,
                channel_id: CHANNEL,
                message_id: message.id,
                guild,
                title: "Lunch?".to_string(),
                end_date: self.ctx.now() + TimeDelta::hours(1),
            })
            .await
            .unwrap()
    }
}
