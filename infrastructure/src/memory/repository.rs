//! In-memory implementation of [`PollRepository`].
//!
//! Everything lives in one [`Store`] behind a `tokio::sync::RwLock`, so each
//! repository call is atomic. The same uniqueness rules a relational schema
//! would enforce are checked under the write lock:
//!
//! | Key | Violation |
//! |-----|-----------|
//! | poll message id | `Conflict` on create / re-point |
//! | (poll, symbol) | `Conflict` on create choice |
//! | (user, choice) | `Conflict` on create response |
//!
//! Deleting a poll cascades to its choices and their responses. All state
//! is lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pollbot_application::ports::poll_repository::{PollRepository, RepositoryError};
use pollbot_domain::{
    Choice, ChoiceId, GuildId, InternalGuildId, InternalUserId, MessageId, NewPoll, Poll, PollId,
    UserId,
};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Response {
    user: InternalUserId,
    choice: ChoiceId,
}

#[derive(Default)]
struct Store {
    users: HashMap<UserId, InternalUserId>,
    user_platform_ids: HashMap<InternalUserId, UserId>,
    guilds: HashMap<GuildId, InternalGuildId>,
    polls: BTreeMap<PollId, Poll>,
    choices: BTreeMap<ChoiceId, Choice>,
    /// In insertion order, which is voting order.
    responses: Vec<Response>,
    next_user: i64,
    next_guild: i64,
    next_poll: i64,
    next_choice: i64,
}

impl Store {
    fn message_taken(&self, message: MessageId, except: Option<PollId>) -> bool {
        self.polls
            .values()
            .any(|poll| poll.message_id == message && Some(poll.id) != except)
    }

    fn poll_mut(&mut self, id: PollId) -> Result<&mut Poll, RepositoryError> {
        self.polls
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("poll {id}")))
    }
}

/// In-memory poll repository.
pub struct InMemoryPollRepository {
    store: RwLock<Store>,
}

impl InMemoryPollRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
        }
    }

    /// Every poll, ended or not, in id order.
    pub async fn all_polls(&self) -> Vec<Poll> {
        self.store.read().await.polls.values().cloned().collect()
    }
}

impl Default for InMemoryPollRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PollRepository for InMemoryPollRepository {
    async fn user_id(&self, user: UserId) -> Result<InternalUserId, RepositoryError> {
        if let Some(id) = self.store.read().await.users.get(&user) {
            return Ok(*id);
        }
        let mut store = self.store.write().await;
        // Another task may have created it between the two locks
        if let Some(id) = store.users.get(&user) {
            return Ok(*id);
        }
        store.next_user += 1;
        let id = InternalUserId(store.next_user);
        store.users.insert(user, id);
        store.user_platform_ids.insert(id, user);
        Ok(id)
    }

    async fn register_guild(&self, guild: GuildId) -> Result<InternalGuildId, RepositoryError> {
        let mut store = self.store.write().await;
        if let Some(id) = store.guilds.get(&guild) {
            return Ok(*id);
        }
        store.next_guild += 1;
        let id = InternalGuildId(store.next_guild);
        store.guilds.insert(guild, id);
        Ok(id)
    }

    async fn guild_id(&self, guild: GuildId) -> Result<Option<InternalGuildId>, RepositoryError> {
        Ok(self.store.read().await.guilds.get(&guild).copied())
    }

    async fn create_poll(&self, poll: NewPoll) -> Result<Poll, RepositoryError> {
        let mut store = self.store.write().await;
        if store.message_taken(poll.message_id, None) {
            return Err(RepositoryError::Conflict(format!(
                "message {} already hosts a poll",
                poll.message_id
            )));
        }
        store.next_poll += 1;
        let stored = Poll {
            id: PollId(store.next_poll),
            creator: poll.creator,
            channel_id: poll.channel_id,
            message_id: poll.message_id,
            guild: poll.guild,
            title: poll.title,
            end_date: poll.end_date,
            ended: false,
        };
        store.polls.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn poll(&self, id: PollId) -> Result<Option<Poll>, RepositoryError> {
        Ok(self.store.read().await.polls.get(&id).cloned())
    }

    async fn poll_by_message(&self, message: MessageId) -> Result<Option<Poll>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .polls
            .values()
            .find(|poll| poll.message_id == message)
            .cloned())
    }

    async fn open_polls(&self) -> Result<Vec<Poll>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .polls
            .values()
            .filter(|poll| !poll.ended)
            .cloned()
            .collect())
    }

    async fn update_end_date(
        &self,
        id: PollId,
        end_date: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        store.poll_mut(id)?.end_date = end_date;
        Ok(())
    }

    async fn update_message_id(
        &self,
        id: PollId,
        message: MessageId,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        if store.message_taken(message, Some(id)) {
            return Err(RepositoryError::Conflict(format!(
                "message {message} already hosts a poll"
            )));
        }
        store.poll_mut(id)?.message_id = message;
        Ok(())
    }

    async fn set_ended(&self, id: PollId) -> Result<bool, RepositoryError> {
        let mut store = self.store.write().await;
        Ok(match store.polls.get_mut(&id) {
            Some(poll) if !poll.ended => {
                poll.ended = true;
                true
            }
            _ => false,
        })
    }

    async fn delete_poll(&self, id: PollId) -> Result<bool, RepositoryError> {
        let mut store = self.store.write().await;
        if store.polls.remove(&id).is_none() {
            return Ok(false);
        }
        let removed: Vec<ChoiceId> = store
            .choices
            .values()
            .filter(|choice| choice.poll_id == id)
            .map(|choice| choice.id)
            .collect();
        for choice in &removed {
            store.choices.remove(choice);
        }
        store
            .responses
            .retain(|response| !removed.contains(&response.choice));
        Ok(true)
    }

    async fn create_choice(
        &self,
        poll: PollId,
        symbol: &str,
        text: &str,
    ) -> Result<Choice, RepositoryError> {
        let mut store = self.store.write().await;
        if !store.polls.contains_key(&poll) {
            return Err(RepositoryError::NotFound(format!("poll {poll}")));
        }
        if store
            .choices
            .values()
            .any(|choice| choice.poll_id == poll && choice.symbol == symbol)
        {
            return Err(RepositoryError::Conflict(format!(
                "poll {poll} already has a choice for {symbol}"
            )));
        }
        store.next_choice += 1;
        let choice = Choice {
            id: ChoiceId(store.next_choice),
            poll_id: poll,
            symbol: symbol.to_string(),
            text: text.to_string(),
        };
        store.choices.insert(choice.id, choice.clone());
        Ok(choice)
    }

    async fn choice(&self, poll: PollId, symbol: &str) -> Result<Option<Choice>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .choices
            .values()
            .find(|choice| choice.poll_id == poll && choice.symbol == symbol)
            .cloned())
    }

    async fn choices(&self, poll: PollId) -> Result<Vec<Choice>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .choices
            .values()
            .filter(|choice| choice.poll_id == poll)
            .cloned()
            .collect())
    }

    async fn has_response(
        &self,
        user: InternalUserId,
        choice: ChoiceId,
    ) -> Result<bool, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.responses.contains(&Response { user, choice }))
    }

    async fn create_response(
        &self,
        user: InternalUserId,
        choice: ChoiceId,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        if !store.choices.contains_key(&choice) {
            return Err(RepositoryError::NotFound(format!("choice {choice}")));
        }
        let response = Response { user, choice };
        if store.responses.contains(&response) {
            return Err(RepositoryError::Conflict(format!(
                "user {user} already voted for choice {choice}"
            )));
        }
        store.responses.push(response);
        Ok(())
    }

    async fn delete_response(
        &self,
        user: InternalUserId,
        choice: ChoiceId,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        let target = Response { user, choice };
        match store.responses.iter().position(|r| *r == target) {
            Some(index) => {
                store.responses.remove(index);
                Ok(())
            }
            None => Err(RepositoryError::Conflict("Response did not exist".to_string())),
        }
    }

    async fn voters(&self, choice: ChoiceId) -> Result<Vec<UserId>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .responses
            .iter()
            .filter(|response| response.choice == choice)
            .filter_map(|response| store.user_platform_ids.get(&response.user).copied())
            .collect())
    }
}
