//! Event dispatcher: one task per reaction.
//!
//! Reads the platform's event feed and hands every reaction-add to the
//! [`ReactionRouter`] on its own task, so a user sitting in a 60 second
//! confirmation never holds up anyone else's vote. Message events are not
//! routed; only waiting dialogs care about them.

use super::router::ReactionRouter;
use futures::{Stream, StreamExt};
use pollbot_domain::ChatEvent;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct ReactionDispatcher {
    router: Arc<ReactionRouter>,
}

impl ReactionDispatcher {
    pub fn new(router: ReactionRouter) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    /// Dispatch until the feed ends or `cancel` fires.
    ///
    /// In-flight handlers are aborted on cancellation and awaited when the
    /// feed simply ends.
    pub async fn run<S>(&self, events: S, cancel: CancellationToken)
    where
        S: Stream<Item = ChatEvent> + Send,
    {
        let mut events = std::pin::pin!(events);
        let mut handlers = JoinSet::new();

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Dispatcher cancelled; aborting {} handler(s)", handlers.len());
                    handlers.shutdown().await;
                    return;
                }
                event = events.next() => event,
            };

            let Some(event) = event else {
                break;
            };
            // Reap finished handlers so the set does not grow without bound
            while handlers.try_join_next().is_some() {}

            if let ChatEvent::ReactionAdded(reaction) = event {
                let router = Arc::clone(&self.router);
                handlers.spawn(async move {
                    match router.handle(&reaction).await {
                        Ok(outcome) => debug!(
                            "Reaction {} on {} by {}: {:?}",
                            reaction.symbol, reaction.message_id, reaction.user.id, outcome
                        ),
                        Err(e) => warn!(
                            "Reaction {} on {} failed: {}",
                            reaction.symbol, reaction.message_id, e
                        ),
                    }
                });
            }
        }

        while handlers.join_next().await.is_some() {}
        debug!("Event feed closed");
    }
}
