//! Reconciliation daemon
//!
//! A fixed-period sweep over every open poll: polls whose end date has
//! passed are ended, and every poll's tally is re-rendered from the
//! repository. This is the only path that closes a poll because time ran
//! out, and it also completes manual ends (which only move the end date).
//!
//! Ticks are awaited in sequence, so a slow tick delays the next one rather
//! than overlapping it. Each poll's work is isolated: an error or a panic
//! is logged and the sweep moves on.

use super::context::PollContext;
use super::error::PollActionError;
use super::lifecycle::PollLifecycle;
use super::tally::refresh_tally;
use futures::FutureExt;
use pollbot_domain::Poll;
use std::panic::AssertUnwindSafe;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Summary of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Open polls examined.
    pub examined: usize,
    /// Polls this tick moved to Ended.
    pub ended: usize,
    /// Polls whose tally was re-rendered.
    pub refreshed: usize,
    /// Polls whose message has gone.
    pub missing: usize,
    /// Polls whose work failed or panicked.
    pub failed: usize,
}

/// What happened to a single poll during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PollSweep {
    ended: bool,
    refreshed: bool,
}

pub struct ReconciliationDaemon {
    ctx: PollContext,
    lifecycle: PollLifecycle,
}

impl ReconciliationDaemon {
    pub fn new(ctx: PollContext) -> Self {
        let lifecycle = PollLifecycle::new(ctx.clone());
        Self { ctx, lifecycle }
    }

    /// Tick every `tick_interval` until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let period = self.ctx.settings.tick_interval;
        info!("Reconciliation daemon started (every {:?})", period);

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Reconciliation daemon stopped");
                    break;
                }
                _ = interval.tick() => {
                    let report = self.tick().await;
                    trace!("Tick: {:?}", report);
                }
            }
        }
    }

    /// One sweep over all open polls.
    pub async fn tick(&self) -> TickReport {
        let mut report = TickReport::default();
        let polls = match self.ctx.repository.open_polls().await {
            Ok(polls) => polls,
            Err(e) => {
                error!("Failed to list open polls, skipping tick: {}", e);
                return report;
            }
        };

        for poll in polls {
            report.examined += 1;
            let sweep = AssertUnwindSafe(self.sweep(&poll)).catch_unwind().await;
            match sweep {
                Ok(Ok(Some(sweep))) => {
                    report.ended += usize::from(sweep.ended);
                    report.refreshed += usize::from(sweep.refreshed);
                    if !sweep.refreshed {
                        report.missing += 1;
                    }
                }
                Ok(Ok(None)) => report.missing += 1,
                Ok(Err(e)) if e.is_not_found() => {
                    debug!("Poll {} vanished mid-tick: {}", poll.id, e);
                    report.missing += 1;
                }
                Ok(Err(e)) => {
                    warn!("Failed to reconcile poll {}: {}", poll.id, e);
                    report.failed += 1;
                }
                Err(_) => {
                    error!("Reconciling poll {} panicked", poll.id);
                    report.failed += 1;
                }
            }
        }
        report
    }

    async fn sweep(&self, poll: &Poll) -> Result<Option<PollSweep>, PollActionError> {
        let ended = if poll.is_due(self.ctx.now()) {
            self.lifecycle.end_now(poll).await?
        } else {
            false
        };
        let refreshed = refresh_tally(&self.ctx, poll).await?.is_some();
        if !ended && !refreshed {
            return Ok(None);
        }
        Ok(Some(PollSweep { ended, refreshed }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_transport::ChatTransport;
    use crate::use_cases::test_support::Fixture;
    use chrono::TimeDelta;
    use pollbot_domain::{ADD_CHOICE_SYMBOL, DELETE_SYMBOL, END_POLL_SYMBOL};
    use std::time::Duration;

    #[tokio::test]
    async fn test_never_ends_before_end_date() {
        let fx = Fixture::new();
        let poll = fx.open_poll().await;
        let daemon = ReconciliationDaemon::new(fx.ctx.clone());

        fx.clock.advance(TimeDelta::minutes(59) + TimeDelta::seconds(59));
        let report = daemon.tick().await;

        assert_eq!(report.examined, 1);
        assert_eq!(report.ended, 0);
        assert_eq!(report.refreshed, 1);
        assert!(!fx.ctx.repository.poll(poll.id).await.unwrap().unwrap().ended);
    }

    #[tokio::test]
    async fn test_ends_on_first_tick_at_end_date() {
        let fx = Fixture::new();
        let poll = fx.open_poll().await;
        for symbol in [ADD_CHOICE_SYMBOL, DELETE_SYMBOL, END_POLL_SYMBOL] {
            fx.transport
                .add_reaction(poll.channel_id, poll.message_id, symbol)
                .await
                .unwrap();
        }
        let daemon = ReconciliationDaemon::new(fx.ctx.clone());

        fx.clock.advance(TimeDelta::hours(1));
        let report = daemon.tick().await;

        assert_eq!(report.ended, 1);
        assert!(fx.ctx.repository.poll(poll.id).await.unwrap().unwrap().ended);
        assert_eq!(fx.transport.reactions_on(poll.message_id), vec![DELETE_SYMBOL]);
        // Ended polls drop out of the sweep
        assert_eq!(daemon.tick().await.examined, 0);
        assert_eq!(fx.logger.event_types(), vec!["poll_ended"]);
    }

    #[tokio::test]
    async fn test_missing_message_does_not_stop_other_polls() {
        let fx = Fixture::new();
        let gone = fx.open_poll().await;
        let kept = fx.open_poll().await;
        fx.transport
            .delete_message(gone.channel_id, gone.message_id)
            .await
            .unwrap();
        let daemon = ReconciliationDaemon::new(fx.ctx.clone());

        let report = daemon.tick().await;

        assert_eq!(report.examined, 2);
        assert_eq!(report.missing, 1);
        assert_eq!(report.refreshed, 1);
        assert_eq!(report.failed, 0);
        let message = fx.transport.message(kept.message_id).unwrap();
        assert!(message.embed().unwrap().footer.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_cancel() {
        let fx = Fixture::new();
        fx.open_poll().await;
        let daemon = ReconciliationDaemon::new(
            fx.ctx
                .clone()
                .with_settings(fx.ctx.settings.clone().with_tick_interval(Duration::from_millis(10))),
        );
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();

        let handle = tokio::spawn(async move { daemon.run(cancel).await });
        tokio::time::sleep(Duration::from_millis(35)).await;
        stopper.cancel();
        handle.await.unwrap();

        let edits = fx
            .transport
            .calls()
            .iter()
            .filter(|call| call.starts_with("edit:"))
            .count();
        assert!(edits >= 3, "expected at least three ticks, saw {edits}");
    }
}
