//! Explicit context passed to every poll operation
//!
//! Carries the repository and transport handles plus the clock, settings
//! and event log. One context is built at startup and cloned into each
//! unit of work; there is no process-wide singleton.

use crate::config::PollSettings;
use crate::ports::chat_transport::ChatTransport;
use crate::ports::clock::{Clock, SystemClock};
use crate::ports::poll_event_logger::{NoPollEventLogger, PollEvent, PollEventLogger};
use crate::ports::poll_repository::PollRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct PollContext {
    pub repository: Arc<dyn PollRepository>,
    pub transport: Arc<dyn ChatTransport>,
    pub clock: Arc<dyn Clock>,
    pub settings: PollSettings,
    pub event_logger: Arc<dyn PollEventLogger>,
}

impl PollContext {
    /// Create a context with the system clock, default settings and no
    /// event log.
    pub fn new(repository: Arc<dyn PollRepository>, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            repository,
            transport,
            clock: Arc::new(SystemClock),
            settings: PollSettings::default(),
            event_logger: Arc::new(NoPollEventLogger),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn PollEventLogger>) -> Self {
        self.event_logger = logger;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn log(&self, event_type: &'static str, payload: serde_json::Value) {
        self.event_logger.log(PollEvent::new(event_type, payload));
    }
}
