//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application settings
//! with [`FileConfig::to_settings`].

use pollbot_application::PollSettings;
use pollbot_domain::tally::DEFAULT_VOTER_LIMIT;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("daemon.tick_interval_ms cannot be 0")]
    ZeroTickInterval,

    #[error("dialogs.confirm_timeout_secs cannot be 0")]
    ZeroConfirmTimeout,

    #[error("dialogs.choice_timeout_secs cannot be 0")]
    ZeroChoiceTimeout,

    #[error("display.voter_limit cannot be 0")]
    ZeroVoterLimit,
}

/// Raw reconciliation daemon configuration (`[daemon]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDaemonConfig {
    /// Milliseconds between sweeps
    pub tick_interval_ms: u64,
}

impl Default for FileDaemonConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
        }
    }
}

/// Raw dialog configuration (`[dialogs]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDialogsConfig {
    /// How long end/delete confirmations wait
    pub confirm_timeout_secs: u64,
    /// How long choice entry waits for a message or an edit
    pub choice_timeout_secs: u64,
}

impl Default for FileDialogsConfig {
    fn default() -> Self {
        Self {
            confirm_timeout_secs: 60,
            choice_timeout_secs: 30,
        }
    }
}

/// Raw display configuration (`[display]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDisplayConfig {
    /// Voters named per choice before "and N more"
    pub voter_limit: usize,
}

impl Default for FileDisplayConfig {
    fn default() -> Self {
        Self {
            voter_limit: DEFAULT_VOTER_LIMIT,
        }
    }
}

/// Raw chat platform configuration (`[platform]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePlatformConfig {
    /// Guilds registered at startup; polls can only be created in these
    pub guilds: Vec<u64>,
    /// Users holding the admin capability
    pub admins: Vec<u64>,
    /// Channel the console posts into
    pub channel: u64,
}

impl Default for FilePlatformConfig {
    fn default() -> Self {
        Self {
            guilds: vec![1],
            admins: Vec::new(),
            channel: 100,
        }
    }
}

/// Raw logging configuration (`[logging]`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL poll event log path
    pub event_log: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub daemon: FileDaemonConfig,
    pub dialogs: FileDialogsConfig,
    pub display: FileDisplayConfig,
    pub platform: FilePlatformConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.daemon.tick_interval_ms == 0 {
            return Err(ConfigValidationError::ZeroTickInterval);
        }
        if self.dialogs.confirm_timeout_secs == 0 {
            return Err(ConfigValidationError::ZeroConfirmTimeout);
        }
        if self.dialogs.choice_timeout_secs == 0 {
            return Err(ConfigValidationError::ZeroChoiceTimeout);
        }
        if self.display.voter_limit == 0 {
            return Err(ConfigValidationError::ZeroVoterLimit);
        }
        Ok(())
    }

    /// Convert to the application's settings, validating first.
    pub fn to_settings(&self) -> Result<PollSettings, ConfigValidationError> {
        self.validate()?;
        Ok(PollSettings::default()
            .with_tick_interval(Duration::from_millis(self.daemon.tick_interval_ms))
            .with_confirm_timeout(Duration::from_secs(self.dialogs.confirm_timeout_secs))
            .with_choice_timeout(Duration::from_secs(self.dialogs.choice_timeout_secs))
            .with_voter_limit(self.display.voter_limit))
    }
}
