//! Infrastructure layer for pollbot
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod chat;
pub mod config;
pub mod logging;
pub mod memory;

// Re-export commonly used types
pub use chat::{LocalChatPlatform, PlatformActivity, is_known_emoji};
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileDaemonConfig, FileDialogsConfig,
    FileDisplayConfig, FileLoggingConfig, FilePlatformConfig,
};
pub use logging::JsonlPollEventLogger;
pub use memory::InMemoryPollRepository;
