//! Configuration file loading for pollbot
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `POLLBOT_`-prefixed environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./pollbot.toml` or `./.pollbot.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/pollbot/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileDaemonConfig, FileDialogsConfig, FileDisplayConfig,
    FileLoggingConfig, FilePlatformConfig,
};
pub use loader::ConfigLoader;
