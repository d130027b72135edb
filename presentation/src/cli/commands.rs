//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for pollbot
#[derive(Parser, Debug)]
#[command(name = "pollbot")]
#[command(author, version, about = "Reaction-driven timed polls for chat servers")]
#[command(long_about = r#"
Pollbot runs timed polls that members vote on by reacting to the poll message.

This binary runs the bot against a local console chat platform. You act as a
chat user: post messages, run commands and react to messages, while the bot
renders polls and tallies in the same channel.

Configuration files are loaded from (in priority order):
1. POLLBOT_* environment variables (e.g. POLLBOT_DAEMON__TICK_INTERVAL_MS)
2. --config <path>     Explicit config file
3. ./pollbot.toml      Project-level config
4. ~/.config/pollbot/config.toml   Global config

Example:
  pollbot --user 42
  > !createpoll 1h30m Where should we eat?
  > react 2 ➕
  > say 🍕 Pizza
"#)]
pub struct Cli {
    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append poll lifecycle events to this JSONL file (overrides config)
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Also write diagnostics to a daily rolling file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// User id to act as when the console starts
    #[arg(short, long, value_name = "ID", default_value_t = 42)]
    pub user: u64,
}
