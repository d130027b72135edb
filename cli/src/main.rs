//! CLI entrypoint for pollbot
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use pollbot_application::{
    NoPollEventLogger, PollCommands, PollContext, PollEventLogger, PollRepository,
    ReactionDispatcher, ReactionRouter, ReconciliationDaemon,
};
use pollbot_domain::{ChannelId, GuildId, UserId};
use pollbot_infrastructure::{
    ConfigLoader, InMemoryPollRepository, JsonlPollEventLogger, LocalChatPlatform,
};
use pollbot_presentation::{ChatRepl, Cli};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// The bot's own account on the local platform.
const BOT_USER: UserId = UserId(1);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_logging(&cli);

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    let settings = config.to_settings().context("Invalid configuration")?;

    info!("Starting pollbot");

    // === Dependency Injection ===
    let repository = Arc::new(InMemoryPollRepository::new());
    for guild in &config.platform.guilds {
        repository
            .register_guild(GuildId(*guild))
            .await
            .context("Failed to register guild")?;
    }

    let home_guild = config.platform.guilds.first().copied().map(GuildId);
    if home_guild.is_none() {
        warn!("No guilds configured; create-poll will be refused");
    }
    let platform = Arc::new(
        LocalChatPlatform::new(BOT_USER, home_guild)
            .with_admins(config.platform.admins.iter().copied().map(UserId)),
    );

    let event_log = cli
        .event_log
        .clone()
        .or_else(|| config.logging.event_log.as_ref().map(PathBuf::from));
    let event_logger: Arc<dyn PollEventLogger> = match event_log {
        Some(path) => match JsonlPollEventLogger::new(&path) {
            Some(logger) => {
                info!("Poll events logged to {}", path.display());
                Arc::new(logger)
            }
            None => Arc::new(NoPollEventLogger),
        },
        None => Arc::new(NoPollEventLogger),
    };

    let ctx = PollContext::new(repository.clone(), platform.clone())
        .with_settings(settings)
        .with_event_logger(event_logger);

    // === Background services ===
    let cancel = CancellationToken::new();

    let dispatcher = ReactionDispatcher::new(ReactionRouter::new(ctx.clone()));
    let events = platform.event_stream();
    let dispatcher_cancel = cancel.clone();
    let dispatcher_handle =
        tokio::spawn(async move { dispatcher.run(events, dispatcher_cancel).await });

    let daemon = ReconciliationDaemon::new(ctx.clone());
    let daemon_cancel = cancel.clone();
    let daemon_handle = tokio::spawn(async move { daemon.run(daemon_cancel).await });

    // === Console ===
    let mut repl = ChatRepl::new(
        platform,
        repository,
        PollCommands::new(ctx),
        ChannelId(config.platform.channel),
    )
    .with_user(UserId(cli.user));

    tokio::select! {
        result = repl.run() => result.context("Console input failed")?,
        _ = tokio::signal::ctrl_c() => println!(),
    }

    cancel.cancel();
    for handle in [dispatcher_handle, daemon_handle] {
        if let Err(e) = handle.await {
            warn!("Background task ended abnormally: {}", e);
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level, optionally mirrored to a
/// daily rolling file.
fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let Some(dir) = &cli.log_dir else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(level))
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return None;
    };

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "pollbot.log"));

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    Some(guard)
}
