use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use url::Url;

use vidgrab::cli::{Cli, Commands};
use vidgrab::core::{config, init_logger};
use vidgrab::download::{MediaEngine, YtDlpEngine};
use vidgrab::session::SessionStore;
use vidgrab::telegram::{create_bot, schema, setup_bot_commands, AccessGate, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Load environment variables from .env if present, before any config
    // statics are touched
    let _ = dotenv();

    // Set up a global panic handler so a panicking handler gets logged
    // instead of silently killing the dispatcher task
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Info { url }) => run_cli_info(&url).await,
        Some(Commands::Run) | None => run_bot().await,
    }
}

/// Run the Telegram bot
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    // Make sure the artifact directory exists before the first download
    std::fs::create_dir_all(&*config::DOWNLOAD_DIR)
        .map_err(|e| anyhow::anyhow!("Failed to create download dir {}: {}", &*config::DOWNLOAD_DIR, e))?;

    let bot = create_bot()?;

    let me = bot.get_me().await?;
    log::info!("Bot username: {:?}, Bot ID: {}", me.user.username, me.user.id);

    setup_bot_commands(&bot).await?;

    let engine: Arc<dyn MediaEngine> = Arc::new(YtDlpEngine::new(config::DOWNLOAD_DIR.clone()));
    let sessions = Arc::new(SessionStore::new());
    Arc::clone(&sessions).spawn_eviction_task(config::session::sweep_interval());

    let gate = Arc::new(AccessGate::from_config());
    if gate.is_enabled() {
        log::info!("Membership gate enabled for channels: {:?}", &*config::REQUIRED_CHANNELS);
    } else {
        log::info!("Membership gate disabled (REQUIRED_CHANNELS empty)");
    }

    let deps = HandlerDeps::new(engine, sessions, gate);
    let handler = schema(deps);

    log::info!("Starting bot in long polling mode");
    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Run the CLI info command: print title, duration, and formats for a URL
async fn run_cli_info(url: &str) -> Result<()> {
    use vidgrab::core::utils::format_duration;
    use vidgrab::telegram::handlers::format_formats_list;

    let url = Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid URL: {}", e))?;
    let engine = YtDlpEngine::new(config::DOWNLOAD_DIR.clone());

    let Some(info) = engine.extract_info(&url).await else {
        return Err(anyhow::anyhow!("Failed to extract info for {}", url));
    };

    println!("Title: {}", info.title);
    match info.duration_secs() {
        Some(secs) => println!("Duration: {}", format_duration(secs)),
        None => println!("Duration: unknown"),
    }

    if let Some(formats) = engine.list_formats(&url).await {
        println!("\nAvailable formats:");
        println!("{}", format_formats_list(&formats));
    }

    Ok(())
}
