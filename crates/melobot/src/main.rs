use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;

use melocore::config;
use melocore::logging::{init_logger, log_configuration};
use melocore::{DownloadResult, Orchestrator, PipelineConfig, ResourceArea};

mod bot;
mod cli;
mod handlers;
mod messages;

use cli::{Cli, Commands};
use handlers::{schema, HandlerDeps};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    if let Err(e) = init_logger(&config::LOG_FILE_PATH) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = Cli::parse_args();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads((*config::MAX_BLOCKING_THREADS).max(1))
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let pipeline = PipelineConfig::from_env();
    let area = Arc::new(ResourceArea::create(config::TEMP_FILES_DIR.as_str())?.with_stem_policy(pipeline.stem_policy));
    log_configuration(&pipeline, &area);

    let orchestrator = Orchestrator::from_config(&pipeline, Arc::clone(&area));

    let outcome = match cli.command {
        Some(Commands::Fetch { query, output }) => run_cli_fetch(&orchestrator, &query, output).await,
        Some(Commands::Run) | None => run_bot(orchestrator).await,
    };

    area.teardown();
    log::info!("Scratch area removed, exiting");

    outcome
}

/// Runs the bot with long polling until Ctrl-C or SIGTERM.
async fn run_bot(orchestrator: Orchestrator) -> Result<()> {
    let bot = bot::create_bot()?;

    if let Err(e) = bot::setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let deps = HandlerDeps::new(orchestrator, config::SONG_PERFORMER.as_str());

    log::info!("🤖 Bot is running...");

    let mut dispatcher = Dispatcher::builder(bot, schema(deps))
        .default_handler(|upd| async move {
            log::debug!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("An error has occurred in the dispatcher"))
        .enable_ctrlc_handler()
        .build();

    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        wait_for_sigterm().await;
        log::info!("SIGTERM received, stopping dispatcher");
        match shutdown.shutdown() {
            Ok(done) => done.await,
            Err(e) => log::warn!("Dispatcher was not running: {}", e),
        }
    });

    dispatcher.dispatch().await;
    log::info!("Dispatcher shutdown gracefully");

    Ok(())
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            log::warn!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await;
}

/// Resolves and downloads one song, then copies it out of the scratch area.
async fn run_cli_fetch(orchestrator: &Orchestrator, query: &str, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(|| PathBuf::from("."));

    match orchestrator.handle_query(query).await {
        DownloadResult::Success { file_path, title } => {
            let copied = copy_out(&file_path, &output, &title).await;
            orchestrator.area().remove(&file_path);

            let dest = copied?;
            println!("{} -> {}", title, dest.display());
            Ok(())
        }
        DownloadResult::Failure { reason } => Err(anyhow::anyhow!(reason)),
    }
}

async fn copy_out(file_path: &Path, output: &Path, title: &str) -> Result<PathBuf> {
    fs_err::tokio::create_dir_all(output).await?;

    let extension = file_path.extension().and_then(|e| e.to_str()).unwrap_or("mp3");
    let dest = output.join(format!("{}.{}", messages::escape_filename(title), extension));
    fs_err::tokio::copy(file_path, &dest).await?;

    Ok(dest)
}
