//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A one-shot dump of the effective configuration

use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use crate::config::{self, PipelineConfig};
use crate::error::AppResult;
use crate::resource::ResourceArea;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(AppError)` - Log file could not be created or a logger is already installed
pub fn init_logger(log_file_path: &str) -> AppResult<()> {
    let log_file = fs_err::File::create(log_file_path)?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])?;

    Ok(())
}

/// Logs the pipeline configuration at application startup
pub fn log_configuration(pipeline: &PipelineConfig, area: &ResourceArea) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🎵 melobot configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("   yt-dlp binary:     {}", pipeline.ytdl_bin);
    log::info!("   scratch dir:       {}", area.dir().display());
    log::info!("   stem policy:       {:?}", area.stem_policy());
    log::info!("   max duration:      {}s", pipeline.admission.max_duration_secs);
    log::info!(
        "   max file size:     {} MiB",
        pipeline.admission.max_file_size_bytes / (1024 * 1024)
    );
    log::info!(
        "   audio output:      {} @ {}k",
        config::audio::FORMAT,
        config::audio::QUALITY_KBPS
    );
    log::info!("   blocking threads:  {}", *config::MAX_BLOCKING_THREADS);

    if config::BOT_TOKEN.is_empty() {
        log::warn!("⚠️  BOT_TOKEN / TELOXIDE_TOKEN not set - the bot cannot log in");
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    use tempfile::NamedTempFile;

    #[test]
    fn test_init_logger_creates_log_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        // A second init in the same test binary fails with SetLoggerError;
        // either way the file must have been created first.
        let _ = init_logger(path);
        assert!(temp_file.path().exists());
    }

    #[test]
    fn test_second_init_is_logger_error() {
        let first = NamedTempFile::new().unwrap();
        let second = NamedTempFile::new().unwrap();

        // Only one global logger per process, whichever test installs it first.
        let _ = init_logger(first.path().to_str().unwrap());
        match init_logger(second.path().to_str().unwrap()) {
            Err(AppError::Logger(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected logger error, got {:?}", other),
        }
    }

    #[test]
    fn test_init_logger_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");
        assert!(init_logger(path.to_str().unwrap()).is_err());
    }
}
