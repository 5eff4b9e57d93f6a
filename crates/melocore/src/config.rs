use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

use crate::admission::AdmissionPolicy;
use crate::resource::StemPolicy;

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Parent directory for the per-process scratch area
/// Read from TEMP_FILES_DIR environment variable
/// Defaults to the OS temp directory, supports tilde (~) expansion
pub static TEMP_FILES_DIR: Lazy<String> = Lazy::new(|| {
    env::var("TEMP_FILES_DIR")
        .map(|dir| shellexpand::tilde(&dir).into_owned())
        .unwrap_or_else(|_| env::temp_dir().to_string_lossy().into_owned())
});

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: melobot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "melobot.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Performer tag attached to every sent audio file
/// Read from SONG_PERFORMER environment variable
pub static SONG_PERFORMER: Lazy<String> =
    Lazy::new(|| env::var("SONG_PERFORMER").unwrap_or_else(|_| "melobot".to_string()));

/// How request stems are allocated: "hashed" (default) or "unique"
pub static STEM_POLICY: Lazy<StemPolicy> = Lazy::new(|| match env::var("STEM_POLICY") {
    Ok(value) => value.parse().unwrap_or_else(|_| {
        log::warn!("Unknown STEM_POLICY '{}', falling back to hashed stems", value);
        StemPolicy::Hashed
    }),
    Err(_) => StemPolicy::Hashed,
});

/// Upper bound for the blocking worker pool (yt-dlp calls run there)
pub static MAX_BLOCKING_THREADS: Lazy<usize> = Lazy::new(|| parse_env("MAX_BLOCKING_THREADS").unwrap_or(32));

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparsable {}='{}'", key, raw);
            None
        }
    }
}

/// Admission limits
pub mod admission {
    use super::{parse_env, Lazy};

    /// Longest track accepted before downloading (8 minutes)
    pub const DEFAULT_MAX_DURATION_SECS: u64 = 480;

    /// Maximum file size for Telegram (50MB in bytes)
    /// Telegram Bot API allows up to 50MB for files
    pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

    /// Read from MAX_DURATION_SECS environment variable
    pub static MAX_DURATION_SECS: Lazy<u64> =
        Lazy::new(|| parse_env("MAX_DURATION_SECS").unwrap_or(DEFAULT_MAX_DURATION_SECS));

    /// Read from MAX_FILE_SIZE_BYTES environment variable
    pub static MAX_FILE_SIZE_BYTES: Lazy<u64> =
        Lazy::new(|| parse_env("MAX_FILE_SIZE_BYTES").unwrap_or(DEFAULT_MAX_FILE_SIZE_BYTES));
}

/// Audio output settings handed to yt-dlp
pub mod audio {
    /// Preferred source streams, best first
    pub const FORMAT_SELECTOR: &str = "bestaudio[ext=m4a]/bestaudio[ext=webm]/bestaudio";

    /// Target container/codec
    pub const FORMAT: &str = "mp3";

    /// Target bitrate in kbps. Lower quality for faster processing
    pub const QUALITY_KBPS: u32 = 128;

    /// Parallel fragment downloads for segmented streams
    pub const CONCURRENT_FRAGMENTS: u32 = 4;

    /// Prefix of the provider search query, one result only
    pub const SEARCH_PREFIX: &str = "ytsearch1:";

    /// Appended to every query to bias results towards audio uploads
    pub const SEARCH_SUFFIX: &str = " audio";
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (uploads included)
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Everything the pipeline needs, collected into one injectable value
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub ytdl_bin: String,
    pub admission: AdmissionPolicy,
    pub stem_policy: StemPolicy,
}

impl PipelineConfig {
    /// Build from the process environment
    pub fn from_env() -> Self {
        Self {
            ytdl_bin: YTDL_BIN.clone(),
            admission: AdmissionPolicy::new(*admission::MAX_DURATION_SECS, *admission::MAX_FILE_SIZE_BYTES),
            stem_policy: *STEM_POLICY,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ytdl_bin: "yt-dlp".to_string(),
            admission: AdmissionPolicy::default(),
            stem_policy: StemPolicy::Hashed,
        }
    }
}
