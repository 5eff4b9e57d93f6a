//! yt-dlp backed resolver and downloader.
//!
//! Both run yt-dlp as a child process and wait for it synchronously, so they
//! must only be called from the blocking pool. There is no timeout: a hung
//! yt-dlp holds its worker thread until it exits.

use serde::Deserialize;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use crate::config;
use crate::download::PipelineError;
use crate::provider::ytdlp_errors::{analyze_ytdlp_error, provider_message};
use crate::provider::{Candidate, Downloader, OutputTarget, Resolver};

/// Title used when the provider omits one
const UNKNOWN_TITLE: &str = "Unknown";

/// Options handed to yt-dlp for one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YtDlpOptions {
    /// `<dir>/<stem>.%(ext)s`
    pub output_template: PathBuf,
    /// `-f` selector for the source stream
    pub format_selector: String,
    /// Target codec after extraction
    pub audio_format: String,
    /// Target bitrate in kbps
    pub audio_quality: u32,
    /// Skip info-json, thumbnails and subtitles
    pub suppress_metadata_artifacts: bool,
    /// Quiet output without warnings or colour codes
    pub suppress_warnings: bool,
    pub concurrent_fragment_downloads: u32,
}

impl YtDlpOptions {
    /// Fixed audio profile writing to `output_template`
    pub fn audio(output_template: PathBuf) -> Self {
        Self {
            output_template,
            format_selector: config::audio::FORMAT_SELECTOR.to_string(),
            audio_format: config::audio::FORMAT.to_string(),
            audio_quality: config::audio::QUALITY_KBPS,
            suppress_metadata_artifacts: true,
            suppress_warnings: true,
            concurrent_fragment_downloads: config::audio::CONCURRENT_FRAGMENTS,
        }
    }

    /// Render as yt-dlp command-line arguments, without the source locator.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.format_selector.clone(),
            "-o".to_string(),
            self.output_template.to_string_lossy().into_owned(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            self.audio_format.clone(),
            "--audio-quality".to_string(),
            format!("{}K", self.audio_quality),
            "--no-playlist".to_string(),
            "--concurrent-fragments".to_string(),
            self.concurrent_fragment_downloads.to_string(),
        ];

        if self.suppress_warnings {
            args.extend(["--quiet", "--no-warnings", "--no-color", "--no-progress"].map(String::from));
        }
        if self.suppress_metadata_artifacts {
            args.extend(
                [
                    "--no-write-info-json",
                    "--no-write-thumbnail",
                    "--no-write-subs",
                    "--no-write-auto-subs",
                ]
                .map(String::from),
            );
        }

        args
    }
}

/// Build the provider search string for a user query
pub fn search_query(query: &str) -> String {
    format!(
        "{}{}{}",
        config::audio::SEARCH_PREFIX,
        query.trim(),
        config::audio::SEARCH_SUFFIX
    )
}

/// Run yt-dlp to completion, turning spawn failures and non-zero exits into
/// `PipelineError::Provider`.
fn run_ytdlp(ytdl_bin: &str, args: &[String]) -> Result<Output, PipelineError> {
    log::debug!("yt-dlp command: {} {}", ytdl_bin, args.join(" "));

    let output = Command::new(ytdl_bin)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            log::error!("Failed to execute {}: {}", ytdl_bin, e);
            PipelineError::Provider(format!("Failed to execute {}: {}", ytdl_bin, e))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let error_type = analyze_ytdlp_error(&stderr);
        log::error!(
            "yt-dlp failed ({}), error type: {}",
            output.status,
            error_type.label()
        );
        log::debug!("yt-dlp stderr: {}", stderr);
        return Err(PipelineError::Provider(provider_message(
            &stderr,
            &format!("yt-dlp exited with {}", output.status),
        )));
    }

    Ok(output)
}

/// One line of `--dump-json --flat-playlist` output
#[derive(Debug, Deserialize)]
struct SearchEntry {
    id: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    webpage_url: Option<String>,
    url: Option<String>,
}

impl SearchEntry {
    fn into_candidate(self) -> Result<Candidate, PipelineError> {
        let source_locator = self
            .webpage_url
            .or(self.url)
            .or_else(|| self.id.map(|id| format!("https://www.youtube.com/watch?v={}", id)))
            .ok_or_else(|| PipelineError::Provider("Search result has no URL".to_string()))?;

        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let duration_seconds = self
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d.round() as u64);

        Ok(Candidate {
            title,
            duration_seconds,
            source_locator,
        })
    }
}

/// Parse the first search entry from yt-dlp stdout
pub fn parse_search_output(stdout: &str) -> Result<Candidate, PipelineError> {
    let line = match stdout.lines().map(str::trim).find(|l| !l.is_empty()) {
        Some(line) => line,
        None => return Err(PipelineError::NoResults),
    };

    let entry: SearchEntry = serde_json::from_str(line)
        .map_err(|e| PipelineError::Provider(format!("Failed to parse yt-dlp output: {}", e)))?;

    entry.into_candidate()
}

/// YouTube search through `yt-dlp "ytsearch1:<query> audio"`
pub struct YtDlpResolver {
    ytdl_bin: String,
}

impl YtDlpResolver {
    pub fn new(ytdl_bin: impl Into<String>) -> Self {
        Self {
            ytdl_bin: ytdl_bin.into(),
        }
    }
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new(config::YTDL_BIN.clone())
    }
}

impl Resolver for YtDlpResolver {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    fn search(&self, query: &str) -> Result<Candidate, PipelineError> {
        let args = vec![
            "--dump-json".to_string(),
            "--flat-playlist".to_string(),
            "--playlist-items".to_string(),
            "1".to_string(),
            "--no-warnings".to_string(),
            search_query(query),
        ];

        let output = run_ytdlp(&self.ytdl_bin, &args)?;
        let candidate = parse_search_output(&String::from_utf8_lossy(&output.stdout))?;

        log::info!(
            "Resolved '{}' -> '{}' ({:?}s)",
            query,
            candidate.title,
            candidate.duration_seconds
        );
        Ok(candidate)
    }
}

/// Audio extraction through yt-dlp + ffmpeg
pub struct YtDlpDownloader {
    ytdl_bin: String,
}

impl YtDlpDownloader {
    pub fn new(ytdl_bin: impl Into<String>) -> Self {
        Self {
            ytdl_bin: ytdl_bin.into(),
        }
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new(config::YTDL_BIN.clone())
    }
}

impl Downloader for YtDlpDownloader {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    fn extension(&self) -> &str {
        config::audio::FORMAT
    }

    fn fetch(&self, candidate: &Candidate, target: &OutputTarget) -> Result<(), PipelineError> {
        let mut args = YtDlpOptions::audio(target.template()).to_args();
        args.push(candidate.source_locator.clone());

        log::info!("📥 Downloading '{}' into {}", candidate.title, target.stem);
        run_ytdlp(&self.ytdl_bin, &args)?;
        Ok(())
    }
}
