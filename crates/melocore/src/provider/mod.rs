//! Search and download backends.
//!
//! Both traits are synchronous: implementations shell out to external tools
//! and block. The orchestrator only ever calls them from the blocking pool.
//!
//! Built-in backend:
//! - `ytdlp`: YouTube search and audio extraction via yt-dlp + ffmpeg

pub mod ytdlp;
pub mod ytdlp_errors;

use std::path::PathBuf;

use crate::download::PipelineError;

/// A single resolved search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    /// `None` when the provider does not know (live streams, some uploads)
    pub duration_seconds: Option<u64>,
    /// Opaque handle the downloader understands (a page URL for yt-dlp)
    pub source_locator: String,
}

/// Where a downloader must place its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Scratch directory
    pub dir: PathBuf,
    /// File name without extension
    pub stem: String,
    /// Expected extension after transcoding, e.g. "mp3"
    pub extension: String,
}

impl OutputTarget {
    /// `<dir>/<stem>.<extension>`
    pub fn expected_path(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem, self.extension))
    }

    /// `<dir>/<stem>.%(ext)s`, the yt-dlp output template
    pub fn template(&self) -> PathBuf {
        self.dir.join(format!("{}.%(ext)s", self.stem))
    }
}

/// Resolves a free-text query to its best match without downloading.
pub trait Resolver: Send + Sync {
    /// Human-readable name of this backend
    fn name(&self) -> &str;

    /// Best single match, `NoResults` when the index has none.
    fn search(&self, query: &str) -> Result<Candidate, PipelineError>;
}

/// Fetches and transcodes a resolved candidate into the scratch area.
pub trait Downloader: Send + Sync {
    /// Human-readable name of this backend
    fn name(&self) -> &str;

    /// Audio extension this backend produces
    fn extension(&self) -> &str;

    /// Run the provider. A successful return does not guarantee a file exists;
    /// callers locate it with [`crate::download::locate_output`].
    fn fetch(&self, candidate: &Candidate, target: &OutputTarget) -> Result<(), PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_output_target_paths() {
        let target = OutputTarget {
            dir: PathBuf::from("/tmp/melobot-x"),
            stem: "song_0042".to_string(),
            extension: "mp3".to_string(),
        };
        assert_eq!(target.expected_path(), Path::new("/tmp/melobot-x/song_0042.mp3"));
        assert_eq!(target.template(), Path::new("/tmp/melobot-x/song_0042.%(ext)s"));
    }
}
