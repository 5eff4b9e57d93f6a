use thiserror::Error;

/// Why a request did not produce a deliverable file.
///
/// `Display` is the text shown to the user, so every variant renders as a
/// short human-readable sentence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Query was blank after trimming
    #[error("Please provide a song name!")]
    EmptyQuery,

    /// Search returned nothing
    #[error("No results found")]
    NoResults,

    /// yt-dlp failed; carries the provider's own message
    #[error("{0}")]
    Provider(String),

    /// Track is longer than the duration ceiling
    #[error("Song is too long (max {} minutes allowed)", max_secs / 60)]
    TooLong { duration_secs: u64, max_secs: u64 },

    /// Produced file is bigger than the upload ceiling
    #[error("File too large (max {}MB)", max_bytes / (1024 * 1024))]
    TooLarge { size_bytes: u64, max_bytes: u64 },

    /// Provider reported success but no output file was found
    #[error("Download completed but file not found")]
    FileNotProduced(String),

    /// Request was cancelled at a stage boundary
    #[error("Download cancelled")]
    Cancelled,

    /// Anything else, with the underlying message
    #[error("Error: {0}")]
    Unexpected(String),
}

impl PipelineError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            PipelineError::EmptyQuery => "empty_query",
            PipelineError::NoResults => "no_results",
            PipelineError::Provider(_) => "provider",
            PipelineError::TooLong { .. } => "too_long",
            PipelineError::TooLarge { .. } => "too_large",
            PipelineError::FileNotProduced(_) => "file_not_produced",
            PipelineError::Cancelled => "cancelled",
            PipelineError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Unexpected(err.to_string())
    }
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(err: tokio::task::JoinError) -> Self {
        PipelineError::Unexpected(format!("Task join error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_user_messages() {
        assert_eq!(PipelineError::NoResults.to_string(), "No results found");
        assert_eq!(
            PipelineError::TooLong {
                duration_secs: 36_000,
                max_secs: 480
            }
            .to_string(),
            "Song is too long (max 8 minutes allowed)"
        );
        assert_eq!(
            PipelineError::TooLarge {
                size_bytes: 60 * 1024 * 1024,
                max_bytes: 50 * 1024 * 1024
            }
            .to_string(),
            "File too large (max 50MB)"
        );
        assert_eq!(
            PipelineError::FileNotProduced("song_0001".into()).to_string(),
            "Download completed but file not found"
        );
        assert_eq!(PipelineError::Unexpected("boom".into()).to_string(), "Error: boom");
    }

    #[test]
    fn test_provider_message_is_passed_through() {
        let err = PipelineError::Provider("ERROR: [youtube] abc: Video unavailable".into());
        assert_eq!(err.to_string(), "ERROR: [youtube] abc: Video unavailable");
        assert_eq!(err.subcategory(), "provider");
    }

    #[test]
    fn test_from_io_error() {
        let err: PipelineError = std::io::Error::new(std::io::ErrorKind::Other, "disk gone").into();
        assert!(matches!(err, PipelineError::Unexpected(ref m) if m == "disk gone"));
    }
}
