//! yt-dlp stderr analysis.
//!
//! The category only feeds logs. Users always see the provider's own message.

/// Coarse classes of yt-dlp failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YtDlpErrorType {
    /// Sign-in wall or cookie problems
    InvalidCookies,
    /// YouTube flagged the request as automated
    BotDetection,
    /// Private, removed or region-blocked media
    VideoUnavailable,
    /// Timeouts, DNS, refused connections
    NetworkError,
    /// ffmpeg missing or the audio conversion failed
    PostprocessingError,
    Unknown,
}

impl YtDlpErrorType {
    /// Stable label for log lines
    pub fn label(&self) -> &'static str {
        match self {
            YtDlpErrorType::InvalidCookies => "invalid_cookies",
            YtDlpErrorType::BotDetection => "bot_detection",
            YtDlpErrorType::VideoUnavailable => "video_unavailable",
            YtDlpErrorType::NetworkError => "network",
            YtDlpErrorType::PostprocessingError => "postprocessing",
            YtDlpErrorType::Unknown => "unknown",
        }
    }
}

/// Classify yt-dlp stderr
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorType {
    let stderr_lower = stderr.to_lowercase();

    if stderr_lower.contains("cookies are no longer valid")
        || stderr_lower.contains("sign in to confirm you're not a bot")
        || stderr_lower.contains("please sign in")
        || stderr_lower.contains("use --cookies")
    {
        return YtDlpErrorType::InvalidCookies;
    }

    if stderr_lower.contains("bot detection")
        || stderr_lower.contains("http error 403")
        || stderr_lower.contains("signature extraction failed")
    {
        return YtDlpErrorType::BotDetection;
    }

    if stderr_lower.contains("private video")
        || stderr_lower.contains("video unavailable")
        || stderr_lower.contains("video is not available")
        || stderr_lower.contains("video has been removed")
    {
        return YtDlpErrorType::VideoUnavailable;
    }

    if stderr_lower.contains("ffmpeg")
        || stderr_lower.contains("ffprobe")
        || stderr_lower.contains("postprocessing")
    {
        return YtDlpErrorType::PostprocessingError;
    }

    if stderr_lower.contains("timed out")
        || stderr_lower.contains("timeout")
        || stderr_lower.contains("connection")
        || stderr_lower.contains("network")
        || stderr_lower.contains("name resolution")
    {
        return YtDlpErrorType::NetworkError;
    }

    YtDlpErrorType::Unknown
}

/// Pick the line worth showing from yt-dlp stderr.
///
/// Prefers the last `ERROR:` line, then the last non-empty line. Falls back to
/// `fallback` when stderr is blank.
pub fn provider_message(stderr: &str, fallback: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_analyze_categories() {
        assert_eq!(
            analyze_ytdlp_error("ERROR: Sign in to confirm you're not a bot"),
            YtDlpErrorType::InvalidCookies
        );
        assert_eq!(
            analyze_ytdlp_error("ERROR: unable to download video data: HTTP Error 403: Forbidden"),
            YtDlpErrorType::BotDetection
        );
        assert_eq!(
            analyze_ytdlp_error("ERROR: [youtube] abc: Video unavailable"),
            YtDlpErrorType::VideoUnavailable
        );
        assert_eq!(
            analyze_ytdlp_error("ERROR: Postprocessing: ffprobe and ffmpeg not found"),
            YtDlpErrorType::PostprocessingError
        );
        assert_eq!(
            analyze_ytdlp_error("ERROR: Read timed out."),
            YtDlpErrorType::NetworkError
        );
        assert_eq!(analyze_ytdlp_error("something odd"), YtDlpErrorType::Unknown);
    }

    #[test]
    fn test_provider_message_prefers_error_line() {
        let stderr = "WARNING: falling back\nERROR: [youtube] abc: Video unavailable\n  \n";
        assert_eq!(
            provider_message(stderr, "yt-dlp failed"),
            "ERROR: [youtube] abc: Video unavailable"
        );
    }

    #[test]
    fn test_provider_message_fallbacks() {
        assert_eq!(provider_message("just noise\nlast words\n", "x"), "last words");
        assert_eq!(provider_message("   \n", "yt-dlp exited with 1"), "yt-dlp exited with 1");
    }
}
