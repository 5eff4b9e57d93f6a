//! User-facing texts

use indoc::indoc;
use melocore::PipelineError;

pub const WELCOME: &str = indoc! {"
    🎵 Welcome to Music Bot! 🎵

    Send me a song request using:
    /song <song name or artist - song title>

    Example:
    /song Imagine Dragons - Believer
    /song Shape of You Ed Sheeran

    I'll search and download the song for you!"};

pub const HELP: &str = indoc! {"
    🎵 Music Bot Commands:

    /start - Start the bot
    /help - Show this help message
    /song <song name> - Download and send a song

    Just type the song name after /song and I'll find it for you!"};

pub const SONG_USAGE: &str = indoc! {"
    Please provide a song name!
    Example: /song Imagine Dragons - Believer"};

pub const UPLOADING: &str = "⬆️ Uploading song...";

pub fn searching(query: &str) -> String {
    format!("🔍 Searching for: {}\n⏳ Downloading... Please wait", query)
}

pub fn failure(reason: &PipelineError) -> String {
    format!("❌ {}", reason)
}

pub fn send_failed(err: &dyn std::fmt::Display) -> String {
    format!("❌ An error occurred: {}", err)
}

pub fn caption(title: &str) -> String {
    format!("🎵 {}", title)
}

/// Make a song title safe to use as a file name.
pub fn escape_filename(filename: &str) -> String {
    let mut result = String::with_capacity(filename.len());

    for c in filename.chars() {
        match c {
            '/' | '\\' => result.push('_'),
            ':' | '*' | '?' | '<' | '>' | '|' => result.push('_'),
            '"' => result.push('\''),
            c if c.is_control() => result.push('_'),
            _ => result.push(c),
        }
    }

    let result = result.trim_matches(|c: char| c.is_whitespace() || c == '.');

    if result.is_empty() {
        "unnamed".to_string()
    } else {
        result.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_texts() {
        assert_eq!(
            searching("Believer"),
            "🔍 Searching for: Believer\n⏳ Downloading... Please wait"
        );
        assert_eq!(failure(&PipelineError::NoResults), "❌ No results found");
        assert_eq!(caption("Believer"), "🎵 Believer");
        assert!(SONG_USAGE.starts_with("Please provide a song name!"));
        assert!(HELP.contains("/song <song name>"));
        assert!(WELCOME.contains("/song Imagine Dragons - Believer"));
    }

    #[test]
    fn test_escape_filename() {
        assert_eq!(escape_filename("AC/DC: Back in Black"), "AC_DC_ Back in Black");
        assert_eq!(escape_filename("  ..  "), "unnamed");
        assert_eq!(escape_filename("Say \"Hi\""), "Say 'Hi'");
    }
}
