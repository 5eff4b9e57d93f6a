use std::path::PathBuf;
use std::time::SystemTime;

use crate::download::PipelineError;
use crate::provider::OutputTarget;

/// Find the file a downloader produced for `target`.
///
/// Lookup order:
/// 1. exact `<stem>.<extension>`
/// 2. any `<stem>*.<extension>` in the same directory (yt-dlp may append
///    suffixes); the most recently modified one wins
///
/// Returns `FileNotProduced` when neither finds anything.
pub fn locate_output(target: &OutputTarget) -> Result<PathBuf, PipelineError> {
    let expected = target.expected_path();
    if expected.is_file() {
        log::debug!("File found at expected path: {}", expected.display());
        return Ok(expected);
    }

    log::warn!("File not found at expected path: {}", expected.display());

    let suffix = format!(".{}", target.extension);
    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();

    for entry in fs_err::read_dir(&target.dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry in {}: {}", target.dir.display(), e);
                continue;
            }
        };

        let file_name = entry.file_name();
        let file_name_str = file_name.to_string_lossy();
        if !(file_name_str.starts_with(&target.stem) && file_name_str.ends_with(&suffix)) {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((modified, entry.path()));
    }

    let actual = found
        .into_iter()
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
        .ok_or_else(|| {
            log::error!(
                "No {} files for stem {} in {}",
                target.extension,
                target.stem,
                target.dir.display()
            );
            PipelineError::FileNotProduced(target.stem.clone())
        })?;

    log::info!(
        "Found actual downloaded file: {} (searched for: {})",
        actual.display(),
        expected.display()
    );
    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn target(dir: &std::path::Path) -> OutputTarget {
        OutputTarget {
            dir: dir.to_path_buf(),
            stem: "song_0042".to_string(),
            extension: "mp3".to_string(),
        }
    }

    #[test]
    fn test_exact_match_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("song_0042.mp3"), b"a").unwrap();
        fs::write(dir.path().join("song_0042 (1).mp3"), b"b").unwrap();

        assert_eq!(
            locate_output(&target(dir.path())).unwrap(),
            dir.path().join("song_0042.mp3")
        );
    }

    #[test]
    fn test_prefix_scan_finds_suffixed_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("song_0042 (1).mp3"), b"a").unwrap();
        fs::write(dir.path().join("song_0042.webm"), b"b").unwrap();
        fs::write(dir.path().join("song_0043.mp3"), b"c").unwrap();

        assert_eq!(
            locate_output(&target(dir.path())).unwrap(),
            dir.path().join("song_0042 (1).mp3")
        );
    }

    #[test]
    fn test_nothing_matching_is_file_not_produced() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("song_0042.m4a"), b"a").unwrap();

        assert_eq!(
            locate_output(&target(dir.path())),
            Err(PipelineError::FileNotProduced("song_0042".to_string()))
        );
    }

    #[test]
    fn test_missing_directory_is_unexpected() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        assert!(matches!(
            locate_output(&target(&gone)),
            Err(PipelineError::Unexpected(_))
        ));
    }
}
