//! Duration and size gates around the download step.

use std::path::Path;

use crate::config;
use crate::download::PipelineError;
use crate::provider::Candidate;
use crate::resource::ResourceArea;

/// Ceilings applied before and after downloading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub max_duration_secs: u64,
    pub max_file_size_bytes: u64,
}

impl AdmissionPolicy {
    pub fn new(max_duration_secs: u64, max_file_size_bytes: u64) -> Self {
        Self {
            max_duration_secs,
            max_file_size_bytes,
        }
    }

    /// Reject candidates longer than the ceiling. Unknown or zero duration passes.
    pub fn check_duration(&self, candidate: &Candidate) -> Result<(), PipelineError> {
        match candidate.duration_seconds {
            Some(duration) if duration > self.max_duration_secs => {
                log::info!(
                    "Rejecting '{}': {}s exceeds {}s",
                    candidate.title,
                    duration,
                    self.max_duration_secs
                );
                Err(PipelineError::TooLong {
                    duration_secs: duration,
                    max_secs: self.max_duration_secs,
                })
            }
            _ => Ok(()),
        }
    }

    /// Reject files over the size ceiling, deleting them first.
    ///
    /// Returns the file size on success.
    pub fn check_size(&self, area: &ResourceArea, path: &Path) -> Result<u64, PipelineError> {
        let size = fs_err::metadata(path)?.len();

        if size > self.max_file_size_bytes {
            log::warn!(
                "File {} is {} bytes, limit is {} bytes - removing",
                path.display(),
                size,
                self.max_file_size_bytes
            );
            area.remove(path);
            return Err(PipelineError::TooLarge {
                size_bytes: size,
                max_bytes: self.max_file_size_bytes,
            });
        }

        Ok(size)
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::new(
            config::admission::DEFAULT_MAX_DURATION_SECS,
            config::admission::DEFAULT_MAX_FILE_SIZE_BYTES,
        )
    }
}
