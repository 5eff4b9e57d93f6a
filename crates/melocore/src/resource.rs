//! Process-lifetime scratch storage.
//!
//! A [`ResourceArea`] owns one directory for the whole process. Every request
//! writes its output under it using a stem from [`ResourceArea::allocate_stem`],
//! and the caller releases each file with [`ResourceArea::remove`] once it has
//! been delivered or rejected. The directory itself goes away in
//! [`ResourceArea::teardown`], at most once.
//!
//! The area does no locking. With [`StemPolicy::Hashed`] two queries that land
//! in the same bucket share a stem, and concurrent requests for them overwrite
//! each other's output (last writer wins).

use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{AppError, AppResult};

/// Number of hash buckets for request stems
pub const DEFAULT_STEM_BUCKETS: u64 = 10_000;

/// Prefix shared by every request stem
const STEM_PREFIX: &str = "song_";

/// Prefix of the scratch directory name
const AREA_PREFIX: &str = "melobot-";

/// How request stems are derived from queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StemPolicy {
    /// `song_<bucket>`: deterministic, bounded, collides across queries
    Hashed,
    /// `song_<bucket>_<uuid>`: never collides
    Unique,
}

impl FromStr for StemPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashed" => Ok(StemPolicy::Hashed),
            "unique" => Ok(StemPolicy::Unique),
            other => Err(AppError::Validation(format!("unknown stem policy: {}", other))),
        }
    }
}

/// Scratch directory shared by all in-flight requests
#[derive(Debug)]
pub struct ResourceArea {
    dir: PathBuf,
    buckets: u64,
    policy: StemPolicy,
    torn_down: AtomicBool,
}

impl ResourceArea {
    /// Create a fresh `melobot-<uuid>` directory under `parent`.
    pub fn create(parent: impl AsRef<Path>) -> AppResult<Self> {
        let dir = parent
            .as_ref()
            .join(format!("{}{}", AREA_PREFIX, uuid::Uuid::new_v4().simple()));
        fs_err::create_dir_all(&dir)?;
        log::info!("Scratch area created at {}", dir.display());

        Ok(Self {
            dir,
            buckets: DEFAULT_STEM_BUCKETS,
            policy: StemPolicy::Hashed,
            torn_down: AtomicBool::new(false),
        })
    }

    /// Set the stem allocation policy.
    pub fn with_stem_policy(mut self, policy: StemPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the number of hash buckets (minimum 1).
    pub fn with_buckets(mut self, buckets: u64) -> Self {
        self.buckets = buckets.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stem_policy(&self) -> StemPolicy {
        self.policy
    }

    /// Derive the file-name stem for a query.
    ///
    /// With [`StemPolicy::Hashed`] this is a pure function of the query. The
    /// bucket number is zero-padded to a fixed width so no stem is a prefix
    /// of another bucket's stem.
    pub fn allocate_stem(&self, query: &str) -> String {
        let digest = Sha256::digest(query.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let bucket = u64::from_be_bytes(prefix) % self.buckets;
        let width = (self.buckets - 1).to_string().len();
        let stem = format!("{}{:0width$}", STEM_PREFIX, bucket, width = width);

        match self.policy {
            StemPolicy::Hashed => stem,
            StemPolicy::Unique => format!("{}_{}", stem, uuid::Uuid::new_v4().simple()),
        }
    }

    /// `<dir>/<stem>.<extension>`
    pub fn path_for(&self, stem: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", stem, extension))
    }

    /// Delete one file. Missing files are fine; other failures are only logged.
    pub fn remove(&self, path: &Path) {
        match fs_err::remove_file(path) {
            Ok(()) => log::debug!("Removed scratch file {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Scratch file already gone: {}", path.display())
            }
            Err(e) => log::warn!("Failed to remove scratch file: {}", e),
        }
    }

    /// Delete every file whose name starts with `stem`, including provider
    /// intermediates such as `<stem>.webm` or `<stem>.temp.mp3`.
    ///
    /// Returns how many files were removed. Failures are only logged.
    pub fn remove_stem(&self, stem: &str) -> usize {
        let entries = match fs_err::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to scan scratch area: {}", e);
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            if !entry.file_name().to_string_lossy().starts_with(stem) {
                continue;
            }
            let path = entry.path();
            if path.is_file() {
                self.remove(&path);
                removed += 1;
            }
        }

        if removed > 0 {
            log::debug!("Cleared {} scratch file(s) for {}", removed, stem);
        }
        removed
    }

    /// Delete the whole scratch directory. Only the first call does anything.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        match fs_err::remove_dir_all(&self.dir) {
            Ok(()) => log::info!("Scratch area {} removed", self.dir.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Scratch area {} was already gone", self.dir.display())
            }
            Err(e) => log::error!("Failed to remove scratch area: {}", e),
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

impl Drop for ResourceArea {
    fn drop(&mut self) {
        self.teardown();
    }
}
