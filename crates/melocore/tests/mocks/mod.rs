//! Mock providers for pipeline tests
//!
//! Stand-ins for yt-dlp that never touch the network: the resolver answers
//! from a table, the downloader writes files of a chosen size into the
//! target directory.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use melocore::{Candidate, Downloader, OutputTarget, PipelineError, Resolver};

pub const MIB: u64 = 1024 * 1024;

pub fn candidate(title: &str, duration: Option<u64>, locator: &str) -> Candidate {
    Candidate {
        title: title.to_string(),
        duration_seconds: duration,
        source_locator: locator.to_string(),
    }
}

/// Resolver answering from a per-query table
pub struct MockResolver {
    responses: HashMap<String, Result<Candidate, PipelineError>>,
    fallback: Result<Candidate, PipelineError>,
    delay: Duration,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MockResolver {
    /// Every query resolves to `candidate`
    pub fn returning(candidate: Candidate) -> Self {
        Self::with_fallback(Ok(candidate))
    }

    /// Every query finds nothing
    pub fn empty() -> Self {
        Self::with_fallback(Err(PipelineError::NoResults))
    }

    /// Every query fails with a provider message
    pub fn failing(message: &str) -> Self {
        Self::with_fallback(Err(PipelineError::Provider(message.to_string())))
    }

    fn with_fallback(fallback: Result<Candidate, PipelineError>) -> Self {
        Self {
            responses: HashMap::new(),
            fallback,
            delay: Duration::ZERO,
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Override the answer for one query
    pub fn answer(mut self, query: &str, candidate: Candidate) -> Self {
        self.responses.insert(query.to_string(), Ok(candidate));
        self
    }

    /// Sleep this long inside every search
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sleep this long when searching for `query`
    pub fn delay_for(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Resolver for MockResolver {
    fn name(&self) -> &str {
        "mock"
    }

    fn search(&self, query: &str) -> Result<Candidate, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.get(query).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.responses.get(query).cloned().unwrap_or_else(|| self.fallback.clone())
    }
}

/// What the mock downloader does when called
#[derive(Debug, Clone)]
pub enum MockOutput {
    /// Sparse file of `size` bytes named `<stem><suffix>.mp3`
    File { size: u64, suffix: String },
    /// File whose content is the candidate's locator
    Locator,
    /// Report success but write nothing
    Nothing,
    /// Leave `<stem>.webm` and `<stem>.temp.mp3` behind, then fail
    Partial(String),
    /// Provider failure
    Fail(String),
}

/// Downloader that fabricates output files
pub struct MockDownloader {
    output: MockOutput,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MockDownloader {
    pub fn new(output: MockOutput) -> Self {
        Self {
            output,
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Exact-name file of `size` bytes
    pub fn producing(size: u64) -> Self {
        Self::new(MockOutput::File {
            size,
            suffix: String::new(),
        })
    }

    /// Sleep before writing when fetching `locator`
    pub fn delay_for(mut self, locator: &str, delay: Duration) -> Self {
        self.delays.insert(locator.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Downloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    fn extension(&self) -> &str {
        "mp3"
    }

    fn fetch(&self, candidate: &Candidate, target: &OutputTarget) -> Result<(), PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&candidate.source_locator) {
            std::thread::sleep(*delay);
        }

        match &self.output {
            MockOutput::File { size, suffix } => {
                let path = target
                    .dir
                    .join(format!("{}{}.{}", target.stem, suffix, target.extension));
                let file = File::create(path)?;
                file.set_len(*size)?;
                Ok(())
            }
            MockOutput::Locator => {
                let mut file = File::create(target.expected_path())?;
                file.write_all(candidate.source_locator.as_bytes())?;
                Ok(())
            }
            MockOutput::Nothing => Ok(()),
            MockOutput::Partial(message) => {
                for suffix in ["webm", "temp.mp3"] {
                    File::create(target.dir.join(format!("{}.{}", target.stem, suffix)))?.set_len(1024)?;
                }
                Err(PipelineError::Provider(message.clone()))
            }
            MockOutput::Fail(message) => Err(PipelineError::Provider(message.clone())),
        }
    }
}
