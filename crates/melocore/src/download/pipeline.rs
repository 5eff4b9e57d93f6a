//! Request pipeline orchestrator.
//!
//! One request walks a fixed sequence of stages and stops at the first failure:
//!   Resolving → DurationCheck → Downloading → SizeCheck
//! Delivery of the resulting file belongs to the caller.
//!
//! All stages run together as a single job on tokio's blocking pool; awaiting
//! that job is the only suspension point. Nothing is retried.
//!
//! Provides two entry points:
//! - `handle_query()`: run and await one request
//! - `spawn()`: run in the background and get a cancellable handle

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::admission::AdmissionPolicy;
use crate::config::PipelineConfig;
use crate::download::locate::locate_output;
use crate::download::PipelineError;
use crate::provider::ytdlp::{YtDlpDownloader, YtDlpResolver};
use crate::provider::{Candidate, Downloader, OutputTarget, Resolver};
use crate::resource::ResourceArea;

/// Outcome of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadResult {
    /// File is in the scratch area; the caller must `ResourceArea::remove` it
    Success { file_path: PathBuf, title: String },
    Failure { reason: PipelineError },
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadResult::Success { .. })
    }

    /// The failure reason, if any
    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            DownloadResult::Success { .. } => None,
            DownloadResult::Failure { reason } => Some(reason),
        }
    }
}

impl From<Result<(PathBuf, String), PipelineError>> for DownloadResult {
    fn from(result: Result<(PathBuf, String), PipelineError>) -> Self {
        match result {
            Ok((file_path, title)) => DownloadResult::Success { file_path, title },
            Err(reason) => DownloadResult::Failure { reason },
        }
    }
}

/// Pipeline stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    DurationCheck,
    Downloading,
    SizeCheck,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolving => "resolving",
            Stage::DurationCheck => "duration_check",
            Stage::Downloading => "downloading",
            Stage::SizeCheck => "size_check",
        };
        f.write_str(name)
    }
}

/// Composes resolver, admission and downloader over a shared scratch area.
///
/// Cheap to clone: every collaborator sits behind an `Arc`.
#[derive(Clone)]
pub struct Orchestrator {
    resolver: Arc<dyn Resolver>,
    downloader: Arc<dyn Downloader>,
    area: Arc<ResourceArea>,
    admission: AdmissionPolicy,
}

impl Orchestrator {
    pub fn new(
        resolver: Arc<dyn Resolver>,
        downloader: Arc<dyn Downloader>,
        area: Arc<ResourceArea>,
        admission: AdmissionPolicy,
    ) -> Self {
        Self {
            resolver,
            downloader,
            area,
            admission,
        }
    }

    /// yt-dlp backends configured from `config`
    pub fn from_config(config: &PipelineConfig, area: Arc<ResourceArea>) -> Self {
        Self::new(
            Arc::new(YtDlpResolver::new(config.ytdl_bin.clone())),
            Arc::new(YtDlpDownloader::new(config.ytdl_bin.clone())),
            area,
            config.admission,
        )
    }

    pub fn area(&self) -> &Arc<ResourceArea> {
        &self.area
    }

    /// Run one request to completion.
    pub async fn handle_query(&self, query: &str) -> DownloadResult {
        self.run(query, CancellationToken::new()).await
    }

    /// Run one request as a background task.
    ///
    /// Cancelling the handle is only observed between stages; a yt-dlp call
    /// that has already started runs to completion. Dropping the handle
    /// without joining cancels the request, and a file that was still
    /// produced is released instead of being left for teardown.
    pub fn spawn(&self, query: impl Into<String>) -> PipelineHandle {
        let cancel = CancellationToken::new();
        let orchestrator = self.clone();
        let query = query.into();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let result = orchestrator.run(&query, token.clone()).await;
            match result {
                DownloadResult::Success { file_path, .. } if token.is_cancelled() => {
                    log::info!("Request cancelled after download, releasing {}", file_path.display());
                    orchestrator.area.remove(&file_path);
                    DownloadResult::Failure {
                        reason: PipelineError::Cancelled,
                    }
                }
                other => other,
            }
        });

        PipelineHandle {
            task: Some(task),
            cancel,
        }
    }

    async fn run(&self, query: &str, cancel: CancellationToken) -> DownloadResult {
        let query = query.trim();
        if query.is_empty() {
            return DownloadResult::Failure {
                reason: PipelineError::EmptyQuery,
            };
        }

        let started = Instant::now();
        let job = Job {
            resolver: Arc::clone(&self.resolver),
            downloader: Arc::clone(&self.downloader),
            area: Arc::clone(&self.area),
            admission: self.admission,
            query: query.to_string(),
            stem: self.area.allocate_stem(query),
            cancel,
        };
        let stem = job.stem.clone();

        log::info!(
            "🔍 [{}] Request for '{}' via {}/{}",
            stem,
            query,
            self.resolver.name(),
            self.downloader.name()
        );

        let result = match tokio::task::spawn_blocking(move || job.run()).await {
            Ok(result) => result,
            Err(join_err) => {
                log::error!("[{}] Pipeline worker failed: {}", stem, join_err);
                Err(join_err.into())
            }
        };

        match &result {
            Ok((path, title)) => log::info!(
                "✅ [{}] '{}' ready at {} in {:.2}s",
                stem,
                title,
                path.display(),
                started.elapsed().as_secs_f64()
            ),
            Err(e) => log::warn!(
                "❌ [{}] Request failed ({}): {} after {:.2}s",
                stem,
                e.subcategory(),
                e,
                started.elapsed().as_secs_f64()
            ),
        }

        result.into()
    }
}

/// Handle to a request started with [`Orchestrator::spawn`].
///
/// Dropping it without calling [`PipelineHandle::join`] cancels the request.
pub struct PipelineHandle {
    task: Option<JoinHandle<DownloadResult>>,
    cancel: CancellationToken,
}

impl PipelineHandle {
    /// Ask the request to stop at its next stage boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the request to finish.
    pub async fn join(mut self) -> DownloadResult {
        let task = match self.task.take() {
            Some(task) => task,
            None => {
                return DownloadResult::Failure {
                    reason: PipelineError::Cancelled,
                }
            }
        };

        match task.await {
            Ok(result) => result,
            Err(join_err) => DownloadResult::Failure {
                reason: join_err.into(),
            },
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.cancel.cancel();
        }
    }
}

/// Everything one blocking run needs, owned so it can move to the worker.
struct Job {
    resolver: Arc<dyn Resolver>,
    downloader: Arc<dyn Downloader>,
    area: Arc<ResourceArea>,
    admission: AdmissionPolicy,
    query: String,
    stem: String,
    cancel: CancellationToken,
}

impl Job {
    fn enter(&self, stage: Stage) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            log::info!("[{}] Cancelled before {}", self.stem, stage);
            return Err(PipelineError::Cancelled);
        }
        log::debug!("[{}] -> {}", self.stem, stage);
        Ok(())
    }

    fn run(self) -> Result<(PathBuf, String), PipelineError> {
        self.enter(Stage::Resolving)?;
        let candidate = self.resolver.search(&self.query)?;

        self.enter(Stage::DurationCheck)?;
        self.admission.check_duration(&candidate)?;

        self.enter(Stage::Downloading)?;
        // Leftovers under this stem would be picked up by the prefix scan
        self.area.remove_stem(&self.stem);

        match self.download(&candidate) {
            Ok(path) => Ok((path, candidate.title)),
            Err(e) => {
                self.area.remove_stem(&self.stem);
                Err(e)
            }
        }
    }

    /// Downloading and SizeCheck. On error the caller clears the stem.
    fn download(&self, candidate: &Candidate) -> Result<PathBuf, PipelineError> {
        let target = OutputTarget {
            dir: self.area.dir().to_path_buf(),
            stem: self.stem.clone(),
            extension: self.downloader.extension().to_string(),
        };
        self.downloader.fetch(candidate, &target)?;
        let path = locate_output(&target)?;

        self.enter(Stage::SizeCheck)?;
        let size = self.admission.check_size(&self.area, &path)?;
        log::debug!("[{}] {} bytes on disk", self.stem, size);

        Ok(path)
    }
}
