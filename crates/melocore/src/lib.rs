//! melocore - song search and audio download pipeline behind melobot
//!
//! Turns a free-text query into an MP3 in a process-wide scratch directory,
//! or into a user-displayable reason why it could not.
//!
//! # Module Structure
//!
//! - `config`: environment-driven settings and limits
//! - `resource`: scratch directory and request stems
//! - `provider`: search and download backends (yt-dlp)
//! - `admission`: duration and size gates
//! - `download`: error taxonomy, output lookup and the orchestrator
//! - `logging`: logger setup and startup diagnostics

pub mod admission;
pub mod config;
pub mod download;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resource;

// Re-export commonly used types for convenience
pub use admission::AdmissionPolicy;
pub use config::PipelineConfig;
pub use download::{DownloadResult, Orchestrator, PipelineError, PipelineHandle};
pub use error::{AppError, AppResult};
pub use provider::{Candidate, Downloader, OutputTarget, Resolver};
pub use resource::{ResourceArea, StemPolicy};
