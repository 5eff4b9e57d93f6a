//! Download orchestration: error taxonomy, output lookup, pipeline

pub mod error;
pub mod locate;
pub mod pipeline;

// Re-exports for convenience
pub use error::PipelineError;
pub use locate::locate_output;
pub use pipeline::{DownloadResult, Orchestrator, PipelineHandle, Stage};
