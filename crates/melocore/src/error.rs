use thiserror::Error;

/// Errors raised while setting up the process (scratch area, logging, config).
///
/// Request-level failures never use this type; they are reported as
/// [`crate::download::PipelineError`] inside a `DownloadResult`.
#[derive(Error, Debug)]
pub enum AppError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Logger could not be installed
    #[error("Logger error: {0}")]
    Logger(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl From<log::SetLoggerError> for AppError {
    fn from(err: log::SetLoggerError) -> Self {
        AppError::Logger(err.to_string())
    }
}
