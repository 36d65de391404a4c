use thiserror::Error;

/// Errors generated by the logs library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error generated when a global subscriber is already set.
    #[error(transparent)]
    Init(#[from] tracing_subscriber::util::TryInitError),

    /// Error generated creating the rolling log file.
    #[error(transparent)]
    Appender(#[from] tracing_appender::rolling::InitError),

    /// Errors generated by the IO module.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
