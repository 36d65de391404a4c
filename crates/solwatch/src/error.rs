use std::path::PathBuf;
use thiserror::Error;

/// Errors generated by the command line interface.
#[derive(Debug, Error)]
pub enum Error {
    /// Error generated when a config file does not exist.
    #[error("path {0} is not a file")]
    NotFile(PathBuf),

    /// Error generated when listening without an address
    /// outside of interactive mode.
    #[error("an address is required unless --interactive is set")]
    AddressRequired,

    #[error(transparent)]
    Core(#[from] solwatch_core::Error),

    #[error(transparent)]
    Protocol(#[from] solwatch_protocol::Error),

    #[error(transparent)]
    Logs(#[from] solwatch_logs::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Ctrlc(#[from] ctrlc::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
