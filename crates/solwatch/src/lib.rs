//! Watch Solana accounts for changes from the command line.

/// Target for tracing macros.
///
/// Used so that error messages are succinct rather than
/// including the full module path.
pub const TARGET: &str = "solwatch";

pub mod cli;
pub mod commands;
pub mod config;
mod error;
pub(crate) mod helpers;

pub use error::Error;

/// Result type for the executable.
pub type Result<T> = std::result::Result<T, error::Error>;
