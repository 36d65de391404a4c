//! Core types and constants for the solwatch account notification tools.
#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod address;
mod commitment;
pub mod constants;
mod error;
mod origin;

pub use address::Address;
pub use commitment::{AccountEncoding, Commitment};
pub use error::Error;
pub use origin::Origin;

pub use url;

/// Result type for the library.
pub type Result<T> = std::result::Result<T, Error>;
