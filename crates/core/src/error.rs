use thiserror::Error;

/// Errors generated by the core library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error generated when an address does not decode to
    /// a 32 byte public key.
    #[error("invalid address length, expected 32 bytes, got {0}")]
    AddressLength(usize),

    /// Error generated when a commitment level is not recognized.
    #[error("unknown commitment level '{0}'")]
    UnknownCommitment(String),

    /// Error generated when an account encoding is not recognized.
    #[error("unknown account encoding '{0}'")]
    UnknownEncoding(String),

    /// Error generated when a URL scheme cannot be used
    /// for the requested transport.
    #[error("unsupported url scheme '{0}'")]
    UnsupportedUrlScheme(String),

    /// Error generated by the base58 decoder.
    #[error(transparent)]
    Base58(#[from] bs58::decode::Error),

    /// Error generated parsing URLs.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}
