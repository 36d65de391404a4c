use crate::rpc::RpcError;
use thiserror::Error;

/// Errors generated by the protocol library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error generated when a wallet action is attempted
    /// before a wallet is connected.
    #[error("wallet is not connected")]
    WalletNotConnected,

    /// Error generated by a wallet session implementation.
    #[error("wallet: {0}")]
    Wallet(String),

    /// Error returned by the remote node for a request.
    #[error("rpc error {}: {}", .0.code, .0.message)]
    Rpc(RpcError),

    /// Error generated when a response has neither
    /// a result nor an error.
    #[error("response did not contain a result")]
    MissingResult,

    /// Error generated when an inbound message is not a
    /// JSON object.
    #[error("expected a JSON object for an RPC message")]
    NotAnObject,

    /// Error generated when an HTTP response is not successful.
    #[cfg(feature = "network-client")]
    #[error("unexpected response status code {0}")]
    ResponseCode(reqwest::StatusCode),

    /// Errors generated by the core library.
    #[error(transparent)]
    Core(#[from] solwatch_core::Error),

    /// Errors generated by the JSON library.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Errors generated by the HTTP client.
    #[cfg(feature = "network-client")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Errors generated by the websocket library.
    #[cfg(feature = "listen")]
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
