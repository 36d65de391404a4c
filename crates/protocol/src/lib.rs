#![allow(clippy::result_large_err)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
//! JSON-RPC types and the account subscription lifecycle for solwatch.
//!
//! The lifecycle is a pure reducer in [subscription]; when the `listen`
//! feature is enabled [network_client] provides a websocket driver that
//! executes the effects it produces. The `network-client` feature adds
//! an HTTP client for balance queries and transaction submission
//! together with the [wallet] session contract.

pub mod constants;
mod error;
#[cfg(any(feature = "listen", feature = "network-client"))]
pub mod network_client;
pub mod rpc;
pub mod subscription;
#[cfg(feature = "network-client")]
pub mod wallet;

pub use error::Error;
pub use rpc::{AccountSubscribeConfig, RpcError, RpcMessage, SubscriptionId};
pub use subscription::{
    AccountNotification, ConnectionId, Effect, Event, ListenerState,
    NotificationLog, Phase, SubscriptionManager,
};

pub use solwatch_core as core;

/// Result type for the protocol library.
pub type Result<T> = std::result::Result<T, Error>;
