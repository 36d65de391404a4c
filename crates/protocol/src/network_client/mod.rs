//! Network clients for the cluster endpoints.
#[cfg(feature = "network-client")]
mod http;
#[cfg(feature = "listen")]
mod websocket;

#[cfg(feature = "network-client")]
pub use self::http::HttpClient;

#[cfg(feature = "listen")]
pub use websocket::{
    connect, AccountListener, AccountListenerHandle, ListenOptions, WsStream,
};
