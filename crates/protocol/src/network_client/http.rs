//! HTTP client for JSON-RPC requests to a cluster.
use crate::{
    constants::{GET_BALANCE, SEND_TRANSACTION},
    rpc::{RequestId, RpcError, RpcRequest},
    Error, Result,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use solwatch_core::{Address, Commitment, Origin};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct RpcResponse<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Result value wrapped with the slot context.
#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

/// Client for HTTP requests to a cluster.
#[derive(Clone)]
pub struct HttpClient {
    origin: Origin,
    client: reqwest::Client,
    id: Arc<AtomicU64>,
}

impl HttpClient {
    /// Create a new client.
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            client: reqwest::Client::new(),
            id: Arc::new(AtomicU64::from(1)),
        }
    }

    /// Origin of the cluster.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Get the next request identifier.
    fn next_id(&self) -> RequestId {
        self.id.fetch_add(1, Ordering::SeqCst)
    }

    /// Call a method and decode the result.
    pub async fn call<P, T>(&self, method: &str, params: P) -> Result<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let request = RpcRequest::new(self.next_id(), method, params);
        tracing::debug!(
            id = request.id(),
            method = %method,
            url = %self.origin.url(),
            "http_client::call");

        let response = self
            .client
            .post(self.origin.url().clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ResponseCode(status));
        }

        let response: RpcResponse<T> = response.json().await?;
        match response {
            RpcResponse {
                error: Some(error), ..
            } => Err(Error::Rpc(error)),
            RpcResponse {
                result: Some(result),
                ..
            } => Ok(result),
            _ => Err(Error::MissingResult),
        }
    }

    /// Balance of an account in lamports.
    pub async fn get_balance(
        &self,
        address: &Address,
        commitment: Commitment,
    ) -> Result<u64> {
        let balance: WithContext<u64> = self
            .call(
                GET_BALANCE,
                (address.to_string(), json!({ "commitment": commitment })),
            )
            .await?;
        Ok(balance.value)
    }

    /// Submit a signed and serialized transaction.
    ///
    /// Returns the transaction signature.
    pub async fn send_encoded_transaction(
        &self,
        transaction: &[u8],
    ) -> Result<String> {
        let encoded = STANDARD.encode(transaction);
        self.call(SEND_TRANSACTION, (encoded, json!({ "encoding": "base64" })))
            .await
    }
}
