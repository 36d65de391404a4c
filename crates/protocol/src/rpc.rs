//! JSON-RPC 2.0 envelopes for the account subscription methods.
//!
//! Outbound requests are serialized to single line JSON text;
//! inbound text is classified into an [RpcMessage].
use crate::{
    constants::{ACCOUNT_SUBSCRIBE, ACCOUNT_UNSUBSCRIBE, JSONRPC_VERSION},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use solwatch_core::{AccountEncoding, Address, Commitment};
use std::{fmt, str::FromStr};

/// Identifier for a request.
pub type RequestId = u64;

/// Allocates request identifiers for a single connection.
///
/// Identifiers start at one and increase monotonically so the
/// first request on a connection always has the identifier `1`.
#[derive(Debug, Clone)]
pub struct RequestIds {
    next: RequestId,
}

impl Default for RequestIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl RequestIds {
    /// Get the next request identifier.
    pub fn next_id(&mut self) -> RequestId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Subscription handle assigned by the server.
///
/// The value is opaque and echoed back verbatim when
/// unsubscribing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Value);

impl SubscriptionId {
    /// Raw value returned by the server.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for SubscriptionId {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<u64> for SubscriptionId {
    fn from(value: u64) -> Self {
        Self(Value::from(value))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request envelope.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: RequestId,
    method: &'a str,
    params: P,
}

impl<'a, P: Serialize> RpcRequest<'a, P> {
    /// Create a new request.
    pub fn new(id: RequestId, method: &'a str, params: P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }

    /// Request identifier.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Encode as single line JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Options sent with an account subscription.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSubscribeConfig {
    /// Encoding for the account data.
    pub encoding: AccountEncoding,
    /// Commitment level for notifications.
    pub commitment: Commitment,
}

/// Encode an `accountSubscribe` request.
pub fn account_subscribe(
    id: RequestId,
    address: &Address,
    config: &AccountSubscribeConfig,
) -> Result<String> {
    RpcRequest::new(id, ACCOUNT_SUBSCRIBE, (address.to_string(), config))
        .to_json()
}

/// Encode an `accountUnsubscribe` request.
pub fn account_unsubscribe(
    id: RequestId,
    subscription: &SubscriptionId,
) -> Result<String> {
    RpcRequest::new(id, ACCOUNT_UNSUBSCRIBE, (subscription,)).to_json()
}

/// Error object in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Error code.
    pub code: i64,
    /// Error message.
    pub message: String,
    /// Additional error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcMessage {
    /// Successful response to a request.
    ///
    /// A `null` result is not considered a result.
    Response {
        /// Identifier of the request.
        id: Option<Value>,
        /// Result value.
        result: Value,
    },
    /// Error response to a request.
    Failure {
        /// Identifier of the request.
        id: Option<Value>,
        /// Error object.
        error: RpcError,
    },
    /// Notification pushed by the server.
    Notification {
        /// Method name.
        method: String,
        /// Notification payload.
        params: Value,
    },
    /// Object without a result, an error or a method.
    Other(Value),
}

impl RpcMessage {
    /// Parse inbound text.
    ///
    /// Only text that is not a JSON object is an error. Each
    /// field is inspected on its own so an unexpected shape in
    /// one field does not hide the others.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(mut fields) = value else {
            return Err(Error::NotAnObject);
        };

        if let Some(method) = fields
            .get("method")
            .and_then(Value::as_str)
            .map(str::to_owned)
        {
            return Ok(Self::Notification {
                method,
                params: fields.remove("params").unwrap_or(Value::Null),
            });
        }

        let id = fields.get("id").filter(|id| !id.is_null()).cloned();
        if let Some(error) = fields
            .get("error")
            .and_then(|error| RpcError::deserialize(error).ok())
        {
            return Ok(Self::Failure { id, error });
        }
        match fields.remove("result") {
            Some(result) if !result.is_null() => {
                Ok(Self::Response { id, result })
            }
            result => {
                if let Some(result) = result {
                    fields.insert("result".to_owned(), result);
                }
                Ok(Self::Other(Value::Object(fields)))
            }
        }
    }

    /// Determine if this is a response for a request identifier.
    pub fn is_response_to(&self, request: RequestId) -> bool {
        match self {
            Self::Response { id, .. } | Self::Failure { id, .. } => {
                id.as_ref().and_then(Value::as_u64) == Some(request)
            }
            _ => false,
        }
    }
}

impl FromStr for RpcMessage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
