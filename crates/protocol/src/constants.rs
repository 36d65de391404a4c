//! Constants for the JSON-RPC protocol.

/// Version of the JSON-RPC envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Route names for the RPC methods.
mod methods {
    /// Subscribe to changes for an account.
    pub const ACCOUNT_SUBSCRIBE: &str = "accountSubscribe";

    /// Cancel an account subscription.
    pub const ACCOUNT_UNSUBSCRIBE: &str = "accountUnsubscribe";

    /// Method name of pushed account notifications.
    pub const ACCOUNT_NOTIFICATION: &str = "accountNotification";

    /// Query the lamport balance of an account.
    pub const GET_BALANCE: &str = "getBalance";

    /// Submit a signed transaction.
    pub const SEND_TRANSACTION: &str = "sendTransaction";
}

pub use methods::*;
