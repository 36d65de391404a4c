//! Wallet session contract and guards for wallet actions.
//!
//! Signing is delegated to the wallet; this module only describes
//! what a wallet session exposes and refuses actions that need a
//! public key when no wallet is connected.
use crate::{network_client::HttpClient, Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solwatch_core::{Address, Commitment};

/// Signature of a submitted transaction.
pub type TransactionId = String;

/// Native lamport transfer between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Paying account.
    pub from: Address,
    /// Receiving account.
    pub to: Address,
    /// Amount in lamports.
    pub lamports: u64,
}

/// Session for a connected wallet.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Public key of the connected wallet, if any.
    fn public_key(&self) -> Option<Address>;

    /// Connection used for queries and submission.
    fn connection(&self) -> &HttpClient;

    /// Sign the transfer and submit it using the connection.
    ///
    /// Implementations fail when no wallet is connected.
    async fn send_transaction(
        &self,
        transfer: &TransferRequest,
        connection: &HttpClient,
    ) -> Result<TransactionId>;
}

/// Balance of the connected wallet in lamports.
///
/// Returns `None` when no wallet is connected.
pub async fn balance(
    session: &impl WalletSession,
    commitment: Commitment,
) -> Result<Option<u64>> {
    let Some(public_key) = session.public_key() else {
        return Ok(None);
    };
    let lamports = session
        .connection()
        .get_balance(&public_key, commitment)
        .await?;
    Ok(Some(lamports))
}

/// Transfer lamports from the connected wallet.
pub async fn send_transfer(
    session: &impl WalletSession,
    to: Address,
    lamports: u64,
) -> Result<TransactionId> {
    let from = session.public_key().ok_or(Error::WalletNotConnected)?;
    let transfer = TransferRequest { from, to, lamports };
    tracing::info!(
        from = %transfer.from,
        to = %transfer.to,
        lamports = transfer.lamports,
        "wallet::send_transfer");
    session
        .send_transaction(&transfer, session.connection())
        .await
}
