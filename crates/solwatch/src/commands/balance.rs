//! Query the balance of an account.
use solwatch_core::Address;
use solwatch_protocol::network_client::HttpClient;

use crate::{config::ListenerConfig, helpers::messages, Result, TARGET};

/// Print the lamport balance of an account.
pub async fn run(config: ListenerConfig, address: Address) -> Result<()> {
    let client = HttpClient::new(config.origin()?);
    tracing::debug!(
        target: TARGET,
        origin = %client.origin(),
        address = %address,
        "balance");
    let lamports = client.get_balance(&address, config.commitment).await?;
    messages::balance(&address, lamports);
    Ok(())
}
