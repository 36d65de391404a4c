//! Listen for account notifications on the cluster websocket.
use solwatch_core::Address;
use solwatch_protocol::network_client::{
    AccountListener, AccountListenerHandle, ListenOptions,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};

use crate::{
    config::ListenerConfig, helpers::messages, Error, Result, TARGET,
};

/// Parse a line of input into the address to watch.
///
/// An empty line means stop watching.
fn parse_line(line: &str) -> solwatch_core::Result<Option<Address>> {
    let line = line.trim();
    if line.is_empty() {
        Ok(None)
    } else {
        Ok(Some(line.parse()?))
    }
}

/// Change the watched address for each line read from stdin.
async fn read_addresses(
    handle: &AccountListenerHandle,
    shutdown: &mut watch::Receiver<()>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_line(&line) {
                    Ok(address) => {
                        messages::watching(address.as_ref());
                        handle.watch(address);
                    }
                    Err(e) => messages::invalid(e.to_string()),
                }
            }
        }
    }
    Ok(())
}

/// Start listening and print notifications until interrupted.
pub async fn run(
    config: ListenerConfig,
    address: Option<Address>,
    interactive: bool,
) -> Result<()> {
    if address.is_none() && !interactive {
        return Err(Error::AddressRequired);
    }

    let options = ListenOptions::new(config.origin()?, config.subscribe_config());
    tracing::info!(
        target: TARGET,
        origin = %options.origin(),
        websocket = %options.origin().websocket(),
        "listen");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(());
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })?;

    let handle = AccountListener::spawn(options, |notification| async move {
        messages::notification(&notification);
    });
    handle.watch(address);

    let result = if interactive {
        read_addresses(&handle, &mut shutdown_rx).await
    } else {
        let _ = shutdown_rx.changed().await;
        Ok(())
    };

    handle.close().await;
    messages::closed();
    result
}
