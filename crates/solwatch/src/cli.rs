use clap::{Parser, Subcommand};
use solwatch_core::{Address, Commitment};
use solwatch_logs::Logger;
use std::path::PathBuf;
use url::Url;

use crate::{
    commands::{balance, listen},
    config::ListenerConfig,
    Result,
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Solwatch {
    /// Config file to load.
    #[clap(short, long, env = "SOLWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP endpoint of the cluster.
    #[clap(long, env = "SOLWATCH_HTTP_URL")]
    http_url: Option<Url>,

    /// Websocket endpoint of the cluster.
    #[clap(long, env = "SOLWATCH_WS_URL")]
    ws_url: Option<Url>,

    /// Commitment level: processed, confirmed or finalized.
    #[clap(long, env = "SOLWATCH_COMMITMENT")]
    commitment: Option<Commitment>,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print notifications for changes to an account.
    Listen {
        /// Account address to watch.
        #[clap(short, long)]
        address: Option<Address>,

        /// Read addresses to watch from stdin.
        ///
        /// Each line changes the watched address and
        /// an empty line stops watching.
        #[clap(short, long)]
        interactive: bool,
    },
    /// Print the balance of an account in lamports.
    Balance {
        /// Account address.
        address: Address,
    },
}

/// Apply command line overrides to the config.
fn apply_overrides(args: &mut Solwatch, config: &mut ListenerConfig) {
    if let Some(url) = args.http_url.take() {
        config.origin.url = Some(url);
        // Derive from the new endpoint unless overridden below
        config.origin.websocket = None;
    }
    if let Some(url) = args.ws_url.take() {
        config.origin.websocket = Some(url);
    }
    if let Some(commitment) = args.commitment.take() {
        config.commitment = commitment;
    }
}

pub async fn run() -> Result<()> {
    let mut args = Solwatch::parse();

    let config = ListenerConfig::load_or_default(args.config.as_deref()).await;
    let logs = config.as_ref().ok().and_then(|c| c.logs.clone());
    let _guard = Logger::new(logs).init_subscriber(None)?;
    let mut config = config?;

    apply_overrides(&mut args, &mut config);

    match args.cmd {
        Command::Listen {
            address,
            interactive,
        } => listen::run(config, address, interactive).await?,
        Command::Balance { address } => balance::run(config, address).await?,
    }
    Ok(())
}
