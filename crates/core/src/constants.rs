//! Constants for cluster endpoints.

/// JSON-RPC endpoint for devnet.
pub const DEVNET_URL: &str = "https://api.devnet.solana.com";

/// Name of the devnet cluster.
pub const DEVNET: &str = "devnet";
