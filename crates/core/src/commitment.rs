use crate::Error;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Finality guarantee requested for ledger data.
#[derive(
    Default, Debug, Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Most recent block seen by the node.
    Processed,
    /// Block voted on by a supermajority of the cluster.
    Confirmed,
    /// Block that has reached maximum lockout.
    #[default]
    Finalized,
}

impl Commitment {
    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            _ => Err(Error::UnknownCommitment(s.to_owned())),
        }
    }
}

/// Encoding for account data in notifications.
#[derive(
    Default, Debug, Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize,
)]
pub enum AccountEncoding {
    /// Base58 encoded account data.
    #[serde(rename = "base58")]
    Base58,
    /// Base64 encoded account data.
    #[serde(rename = "base64")]
    Base64,
    /// Zstandard compressed then base64 encoded account data.
    #[serde(rename = "base64+zstd")]
    Base64Zstd,
    /// Parsed JSON when the node knows the owning program.
    #[default]
    #[serde(rename = "jsonParsed")]
    JsonParsed,
}

impl AccountEncoding {
    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base58 => "base58",
            Self::Base64 => "base64",
            Self::Base64Zstd => "base64+zstd",
            Self::JsonParsed => "jsonParsed",
        }
    }
}

impl fmt::Display for AccountEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base58" => Ok(Self::Base58),
            "base64" => Ok(Self::Base64),
            "base64+zstd" => Ok(Self::Base64Zstd),
            "jsonParsed" => Ok(Self::JsonParsed),
            _ => Err(Error::UnknownEncoding(s.to_owned())),
        }
    }
}
