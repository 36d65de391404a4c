//! Listener configuration.
use serde::{Deserialize, Serialize};
use solwatch_core::{AccountEncoding, Commitment, Origin};
use solwatch_protocol::AccountSubscribeConfig;
use std::path::{Path, PathBuf};
use url::Url;

use crate::{Error, Result};

/// Configuration for the listener.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Cluster endpoints.
    pub origin: OriginConfig,

    /// Commitment level for notifications and queries.
    pub commitment: Commitment,

    /// Encoding for account data in notifications.
    pub encoding: AccountEncoding,

    /// Directory for log files.
    pub logs: Option<PathBuf>,

    /// Path the file was loaded from used to determine
    /// relative paths.
    #[serde(skip)]
    file: Option<PathBuf>,
}

/// Cluster endpoints.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// HTTP endpoint.
    ///
    /// When not set the devnet cluster is used.
    pub url: Option<Url>,

    /// Websocket endpoint.
    ///
    /// When not set the endpoint is derived from the HTTP URL.
    pub websocket: Option<Url>,
}

impl ListenerConfig {
    /// Load a config from a file path.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await? {
            return Err(Error::NotFile(path.to_path_buf()));
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let mut config: ListenerConfig = toml::from_str(&contents)?;
        config.file = Some(path.canonicalize()?);

        if let Some(dir) = config.directory() {
            if let Some(logs) = config.logs.as_mut() {
                if logs.is_relative() {
                    *logs = dir.join(&*logs);
                }
            }
        }

        Ok(config)
    }

    /// Load from an optional path falling back to the defaults.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Default::default()),
        }
    }

    /// Path the config was loaded from.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Cluster origin for the configured endpoints.
    pub fn origin(&self) -> Result<Origin> {
        let origin = match &self.origin.url {
            Some(url) => Origin::try_from(url.clone())?,
            None => Origin::devnet()?,
        };
        Ok(match &self.origin.websocket {
            Some(websocket) => origin.with_websocket(websocket.clone())?,
            None => origin,
        })
    }

    /// Options for account subscriptions.
    pub fn subscribe_config(&self) -> AccountSubscribeConfig {
        AccountSubscribeConfig {
            encoding: self.encoding,
            commitment: self.commitment,
        }
    }

    /// Parent directory of the configuration file.
    fn directory(&self) -> Option<PathBuf> {
        self.file
            .as_ref()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
    }
}
