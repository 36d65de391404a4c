use crate::{
    constants::{DEVNET, DEVNET_URL},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
};
use url::Url;

/// Remote cluster origin.
///
/// Pairs the HTTP endpoint used for requests with the
/// websocket endpoint used for subscriptions.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Origin {
    name: String,
    url: Url,
    websocket: Url,
}

impl Origin {
    /// Create a new origin.
    ///
    /// The websocket endpoint is derived from the HTTP endpoint.
    pub fn new(name: String, url: Url) -> Result<Self> {
        let websocket = websocket_url(&url)?;
        Ok(Self {
            name,
            url,
            websocket,
        })
    }

    /// Origin for the devnet cluster.
    pub fn devnet() -> Result<Self> {
        Self::new(DEVNET.to_owned(), Url::parse(DEVNET_URL)?)
    }

    /// Replace the websocket endpoint.
    pub fn with_websocket(mut self, websocket: Url) -> Result<Self> {
        match websocket.scheme() {
            "ws" | "wss" => {
                self.websocket = websocket;
                Ok(self)
            }
            scheme => Err(Error::UnsupportedUrlScheme(scheme.to_owned())),
        }
    }

    /// Name of the cluster.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL of the HTTP endpoint.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL of the websocket endpoint.
    pub fn websocket(&self) -> &Url {
        &self.websocket
    }
}

impl PartialEq for Origin {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.websocket == other.websocket
    }
}

impl Hash for Origin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
        self.websocket.hash(state);
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

impl TryFrom<Url> for Origin {
    type Error = Error;

    fn try_from(url: Url) -> Result<Self> {
        let name = url.authority().to_owned();
        Self::new(name, url)
    }
}

/// Websocket endpoint for an HTTP endpoint.
fn websocket_url(url: &Url) -> Result<Url> {
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        scheme => return Err(Error::UnsupportedUrlScheme(scheme.to_owned())),
    };
    let mut websocket = url.clone();
    websocket
        .set_scheme(scheme)
        .map_err(|_| Error::UnsupportedUrlScheme(scheme.to_owned()))?;
    Ok(websocket)
}
