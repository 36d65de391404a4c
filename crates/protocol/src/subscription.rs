//! Lifecycle of an account notification subscription.
//!
//! [SubscriptionManager] is a reducer: an [Event] goes in and a list of
//! [Effect] comes out; no I/O happens here. A driver owns the duplex
//! connection, executes the effects in order and feeds the outcome back
//! as further events.
//!
//! ```text
//! Idle -> Connecting -> OpenUnconfirmed -> OpenConfirmed
//!              \               \                 /
//!               +---------------+--> Closing <--+
//!                                       |
//!                                      Idle
//! ```
//!
//! At most one connection exists at a time. A new connection for a
//! changed address is only requested once the previous connection has
//! reported [Event::Closed].
//!
//! The notification log belongs to the most recent connection and
//! outlives it: a server close leaves the log in place and only the
//! next [Effect::Connect] starts a fresh one.
use crate::{
    constants::ACCOUNT_NOTIFICATION,
    rpc::{
        self, AccountSubscribeConfig, RequestId, RequestIds, RpcMessage,
        SubscriptionId,
    },
};
use serde_json::Value;
use solwatch_core::Address;

/// Identifier for a connection instance.
///
/// Every connection opened by a manager gets a new identifier
/// so that events for a connection that has already been torn
/// down can be recognized and discarded.
pub type ConnectionId = u64;

/// Phase of the subscription lifecycle.
#[derive(Default, Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum Phase {
    /// No connection.
    #[default]
    Idle,
    /// Connection requested but not yet open.
    Connecting,
    /// Subscribe request sent, waiting for the subscription id.
    OpenUnconfirmed,
    /// Subscription id received.
    OpenConfirmed,
    /// Teardown started, waiting for the connection to close.
    Closing,
}

impl Phase {
    /// Determine if the connection is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::OpenUnconfirmed | Self::OpenConfirmed)
    }
}

/// Input to the subscription manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Watched address changed; `None` stops watching.
    Watch(Option<Address>),
    /// Owner is going away; tear down and stop.
    Dispose,
    /// Connection is open.
    Opened(ConnectionId),
    /// Text message received on a connection.
    Received(ConnectionId, String),
    /// Connection closed after an [Effect::Close].
    Closed(ConnectionId),
    /// Connection failed or was closed by the server.
    Disconnected(ConnectionId),
}

/// Side effect requested by the subscription manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a new connection.
    Connect {
        /// Connection identifier.
        connection: ConnectionId,
        /// Address the connection is opened for.
        address: Address,
    },
    /// Send a text message.
    Send {
        /// Connection identifier.
        connection: ConnectionId,
        /// Single line JSON-RPC envelope.
        message: String,
    },
    /// Close a connection.
    ///
    /// The driver must answer with [Event::Closed].
    Close {
        /// Connection identifier.
        connection: ConnectionId,
    },
    /// Notification was appended to the log.
    Notify(AccountNotification),
}

/// Account notification received on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNotification {
    /// Connection that received the notification.
    pub connection: ConnectionId,
    /// Address the connection was opened for.
    pub address: Address,
    /// Notification payload.
    pub params: Value,
}

/// Ordered log of notification payloads.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NotificationLog(Vec<Value>);

impl NotificationLog {
    /// Append a payload.
    pub fn push(&mut self, params: Value) {
        self.0.push(params);
    }

    /// Number of payloads.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Determine if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Payloads in arrival order.
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Iterator over the payloads.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter()
    }
}

impl From<NotificationLog> for Vec<Value> {
    fn from(value: NotificationLog) -> Self {
        value.0
    }
}

/// Snapshot of the manager state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListenerState {
    /// Current phase.
    pub phase: Phase,
    /// Address of the current connection.
    pub address: Option<Address>,
    /// Identifier of the current connection.
    pub connection: Option<ConnectionId>,
    /// Confirmed subscription identifier.
    pub subscription_id: Option<SubscriptionId>,
    /// Number of notifications in the log.
    pub notifications: usize,
}

#[derive(Debug)]
struct Connection {
    id: ConnectionId,
    address: Address,
    phase: Phase,
    request_ids: RequestIds,
    subscribe_request: Option<RequestId>,
    subscription_id: Option<SubscriptionId>,
}

impl Connection {
    fn new(id: ConnectionId, address: Address) -> Self {
        Self {
            id,
            address,
            phase: Phase::Connecting,
            request_ids: Default::default(),
            subscribe_request: None,
            subscription_id: None,
        }
    }
}

/// Maintains one live subscription for the watched address.
#[derive(Debug)]
pub struct SubscriptionManager {
    config: AccountSubscribeConfig,
    watched: Option<Address>,
    connection: Option<Connection>,
    last_connection: ConnectionId,
    log: NotificationLog,
    log_connection: Option<ConnectionId>,
    disposed: bool,
}

impl SubscriptionManager {
    /// Create a new idle manager.
    pub fn new(config: AccountSubscribeConfig) -> Self {
        Self {
            config,
            watched: None,
            connection: None,
            last_connection: 0,
            log: Default::default(),
            log_connection: None,
            disposed: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.connection
            .as_ref()
            .map(|c| c.phase)
            .unwrap_or_default()
    }

    /// Most recent watched address.
    pub fn watched(&self) -> Option<&Address> {
        self.watched.as_ref()
    }

    /// Address of the current connection.
    pub fn address(&self) -> Option<&Address> {
        self.connection.as_ref().map(|c| &c.address)
    }

    /// Identifier of the current connection.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection.as_ref().map(|c| c.id)
    }

    /// Confirmed subscription identifier.
    pub fn subscription_id(&self) -> Option<&SubscriptionId> {
        self.connection
            .as_ref()
            .and_then(|c| c.subscription_id.as_ref())
    }

    /// Notifications received since the last connect.
    ///
    /// The log survives the connection that filled it.
    pub fn notifications(&self) -> &[Value] {
        self.log.as_slice()
    }

    /// Connection that started the notification log.
    pub fn log_connection(&self) -> Option<ConnectionId> {
        self.log_connection
    }

    /// Determine if the manager has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Snapshot of the state.
    pub fn state(&self) -> ListenerState {
        ListenerState {
            phase: self.phase(),
            address: self.address().copied(),
            connection: self.connection_id(),
            subscription_id: self.subscription_id().cloned(),
            notifications: self.notifications().len(),
        }
    }

    /// Apply an event and return the effects to execute in order.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Watch(address) => self.watch(address),
            Event::Dispose => self.dispose(),
            Event::Opened(id) => self.opened(id),
            Event::Received(id, text) => self.received(id, &text),
            Event::Closed(id) => self.closed(id),
            Event::Disconnected(id) => self.disconnected(id),
        }
    }

    fn current(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.connection.as_mut().filter(|c| c.id == id)
    }

    fn watch(&mut self, address: Option<Address>) -> Vec<Effect> {
        if self.disposed {
            tracing::debug!("subscription::watch_after_dispose");
            return vec![];
        }
        if self.watched == address {
            return vec![];
        }
        self.watched = address;
        match &self.connection {
            // Connect once the pending close completes
            Some(c) if c.phase == Phase::Closing => vec![],
            Some(_) => self.teardown(),
            None => self.connect(),
        }
    }

    fn dispose(&mut self) -> Vec<Effect> {
        self.disposed = true;
        self.watched = None;
        match &self.connection {
            Some(c) if c.phase != Phase::Closing => self.teardown(),
            _ => vec![],
        }
    }

    fn connect(&mut self) -> Vec<Effect> {
        let Some(address) = self.watched else {
            return vec![];
        };
        self.last_connection += 1;
        let connection = self.last_connection;
        tracing::debug!(
            connection = %connection,
            address = %address,
            "subscription::connect");
        self.connection = Some(Connection::new(connection, address));
        self.log = Default::default();
        self.log_connection = Some(connection);
        vec![Effect::Connect {
            connection,
            address,
        }]
    }

    fn teardown(&mut self) -> Vec<Effect> {
        let Some(conn) = self.connection.as_mut() else {
            return vec![];
        };
        let mut effects = Vec::with_capacity(2);
        if let Some(subscription_id) = conn.subscription_id.take() {
            let request = conn.request_ids.next_id();
            match rpc::account_unsubscribe(request, &subscription_id) {
                Ok(message) => effects.push(Effect::Send {
                    connection: conn.id,
                    message,
                }),
                Err(error) => tracing::warn!(
                    connection = %conn.id,
                    error = %error,
                    "subscription::unsubscribe_encode"),
            }
        }
        let unsubscribe = !effects.is_empty();
        tracing::debug!(
            connection = %conn.id,
            address = %conn.address,
            unsubscribe = %unsubscribe,
            "subscription::teardown");
        conn.phase = Phase::Closing;
        effects.push(Effect::Close {
            connection: conn.id,
        });
        effects
    }

    fn opened(&mut self, id: ConnectionId) -> Vec<Effect> {
        let config = self.config;
        let Some(conn) = self
            .current(id)
            .filter(|c| c.phase == Phase::Connecting)
        else {
            tracing::debug!(connection = %id, "subscription::stale_open");
            return vec![];
        };

        let request = conn.request_ids.next_id();
        match rpc::account_subscribe(request, &conn.address, &config) {
            Ok(message) => {
                conn.phase = Phase::OpenUnconfirmed;
                conn.subscribe_request = Some(request);
                vec![Effect::Send {
                    connection: id,
                    message,
                }]
            }
            Err(error) => {
                tracing::warn!(
                    connection = %id,
                    error = %error,
                    "subscription::subscribe_encode");
                self.teardown()
            }
        }
    }

    fn received(&mut self, id: ConnectionId, text: &str) -> Vec<Effect> {
        let Some(conn) = self
            .connection
            .as_mut()
            .filter(|c| c.id == id && c.phase.is_open())
        else {
            tracing::debug!(
                connection = %id,
                "subscription::discard_message");
            return vec![];
        };

        tracing::trace!(connection = %id, message = %text, "subscription::message");

        let message = match RpcMessage::parse(text) {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(
                    connection = %id,
                    error = %error,
                    "subscription::malformed_message");
                return vec![];
            }
        };

        let acknowledges_subscribe = conn
            .subscribe_request
            .is_some_and(|request| message.is_response_to(request));

        match message {
            RpcMessage::Response { result, .. } if acknowledges_subscribe => {
                if conn.phase == Phase::OpenUnconfirmed {
                    let subscription_id = SubscriptionId::from(result);
                    tracing::info!(
                        connection = %id,
                        address = %conn.address,
                        subscription_id = %subscription_id,
                        "subscription::confirmed");
                    conn.subscription_id = Some(subscription_id);
                    conn.phase = Phase::OpenConfirmed;
                }
                vec![]
            }
            RpcMessage::Failure { error, .. } => {
                tracing::warn!(
                    connection = %id,
                    code = %error.code,
                    message = %error.message,
                    "subscription::request_failed");
                vec![]
            }
            RpcMessage::Notification { method, params }
                if method == ACCOUNT_NOTIFICATION =>
            {
                self.log.push(params.clone());
                vec![Effect::Notify(AccountNotification {
                    connection: id,
                    address: conn.address,
                    params,
                })]
            }
            _ => vec![],
        }
    }

    fn closed(&mut self, id: ConnectionId) -> Vec<Effect> {
        if self.current(id).is_none() {
            return vec![];
        }
        tracing::debug!(connection = %id, "subscription::closed");
        self.connection = None;
        self.connect()
    }

    fn disconnected(&mut self, id: ConnectionId) -> Vec<Effect> {
        let Some(conn) = self.current(id) else {
            return vec![];
        };
        let closing = conn.phase == Phase::Closing;
        let address = conn.address;
        self.connection = None;
        if closing {
            self.connect()
        } else {
            // No resubscribe until the watched address changes
            tracing::warn!(
                connection = %id,
                address = %address,
                "subscription::disconnected");
            vec![]
        }
    }
}
