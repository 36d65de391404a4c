//! Listen for account notifications on a websocket connection.
use crate::{
    subscription::{
        AccountNotification, ConnectionId, Effect, Event, ListenerState,
        Phase, SubscriptionManager,
    },
    AccountSubscribeConfig, Result,
};
use futures::{Future, SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use solwatch_core::{Address, Origin};
use std::{collections::VecDeque, pin::Pin, sync::Arc};
use tokio::{net::TcpStream, sync::watch, task::JoinHandle};
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::{
        frame::{coding::CloseCode, Utf8Bytes},
        CloseFrame, Message,
    },
    MaybeTlsStream, WebSocketStream,
};

type ConnectFuture = Pin<Box<dyn Future<Output = Result<WsStream>> + Send>>;

/// Type of stream created for websocket connections.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Options used when listening for account notifications.
#[derive(Debug, Clone)]
pub struct ListenOptions {
    origin: Origin,
    config: AccountSubscribeConfig,
}

impl ListenOptions {
    /// Create new listen options.
    pub fn new(origin: Origin, config: AccountSubscribeConfig) -> Self {
        Self { origin, config }
    }

    /// Cluster origin.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Subscription options.
    pub fn config(&self) -> &AccountSubscribeConfig {
        &self.config
    }
}

/// Create a websocket connection to the origin.
pub async fn connect(origin: Origin) -> Result<WsStream> {
    tracing::debug!(uri = %origin.websocket(), "account_listener::connect");
    let (stream, _) = connect_async(origin.websocket().as_str()).await?;
    Ok(stream)
}

/// Duplex connection owned by the listener.
enum Link {
    Idle,
    Connecting {
        connection: ConnectionId,
        pending: ConnectFuture,
    },
    Open {
        connection: ConnectionId,
        stream: WsStream,
    },
}

impl Link {
    /// Wait for the next event on the connection.
    ///
    /// Never resolves while idle. Cancel safe, a pending
    /// connection is kept until it resolves or is closed.
    async fn next_event(&mut self) -> Event {
        match self {
            Self::Idle => std::future::pending().await,
            Self::Connecting {
                connection,
                pending,
            } => {
                let connection = *connection;
                match pending.await {
                    Ok(stream) => {
                        tracing::debug!(
                            connection = %connection,
                            "account_listener::connected");
                        *self = Self::Open { connection, stream };
                        Event::Opened(connection)
                    }
                    Err(error) => {
                        tracing::warn!(
                            connection = %connection,
                            error = %error,
                            "account_listener::connect_error");
                        *self = Self::Idle;
                        Event::Disconnected(connection)
                    }
                }
            }
            Self::Open { connection, stream } => {
                let connection = *connection;
                loop {
                    match stream.next().await {
                        Some(Ok(Message::Text(text))) => {
                            return Event::Received(
                                connection,
                                text.as_str().to_owned(),
                            );
                        }
                        Some(Ok(Message::Binary(buffer))) => {
                            match String::from_utf8(buffer.to_vec()) {
                                Ok(text) => {
                                    return Event::Received(connection, text)
                                }
                                Err(_) => tracing::debug!(
                                    connection = %connection,
                                    "account_listener::binary_ignored"),
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::debug!(
                                connection = %connection,
                                frame = ?frame,
                                "account_listener::server_close");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(error)) => {
                            tracing::warn!(
                                connection = %connection,
                                error = %error,
                                "account_listener::read_error");
                            break;
                        }
                        None => break,
                    }
                }
                *self = Self::Idle;
                Event::Disconnected(connection)
            }
        }
    }

    async fn send(&mut self, connection: ConnectionId, message: String) {
        match self {
            Self::Open {
                connection: open,
                stream,
            } if *open == connection => {
                tracing::debug!(
                    connection = %connection,
                    message = %message,
                    "account_listener::send");
                if let Err(error) = stream.send(Message::Text(message.into())).await
                {
                    tracing::warn!(
                        connection = %connection,
                        error = %error,
                        "account_listener::send_error");
                }
            }
            _ => {
                tracing::debug!(
                    connection = %connection,
                    "account_listener::send_skipped");
            }
        }
    }

    async fn close(&mut self, connection: ConnectionId) {
        match std::mem::replace(self, Self::Idle) {
            Self::Open {
                connection: open,
                mut stream,
            } if open == connection => {
                // Perform close handshake
                if let Err(error) = stream
                    .close(Some(CloseFrame {
                        code: CloseCode::Normal,
                        reason: Utf8Bytes::from_static("closed"),
                    }))
                    .await
                {
                    tracing::warn!(
                        connection = %connection,
                        error = %error,
                        "account_listener::close_error");
                }
            }
            Self::Connecting {
                connection: pending,
                ..
            } if pending == connection => {
                tracing::debug!(
                    connection = %connection,
                    "account_listener::connect_abandoned");
            }
            other => *self = other,
        }
    }
}

#[derive(Default)]
struct Notifications {
    connection: Option<ConnectionId>,
    log: Vec<Value>,
}

/// Handle to an account listener.
#[derive(Clone)]
pub struct AccountListenerHandle {
    address: watch::Sender<Option<Address>>,
    shutdown: watch::Sender<()>,
    state: watch::Receiver<ListenerState>,
    notifications: Arc<RwLock<Notifications>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AccountListenerHandle {
    /// Change the watched address; `None` stops watching.
    ///
    /// Changes made in quick succession may be coalesced so only
    /// the latest value is observed.
    pub fn watch(&self, address: Option<Address>) {
        self.address.send_replace(address);
    }

    /// Current listener state.
    pub fn state(&self) -> ListenerState {
        self.state.borrow().clone()
    }

    /// Receiver for listener state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ListenerState> {
        self.state.clone()
    }

    /// Notifications received since the last connect.
    ///
    /// Kept after the server closes the connection; a new
    /// watched address starts a fresh log.
    pub fn notifications(&self) -> Vec<Value> {
        self.notifications.read().log.clone()
    }

    /// Tear down any subscription and wait for the listener to stop.
    pub async fn close(&self) {
        tracing::debug!("account_listener::close");
        if self.shutdown.send(()).is_err() {
            tracing::debug!("account_listener::already_stopped");
        }
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(error) = task.await {
                tracing::error!(
                    error = ?error,
                    "account_listener::join_error");
            }
        }
    }
}

/// Maintains an account subscription on a websocket and
/// invokes a handler with the notifications.
pub struct AccountListener {
    options: ListenOptions,
    manager: SubscriptionManager,
    link: Link,
    address: watch::Receiver<Option<Address>>,
    shutdown: watch::Receiver<()>,
    state: watch::Sender<ListenerState>,
    notifications: Arc<RwLock<Notifications>>,
}

impl AccountListener {
    /// Spawn a task that listens for account notifications and
    /// invokes the handler for each notification.
    ///
    /// Nothing is watched until [AccountListenerHandle::watch]
    /// is called.
    pub fn spawn<F>(
        options: ListenOptions,
        handler: impl Fn(AccountNotification) -> F + Send + Sync + 'static,
    ) -> AccountListenerHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (address, address_rx) = watch::channel(None);
        let (shutdown, shutdown_rx) = watch::channel(());
        let (state_tx, state) = watch::channel(ListenerState::default());
        let notifications = Arc::new(RwLock::new(Notifications::default()));

        let listener = Self {
            manager: SubscriptionManager::new(*options.config()),
            options,
            link: Link::Idle,
            address: address_rx,
            shutdown: shutdown_rx,
            state: state_tx,
            notifications: Arc::clone(&notifications),
        };

        let task = tokio::task::spawn(async move {
            listener.run(handler).await;
        });

        AccountListenerHandle {
            address,
            shutdown,
            state,
            notifications,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    async fn run<F>(
        mut self,
        handler: impl Fn(AccountNotification) -> F + Send + Sync,
    ) where
        F: Future<Output = ()> + Send,
    {
        tracing::debug!(
            origin = %self.options.origin(),
            "account_listener::start");

        loop {
            let disposed = self.manager.is_disposed();
            let event = tokio::select! {
                changed = self.address.changed(), if !disposed => {
                    match changed {
                        Ok(()) => Event::Watch(*self.address.borrow_and_update()),
                        // Every handle was dropped
                        Err(_) => Event::Dispose,
                    }
                }
                _ = self.shutdown.changed(), if !disposed => Event::Dispose,
                event = self.link.next_event() => event,
            };

            self.apply(event, &handler).await;

            if self.manager.is_disposed() && self.manager.phase() == Phase::Idle
            {
                break;
            }
        }

        tracing::debug!("account_listener::stopped");
    }

    async fn apply<F>(
        &mut self,
        event: Event,
        handler: &(impl Fn(AccountNotification) -> F + Send + Sync),
    ) where
        F: Future<Output = ()> + Send,
    {
        let mut effects: VecDeque<Effect> = self.manager.handle(event).into();
        while let Some(effect) = effects.pop_front() {
            match effect {
                Effect::Connect {
                    connection,
                    address,
                } => {
                    tracing::info!(
                        connection = %connection,
                        address = %address,
                        "account_listener::connecting");
                    let origin = self.options.origin().clone();
                    self.link = Link::Connecting {
                        connection,
                        pending: Box::pin(connect(origin)),
                    };
                }
                Effect::Send {
                    connection,
                    message,
                } => {
                    self.link.send(connection, message).await;
                }
                Effect::Close { connection } => {
                    self.link.close(connection).await;
                    effects.extend(self.manager.handle(Event::Closed(connection)));
                }
                Effect::Notify(notification) => {
                    handler(notification).await;
                }
            }
        }
        self.publish();
    }

    fn publish(&self) {
        {
            let mut notifications = self.notifications.write();
            let current = self.manager.notifications();
            let connection = self.manager.log_connection();
            if notifications.connection != connection {
                notifications.connection = connection;
                notifications.log = current.to_vec();
            } else {
                let seen = notifications.log.len();
                if seen < current.len() {
                    notifications.log.extend_from_slice(&current[seen..]);
                }
            }
        }
        self.state.send_replace(self.manager.state());
    }
}
