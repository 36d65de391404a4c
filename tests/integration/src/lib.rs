//! Test utilities for the solwatch integration tests.
//!
//! [MockNode] plays the part of a cluster node on a local
//! websocket so listener behavior can be observed from
//! the server side.
use anyhow::Result;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use solwatch_core::{url::Url, Origin};
use solwatch_protocol::{
    network_client::{AccountListenerHandle, ListenOptions},
    AccountSubscribeConfig, ListenerState,
};
use std::{net::SocketAddr, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_tungstenite::{accept_async, tungstenite::Message};

const ADDR: &str = "127.0.0.1:0";

/// Maximum time to wait for an expected event.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize a tracing subscriber.
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "debug,tungstenite=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().without_time())
        .try_init();
}

/// Pause a while to allow messages to be delivered.
pub async fn pause(millis: Option<u64>) {
    tokio::time::sleep(Duration::from_millis(millis.unwrap_or(250))).await;
}

/// Origin for a local server.
pub fn local_origin(addr: SocketAddr) -> Result<Origin> {
    let url = Url::parse(&format!("http://{}", addr))?;
    Ok(Origin::try_from(url)?)
}

/// Listen options for a local server.
pub fn listen_options(addr: SocketAddr) -> Result<ListenOptions> {
    Ok(ListenOptions::new(
        local_origin(addr)?,
        AccountSubscribeConfig::default(),
    ))
}

/// Wait until the listener state matches a predicate.
pub async fn wait_for_state(
    handle: &AccountListenerHandle,
    predicate: impl FnMut(&ListenerState) -> bool,
) -> Result<ListenerState> {
    let mut rx = handle.subscribe_state();
    let state = tokio::time::timeout(TIMEOUT, rx.wait_for(predicate))
        .await??
        .clone();
    Ok(state)
}

/// Event observed by the mock node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Websocket connection accepted.
    Connected(u64),
    /// JSON message received on a connection.
    Received(u64, Value),
    /// Connection closed.
    Disconnected(u64),
}

impl ServerEvent {
    /// Server side connection number.
    pub fn connection(&self) -> u64 {
        match self {
            Self::Connected(id)
            | Self::Received(id, _)
            | Self::Disconnected(id) => *id,
        }
    }

    /// Method name of a received request.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Received(_, value) => value["method"].as_str(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
enum NodeCommand {
    Send(String),
    Close,
}

/// Behavior of the mock node.
#[derive(Debug, Clone, Copy)]
pub struct MockNodeOptions {
    /// Reply to subscribe requests.
    pub acknowledge: bool,
    /// Subscription id assigned when acknowledging.
    pub subscription_id: u64,
}

impl Default for MockNodeOptions {
    fn default() -> Self {
        Self {
            acknowledge: true,
            subscription_id: 42,
        }
    }
}

/// Websocket server that answers account subscriptions.
pub struct MockNode {
    addr: SocketAddr,
    events: mpsc::UnboundedReceiver<ServerEvent>,
    seen: Vec<ServerEvent>,
    commands: broadcast::Sender<NodeCommand>,
    task: JoinHandle<()>,
}

impl MockNode {
    /// Spawn a node on an ephemeral port.
    pub async fn spawn(options: MockNodeOptions) -> Result<Self> {
        let listener = TcpListener::bind(ADDR).await?;
        let addr = listener.local_addr()?;
        let (events_tx, events) = mpsc::unbounded_channel();
        let (commands, _) = broadcast::channel(64);

        let commands_tx = commands.clone();
        let task = tokio::task::spawn(async move {
            let mut next = 0;
            while let Ok((stream, _)) = listener.accept().await {
                next += 1;
                tokio::task::spawn(serve(
                    next,
                    stream,
                    options,
                    events_tx.clone(),
                    commands_tx.subscribe(),
                ));
            }
        });

        Ok(Self {
            addr,
            events,
            seen: Vec::new(),
            commands,
            task,
        })
    }

    /// Address the node is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Push an account notification to open connections.
    pub fn notify(&self, subscription: u64, params: Value) {
        let message = json!({
            "jsonrpc": "2.0",
            "method": "accountNotification",
            "params": params,
            "subscription": subscription,
        });
        self.send_text(message.to_string());
    }

    /// Send raw text to open connections.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.commands.send(NodeCommand::Send(text.into()));
    }

    /// Close open connections from the server side.
    pub fn close_connections(&self) {
        let _ = self.commands.send(NodeCommand::Close);
    }

    /// Events observed so far.
    pub fn events(&self) -> &[ServerEvent] {
        &self.seen
    }

    /// Wait until an observed event matches a predicate.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&ServerEvent) -> bool,
    ) -> Result<ServerEvent> {
        if let Some(event) = self.seen.iter().find(|e| predicate(e)) {
            return Ok(event.clone());
        }
        loop {
            let event = tokio::time::timeout(TIMEOUT, self.events.recv())
                .await?
                .ok_or_else(|| anyhow::anyhow!("mock node stopped"))?;
            self.seen.push(event.clone());
            if predicate(&event) {
                return Ok(event);
            }
        }
    }

    /// Collect events that arrive within a short pause.
    pub async fn drain(&mut self) {
        pause(None).await;
        while let Ok(event) = self.events.try_recv() {
            self.seen.push(event);
        }
    }

    /// Requests received with a method name.
    pub fn requests(&self, method: &str) -> Vec<(u64, Value)> {
        self.seen
            .iter()
            .filter_map(|event| match event {
                ServerEvent::Received(id, value)
                    if value["method"] == method =>
                {
                    Some((*id, value.clone()))
                }
                _ => None,
            })
            .collect()
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    id: u64,
    stream: TcpStream,
    options: MockNodeOptions,
    events: mpsc::UnboundedSender<ServerEvent>,
    mut commands: broadcast::Receiver<NodeCommand>,
) {
    let mut socket = match accept_async(stream).await {
        Ok(socket) => socket,
        Err(error) => {
            tracing::warn!(connection = %id, error = %error, "mock_node::handshake");
            return;
        }
    };
    tracing::debug!(connection = %id, "mock_node::connected");
    let _ = events.send(ServerEvent::Connected(id));

    loop {
        tokio::select! {
            message = socket.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        let Ok(value) =
                            serde_json::from_str::<Value>(text.as_str())
                        else {
                            tracing::warn!(connection = %id, "mock_node::invalid_json");
                            continue;
                        };
                        tracing::debug!(
                            connection = %id,
                            method = ?value["method"].as_str(),
                            "mock_node::received");
                        let _ = events.send(
                            ServerEvent::Received(id, value.clone()));
                        if let Some(reply) = reply(&value, &options) {
                            if socket
                                .send(Message::Text(reply.to_string().into()))
                                .await
                                .is_err()
                            {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                        break
                    }
                    Some(Ok(_)) => {}
                }
            }
            command = commands.recv() => {
                match command {
                    Ok(NodeCommand::Send(text)) => {
                        if socket.send(Message::Text(text.into())).await.is_err()
                        {
                            break;
                        }
                    }
                    Ok(NodeCommand::Close) => {
                        tracing::debug!(connection = %id, "mock_node::close");
                        let _ = socket.close(None).await;
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!(connection = %id, "mock_node::disconnected");
    let _ = events.send(ServerEvent::Disconnected(id));
}

fn reply(request: &Value, options: &MockNodeOptions) -> Option<Value> {
    match request["method"].as_str() {
        Some("accountSubscribe") if options.acknowledge => Some(json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "result": options.subscription_id,
        })),
        Some("accountUnsubscribe") => Some(json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "result": true,
        })),
        _ => None,
    }
}

/// HTTP server that answers a fixed number of JSON-RPC requests
/// with the same result.
pub struct MockHttpNode {
    addr: SocketAddr,
    task: JoinHandle<Result<Vec<Value>>>,
}

impl MockHttpNode {
    /// Spawn a server that answers `requests` requests with `result`.
    pub async fn spawn(result: Value, requests: usize) -> Result<Self> {
        let listener = TcpListener::bind(ADDR).await?;
        let addr = listener.local_addr()?;
        let task = tokio::task::spawn(async move {
            let mut received = Vec::new();
            for _ in 0..requests {
                let (mut stream, _) = listener.accept().await?;
                let request = read_request(&mut stream).await?;
                tracing::debug!(
                    method = ?request["method"].as_str(),
                    "mock_http_node::request");
                let body = json!({
                    "jsonrpc": "2.0",
                    "id": request["id"],
                    "result": result,
                })
                .to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).await?;
                stream.shutdown().await?;
                received.push(request);
            }
            Ok(received)
        });
        Ok(Self { addr, task })
    }

    /// Address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the expected requests and return their bodies.
    pub async fn requests(self) -> Result<Vec<Value>> {
        tokio::time::timeout(TIMEOUT, self.task).await??
    }
}

async fn read_request(stream: &mut TcpStream) -> Result<Value> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            anyhow::bail!("connection closed before request completed");
        }
        buffer.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&buffer);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            let body = &buffer[end + 4..];
            if body.len() >= length {
                return Ok(serde_json::from_slice(&body[..length])?);
            }
        }
    }
}
