use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;
use solwatch_core::Address;
use solwatch_integration_tests::{
    listen_options, pause, wait_for_state, MockNode, MockNodeOptions,
    ServerEvent,
};
use solwatch_protocol::{network_client::AccountListener, Phase};

const ADDR1: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
const ADDR2: &str = "11111111111111111111111111111111";

/// Connection closed by the server resets the listener
/// to idle without reconnecting and keeps the notifications
/// already received.
#[tokio::test]
async fn account_listener_server_close() -> Result<()> {
    //solwatch_integration_tests::init_tracing();
    let mut node = MockNode::spawn(MockNodeOptions::default()).await?;
    let address: Address = ADDR1.parse()?;

    let handle =
        AccountListener::spawn(listen_options(node.addr())?, |_| async {});
    handle.watch(Some(address));
    wait_for_state(&handle, |s| s.phase == Phase::OpenConfirmed).await?;
    node.notify(42, json!({"x": 1}));
    wait_for_state(&handle, |s| s.notifications == 1).await?;

    node.close_connections();
    let state = wait_for_state(&handle, |s| s.phase == Phase::Idle).await?;
    assert_eq!(None, state.connection);
    assert_eq!(1, state.notifications);
    assert_eq!(vec![json!({"x": 1})], handle.notifications());

    node.drain().await;
    let connections = node
        .events()
        .iter()
        .filter(|e| matches!(e, ServerEvent::Connected(_)))
        .count();
    assert_eq!(1, connections);
    assert!(node.requests("accountUnsubscribe").is_empty());

    // A different address opens a new connection
    handle.watch(Some(ADDR2.parse()?));
    let state =
        wait_for_state(&handle, |s| s.phase == Phase::OpenConfirmed).await?;
    assert_eq!(0, state.notifications);
    assert!(handle.notifications().is_empty());
    node.drain().await;
    assert_eq!(2, node.requests("accountSubscribe").len());

    handle.close().await;
    Ok(())
}

/// Connection failure resets the listener to idle.
#[tokio::test]
async fn account_listener_connect_error() -> Result<()> {
    // Nothing is listening once the socket is dropped
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.local_addr()?
    };

    let handle = AccountListener::spawn(listen_options(addr)?, |_| async {});
    handle.watch(Some(ADDR1.parse()?));
    pause(None).await;

    let state = wait_for_state(&handle, |s| s.phase == Phase::Idle).await?;
    assert_eq!(None, state.connection);
    assert!(handle.notifications().is_empty());

    handle.close().await;
    Ok(())
}
