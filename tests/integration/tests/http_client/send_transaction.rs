use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;
use solwatch_integration_tests::{local_origin, MockHttpNode};
use solwatch_protocol::{network_client::HttpClient, Error};

/// Transactions are submitted base64 encoded.
#[tokio::test]
async fn http_client_send_transaction() -> Result<()> {
    let node = MockHttpNode::spawn(json!("signature"), 1).await?;
    let client = HttpClient::new(local_origin(node.addr())?);

    let signature = client.send_encoded_transaction(&[1, 2, 3]).await?;
    assert_eq!("signature", signature);

    let requests = node.requests().await?;
    assert_eq!(json!("sendTransaction"), requests[0]["method"]);
    assert_eq!(
        json!(["AQID", {"encoding": "base64"}]),
        requests[0]["params"]
    );
    Ok(())
}

/// Missing result is an error.
#[tokio::test]
async fn http_client_missing_result() -> Result<()> {
    let node = MockHttpNode::spawn(serde_json::Value::Null, 1).await?;
    let client = HttpClient::new(local_origin(node.addr())?);

    let result = client.send_encoded_transaction(&[1, 2, 3]).await;
    assert!(matches!(result, Err(Error::MissingResult)));
    node.requests().await?;
    Ok(())
}
