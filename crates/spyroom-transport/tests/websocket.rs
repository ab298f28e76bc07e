//! Real-socket tests for the WebSocket transport.

#![cfg(feature = "websocket")]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use spyroom_transport::{
    Connection, ConnectionId, Inbound, Transport, TransportError, WebSocketConnection,
    WebSocketTransport,
};
use tokio_tungstenite::tungstenite::Message;

type Client = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// A listener on an OS-assigned port plus one connected client.
async fn pair() -> (WebSocketConnection, Client) {
    let mut transport = WebSocketTransport::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = transport.local_addr().expect("local addr");

    let accepted = tokio::spawn(async move { transport.accept().await });
    let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("client connect");
    let server = accepted.await.expect("join").expect("accept");
    (server, client)
}

#[tokio::test]
async fn test_json_travels_as_text_both_ways() {
    let (server, mut client) = pair().await;
    assert!(server.peer_addr().ip().is_loopback());

    let event = r#"{"event":"gameStarted","data":{"role":"player","word":"Телефон"}}"#;
    server.send(event.as_bytes()).await.expect("send");

    let frame = client.next().await.expect("frame").expect("ok");
    assert!(frame.is_text());
    assert_eq!(frame.into_text().expect("utf8").as_str(), event);

    client
        .send(Message::Text(r#"{"event":"endGame","data":{"roomId":"AB12CD"}}"#.into()))
        .await
        .expect("client send");
    let inbound = server.recv().await.expect("recv").expect("data");
    assert_eq!(
        inbound,
        Inbound::Data(br#"{"event":"endGame","data":{"roomId":"AB12CD"}}"#.to_vec())
    );
}

#[tokio::test]
async fn test_binary_frames_are_delivered_as_bytes() {
    let (server, mut client) = pair().await;

    client
        .send(Message::Binary(vec![0xde, 0xad].into()))
        .await
        .expect("client send");
    assert_eq!(
        server.recv().await.unwrap(),
        Some(Inbound::Data(vec![0xde, 0xad]))
    );

    server.send(&[0xff]).await.expect("send");
    assert!(client.next().await.unwrap().unwrap().is_binary());
}

#[tokio::test]
async fn test_client_ping_surfaces_as_keep_alive() {
    let (server, mut client) = pair().await;

    client.send(Message::Ping(b"x".to_vec().into())).await.unwrap();
    client.send(Message::Text("after ping".into())).await.unwrap();

    assert_eq!(server.recv().await.unwrap(), Some(Inbound::KeepAlive));
    assert_eq!(
        server.recv().await.unwrap(),
        Some(Inbound::Data(b"after ping".to_vec()))
    );
}

#[tokio::test]
async fn test_server_ping_is_answered_with_pong() {
    let (server, mut client) = pair().await;
    let server = Arc::new(server);

    let reader = Arc::clone(&server);
    let reply = tokio::spawn(async move { reader.recv().await });

    server.ping().await.expect("ping");
    // The client sees the ping; reading it makes tungstenite queue the pong.
    let frame = client.next().await.unwrap().unwrap();
    assert!(frame.is_ping());
    // Flush the queued pong.
    client.flush().await.unwrap();

    let got = tokio::time::timeout(Duration::from_secs(1), reply)
        .await
        .expect("pong within a second")
        .unwrap()
        .unwrap();
    assert_eq!(got, Some(Inbound::KeepAlive));
}

#[tokio::test]
async fn test_broadcast_while_reader_is_parked() {
    let (server, mut client) = pair().await;
    let server = Arc::new(server);

    let reader = Arc::clone(&server);
    let parked = tokio::spawn(async move { reader.recv().await });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let sent = tokio::time::timeout(Duration::from_secs(1), server.send(b"playerJoined")).await;
    assert!(sent.is_ok(), "send must not wait for the parked reader");

    let frame = client.next().await.unwrap().unwrap();
    assert_eq!(frame.into_data().as_ref(), b"playerJoined");

    client.close(None).await.unwrap();
    assert_eq!(parked.await.unwrap().unwrap(), None);
}

#[tokio::test]
async fn test_close_then_recv_ends() {
    let (server, mut client) = pair().await;

    server.close().await.expect("close");
    // A second close is harmless.
    server.close().await.expect("close again");

    let frame = client.next().await;
    assert!(matches!(frame, Some(Ok(Message::Close(_))) | None));
}

#[tokio::test]
async fn test_each_accept_gets_a_fresh_id() {
    let (a, _ca) = pair().await;
    let (b, _cb) = pair().await;
    assert_ne!(a.id(), b.id());
    assert!(a.id() > ConnectionId::new(0));
}

#[tokio::test]
async fn test_bind_failure_names_the_address() {
    let err = match WebSocketTransport::bind("not-an-address").await {
        Err(e) => e,
        Ok(_) => panic!("bind should fail"),
    };
    assert!(matches!(err, TransportError::Bind { .. }));
    assert!(err.to_string().contains("not-an-address"));
}
