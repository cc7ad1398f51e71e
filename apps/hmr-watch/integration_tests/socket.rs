use crate::helpers::{
    FAST_RECONNECT, STEP_TIMEOUT, next_connection, next_event, start_update_server,
};

use hmr_core::transport::{Transport, TransportEvent};
use hmr_watch::config::ReconnectPolicy;
use hmr_watch::socket::spawn_socket;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

/// **VALUE**: Verifies the socket reports the connection and carries text
/// frames both ways.
///
/// **WHY THIS MATTERS**: Subscriptions go out and updates come in over this
/// one socket. If either direction is broken no update ever applies.
///
/// **BUG THIS CATCHES**: Would catch missing `Connected` events, binary frames
/// being sent instead of text, or inbound frames being dropped.
#[tokio::test]
async fn given_running_server_when_socket_connects_then_relays_text_both_ways() {
    // GIVEN: A server and a socket task pointed at it
    let (url, mut accepted) = start_update_server().await;
    let mut handle = spawn_socket(url, FAST_RECONNECT);
    let mut server = next_connection(&mut accepted).await;

    // THEN: The session is told the connection is up
    assert_eq!(next_event(&mut handle.events).await, Some(TransportEvent::Connected));

    // WHEN: The client subscribes
    let subscribe = r#"{"type":"subscribe","chunkPath":"static/css/app.css"}"#;
    handle.transport.send(subscribe.to_string()).unwrap();

    // THEN: The server receives the exact payload as a text frame
    let frame = timeout(STEP_TIMEOUT, server.next())
        .await
        .expect("Timed out waiting for subscribe")
        .expect("Server stream ended")
        .expect("Server read failed");
    assert_eq!(frame, Message::Text(subscribe.to_string().into()));

    // WHEN: The server pushes an update
    let update = r#"{"type":"restart","chunkPath":"static/css/app.css"}"#;
    server.send(Message::Text(update.to_string().into())).await.unwrap();

    // THEN: It arrives as a message event
    assert_eq!(
        next_event(&mut handle.events).await,
        Some(TransportEvent::Message(update.to_string()))
    );

    handle.task.abort();
}

/// **VALUE**: Verifies a dropped connection is re-established and reported
/// again as `Connected`.
///
/// **WHY THIS MATTERS**: Dev servers restart all the time. The client replays
/// subscriptions on `Connected`; without a second one it stays deaf.
///
/// **BUG THIS CATCHES**: Would catch the socket task exiting on close instead
/// of reconnecting.
#[tokio::test]
async fn given_server_closes_connection_when_running_then_reconnects() {
    // GIVEN: An established connection
    let (url, mut accepted) = start_update_server().await;
    let mut handle = spawn_socket(url, FAST_RECONNECT);
    let mut server = next_connection(&mut accepted).await;
    assert_eq!(next_event(&mut handle.events).await, Some(TransportEvent::Connected));

    // WHEN: The server closes it
    server.close(None).await.unwrap();
    drop(server);

    // THEN: The socket connects again and says so
    let _second = next_connection(&mut accepted).await;
    assert_eq!(next_event(&mut handle.events).await, Some(TransportEvent::Connected));

    handle.task.abort();
}

/// **VALUE**: Verifies the socket gives up once the reconnect budget is spent.
///
/// **BUG THIS CATCHES**: Would catch `give_up_after` being ignored, which
/// would leave the driver hanging forever against a dead address.
#[tokio::test]
async fn given_unreachable_server_when_budget_spent_then_closes_event_channel() {
    // GIVEN: An address nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let policy = ReconnectPolicy {
        max_interval: Duration::from_millis(50),
        give_up_after: Some(Duration::from_millis(300)),
    };

    // WHEN: Spawning a socket for it
    let mut handle = spawn_socket(format!("ws://{address}/turbopack-hmr"), policy);

    // THEN: The event channel closes without ever connecting
    assert_eq!(next_event(&mut handle.events).await, None);
    assert!(handle.task.await.is_ok(), "Socket task should exit cleanly");
}
