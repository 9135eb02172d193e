// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hub integration tests over real WebSocket connections on loopback.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use brigade_core::Event;
use brigade_core::event::OrderSignal;
use brigade_core::types::{OrderId, OrderStatus};
use brigade_hub::{BroadcastHub, HubState, build_router};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(10);

async fn start_hub(queue_capacity: usize) -> (SocketAddr, Arc<BroadcastHub>) {
    let hub = Arc::new(BroadcastHub::new(queue_capacity));
    let router = build_router(HubState { hub: hub.clone() });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, hub)
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (socket, _response) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    socket
}

/// Read the next decoded event, skipping transport frames.
async fn next_event(socket: &mut WsClient) -> Event {
    loop {
        let frame = timeout(WAIT, socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return Event::decode(text.as_str()).unwrap();
        }
    }
}

fn order_updated(id: &str, status: OrderStatus) -> Event {
    Event::OrderUpdated(OrderSignal {
        id: OrderId(id.into()),
        order_number: format!("ORD-{id}"),
        table_number: None,
        status: Some(status),
        total: None,
    })
}

#[tokio::test]
async fn connect_receives_an_ack() {
    let (addr, _hub) = start_hub(16).await;
    let mut client = connect(addr).await;
    match next_event(&mut client).await {
        Event::Connect { message } => assert!(!message.is_empty()),
        other => panic!("expected connect ack, got {other:?}"),
    }
}

#[tokio::test]
async fn publish_fans_out_to_every_client() {
    let (addr, hub) = start_hub(16).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    // Consume the acks.
    next_event(&mut a).await;
    next_event(&mut b).await;

    hub.publish(&order_updated("42", OrderStatus::Ready));

    assert_eq!(
        next_event(&mut a).await,
        order_updated("42", OrderStatus::Ready)
    );
    assert_eq!(
        next_event(&mut b).await,
        order_updated("42", OrderStatus::Ready)
    );
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let (addr, _hub) = start_hub(16).await;
    let mut client = connect(addr).await;
    next_event(&mut client).await;

    client
        .send(Message::text(Event::Ping.encode()))
        .await
        .unwrap();

    assert_eq!(next_event(&mut client).await, Event::Pong);
}

#[tokio::test]
async fn malformed_envelope_does_not_kill_the_connection() {
    let (addr, _hub) = start_hub(16).await;
    let mut client = connect(addr).await;
    next_event(&mut client).await;

    client.send(Message::text("{not json")).await.unwrap();
    client
        .send(Message::text(r#"{"type":"mystery"}"#))
        .await
        .unwrap();
    client
        .send(Message::text(Event::Ping.encode()))
        .await
        .unwrap();

    // Both bad envelopes were dropped silently; the heartbeat still works.
    assert_eq!(next_event(&mut client).await, Event::Pong);
}

#[tokio::test]
async fn lagged_client_is_told_to_resync_on_its_next_heartbeat() {
    let (addr, hub) = start_hub(2).await;
    let mut client = connect(addr).await;

    // Do not read anything. Large frames fill the kernel socket buffers,
    // the sender task stalls, and the capacity-2 queue overflows.
    let bulk = "x".repeat(4096);
    let mut published = 0u32;
    while published < 4096 {
        hub.publish(&Event::OrderUpdated(OrderSignal {
            id: OrderId(published.to_string()),
            order_number: bulk.clone(),
            table_number: None,
            status: Some(OrderStatus::Preparing),
            total: None,
        }));
        published += 1;
    }

    client
        .send(Message::text(Event::Ping.encode()))
        .await
        .unwrap();

    // Everything already buffered arrives first, then the pong and the
    // resync. Far fewer frames than were published survive.
    let mut saw_resync = false;
    for _ in 0..published {
        match next_event(&mut client).await {
            Event::Resync => {
                saw_resync = true;
                break;
            }
            _ => {}
        }
    }
    assert!(saw_resync, "lagged client never got a resync");
}

#[tokio::test]
async fn publish_endpoint_feeds_the_fanout() {
    let (addr, _hub) = start_hub(16).await;
    let mut client = connect(addr).await;
    next_event(&mut client).await;

    let http = reqwest::Client::new();
    let response = http
        .post(format!("http://{addr}/publish"))
        .json(&order_updated("9", OrderStatus::Completed))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    assert_eq!(
        next_event(&mut client).await,
        order_updated("9", OrderStatus::Completed)
    );
}

#[tokio::test]
async fn publish_endpoint_rejects_heartbeat_frames() {
    let (addr, _hub) = start_hub(16).await;
    let http = reqwest::Client::new();
    let response = http
        .post(format!("http://{addr}/publish"))
        .json(&Event::Ping)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn health_reports_connection_count() {
    let (addr, _hub) = start_hub(16).await;
    let mut client = connect(addr).await;
    next_event(&mut client).await;

    let body: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 1);
}
