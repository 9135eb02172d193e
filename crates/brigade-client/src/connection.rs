// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket connection manager.
//!
//! Owns the socket lifecycle end to end: dial, heartbeat, reconnect with
//! capped exponential backoff, and teardown. Decoded events flow out on an
//! unbounded channel; connection transitions flow out as [`ConnectionSignal`]s
//! so the reconciliation layer can trigger a full re-fetch on reconnect. The
//! current [`ConnectionState`] is observable through a watch channel.

use std::time::Duration;

use brigade_config::model::ClientConfig;
use brigade_core::Event;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backoff::BackoffPolicy;

/// Coarse connection state, observable by UI layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Dialing, or waiting out a backoff delay between attempts.
    Connecting,
    /// Socket established and heartbeating.
    Open,
    /// Gave up after exhausting reconnect attempts, or shut down.
    Closed,
}

/// Edge-triggered connection transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionSignal {
    /// First successful connection of this manager's lifetime.
    Connected,
    /// Connection re-established after at least one prior session. The
    /// reconciliation layer re-fetches every collection on this signal.
    Reconnected,
    /// Session ended; reconnect attempts follow automatically.
    Disconnected,
    /// Reconnect attempts exhausted. Terminal; the manager task returns.
    ConnectionLost { attempts: u32 },
}

/// Receiving halves handed to the caller when a manager is built.
pub struct ConnectionHandles {
    pub state: watch::Receiver<ConnectionState>,
    pub events: mpsc::UnboundedReceiver<Event>,
    pub signals: mpsc::UnboundedReceiver<ConnectionSignal>,
}

/// Drives one logical connection to the hub, across any number of sockets.
pub struct ConnectionManager {
    endpoint: String,
    heartbeat: Duration,
    backoff: BackoffPolicy,
    state_tx: watch::Sender<ConnectionState>,
    event_tx: mpsc::UnboundedSender<Event>,
    signal_tx: mpsc::UnboundedSender<ConnectionSignal>,
}

impl ConnectionManager {
    pub fn new(config: &ClientConfig) -> (Self, ConnectionHandles) {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let manager = Self {
            endpoint: config.endpoint.clone(),
            heartbeat: Duration::from_secs(config.heartbeat_interval_secs),
            backoff: BackoffPolicy::from_config(config),
            state_tx,
            event_tx,
            signal_tx,
        };
        let handles = ConnectionHandles {
            state: state_rx,
            events: event_rx,
            signals: signal_rx,
        };
        (manager, handles)
    }

    /// Run until cancelled or until reconnect attempts are exhausted.
    ///
    /// Consecutive failed dials count toward the attempt limit; any
    /// successful session resets the counter, so a long-lived connection
    /// that drops starts its backoff from the base delay again.
    pub async fn run(self, cancel: CancellationToken) {
        let mut failed_attempts: u32 = 0;
        let mut had_session = false;

        loop {
            if cancel.is_cancelled() {
                break;
            }
            self.set_state(ConnectionState::Connecting);

            match connect_async(&self.endpoint).await {
                Ok((socket, _response)) => {
                    failed_attempts = 0;
                    let signal = if had_session {
                        ConnectionSignal::Reconnected
                    } else {
                        ConnectionSignal::Connected
                    };
                    had_session = true;
                    info!(endpoint = %self.endpoint, "connected");
                    self.set_state(ConnectionState::Open);
                    let _ = self.signal_tx.send(signal);

                    self.drive_session(socket, &cancel).await;

                    if cancel.is_cancelled() {
                        break;
                    }
                    warn!(endpoint = %self.endpoint, "connection dropped");
                    self.set_state(ConnectionState::Connecting);
                    let _ = self.signal_tx.send(ConnectionSignal::Disconnected);
                }
                Err(err) => {
                    failed_attempts += 1;
                    warn!(
                        endpoint = %self.endpoint,
                        attempt = failed_attempts,
                        error = %err,
                        "connect failed"
                    );
                    if self.backoff.exhausted(failed_attempts) {
                        warn!(attempts = failed_attempts, "reconnect attempts exhausted");
                        self.set_state(ConnectionState::Closed);
                        let _ = self.signal_tx.send(ConnectionSignal::ConnectionLost {
                            attempts: failed_attempts,
                        });
                        return;
                    }
                }
            }

            let delay = self.backoff.delay(failed_attempts.saturating_sub(1));
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.set_state(ConnectionState::Closed);
    }

    /// Pump one established socket: send pings on the heartbeat interval,
    /// decode inbound frames, and return when the socket dies.
    ///
    /// The session tracks when the hub last acknowledged a heartbeat. A
    /// socket that stays open but answers no ping for two full intervals is
    /// torn down so the reconnect loop can replace it.
    async fn drive_session(
        &self,
        socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
        cancel: &CancellationToken,
    ) {
        let (mut sink, mut stream) = socket.split();
        let mut heartbeat = tokio::time::interval(self.heartbeat);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately; consume it so
        // the first ping goes out one full interval after connect.
        heartbeat.tick().await;
        let mut last_heartbeat = Instant::now();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }
                _ = heartbeat.tick() => {
                    if last_heartbeat.elapsed() >= self.heartbeat * 2 {
                        warn!("hub stopped answering heartbeats, dropping session");
                        return;
                    }
                    if sink.send(Message::text(Event::Ping.encode())).await.is_err() {
                        return;
                    }
                }
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => match Event::decode(text.as_str()) {
                            Ok(Event::Pong) => {
                                last_heartbeat = Instant::now();
                                debug!("heartbeat acknowledged");
                            }
                            Ok(Event::Connect { message }) => debug!(%message, "hub greeting"),
                            Ok(event) => {
                                let _ = self.event_tx.send(event);
                            }
                            // A malformed envelope drops itself, never the
                            // connection.
                            Err(err) => warn!(error = %err, "dropping malformed envelope"),
                        },
                        Some(Ok(Message::Close(_))) | None => return,
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            warn!(error = %err, "socket error");
                            return;
                        }
                    }
                }
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        // send_if_modified keeps watch wakeups edge-triggered.
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}
