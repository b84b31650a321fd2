// SPDX-FileCopyrightText: 2026 Voxlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The broker link: one persistent MQTT session per process, publishing and
//! receiving canonical events on a single topic at QoS 1.
//!
//! The link is what lets the webhook process and the dashboard process run
//! as separate, independently deployable programs while staying in sync.
//! The inbound callback is registered once at construction and runs on the
//! receive task, concurrently with request handlers -- it must only touch
//! thread-safe structures such as the [`EventQueue`](crate::queue::EventQueue).

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use voxlink_config::model::RelayConfig;
use voxlink_core::traits::EventPublisher;
use voxlink_core::{CanonicalEvent, VoxlinkError};

use crate::queue::EventQueue;

/// Bound on waiting for the broker's CONNACK during `connect`.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause before re-polling the event loop after a transport error. The
/// client reconnects on the next poll; this just avoids a hot loop while
/// the broker is down.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Callback invoked on the receive task for every decoded inbound event.
pub type EventCallback = Arc<dyn Fn(CanonicalEvent) + Send + Sync>;

/// Live session state, present only while connected.
struct LinkState {
    client: AsyncClient,
    recv_task: JoinHandle<()>,
}

/// Persistent connection to the publish/subscribe broker.
///
/// One instance per process, constructed by the entry point and shared via
/// `Arc`. `connect` is idempotent; `disconnect` is safe to call twice.
pub struct BrokerLink {
    config: RelayConfig,
    on_event: EventCallback,
    state: Mutex<Option<LinkState>>,
}

impl BrokerLink {
    /// Creates a disconnected link. `on_event` is the single inbound
    /// subscription, invoked on the receive task for every decoded message.
    pub fn new(config: RelayConfig, on_event: EventCallback) -> Self {
        Self {
            config,
            on_event,
            state: Mutex::new(None),
        }
    }

    /// Convenience constructor wiring inbound events into an [`EventQueue`].
    pub fn with_queue(config: RelayConfig, queue: Arc<EventQueue>) -> Self {
        Self::new(config, Arc::new(move |event| queue.push(event)))
    }

    /// Establishes the broker session and begins the background receive loop.
    ///
    /// Waits for the broker's CONNACK so network and auth failures surface
    /// here as [`VoxlinkError::Connection`]; the link itself never retries --
    /// the caller (process supervisor) owns retry policy. Subscribes to the
    /// configured topic at QoS 1 before the receive loop starts.
    ///
    /// Idempotent: a second call while connected is a no-op.
    pub async fn connect(&self) -> Result<(), VoxlinkError> {
        let mut state = self.state.lock().await;
        if state.is_some() {
            debug!("broker link already connected");
            return Ok(());
        }

        let mut options = MqttOptions::new(
            self.config.client_id.as_str(),
            self.config.broker_host.as_str(),
            self.config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(self.config.keep_alive_secs));

        let (client, mut eventloop) = AsyncClient::new(options, 64);

        // Drive the event loop until the broker acknowledges the session,
        // so a refused or unreachable broker fails connect() itself.
        tokio::time::timeout(CONNECT_TIMEOUT, wait_for_connack(&mut eventloop))
            .await
            .map_err(|_| VoxlinkError::Connection {
                message: format!(
                    "timed out waiting for CONNACK from {}:{}",
                    self.config.broker_host, self.config.broker_port
                ),
                source: None,
            })??;

        client
            .subscribe(self.config.topic.as_str(), QoS::AtLeastOnce)
            .await
            .map_err(|e| VoxlinkError::Connection {
                message: format!("failed to subscribe to {}: {e}", self.config.topic),
                source: Some(Box::new(e)),
            })?;

        info!(
            broker = %self.config.broker_host,
            port = self.config.broker_port,
            topic = %self.config.topic,
            client_id = %self.config.client_id,
            "broker link connected"
        );

        let recv_task = tokio::spawn(receive_loop(
            eventloop,
            client.clone(),
            self.config.topic.clone(),
            Arc::clone(&self.on_event),
        ));

        *state = Some(LinkState { client, recv_task });
        Ok(())
    }

    /// Publishes one event at QoS 1.
    ///
    /// Stamps the timestamp if the producer left it empty. Fails with
    /// [`VoxlinkError::Publish`] when not connected; does not wait for the
    /// broker acknowledgment beyond the client's own handshake.
    pub async fn publish(&self, event: &CanonicalEvent) -> Result<(), VoxlinkError> {
        let state = self.state.lock().await;
        let Some(ref link) = *state else {
            return Err(VoxlinkError::Publish {
                message: "broker link is not connected".to_string(),
                source: None,
            });
        };

        let wire = event.clone().stamped().to_wire()?;
        debug!(topic = %self.config.topic, payload = %wire, "publishing event");

        link.client
            .publish(self.config.topic.as_str(), QoS::AtLeastOnce, false, wire)
            .await
            .map_err(|e| VoxlinkError::Publish {
                message: format!("publish to {} failed: {e}", self.config.topic),
                source: Some(Box::new(e)),
            })
    }

    /// Stops the receive loop and closes the session.
    ///
    /// Safe to call multiple times; subsequent calls are no-ops.
    pub async fn disconnect(&self) {
        let mut state = self.state.lock().await;
        match state.take() {
            Some(link) => {
                if let Err(e) = link.client.disconnect().await {
                    debug!(error = %e, "broker disconnect request failed");
                }
                link.recv_task.abort();
                info!("broker link disconnected");
            }
            None => {
                debug!("broker link already disconnected");
            }
        }
    }

    /// True while a session is established.
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.is_some()
    }
}

#[async_trait::async_trait]
impl EventPublisher for BrokerLink {
    async fn publish(&self, event: &CanonicalEvent) -> Result<(), VoxlinkError> {
        BrokerLink::publish(self, event).await
    }
}

/// Polls until the initial CONNACK arrives, mapping refusals and transport
/// errors to [`VoxlinkError::Connection`].
async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<(), VoxlinkError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return if ack.code == ConnectReturnCode::Success {
                    Ok(())
                } else {
                    Err(VoxlinkError::Connection {
                        message: format!("broker refused connection: {:?}", ack.code),
                        source: None,
                    })
                };
            }
            Ok(_) => {}
            Err(e) => {
                return Err(VoxlinkError::Connection {
                    message: format!("broker connection failed: {e}"),
                    source: Some(Box::new(e)),
                });
            }
        }
    }
}

/// Background receive loop: decodes inbound messages and hands them to the
/// registered callback. Malformed payloads are logged and dropped -- nothing
/// escapes this task as a panic. Re-subscribes after automatic reconnects.
async fn receive_loop(
    mut eventloop: EventLoop,
    client: AsyncClient,
    topic: String,
    on_event: EventCallback,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if let Some(event) = decode_inbound(&publish.payload) {
                    debug!(topic = %publish.topic, kind = ?event.kind, "event received");
                    on_event(event);
                }
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                // Automatic reconnect established a fresh session; the
                // subscription does not survive it.
                match client.subscribe(topic.as_str(), QoS::AtLeastOnce).await {
                    Ok(()) => info!(topic = %topic, "re-subscribed after reconnect"),
                    Err(e) => warn!(error = %e, "re-subscribe after reconnect failed"),
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "broker receive error, will reconnect");
                tokio::time::sleep(RECONNECT_BACKOFF).await;
            }
        }
    }
}

/// Decodes one inbound payload, stamping a missing timestamp.
///
/// Returns `None` (and logs) for malformed payloads; the message is dropped,
/// not requeued.
fn decode_inbound(payload: &[u8]) -> Option<CanonicalEvent> {
    match CanonicalEvent::from_wire(payload) {
        Ok(event) => Some(event.stamped()),
        Err(e) => {
            warn!(error = %e, "dropping malformed broker message");
            None
        }
    }
}
