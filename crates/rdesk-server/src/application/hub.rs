//! Stream hub: the live connection set plus the two periodic producers.
//!
//! The hub owns a set of WebSocket-backed connections (each represented by
//! an unbounded text-frame sender) and, while running, two independently
//! scheduled tokio tasks:
//!
//! - the **frame producer**, publishing a screenshot message every `1/fps`
//!   seconds when the capture pipeline yields one;
//! - the **resource producer**, publishing a telemetry message at its own
//!   fixed interval.
//!
//! Lifecycle is `Stopped → Running → Stopped`.  `start` and `stop` are both
//! idempotent, and `stop` joins both producer tasks before returning, so a
//! caller can rely on "no more sends after `stop()` returns".
//!
//! Responsibility split around failures: a send failure during a broadcast
//! pass is logged and skipped — it never removes the connection.  Removal
//! belongs solely to the transport-closure path (`remove_connection`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use rdesk_core::protocol::messages::{StreamCommand, StreamHint};

use crate::application::capture_pipeline::CapturePipeline;
use crate::application::sampler::ResourceSampler;

/// Identity of one streaming connection.
pub type ConnectionId = Uuid;

/// Outbound channel to one connection; the transport task drains the other
/// end into the socket.
pub type ConnectionSender = mpsc::UnboundedSender<String>;

struct Producers {
    shutdown: watch::Sender<bool>,
    frame_task: JoinHandle<()>,
    resource_task: JoinHandle<()>,
}

/// The broadcast hub.
///
/// Explicitly constructed and owned by whatever composes the transport
/// layer; nothing here is ambient global state.
pub struct StreamHub {
    connections: Arc<Mutex<HashMap<ConnectionId, ConnectionSender>>>,
    capture: Arc<CapturePipeline>,
    // The sampler's carry-state is read-modify-write; this mutex makes the
    // resource producer its single logical owner.
    sampler: Arc<Mutex<ResourceSampler>>,
    frame_interval: Duration,
    resource_interval: Duration,
    producers: tokio::sync::Mutex<Option<Producers>>,
}

impl StreamHub {
    /// Creates a stopped hub.  `fps` of 0 is treated as 1.
    pub fn new(
        capture: Arc<CapturePipeline>,
        sampler: ResourceSampler,
        fps: u32,
        resource_interval: Duration,
    ) -> Self {
        let fps = fps.max(1);
        Self {
            connections: Arc::new(Mutex::new(HashMap::new())),
            capture,
            sampler: Arc::new(Mutex::new(sampler)),
            frame_interval: Duration::from_secs_f64(1.0 / f64::from(fps)),
            resource_interval,
            producers: tokio::sync::Mutex::new(None),
        }
    }

    // ── Connection set ───────────────────────────────────────────────────────

    /// Registers a connection that completed the streaming handshake.
    pub fn add_connection(&self, id: ConnectionId, sender: ConnectionSender) {
        let mut conns = self.connections.lock().unwrap();
        conns.insert(id, sender);
        info!(connection = %id, total = conns.len(), "streaming connection added");
    }

    /// Removes a connection.  Called exactly once, from the transport path,
    /// when the socket closes or its forward task fails.
    pub fn remove_connection(&self, id: ConnectionId) {
        let mut conns = self.connections.lock().unwrap();
        if conns.remove(&id).is_some() {
            info!(connection = %id, total = conns.len(), "streaming connection removed");
        }
    }

    /// Number of currently registered connections.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().unwrap().len()
    }

    /// Sends `message` to every registered connection.
    ///
    /// The sender list is snapshotted under the lock and the sends happen
    /// outside it, so registration and removal never wait on a slow pass.
    /// A failed send is logged and skipped; the connection stays registered.
    pub fn broadcast(&self, message: &str) {
        let targets: Vec<(ConnectionId, ConnectionSender)> = {
            let conns = self.connections.lock().unwrap();
            conns.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };
        for (id, tx) in targets {
            if tx.send(message.to_string()).is_err() {
                warn!(connection = %id, "send failed; leaving removal to the transport path");
            }
        }
    }

    /// Interprets an inbound text frame from a streaming connection.
    ///
    /// The vocabulary is informational stream hints only; producers are not
    /// gated per connection.
    pub fn handle_message(&self, id: ConnectionId, text: &str) {
        match serde_json::from_str::<StreamCommand>(text) {
            Ok(cmd) => match cmd.command {
                StreamHint::StartStream => info!(connection = %id, "client hinted stream start"),
                StreamHint::StopStream => info!(connection = %id, "client hinted stream pause"),
            },
            Err(_) => debug!(connection = %id, "ignoring unrecognized message: {text}"),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Spawns both producers.  No-op if already running.
    pub async fn start(self: &Arc<Self>) {
        let mut guard = self.producers.lock().await;
        if guard.is_some() {
            debug!("hub already running; start ignored");
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let frame_task = tokio::spawn(frame_producer(
            Arc::clone(self),
            self.frame_interval,
            shutdown_rx.clone(),
        ));
        let resource_task = tokio::spawn(resource_producer(
            Arc::clone(self),
            self.resource_interval,
            shutdown_rx,
        ));

        *guard = Some(Producers { shutdown: shutdown_tx, frame_task, resource_task });
        info!(
            frame_interval_ms = self.frame_interval.as_millis() as u64,
            resource_interval_ms = self.resource_interval.as_millis() as u64,
            "stream hub started"
        );
    }

    /// Signals both producers and waits for them to exit.  No-op if already
    /// stopped.  After this returns no further broadcast originates from
    /// this hub until the next `start`.
    pub async fn stop(&self) {
        let Some(producers) = self.producers.lock().await.take() else {
            debug!("hub already stopped; stop ignored");
            return;
        };
        // Receivers observe the flag at their next loop boundary.
        let _ = producers.shutdown.send(true);
        if let Err(e) = producers.frame_task.await {
            warn!("frame producer ended abnormally: {e}");
        }
        if let Err(e) = producers.resource_task.await {
            warn!("resource producer ended abnormally: {e}");
        }
        info!("stream hub stopped");
    }
}

// ── Producer loops ────────────────────────────────────────────────────────────

async fn frame_producer(hub: Arc<StreamHub>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    debug!("frame producer running");
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // A failed capture/encode is a skipped tick, never fatal.
                if let Some(message) = hub.capture.next_message() {
                    match serde_json::to_string(&message) {
                        Ok(text) => hub.broadcast(&text),
                        Err(e) => warn!("screenshot serialization failed: {e}"),
                    }
                }
            }
            _ = shutdown.changed() => break,
        }
    }
    debug!("frame producer exited");
}

async fn resource_producer(
    hub: Arc<StreamHub>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!("resource producer running");
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Zeroed-with-error samples are still published; absence of
                // telemetry is itself a signal to the viewer.
                let message = hub.sampler.lock().unwrap().sample().to_stream_message();
                match serde_json::to_string(&message) {
                    Ok(text) => hub.broadcast(&text),
                    Err(e) => warn!("telemetry serialization failed: {e}"),
                }
            }
            _ = shutdown.changed() => break,
        }
    }
    debug!("resource producer exited");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::capture_pipeline::{CapturePipeline, RawFrame};
    use crate::application::sampler::{CpuTotals, ResourceSampler};
    use crate::infrastructure::capture::MockCaptureBackend;
    use crate::infrastructure::telemetry::MockCounterSource;

    fn test_hub(fps: u32, resource_interval: Duration) -> Arc<StreamHub> {
        let frame = RawFrame {
            width: 4,
            height: 4,
            bytes_per_pixel: 4,
            data: vec![0x40; 4 * 4 * 4],
        };
        let capture = Arc::new(CapturePipeline::new(
            Arc::new(MockCaptureBackend::with_frame(frame)),
            60,
        ));
        let source = Arc::new(MockCounterSource::new());
        source.push_cpu(CpuTotals { idle: 0, total: 0 });
        let sampler = ResourceSampler::new(source);
        Arc::new(StreamHub::new(capture, sampler, fps, resource_interval))
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_connections() {
        let hub = test_hub(1, Duration::from_secs(2));
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        hub.add_connection(Uuid::new_v4(), tx_a);
        hub.add_connection(Uuid::new_v4(), tx_b);

        hub.broadcast("hello");
        assert_eq!(rx_a.recv().await.unwrap(), "hello");
        assert_eq!(rx_b.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_failed_connection_does_not_block_others_or_get_removed() {
        let hub = test_hub(1, Duration::from_secs(2));
        let (tx_ok, mut rx_ok) = mpsc::unbounded_channel();
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let dead_id = Uuid::new_v4();
        hub.add_connection(Uuid::new_v4(), tx_ok);
        hub.add_connection(dead_id, tx_dead);
        drop(rx_dead); // Sends to this connection now fail.

        hub.broadcast("frame");
        assert_eq!(rx_ok.recv().await.unwrap(), "frame");
        // The broadcaster never removes; that is the transport's job.
        assert_eq!(hub.connection_count(), 2);
    }

    #[tokio::test]
    async fn test_remove_during_broadcast_is_safe() {
        let hub = test_hub(1, Duration::from_secs(2));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        hub.add_connection(id, tx);
        hub.broadcast("one");
        hub.remove_connection(id);
        hub.broadcast("two");
        assert_eq!(rx.recv().await.unwrap(), "one");
        // "two" was never sent to the removed connection.
        assert!(rx.try_recv().is_err());
        assert_eq!(hub.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_producers_publish_both_message_types() {
        let hub = test_hub(50, Duration::from_millis(20));
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.add_connection(Uuid::new_v4(), tx);
        hub.start().await;

        let mut saw_screenshot = false;
        let mut saw_resources = false;
        for _ in 0..20 {
            let Ok(Some(text)) =
                tokio::time::timeout(Duration::from_millis(250), rx.recv()).await
            else {
                break;
            };
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            match value["type"].as_str() {
                Some("screenshot") => saw_screenshot = true,
                Some("resources") => saw_resources = true,
                other => panic!("unexpected message type {other:?}"),
            }
            if saw_screenshot && saw_resources {
                break;
            }
        }
        hub.stop().await;
        assert!(saw_screenshot, "no screenshot message observed");
        assert!(saw_resources, "no resources message observed");
    }

    #[tokio::test]
    async fn test_no_sends_after_stop_returns() {
        let hub = test_hub(100, Duration::from_millis(5));
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.add_connection(Uuid::new_v4(), tx);
        hub.start().await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        hub.stop().await;

        // Drain whatever was published before the stop completed.
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err(), "producer sent after stop() returned");
    }

    #[tokio::test]
    async fn test_start_is_idempotent_no_duplicate_producers() {
        let hub = test_hub(1, Duration::from_millis(10));
        hub.start().await;
        hub.start().await; // Second call must not spawn a second pair.

        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.add_connection(Uuid::new_v4(), tx);

        // Collect a few resource ticks and check they arrive one per period,
        // not two (a duplicated producer would double-publish).
        tokio::time::sleep(Duration::from_millis(100)).await;
        hub.stop().await;
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        // ~10 ticks in 100 ms at one per 10 ms; duplicated producers would
        // give ~20.  Leave slack for scheduler jitter.
        assert!(count <= 14, "observed {count} messages, producers look duplicated");
    }

    #[tokio::test]
    async fn test_stop_then_start_restarts_cleanly() {
        let hub = test_hub(100, Duration::from_millis(10));
        hub.start().await;
        hub.stop().await;
        hub.stop().await; // Idempotent.

        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.add_connection(Uuid::new_v4(), tx);
        hub.start().await;
        let first = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
        hub.stop().await;
        assert!(first.is_ok(), "restarted hub produced no messages");
    }
}
