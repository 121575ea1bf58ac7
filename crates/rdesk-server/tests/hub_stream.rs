//! Integration tests for the streaming path: capture pipeline + sampler +
//! hub, verified down to the JSON frames a client would receive.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

use rdesk_core::protocol::transfer::decode_payload;
use rdesk_server::application::capture_pipeline::{CapturePipeline, RawFrame};
use rdesk_server::application::hub::StreamHub;
use rdesk_server::application::sampler::{CpuTotals, MemoryCounters, ResourceSampler};
use rdesk_server::infrastructure::capture::MockCaptureBackend;
use rdesk_server::infrastructure::telemetry::MockCounterSource;

fn gradient_frame(width: u32, height: u32) -> RawFrame {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 0x20, 0xFF]);
        }
    }
    RawFrame { width, height, bytes_per_pixel: 4, data }
}

fn running_hub() -> Arc<StreamHub> {
    let pipeline = Arc::new(CapturePipeline::new(
        Arc::new(MockCaptureBackend::with_frame(gradient_frame(32, 24))),
        75,
    ));
    let source = Arc::new(MockCounterSource::new());
    source.push_cpu(CpuTotals { idle: 100, total: 400 });
    source.push_cpu(CpuTotals { idle: 150, total: 600 });
    source.set_memory(MemoryCounters { total_kb: 8 * 1024 * 1024, available_kb: 6 * 1024 * 1024 });
    let sampler = ResourceSampler::new(source);
    Arc::new(StreamHub::new(pipeline, sampler, 50, Duration::from_millis(20)))
}

async fn collect_one(
    rx: &mut mpsc::UnboundedReceiver<String>,
    wanted_type: &str,
) -> serde_json::Value {
    for _ in 0..50 {
        let text = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("stream produced nothing")
            .expect("channel closed");
        let value: serde_json::Value = serde_json::from_str(&text).expect("frames are JSON");
        if value["type"] == wanted_type {
            return value;
        }
    }
    panic!("no {wanted_type} frame observed");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_screenshot_frames_decode_to_jpeg() {
    let hub = running_hub();
    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.add_connection(Uuid::new_v4(), tx);
    hub.start().await;

    let frame = collect_one(&mut rx, "screenshot").await;
    hub.stop().await;

    let data = frame["data"].as_str().expect("data is a string");
    let jpeg = decode_payload(data).expect("data is valid base64");
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "payload must be a JPEG");
    assert!(frame["timestamp"].as_u64().expect("timestamp is numeric") > 0);
}

#[tokio::test]
async fn test_resource_frames_carry_utilization_fields() {
    let hub = running_hub();
    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.add_connection(Uuid::new_v4(), tx);
    hub.start().await;

    let frame = collect_one(&mut rx, "resources").await;
    hub.stop().await;

    assert!(frame["cpu_usage"].is_u64());
    assert!(frame["ram_usage"].is_u64());
    assert_eq!(frame["ram_total"].as_u64(), Some(8192));
    assert_eq!(frame["ram_free"].as_u64(), Some(6144));
    assert!(frame.get("error").is_none(), "healthy sample must omit the error field");
}

#[tokio::test]
async fn test_failed_telemetry_still_publishes_zeroed_frame() {
    let pipeline = Arc::new(CapturePipeline::new(Arc::new(MockCaptureBackend::failing()), 75));
    let source = Arc::new(MockCounterSource::new());
    source.fail_cpu();
    let sampler = ResourceSampler::new(source);
    let hub = Arc::new(StreamHub::new(pipeline, sampler, 1, Duration::from_millis(20)));

    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.add_connection(Uuid::new_v4(), tx);
    hub.start().await;

    let frame = collect_one(&mut rx, "resources").await;
    hub.stop().await;

    assert_eq!(frame["cpu_usage"].as_u64(), Some(0));
    assert_eq!(frame["ram_total"].as_u64(), Some(0));
    assert!(frame["error"].is_string(), "zeroed sample must carry the error field");
}

#[tokio::test]
async fn test_failing_capture_skips_frames_but_telemetry_continues() {
    let pipeline = Arc::new(CapturePipeline::new(Arc::new(MockCaptureBackend::failing()), 75));
    let source = Arc::new(MockCounterSource::new());
    source.push_cpu(CpuTotals { idle: 0, total: 100 });
    let sampler = ResourceSampler::new(source);
    let hub = Arc::new(StreamHub::new(pipeline, sampler, 100, Duration::from_millis(10)));

    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.add_connection(Uuid::new_v4(), tx);
    hub.start().await;

    // Collect for a while; every message must be telemetry since capture
    // always fails.
    let mut resources_seen = 0;
    for _ in 0..5 {
        let Ok(Some(text)) = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await
        else {
            break;
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "resources");
        resources_seen += 1;
    }
    hub.stop().await;
    assert!(resources_seen > 0, "telemetry must keep flowing");
}

#[tokio::test]
async fn test_stream_hints_do_not_disrupt_the_stream() {
    let hub = running_hub();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = Uuid::new_v4();
    hub.add_connection(id, tx);
    hub.start().await;

    hub.handle_message(id, r#"{"command": "stop_stream"}"#);
    hub.handle_message(id, "not json at all");
    hub.handle_message(id, r#"{"command": "start_stream"}"#);

    // Hints are informational; frames keep arriving.
    let frame = collect_one(&mut rx, "screenshot").await;
    hub.stop().await;
    assert_eq!(frame["type"], "screenshot");
}

#[tokio::test]
async fn test_late_joining_connection_receives_frames() {
    let hub = running_hub();
    hub.start().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.add_connection(Uuid::new_v4(), tx);
    let frame = collect_one(&mut rx, "screenshot").await;
    hub.stop().await;
    assert_eq!(frame["type"], "screenshot");
}
