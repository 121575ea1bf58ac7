//! Integration tests for authenticated input: sessions issued by the gate
//! driving the pipeline against the mock device.

use std::sync::Arc;

use rdesk_core::domain::input::{InputCommand, PointerButton};
use rdesk_server::application::gate::{AccessGate, GatePolicy, TokenSigner};
use rdesk_server::application::input_pipeline::{
    DeviceBackend, InputError, InputOutcome, InputPipeline, InputTiming,
};
use rdesk_server::infrastructure::device::{DeviceCall, MockDeviceBackend};
use rdesk_server::infrastructure::identity::MockIdentityProvider;

struct Fixture {
    gate: AccessGate,
    device: Arc<MockDeviceBackend>,
    pipeline: InputPipeline,
}

fn fixture() -> Fixture {
    let identity = MockIdentityProvider::new();
    identity.add_user("driver", "pw", &["rd-control"]);
    identity.add_user("watcher", "pw", &["rd-view"]);
    let gate = AccessGate::new(
        Arc::new(identity),
        TokenSigner::new(TokenSigner::random_secret()),
        GatePolicy::default(),
    );
    let device = Arc::new(MockDeviceBackend::new(1920, 1080));
    let pipeline = InputPipeline::new(
        Arc::clone(&device) as Arc<dyn DeviceBackend>,
        InputTiming::immediate(),
    );
    Fixture { gate, device, pipeline }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_control_login_can_click() {
    let f = fixture();
    let session = f.gate.authenticate("driver", "pw").unwrap();

    f.pipeline
        .execute(
            &InputCommand::ClickAt { x: 640, y: 360, button: PointerButton::Left },
            &session,
        )
        .await
        .unwrap();

    assert_eq!(
        f.device.calls(),
        vec![
            DeviceCall::Move { x: 640, y: 360 },
            DeviceCall::Button { button: PointerButton::Left, pressed: true },
            DeviceCall::Button { button: PointerButton::Left, pressed: false },
        ]
    );
}

#[tokio::test]
async fn test_view_only_login_cannot_drive_input() {
    let f = fixture();
    let session = f.gate.authenticate("watcher", "pw").unwrap();

    for command in [
        InputCommand::MoveTo { x: 1, y: 1 },
        InputCommand::ClickAt { x: 1, y: 1, button: PointerButton::Right },
        InputCommand::PressKey { keycode: 30 },
        InputCommand::TypeText { text: "hi".to_string() },
    ] {
        let err = f.pipeline.execute(&command, &session).await.unwrap_err();
        assert!(matches!(err, InputError::PermissionDenied));
    }
    assert!(f.device.calls().is_empty());
}

#[tokio::test]
async fn test_session_restored_from_token_keeps_control_rights() {
    let f = fixture();
    let login = f.gate.authenticate("driver", "pw").unwrap();
    // Round-trip through the token as a later request would.
    let session = f.gate.validate(&login.token).unwrap();

    f.pipeline
        .execute(&InputCommand::PressKey { keycode: 28 }, &session)
        .await
        .unwrap();
    assert_eq!(
        f.device.calls(),
        vec![
            DeviceCall::Key { keycode: 28, pressed: true },
            DeviceCall::Key { keycode: 28, pressed: false },
        ]
    );
}

#[tokio::test]
async fn test_typing_a_sentence_produces_paired_key_events() {
    let f = fixture();
    let session = f.gate.authenticate("driver", "pw").unwrap();

    let outcome = f
        .pipeline
        .execute(&InputCommand::TypeText { text: "ls -a\n".to_string() }, &session)
        .await
        .unwrap();
    assert_eq!(outcome, InputOutcome::Typed { chars_typed: 6 });

    let calls = f.device.calls();
    // Every character becomes exactly one down/up pair, in order.
    assert_eq!(calls.len(), 12);
    for pair in calls.chunks_exact(2) {
        let (DeviceCall::Key { keycode: down, pressed: true },
             DeviceCall::Key { keycode: up, pressed: false }) = (pair[0], pair[1])
        else {
            panic!("expected a down/up pair, got {pair:?}");
        };
        assert_eq!(down, up);
    }
    // The newline maps to enter (28) at the end.
    assert_eq!(calls[10], DeviceCall::Key { keycode: 28, pressed: true });
}

#[tokio::test]
async fn test_mixed_case_text_reuses_base_keycodes() {
    let f = fixture();
    let session = f.gate.authenticate("driver", "pw").unwrap();

    f.pipeline
        .execute(&InputCommand::TypeText { text: "aA".to_string() }, &session)
        .await
        .unwrap();
    let calls = f.device.calls();
    // Case folds to the same physical key.
    assert_eq!(calls[0], DeviceCall::Key { keycode: 30, pressed: true });
    assert_eq!(calls[2], DeviceCall::Key { keycode: 30, pressed: true });
}

#[tokio::test]
async fn test_unmapped_only_text_types_nothing() {
    let f = fixture();
    let session = f.gate.authenticate("driver", "pw").unwrap();

    let outcome = f
        .pipeline
        .execute(&InputCommand::TypeText { text: "@#€".to_string() }, &session)
        .await
        .unwrap();
    assert_eq!(outcome, InputOutcome::Typed { chars_typed: 0 });
    assert!(f.device.calls().is_empty());
}

#[tokio::test]
async fn test_click_at_screen_edges() {
    let f = fixture();
    let session = f.gate.authenticate("driver", "pw").unwrap();

    // Corner pixels are inside; the dimension itself is outside.
    f.pipeline
        .execute(&InputCommand::MoveTo { x: 0, y: 0 }, &session)
        .await
        .unwrap();
    f.pipeline
        .execute(&InputCommand::MoveTo { x: 1919, y: 1079 }, &session)
        .await
        .unwrap();
    let err = f
        .pipeline
        .execute(&InputCommand::MoveTo { x: 1920, y: 1079 }, &session)
        .await
        .unwrap_err();
    assert!(matches!(err, InputError::OutOfBounds { .. }));
}

#[tokio::test]
async fn test_device_failure_mid_string_does_not_abort_typing() {
    let f = fixture();
    f.device.fail_key_releases();
    let session = f.gate.authenticate("driver", "pw").unwrap();

    // Releases fail for every character, so nothing counts as typed, but
    // every character is still attempted.
    let outcome = f
        .pipeline
        .execute(&InputCommand::TypeText { text: "ab".to_string() }, &session)
        .await
        .unwrap();
    assert_eq!(outcome, InputOutcome::Typed { chars_typed: 0 });
    assert_eq!(f.device.calls().len(), 4);
}
