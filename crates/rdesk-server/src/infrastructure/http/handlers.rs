//! REST handlers.
//!
//! Handlers stay thin: extract, call into the application layer, map the
//! result to a wire shape.  All error mapping lives in [`ApiError`].

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use rdesk_core::domain::access::AccessLevel;
use rdesk_core::domain::input::InputCommand;
use rdesk_core::protocol::messages::{
    ClickRequest, ClickResponse, HealthResponse, KeyPressRequest, KeyPressResponse, LoginRequest,
    LoginResponse, LogoutResponse, TypeTextRequest, TypeTextResponse,
};

use crate::application::input_pipeline::InputOutcome;
use crate::error::ApiError;
use crate::infrastructure::http::{bearer_token, AppState};

/// `GET /api/health` — static service identity, no auth.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "rdesk-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/login` — credentials in, session token out.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("username and password are required".to_string()));
    }
    let session = state.gate.authenticate(&req.username, &req.password)?;
    info!(username = %session.username, level = %session.access_level, "login");
    Ok(Json(LoginResponse {
        success: true,
        username: session.username,
        groups: session.groups,
        access_level: session.access_level,
        token: session.token,
        can_view: session.access_level >= AccessLevel::ViewOnly,
        can_control: session.access_level >= AccessLevel::FullControl,
    }))
}

/// `POST /api/logout` — revokes the presented token.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    state.gate.revoke(token);
    Ok(Json(LogoutResponse {
        success: true,
        message: "logged out".to_string(),
    }))
}

/// `POST /api/mouse/click` — move to the coordinates and click.
pub async fn mouse_click(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ClickRequest>,
) -> Result<Json<ClickResponse>, ApiError> {
    let session = state.gate.validate(bearer_token(&headers)?)?;
    let command = InputCommand::ClickAt { x: req.x, y: req.y, button: req.button };
    state.input.execute(&command, &session).await?;
    Ok(Json(ClickResponse {
        success: true,
        x: req.x,
        y: req.y,
        button: req.button,
    }))
}

/// `POST /api/keyboard/press` — one keycode, down then up.
pub async fn keyboard_press(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<KeyPressRequest>,
) -> Result<Json<KeyPressResponse>, ApiError> {
    let session = state.gate.validate(bearer_token(&headers)?)?;
    let command = InputCommand::PressKey { keycode: req.keycode };
    state.input.execute(&command, &session).await?;
    Ok(Json(KeyPressResponse { success: true, keycode: req.keycode }))
}

/// `POST /api/keyboard/type` — types a string character by character.
///
/// `success` is `true` when at least one character reached the device, or
/// when the text was empty to begin with; a string made entirely of
/// unmapped characters reports `success: false` with `chars_typed: 0`.
pub async fn keyboard_type(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TypeTextRequest>,
) -> Result<Json<TypeTextResponse>, ApiError> {
    let session = state.gate.validate(bearer_token(&headers)?)?;
    let command = InputCommand::TypeText { text: req.text.clone() };
    let outcome = state.input.execute(&command, &session).await?;
    let chars_typed = match outcome {
        InputOutcome::Typed { chars_typed } => chars_typed,
        InputOutcome::Done => 0,
    };
    Ok(Json(TypeTextResponse {
        success: chars_typed > 0 || req.text.is_empty(),
        text: req.text,
        chars_typed,
    }))
}
