//! HTTP surface: router, shared state, and bearer-token extraction.
//!
//! Route map:
//!
//! | Method | Path                  | Auth          |
//! |--------|-----------------------|---------------|
//! | POST   | `/api/login`          | credentials   |
//! | POST   | `/api/logout`         | bearer token  |
//! | POST   | `/api/mouse/click`    | bearer token  |
//! | POST   | `/api/keyboard/press` | bearer token  |
//! | POST   | `/api/keyboard/type`  | bearer token  |
//! | GET    | `/api/health`         | none          |
//! | GET    | `/ws`                 | `?token=` query |

pub mod handlers;
pub mod ws;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::application::gate::AccessGate;
use crate::application::hub::StreamHub;
use crate::application::input_pipeline::InputPipeline;
use crate::error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AccessGate>,
    pub input: Arc<InputPipeline>,
    pub hub: Arc<StreamHub>,
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/mouse/click", post(handlers::mouse_click))
        .route("/api/keyboard/press", post(handlers::keyboard_press))
        .route("/api/keyboard/type", post(handlers::keyboard_type))
        .route("/ws", get(ws::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::InvalidToken)
}
