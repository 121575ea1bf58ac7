//! TOML server configuration.
//!
//! Example file:
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! port = 8080
//! log_level = "info"
//!
//! [stream]
//! fps = 1
//! resource_interval_secs = 2
//! jpeg_quality = 80
//! screen_width = 1920
//! screen_height = 1080
//!
//! [access]
//! control_group = "rd-control"
//! view_group = "rd-view"
//! token_ttl_secs = 28800
//!
//! [input]
//! settle_ms = 10
//! hold_ms = 25
//! pacing_ms = 50
//!
//! [[users]]
//! username = "operator"
//! password_sha256 = "..."
//! groups = ["operator", "rd-control"]
//! ```
//!
//! Every field is defaulted, so a missing file and an empty file both yield
//! a runnable configuration (with no users, hence no possible logins).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::application::gate::GatePolicy;
use crate::application::input_pipeline::InputTiming;
use crate::infrastructure::identity::StaticUser;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema ─────────────────────────────────────────────────────────────

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub stream: StreamSection,
    #[serde(default)]
    pub access: AccessSection,
    #[serde(default)]
    pub input: InputTiming,
    #[serde(default)]
    pub users: Vec<StaticUser>,
}

/// Listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// IP address to bind.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// `tracing` filter directive: `"error"`, `"warn"`, `"info"`, `"debug"`,
    /// `"trace"`, or any full `EnvFilter` expression.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Streaming cadence and encoding settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSection {
    /// Screenshot frames per second.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Seconds between resource telemetry messages.
    #[serde(default = "default_resource_interval_secs")]
    pub resource_interval_secs: u64,
    /// JPEG quality, 1 to 100.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Dimensions reported by the synthetic capture and device backends.
    /// Real backends report their own and ignore these.
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,
}

/// Access-control settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessSection {
    /// Membership grants full control.
    #[serde(default = "default_control_group")]
    pub control_group: String,
    /// Membership grants view-only access.
    #[serde(default = "default_view_group")]
    pub view_group: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Token signing secret.  Absent means a fresh secret per boot, so
    /// sessions do not survive a restart.
    #[serde(default)]
    pub token_secret: Option<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_fps() -> u32 {
    1
}
fn default_resource_interval_secs() -> u64 {
    2
}
fn default_jpeg_quality() -> u8 {
    80
}
fn default_screen_width() -> u32 {
    1920
}
fn default_screen_height() -> u32 {
    1080
}
fn default_control_group() -> String {
    "rd-control".to_string()
}
fn default_view_group() -> String {
    "rd-view".to_string()
}
fn default_token_ttl_secs() -> u64 {
    8 * 60 * 60
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            resource_interval_secs: default_resource_interval_secs(),
            jpeg_quality: default_jpeg_quality(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
        }
    }
}

impl Default for AccessSection {
    fn default() -> Self {
        Self {
            control_group: default_control_group(),
            view_group: default_view_group(),
            token_ttl_secs: default_token_ttl_secs(),
            token_secret: None,
        }
    }
}

impl AccessSection {
    pub fn to_policy(&self) -> GatePolicy {
        GatePolicy {
            control_group: self.control_group.clone(),
            view_group: self.view_group.clone(),
            token_ttl_secs: self.token_ttl_secs,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads configuration from `path`, returning `ServerConfig::default()` if
/// the file does not exist.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(e) => Err(ConfigError::Io { path: path.to_path_buf(), source: e }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
