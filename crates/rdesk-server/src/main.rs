//! rdesk server entry point.
//!
//! Wires the infrastructure backends into the application services and runs
//! the axum server until Ctrl-C.
//!
//! ```text
//! main()
//!  └─ load_config()                 -- TOML, all fields defaulted
//!  └─ AccessGate                    -- static users + HMAC token signer
//!  └─ InputPipeline                 -- logging device backend
//!  └─ StreamHub::start()            -- frame + resource producers
//!  └─ axum::serve()                 -- REST + /ws until shutdown
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rdesk_server::application::capture_pipeline::CapturePipeline;
use rdesk_server::application::gate::{AccessGate, TokenSigner};
use rdesk_server::application::hub::StreamHub;
use rdesk_server::application::input_pipeline::InputPipeline;
use rdesk_server::application::sampler::ResourceSampler;
use rdesk_server::infrastructure::capture::TestPatternCapture;
use rdesk_server::infrastructure::device::TraceDeviceBackend;
use rdesk_server::infrastructure::http::{router, AppState};
use rdesk_server::infrastructure::identity::StaticIdentityProvider;
use rdesk_server::infrastructure::storage::load_config;
use rdesk_server::infrastructure::telemetry::ProcCounterSource;

/// Remote desktop control service.
#[derive(Debug, Parser)]
#[command(name = "rdesk-server", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "RDESK_CONFIG", default_value = "rdesk.toml")]
    config: PathBuf,

    /// Override the configured bind address.
    #[arg(long, env = "RDESK_BIND")]
    bind: Option<String>,

    /// Override the configured port.
    #[arg(long, env = "RDESK_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    info!(config = %cli.config.display(), "rdesk server starting");

    // ── Access gate ───────────────────────────────────────────────────────────
    let identity = Arc::new(StaticIdentityProvider::new(config.users.clone()));
    // Without a configured secret, one is generated per boot and tokens do
    // not survive a restart.
    let signer = match &config.access.token_secret {
        Some(secret) => TokenSigner::new(secret.clone().into_bytes()),
        None => TokenSigner::new(TokenSigner::random_secret()),
    };
    let gate = Arc::new(AccessGate::new(identity, signer, config.access.to_policy()));

    // ── Input pipeline ────────────────────────────────────────────────────────
    let device = Arc::new(TraceDeviceBackend::new(
        config.stream.screen_width,
        config.stream.screen_height,
    ));
    let input = Arc::new(InputPipeline::new(device, config.input));

    // ── Stream hub ────────────────────────────────────────────────────────────
    let capture = Arc::new(TestPatternCapture::new(
        config.stream.screen_width,
        config.stream.screen_height,
    ));
    let pipeline = Arc::new(CapturePipeline::new(capture, config.stream.jpeg_quality));
    let sampler = ResourceSampler::new(Arc::new(ProcCounterSource::new()));
    let hub = Arc::new(StreamHub::new(
        pipeline,
        sampler,
        config.stream.fps,
        Duration::from_secs(config.stream.resource_interval_secs.max(1)),
    ));
    hub.start().await;

    // ── HTTP server ───────────────────────────────────────────────────────────
    let state = AppState {
        gate,
        input,
        hub: Arc::clone(&hub),
    };
    let app = router(state);

    let bind = cli.bind.unwrap_or(config.server.bind_address);
    let port = cli.port.unwrap_or(config.server.port);
    let listener = tokio::net::TcpListener::bind((bind.as_str(), port)).await?;
    info!("listening on {bind}:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    hub.stop().await;
    info!("rdesk server stopped");
    Ok(())
}
