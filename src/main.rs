use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use soundrec::platform::{LogWakeLock, SystemDeviceProbe, SystemDisk};
use soundrec::recorder::SoxRecorderFactory;
use soundrec::session::{ControllerDeps, SessionController, SessionHandle};
use soundrec::{create_router, AppState, Config, LogNotifier, NatsBridge};

#[derive(Debug, Parser)]
#[command(name = "soundrec", about = "Background audio recording session service")]
struct Args {
    /// Configuration file (without extension, config-crate style)
    #[arg(long, default_value = "config/soundrec")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config))?;

    info!("soundrec v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    let handle = SessionController::spawn(ControllerDeps {
        recorders: Box::new(SoxRecorderFactory),
        notifier: Arc::new(LogNotifier),
        device: Arc::new(SystemDeviceProbe),
        wake_lock: Arc::new(LogWakeLock::default()),
        disk: Arc::new(SystemDisk),
        default_sample_rate: cfg.audio.sample_rate,
    });

    if let Some(nats) = &cfg.nats {
        let bridge = NatsBridge::connect(&nats.url, cfg.service.name.clone()).await?;
        bridge.spawn(handle.clone()).await?;
    }

    let app = create_router(AppState::new(handle.clone()));
    let listener =
        tokio::net::TcpListener::bind((cfg.service.http.bind.as_str(), cfg.service.http.port))
            .await
            .context("failed to bind HTTP listener")?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(handle))
        .await?;

    Ok(())
}

/// On ctrl-c, stop any active session before the server goes away so the
/// recorder and wake lock are released.
async fn shutdown_signal(handle: SessionHandle) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested, stopping any active session");
    let _ = handle.stop().await;
}
