use std::path::Path;

use anyhow::Result;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::profile::EncoderProfile;

/// Faults the backend raises at its own seams.
///
/// The phase a fault occurs in drives classification: a prepare-time `Io`
/// and a start-time `Start` are reported differently to observers.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("recorder I/O setup failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("recorder rejected start: {0}")]
    Start(String),

    #[error("recorder used before configure()")]
    NotConfigured,

    #[error("recorder device fault: {0}")]
    Device(String),
}

/// Asynchronous mid-session hardware error reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderFault {
    pub code: i32,
    pub message: String,
}

/// Opaque handle to the underlying audio-capture/encode facility.
///
/// Lifecycle: `configure` → `prepare` → `start` → `stop`; release is drop.
/// The handle is exclusively owned by the active session and must clean up
/// on drop even if `stop` was never called.
#[async_trait::async_trait]
pub trait RecorderBackend: Send {
    /// Fix encoder parameters and the output path. Called exactly once,
    /// before `prepare`.
    fn configure(&mut self, profile: &EncoderProfile, output: &Path) -> Result<(), RecorderError>;

    /// Set up the output file and any device plumbing. Fails with
    /// [`RecorderError::Io`] on I/O setup problems.
    async fn prepare(&mut self) -> Result<(), RecorderError>;

    /// Begin capturing. Fails with [`RecorderError::Start`] when the device
    /// rejects the session at runtime.
    async fn start(&mut self) -> Result<(), RecorderError>;

    /// Stop capturing, finalizing the output file best-effort.
    async fn stop(&mut self) -> Result<(), RecorderError>;

    /// Peak amplitude since the last call; backends without metering report 0.
    fn max_amplitude(&mut self) -> i32 {
        0
    }

    /// Take the channel on which the backend reports asynchronous faults
    /// (e.g. the capture process dying mid-session). `None` if the backend
    /// cannot fail asynchronously. Callable once, after `start`.
    fn fault_events(&mut self) -> Option<mpsc::Receiver<RecorderFault>> {
        None
    }
}

/// Creates one backend per session start.
pub trait RecorderFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn RecorderBackend>>;
}
