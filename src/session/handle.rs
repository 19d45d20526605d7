use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::events::SessionEvent;
use crate::profile::OutputFormat;
use crate::recorder::RecorderFault;

/// Parameters of a start command.
#[derive(Debug, Clone)]
pub struct StartRequest {
    pub format: OutputFormat,
    /// Absolute path of the output file.
    pub path: PathBuf,
    pub high_quality: bool,
    /// Maximum output size in bytes; -1 means unlimited. Any other value,
    /// including 0, configures a cap.
    pub max_file_size: i64,
}

/// Read-only snapshot of the controller's state.
///
/// `file_path` and `started_at` are retained from the last session after a
/// stop, until the next start overwrites them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub recording: bool,
    pub monitoring: bool,
    pub file_path: Option<PathBuf>,
    pub started_at: Option<DateTime<Utc>>,
    pub max_amplitude: i32,
}

pub(crate) enum Command {
    Start(StartRequest),
    Stop,
    EnableMonitoring,
    DisableMonitoring,
    LowMemory,
    /// Asynchronous fault from the recorder backend, tagged with the session
    /// epoch it belongs to so faults from a released backend are ignored.
    ResourceError { epoch: u64, fault: RecorderFault },
    Status(oneshot::Sender<SessionStatus>),
}

/// Cloneable handle to the controller actor.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) tx: mpsc::Sender<Command>,
    pub(crate) events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    async fn send(&self, cmd: Command) -> Result<()> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| anyhow!("session controller is gone"))
    }

    /// Request a recording start. Returns once the command is queued;
    /// failures surface on the event bus.
    pub async fn start(&self, req: StartRequest) -> Result<()> {
        self.send(Command::Start(req)).await
    }

    /// Request a recording stop. No-op when idle.
    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    /// Turn the remaining-time monitor on; the first poll runs immediately.
    pub async fn enable_monitoring(&self) -> Result<()> {
        self.send(Command::EnableMonitoring).await
    }

    pub async fn disable_monitoring(&self) -> Result<()> {
        self.send(Command::DisableMonitoring).await
    }

    /// System memory pressure: the session is stopped and not resumable.
    pub async fn notify_low_memory(&self) -> Result<()> {
        self.send(Command::LowMemory).await
    }

    pub async fn status(&self) -> Result<SessionStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Status(reply_tx)).await?;
        reply_rx
            .await
            .context("session controller dropped the status request")
    }

    pub async fn is_recording(&self) -> Result<bool> {
        Ok(self.status().await?.recording)
    }

    pub async fn current_file_path(&self) -> Result<Option<PathBuf>> {
        Ok(self.status().await?.file_path)
    }

    pub async fn session_start_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.status().await?.started_at)
    }

    /// Peak amplitude since the last query; 0 when idle.
    pub async fn max_amplitude(&self) -> Result<i32> {
        Ok(self.status().await?.max_amplitude)
    }

    /// Subscribe to state-changed and error events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
