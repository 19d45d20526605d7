use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::Result;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use super::backend::{RecorderBackend, RecorderError, RecorderFactory, RecorderFault};
use crate::profile::EncoderProfile;

/// Recorder backend that drives a sox `rec` subprocess.
///
/// sox selects the codec from the output file extension, so the encoder
/// variant in the profile is expressed through the path plus the sample rate
/// and channel arguments. A watcher task owns the child: an unexpected exit
/// surfaces as a [`RecorderFault`], a stop request terminates it gracefully
/// (SIGTERM first, so sox finalizes the file) before killing.
pub struct SoxRecorder {
    setup: Option<Setup>,
    running: Option<Running>,
    fault_rx: Option<mpsc::Receiver<RecorderFault>>,
}

struct Setup {
    profile: EncoderProfile,
    output: PathBuf,
}

struct Running {
    stop_tx: mpsc::Sender<oneshot::Sender<()>>,
}

impl SoxRecorder {
    pub fn new() -> Self {
        Self {
            setup: None,
            running: None,
            fault_rx: None,
        }
    }
}

impl Default for SoxRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RecorderBackend for SoxRecorder {
    fn configure(&mut self, profile: &EncoderProfile, output: &Path) -> Result<(), RecorderError> {
        self.setup = Some(Setup {
            profile: *profile,
            output: output.to_path_buf(),
        });
        Ok(())
    }

    async fn prepare(&mut self) -> Result<(), RecorderError> {
        let setup = self.setup.as_ref().ok_or(RecorderError::NotConfigured)?;
        if let Some(parent) = setup.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        // MediaRecorder-style prepare: the output file must be creatable now,
        // not when the first sample arrives.
        tokio::fs::File::create(&setup.output).await?;
        Ok(())
    }

    async fn start(&mut self) -> Result<(), RecorderError> {
        let setup = self.setup.as_ref().ok_or(RecorderError::NotConfigured)?;

        let mut cmd = Command::new("rec");
        cmd.arg("-q")
            .args(["-r", &setup.profile.sample_rate.to_string()])
            .args(["-c", &setup.profile.channels.to_string()])
            .arg(&setup.output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd
            .spawn()
            .map_err(|e| RecorderError::Start(format!("failed to spawn rec: {e}")))?;

        info!(
            "capture started: {} ({:?} @ {} Hz)",
            setup.output.display(),
            setup.profile.encoder,
            setup.profile.sample_rate
        );

        let (fault_tx, fault_rx) = mpsc::channel(4);
        let (stop_tx, stop_rx) = mpsc::channel(1);
        tokio::spawn(watch_child(child, stop_rx, fault_tx));

        self.fault_rx = Some(fault_rx);
        self.running = Some(Running { stop_tx });
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), RecorderError> {
        let running = self
            .running
            .take()
            .ok_or_else(|| RecorderError::Device("recorder is not running".into()))?;

        let (ack_tx, ack_rx) = oneshot::channel();
        running
            .stop_tx
            .send(ack_tx)
            .await
            .map_err(|_| RecorderError::Device("capture process already exited".into()))?;
        ack_rx
            .await
            .map_err(|_| RecorderError::Device("capture watcher went away".into()))?;
        Ok(())
    }

    fn fault_events(&mut self) -> Option<mpsc::Receiver<RecorderFault>> {
        self.fault_rx.take()
    }
}

/// Owns the `rec` child for the session. Dropping the recorder closes the
/// stop channel, which also terminates the child.
async fn watch_child(
    mut child: Child,
    mut stop_rx: mpsc::Receiver<oneshot::Sender<()>>,
    fault_tx: mpsc::Sender<RecorderFault>,
) {
    tokio::select! {
        status = child.wait() => {
            let code = status.ok().and_then(|s| s.code()).unwrap_or(-1);
            warn!("capture process exited unexpectedly with status {}", code);
            let _ = fault_tx
                .send(RecorderFault {
                    code,
                    message: format!("capture process exited with status {code}"),
                })
                .await;
        }
        req = stop_rx.recv() => {
            terminate(child).await;
            if let Some(ack) = req {
                let _ = ack.send(());
            }
        }
    }
}

/// SIGTERM first so sox can flush headers, then kill.
async fn terminate(mut child: Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        let _ = Command::new("kill")
            .args(["-TERM", &pid.to_string()])
            .output()
            .await;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    let _ = child.start_kill();
    let _ = child.wait().await;
}

/// Factory used by the service binary.
pub struct SoxRecorderFactory;

impl RecorderFactory for SoxRecorderFactory {
    fn create(&self) -> Result<Box<dyn RecorderBackend>> {
        Ok(Box::new(SoxRecorder::new()))
    }
}
