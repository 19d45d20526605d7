use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::handle::{Command, SessionHandle, SessionStatus, StartRequest};
use crate::estimator::{RemainingTimeEstimator, StorageLimit};
use crate::events::{ErrorCode, SessionEvent};
use crate::notify::{NoteKind, Notification, NotificationPort};
use crate::platform::{DeviceStateProbe, FreeSpace, WakeLock};
use crate::profile::EncoderProfile;
use crate::recorder::{RecorderFactory, RecorderFault};

const POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Warn when less than half an hour of capacity remains.
const LOW_STORAGE_WARN_SECS: i64 = 1800;
const COMMAND_QUEUE_DEPTH: usize = 32;
const EVENT_QUEUE_DEPTH: usize = 64;

/// Collaborators injected into the controller.
pub struct ControllerDeps {
    pub recorders: Box<dyn RecorderFactory>,
    pub notifier: Arc<dyn NotificationPort>,
    pub device: Arc<dyn DeviceStateProbe>,
    pub wake_lock: Arc<dyn WakeLock>,
    pub disk: Arc<dyn FreeSpace>,
    /// Sampling rate applied to the fixed-rate encoder profiles.
    pub default_sample_rate: u32,
}

struct ActiveSession {
    recorder: Box<dyn crate::recorder::RecorderBackend>,
    path: PathBuf,
}

/// The session state machine. Owns the recorder handle for the active
/// session; the handle exists iff the state is Recording.
pub struct SessionController {
    deps: ControllerDeps,
    estimator: RemainingTimeEstimator,
    session: Option<ActiveSession>,
    monitoring: bool,
    /// Bumped on every successful start; stale backend faults carry an older
    /// epoch and are dropped.
    epoch: u64,
    last_path: Option<PathBuf>,
    last_started_at: Option<DateTime<Utc>>,
    events: broadcast::Sender<SessionEvent>,
    cmd_tx: mpsc::Sender<Command>,
}

impl SessionController {
    /// Spawn the controller actor and return its handle.
    pub fn spawn(deps: ControllerDeps) -> SessionHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (events, _) = broadcast::channel(EVENT_QUEUE_DEPTH);

        let estimator = RemainingTimeEstimator::new(deps.disk.clone());
        let controller = Self {
            deps,
            estimator,
            session: None,
            monitoring: false,
            epoch: 0,
            last_path: None,
            last_started_at: None,
            events: events.clone(),
            cmd_tx: cmd_tx.clone(),
        };
        tokio::spawn(controller.run(cmd_rx));

        SessionHandle { tx: cmd_tx, events }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut poll = tokio::time::interval(POLL_INTERVAL);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                _ = poll.tick() => {
                    if self.monitoring && self.session.is_some() {
                        self.poll_remaining().await;
                    }
                }
            }
        }

        // All handles dropped: release whatever is still held.
        if self.session.is_some() {
            self.handle_stop().await;
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start(req) => self.handle_start(req).await,
            Command::Stop => self.handle_stop().await,
            Command::EnableMonitoring => self.handle_enable_monitoring().await,
            Command::DisableMonitoring => self.handle_disable_monitoring(),
            Command::LowMemory => {
                if self.session.is_some() {
                    info!("low-memory signal, stopping recording");
                }
                self.handle_stop().await;
            }
            Command::ResourceError { epoch, fault } => {
                self.handle_resource_error(epoch, fault).await;
            }
            Command::Status(reply) => {
                let _ = reply.send(self.status());
            }
        }
    }

    async fn handle_start(&mut self, req: StartRequest) {
        if self.session.is_some() {
            // Idempotent: a start while recording leaves the session untouched.
            return;
        }

        let profile =
            EncoderProfile::select(req.format, req.high_quality, self.deps.default_sample_rate);

        self.estimator.reset();
        self.estimator.set_target(&req.path);
        if req.max_file_size != -1 {
            // Only -1 disables the cap; an explicit zero-byte cap is honored
            // and stops the session on the first monitor poll.
            self.estimator
                .set_file_size_limit(req.max_file_size.max(0) as u64);
        }
        self.estimator.set_bit_rate(profile.byte_rate);

        let mut recorder = match self.deps.recorders.create() {
            Ok(recorder) => recorder,
            Err(e) => {
                error!("failed to create recorder backend: {:#}", e);
                self.emit(SessionEvent::Error {
                    code: ErrorCode::Internal,
                });
                return;
            }
        };

        if let Err(e) = recorder.configure(&profile, &req.path) {
            error!("recorder configure failed: {}", e);
            self.emit(SessionEvent::Error {
                code: ErrorCode::Internal,
            });
            return;
        }

        // Preparation failure: release the half-initialized recorder (drop)
        // and stay idle.
        if let Err(e) = recorder.prepare().await {
            error!("recorder prepare failed: {}", e);
            self.emit(SessionEvent::Error {
                code: ErrorCode::Internal,
            });
            return;
        }

        if let Err(e) = recorder.start().await {
            let code = if self.deps.device.in_call() {
                ErrorCode::InCallRecord
            } else {
                ErrorCode::Internal
            };
            error!("recorder start failed ({:?}): {}", code, e);
            self.emit(SessionEvent::Error { code });
            return;
        }

        self.epoch += 1;
        if let Some(mut faults) = recorder.fault_events() {
            // Backend faults enter the same serialized channel as commands.
            let tx = self.cmd_tx.clone();
            let epoch = self.epoch;
            tokio::spawn(async move {
                while let Some(fault) = faults.recv().await {
                    if tx.send(Command::ResourceError { epoch, fault }).await.is_err() {
                        break;
                    }
                }
            });
        }

        let started_at = Utc::now();
        self.deps.wake_lock.acquire();
        self.monitoring = false;
        self.last_path = Some(req.path.clone());
        self.last_started_at = Some(started_at);
        info!("recording started: {} ({:?})", req.path.display(), profile.format);
        self.session = Some(ActiveSession {
            recorder,
            path: req.path,
        });
        self.emit(SessionEvent::StateChanged { recording: true });
        self.deps.notifier.post(Notification::Recording);
        self.deps.notifier.cancel(NoteKind::LowStorage);
    }

    async fn handle_stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let ActiveSession { mut recorder, path } = session;

        self.monitoring = false;

        // Best effort: a stop-time fault is swallowed so the partial output
        // survives; the recording up to this point already succeeded.
        if let Err(e) = recorder.stop().await {
            warn!("recorder stop failed, keeping partial output: {}", e);
        }
        drop(recorder);
        self.deps.wake_lock.release();

        info!("recording stopped: {}", path.display());
        self.emit(SessionEvent::StateChanged { recording: false });
        self.deps.notifier.post(Notification::Stopped { path });
        self.deps.notifier.cancel(NoteKind::Recording);
        // An auto-stop can arrive right after a low-storage warning; clear it
        // so the stale cue does not outlive the session.
        self.deps.notifier.cancel(NoteKind::LowStorage);
    }

    async fn handle_enable_monitoring(&mut self) {
        if self.session.is_none() {
            return;
        }
        self.monitoring = true;
        // First poll runs immediately; the interval takes over from here.
        self.poll_remaining().await;
    }

    fn handle_disable_monitoring(&mut self) {
        self.monitoring = false;
        if self.session.is_some() {
            // The progress-consuming UI is gone: fall back to the persistent
            // notification and drop the transient storage cue.
            self.deps.notifier.post(Notification::Recording);
            self.deps.notifier.cancel(NoteKind::LowStorage);
        }
    }

    async fn handle_resource_error(&mut self, epoch: u64, fault: RecorderFault) {
        if self.session.is_none() || epoch != self.epoch {
            // Fault from a backend that has already been released.
            return;
        }
        error!("recorder fault (code {}): {}", fault.code, fault.message);
        self.emit(SessionEvent::Error {
            code: ErrorCode::Internal,
        });
        self.handle_stop().await;
    }

    /// One monitor tick: auto-stop on exhaustion, warn when disk space (not
    /// the file-size cap) is about to run out.
    async fn poll_remaining(&mut self) {
        let secs = match self.estimator.time_remaining() {
            Ok(secs) => secs,
            Err(e) => {
                // A failed probe skips the tick rather than killing a healthy
                // session.
                warn!("remaining-time estimate failed: {:#}", e);
                return;
            }
        };

        if secs <= 0 {
            info!("storage capacity exhausted, stopping recording");
            self.handle_stop().await;
            return;
        }

        if secs <= LOW_STORAGE_WARN_SECS
            && self.estimator.current_lower_limit() == StorageLimit::DiskSpace
            && !self.deps.device.screen_locked()
        {
            let minutes = ((secs + 59) / 60) as u32;
            self.deps
                .notifier
                .post(Notification::LowStorage { minutes });
        }
    }

    fn status(&mut self) -> SessionStatus {
        let max_amplitude = self
            .session
            .as_mut()
            .map(|s| s.recorder.max_amplitude())
            .unwrap_or(0);
        SessionStatus {
            recording: self.session.is_some(),
            monitoring: self.monitoring,
            file_path: self.last_path.clone(),
            started_at: self.last_started_at,
            max_amplitude,
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine; events are fire-and-forget.
        let _ = self.events.send(event);
    }
}
