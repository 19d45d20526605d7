// Shared test doubles for the session controller: scripted recorder backends,
// a recording notification port, counting wake lock, and a scripted disk.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use soundrec::events::SessionEvent;
use soundrec::notify::{NoteKind, Notification, NotificationPort};
use soundrec::platform::{DeviceStateProbe, FreeSpace, WakeLock};
use soundrec::profile::{EncoderProfile, OutputFormat};
use soundrec::recorder::{RecorderBackend, RecorderError, RecorderFactory, RecorderFault};
use soundrec::session::{ControllerDeps, SessionController, SessionHandle, StartRequest};

/// Notification port that records every post/cancel.
#[derive(Default)]
pub struct RecordingNotifier {
    posts: Mutex<Vec<Notification>>,
    cancels: Mutex<Vec<NoteKind>>,
}

impl RecordingNotifier {
    pub fn posted(&self) -> Vec<Notification> {
        self.posts.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<NoteKind> {
        self.cancels.lock().unwrap().clone()
    }

    pub fn low_storage_minutes(&self) -> Vec<u32> {
        self.posted()
            .into_iter()
            .filter_map(|n| match n {
                Notification::LowStorage { minutes } => Some(minutes),
                _ => None,
            })
            .collect()
    }
}

impl NotificationPort for RecordingNotifier {
    fn post(&self, note: Notification) {
        self.posts.lock().unwrap().push(note);
    }

    fn cancel(&self, kind: NoteKind) {
        self.cancels.lock().unwrap().push(kind);
    }
}

/// Wake lock that counts acquire/release calls.
#[derive(Default)]
pub struct CountingWakeLock {
    pub acquires: AtomicUsize,
    pub releases: AtomicUsize,
}

impl CountingWakeLock {
    pub fn counts(&self) -> (usize, usize) {
        (
            self.acquires.load(Ordering::SeqCst),
            self.releases.load(Ordering::SeqCst),
        )
    }
}

impl WakeLock for CountingWakeLock {
    fn acquire(&self) {
        self.acquires.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Device probe with settable in-call / lock-screen state.
#[derive(Default)]
pub struct FakeProbe {
    pub in_call: AtomicBool,
    pub locked: AtomicBool,
}

impl DeviceStateProbe for FakeProbe {
    fn in_call(&self) -> bool {
        self.in_call.load(Ordering::SeqCst)
    }

    fn screen_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }
}

/// Disk probe returning a scripted sequence of free-byte values; a `None`
/// entry makes that probe fail, and the last successful value repeats once
/// the script is exhausted.
pub struct FakeDisk {
    values: Mutex<VecDeque<Option<u64>>>,
    last: Mutex<u64>,
}

impl FakeDisk {
    pub fn new(values: &[u64]) -> Self {
        Self::scripted(values.iter().map(|v| Some(*v)).collect())
    }

    pub fn returning(value: u64) -> Self {
        Self::new(&[value])
    }

    pub fn scripted(values: Vec<Option<u64>>) -> Self {
        let last = values.iter().rev().find_map(|v| *v).unwrap_or(0);
        Self {
            values: Mutex::new(values.into()),
            last: Mutex::new(last),
        }
    }
}

impl FreeSpace for FakeDisk {
    fn free_bytes(&self, _path: &Path) -> io::Result<u64> {
        let mut values = self.values.lock().unwrap();
        match values.pop_front() {
            Some(Some(value)) => {
                *self.last.lock().unwrap() = value;
                Ok(value)
            }
            Some(None) => Err(io::Error::new(io::ErrorKind::Other, "statfs failed")),
            None => Ok(*self.last.lock().unwrap()),
        }
    }
}

/// Recorder backend with scripted failures at each lifecycle phase.
pub struct ScriptedRecorder {
    prepare_error: Option<RecorderError>,
    start_error: Option<RecorderError>,
    stop_error: Option<RecorderError>,
    amplitude: i32,
    fault_rx: Option<mpsc::Receiver<RecorderFault>>,
}

impl ScriptedRecorder {
    pub fn ok() -> Self {
        Self {
            prepare_error: None,
            start_error: None,
            stop_error: None,
            amplitude: 0,
            fault_rx: None,
        }
    }

    pub fn with_amplitude(amplitude: i32) -> Self {
        Self {
            amplitude,
            ..Self::ok()
        }
    }

    pub fn failing_prepare() -> Self {
        Self {
            prepare_error: Some(RecorderError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "cannot open output",
            ))),
            ..Self::ok()
        }
    }

    pub fn failing_start() -> Self {
        Self {
            start_error: Some(RecorderError::Start("device busy".into())),
            ..Self::ok()
        }
    }

    pub fn failing_stop() -> Self {
        Self {
            stop_error: Some(RecorderError::Device("encoder hung".into())),
            ..Self::ok()
        }
    }

    /// Recorder plus a sender the test uses to inject a mid-session fault.
    pub fn with_fault_channel() -> (Self, mpsc::Sender<RecorderFault>) {
        let (tx, rx) = mpsc::channel(4);
        (
            Self {
                fault_rx: Some(rx),
                ..Self::ok()
            },
            tx,
        )
    }
}

#[async_trait::async_trait]
impl RecorderBackend for ScriptedRecorder {
    fn configure(&mut self, _profile: &EncoderProfile, _output: &Path) -> Result<(), RecorderError> {
        Ok(())
    }

    async fn prepare(&mut self) -> Result<(), RecorderError> {
        match self.prepare_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn start(&mut self) -> Result<(), RecorderError> {
        match self.start_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn stop(&mut self) -> Result<(), RecorderError> {
        match self.stop_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn max_amplitude(&mut self) -> i32 {
        self.amplitude
    }

    fn fault_events(&mut self) -> Option<mpsc::Receiver<RecorderFault>> {
        self.fault_rx.take()
    }
}

/// Hands out scripted recorders in order, one per session start.
pub struct ScriptedFactory {
    recorders: Mutex<VecDeque<ScriptedRecorder>>,
}

impl ScriptedFactory {
    pub fn new(recorders: Vec<ScriptedRecorder>) -> Self {
        Self {
            recorders: Mutex::new(recorders.into()),
        }
    }
}

impl RecorderFactory for ScriptedFactory {
    fn create(&self) -> Result<Box<dyn RecorderBackend>> {
        self.recorders
            .lock()
            .unwrap()
            .pop_front()
            .map(|r| Box::new(r) as Box<dyn RecorderBackend>)
            .ok_or_else(|| anyhow::anyhow!("no scripted recorder left"))
    }
}

/// A spawned controller plus handles to all its fakes.
pub struct Harness {
    pub handle: SessionHandle,
    pub notifier: Arc<RecordingNotifier>,
    pub wake_lock: Arc<CountingWakeLock>,
    pub probe: Arc<FakeProbe>,
}

pub fn spawn_controller(recorders: Vec<ScriptedRecorder>, disk: FakeDisk) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let wake_lock = Arc::new(CountingWakeLock::default());
    let probe = Arc::new(FakeProbe::default());

    let handle = SessionController::spawn(ControllerDeps {
        recorders: Box::new(ScriptedFactory::new(recorders)),
        notifier: notifier.clone(),
        device: probe.clone(),
        wake_lock: wake_lock.clone(),
        disk: Arc::new(disk),
        default_sample_rate: 44100,
    });

    Harness {
        handle,
        notifier,
        wake_lock,
        probe,
    }
}

/// A plain start request against a temp path.
pub fn start_request(path: &Path) -> StartRequest {
    StartRequest {
        format: OutputFormat::Aac3gp,
        path: path.to_path_buf(),
        high_quality: false,
        max_file_size: -1,
    }
}

/// Collect every event currently buffered on the subscription. Callers
/// round-trip a status query first so the actor has settled.
pub fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Wait until the controller reports idle, failing after two seconds.
pub async fn wait_until_idle(handle: &SessionHandle) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if !handle.is_recording().await.unwrap() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("controller did not return to idle in time");
}

pub fn temp_output(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}
