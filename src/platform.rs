//! Platform collaborator seams: device state probes, the wake lock, and the
//! free-disk-space query. The controller only talks to these traits; the
//! default implementations here suit a headless service, and embedders with a
//! real telephony/lock-screen/power stack supply their own.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

/// Read-only device state consulted by the controller.
pub trait DeviceStateProbe: Send + Sync {
    /// Whether the device is currently in an exclusive voice call. Decides
    /// how a start-time runtime failure is classified.
    fn in_call(&self) -> bool;

    /// Whether the lock screen is active. Low-storage warnings are suppressed
    /// while it is.
    fn screen_locked(&self) -> bool;
}

/// Probe for hosts without telephony or a lock screen.
pub struct SystemDeviceProbe;

impl DeviceStateProbe for SystemDeviceProbe {
    fn in_call(&self) -> bool {
        false
    }

    fn screen_locked(&self) -> bool {
        false
    }
}

/// Keeps the system awake for the duration of a recording session.
///
/// The controller acquires exactly once per successful start and releases
/// exactly once per stop/error/low-memory path.
pub trait WakeLock: Send + Sync {
    fn acquire(&self);
    fn release(&self);
}

/// Default wake lock: tracks held state and logs transitions. Release is
/// idempotent so duplicate teardown signals are harmless.
#[derive(Default)]
pub struct LogWakeLock {
    held: AtomicBool,
}

impl WakeLock for LogWakeLock {
    fn acquire(&self) {
        if !self.held.swap(true, Ordering::SeqCst) {
            info!("wake lock acquired");
        }
    }

    fn release(&self) {
        if self.held.swap(false, Ordering::SeqCst) {
            info!("wake lock released");
        }
    }
}

/// Free-space query for the filesystem holding a given path.
pub trait FreeSpace: Send + Sync {
    fn free_bytes(&self, path: &Path) -> io::Result<u64>;
}

/// Real disk probe. The output file may not exist yet when the estimator
/// first asks, so fall back to its parent directory.
pub struct SystemDisk;

impl FreeSpace for SystemDisk {
    fn free_bytes(&self, path: &Path) -> io::Result<u64> {
        let probe = if path.exists() {
            path
        } else {
            path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| {
                warn!("no parent directory for {}, probing cwd", path.display());
                Path::new(".")
            })
        };
        fs2::available_space(probe)
    }
}
