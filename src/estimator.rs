use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{ensure, Context, Result};

use crate::platform::FreeSpace;

/// Which constraint currently yields the smaller remaining-time estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLimit {
    DiskSpace,
    FileSizeCap,
}

/// Estimates how many seconds of recording capacity remain for the active
/// session, under free disk space and an optional file-size cap.
///
/// State is reset at each session start; the disk probe is injected so tests
/// can script free-space values.
pub struct RemainingTimeEstimator {
    disk: Arc<dyn FreeSpace>,
    byte_rate: u64,
    target: Option<PathBuf>,
    cap_bytes: Option<u64>,
    current_limit: StorageLimit,
}

impl RemainingTimeEstimator {
    pub fn new(disk: Arc<dyn FreeSpace>) -> Self {
        Self {
            disk,
            byte_rate: 0,
            target: None,
            cap_bytes: None,
            current_limit: StorageLimit::DiskSpace,
        }
    }

    /// Clear cap, rate, and target for a new session.
    pub fn reset(&mut self) {
        self.byte_rate = 0;
        self.target = None;
        self.cap_bytes = None;
        self.current_limit = StorageLimit::DiskSpace;
    }

    /// Set the output path; free space is measured on its filesystem and the
    /// cap (if any) is checked against its current size.
    pub fn set_target(&mut self, path: &Path) {
        self.target = Some(path.to_path_buf());
    }

    /// Record an explicit maximum output size in bytes.
    pub fn set_file_size_limit(&mut self, max_bytes: u64) {
        self.cap_bytes = Some(max_bytes);
    }

    /// Set the divisor used to convert free bytes into seconds.
    pub fn set_bit_rate(&mut self, bytes_per_second: u64) {
        self.byte_rate = bytes_per_second;
    }

    /// Seconds remaining under the binding constraint; zero or negative means
    /// capacity is exhausted. Also updates [`current_lower_limit`].
    ///
    /// [`current_lower_limit`]: Self::current_lower_limit
    pub fn time_remaining(&mut self) -> Result<i64> {
        let target = self.target.as_deref().context("estimator has no target path")?;
        ensure!(self.byte_rate > 0, "estimator byte rate not set");

        let free = self
            .disk
            .free_bytes(target)
            .with_context(|| format!("free-space probe failed for {}", target.display()))?;
        let disk_secs = (free / self.byte_rate) as i64;

        let (secs, limit) = match self.cap_bytes {
            Some(cap) => {
                let written = fs::metadata(target).map(|m| m.len()).unwrap_or(0);
                let cap_secs = (cap.saturating_sub(written) / self.byte_rate) as i64;
                if cap_secs < disk_secs {
                    (cap_secs, StorageLimit::FileSizeCap)
                } else {
                    (disk_secs, StorageLimit::DiskSpace)
                }
            }
            None => (disk_secs, StorageLimit::DiskSpace),
        };

        self.current_limit = limit;
        Ok(secs)
    }

    /// The constraint that bound the most recent [`time_remaining`] call.
    ///
    /// [`time_remaining`]: Self::time_remaining
    pub fn current_lower_limit(&self) -> StorageLimit {
        self.current_limit
    }
}
