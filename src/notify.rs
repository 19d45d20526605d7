use std::path::PathBuf;

use tracing::info;

/// Notification kinds, used as cancellation handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    Recording,
    Stopped,
    LowStorage,
}

/// User-visible status notifications posted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Persistent "recording in progress" indicator
    Recording,
    /// Recording finished; carries the produced file so the embedder can
    /// offer to open it
    Stopped { path: PathBuf },
    /// Storage is running out; minutes of capacity left (ceiling)
    LowStorage { minutes: u32 },
}

impl Notification {
    pub fn kind(&self) -> NoteKind {
        match self {
            Notification::Recording => NoteKind::Recording,
            Notification::Stopped { .. } => NoteKind::Stopped,
            Notification::LowStorage { .. } => NoteKind::LowStorage,
        }
    }
}

/// Outbound-only notification surface. Posting the same kind twice replaces
/// the previous notification; the controller never reads anything back.
pub trait NotificationPort: Send + Sync {
    fn post(&self, note: Notification);
    fn cancel(&self, kind: NoteKind);
}

/// Default port for headless deployments: structured log lines.
#[derive(Default)]
pub struct LogNotifier;

impl NotificationPort for LogNotifier {
    fn post(&self, note: Notification) {
        match note {
            Notification::Recording => info!("notification: recording in progress"),
            Notification::Stopped { path } => {
                info!("notification: recording stopped, saved to {}", path.display())
            }
            Notification::LowStorage { minutes } => {
                info!("notification: low storage, about {} minute(s) left", minutes)
            }
        }
    }

    fn cancel(&self, kind: NoteKind) {
        info!("notification cancelled: {:?}", kind);
    }
}
