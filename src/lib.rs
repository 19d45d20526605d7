pub mod config;
pub mod estimator;
pub mod events;
pub mod http;
pub mod nats;
pub mod notify;
pub mod platform;
pub mod profile;
pub mod recorder;
pub mod session;

pub use config::Config;
pub use estimator::{RemainingTimeEstimator, StorageLimit};
pub use events::{ErrorCode, SessionEvent};
pub use http::{create_router, AppState};
pub use nats::{NatsBridge, SessionEventMessage};
pub use notify::{LogNotifier, NoteKind, Notification, NotificationPort};
pub use platform::{
    DeviceStateProbe, FreeSpace, LogWakeLock, SystemDeviceProbe, SystemDisk, WakeLock,
};
pub use profile::{Encoder, EncoderProfile, OutputFormat};
pub use recorder::{
    RecorderBackend, RecorderError, RecorderFactory, RecorderFault, SoxRecorder,
    SoxRecorderFactory,
};
pub use session::{ControllerDeps, SessionController, SessionHandle, SessionStatus, StartRequest};
