use serde::{Deserialize, Serialize};

/// Classified failure codes surfaced on the event bus.
///
/// Capacity exhaustion is deliberately absent: running out of storage is a
/// normal stop trigger, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Resource preparation, start, or mid-session runtime failure
    Internal,
    /// Start rejected because the device is in an exclusive voice call
    InCallRecord,
}

/// Events published by the session controller.
///
/// Fire-and-forget: commands never report failures to their caller, they
/// surface here instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Emitted on every successful start/stop transition. Never emitted
    /// before the recorder has actually started (true) or been released
    /// (false).
    StateChanged { recording: bool },
    /// Emitted once per classified failure.
    Error { code: ErrorCode },
}
