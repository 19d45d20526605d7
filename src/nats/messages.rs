use serde::{Deserialize, Serialize};

use crate::events::SessionEvent;

/// Control command received on `<service>.control`
#[derive(Debug, Serialize, Deserialize)]
pub struct ControlMessage {
    pub action: ControlAction,
    /// Output format name (start only); unrecognized values fall back to mp3
    pub format: Option<String>,
    /// Output file path (start only)
    pub path: Option<String>,
    pub high_quality: Option<bool>,
    /// Maximum output size in bytes; -1 = unlimited (start only)
    pub max_file_size: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    Start,
    Stop,
    EnableMonitoring,
    DisableMonitoring,
}

/// Session event published to `<service>.events`
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionEventMessage {
    pub service: String,
    pub timestamp: String, // RFC3339 timestamp
    #[serde(flatten)]
    pub event: SessionEvent,
}
