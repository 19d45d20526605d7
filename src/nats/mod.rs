//! NATS bridge: republishes session events to `<service>.events` and accepts
//! JSON control commands on `<service>.control`, for deployments where the
//! embedding system talks over a message bus instead of HTTP.

pub mod client;
pub mod messages;

pub use client::NatsBridge;
pub use messages::{ControlAction, ControlMessage, SessionEventMessage};
