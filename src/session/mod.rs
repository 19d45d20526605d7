//! Recording session controller.
//!
//! A single actor task owns the session state machine. All entry points
//! (control commands, the remaining-time monitor, and asynchronous backend
//! faults) are serialized through one command channel, so state transitions
//! never race. Observers watch the broadcast event bus; commands themselves
//! are fire-and-forget.

mod controller;
mod handle;

pub use controller::{ControllerDeps, SessionController};
pub use handle::{SessionHandle, SessionStatus, StartRequest};
