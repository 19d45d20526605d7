//! HTTP API for external control of the recording session:
//! - POST /recorder/start - begin a recording session
//! - POST /recorder/stop - end the active session
//! - POST /recorder/monitor/enable - turn the remaining-time monitor on
//! - POST /recorder/monitor/disable - turn it off
//! - GET /recorder/status - query session state
//! - GET /health - health check
//!
//! Command endpoints are fire-and-forget: they return 202 Accepted once the
//! command is queued, and failures surface on the event bus.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
