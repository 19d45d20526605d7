use crate::session::SessionHandle;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Handle to the session controller actor
    pub handle: SessionHandle,
}

impl AppState {
    pub fn new(handle: SessionHandle) -> Self {
        Self { handle }
    }
}
