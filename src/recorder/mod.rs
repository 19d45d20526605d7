//! The opaque recording resource the controller drives.
//!
//! The controller only sees [`RecorderBackend`]: configure, prepare, start,
//! stop; dropping the handle releases the resource. One real implementation
//! ships here (a sox `rec` subprocess); tests and embedders inject their own
//! through [`RecorderFactory`].

mod backend;
mod sox;

pub use backend::{RecorderBackend, RecorderError, RecorderFactory, RecorderFault};
pub use sox::{SoxRecorder, SoxRecorderFactory};
