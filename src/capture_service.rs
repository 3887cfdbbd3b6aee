//! Capture endpoints without the HTTP layer.
//!
//! [`CaptureService`] runs the route's guard, then the filename generator or the path
//! guard, then the store, and returns plain data or a [`ServiceError`]. The web layer
//! only serialises what comes back.

pub mod request;
pub mod service;

pub use request::CaptureRequest;
pub use service::{CaptureService, SavedCapture};
