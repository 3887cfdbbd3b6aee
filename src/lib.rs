pub mod auth;
pub use auth::{AuthConfig, AuthGuard, AuthRejection, Secret};

pub mod capture_service;
pub use capture_service::{CaptureRequest, CaptureService, SavedCapture};

pub mod configuration;

pub mod error_handling;

pub mod storage;
pub use storage::{Capture, CaptureStorage, FileStorage};

pub mod web_interface;
