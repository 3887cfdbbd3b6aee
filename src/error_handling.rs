//! Error types shared across the crate.
//!
//! Every failure a request can hit ends up as a [`types::ServiceError`], which knows the
//! HTTP status and the client-facing message. Underlying causes (I/O errors, paths) stay
//! in the logs.

pub mod types;
