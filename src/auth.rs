//! Request authentication
//!
//! Three independent schemes guard the HTTP surface:
//! - ingestion bearer token (`POST /capture`),
//! - admin bearer token (`GET /admin/captures`),
//! - admin basic auth, password only (`DELETE /admin/captures/:filename`, `GET /admin/viewer`).
//!
//! Components:
//! - `comparator`: constant-time credential comparison.
//! - `guard`: the [`AuthGuard`] policy variants.
//! - `types`: secrets, configuration and rejection payloads.

pub mod comparator;
pub mod guard;
pub mod types;

pub use comparator::constant_time_eq;
pub use guard::AuthGuard;
pub use types::{AuthConfig, AuthRejection, Secret};
