use chrono::{DateTime, Utc};

/// One stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Directory entry name, unique within the store.
    pub filename: String,
    pub size_bytes: u64,
    /// Birth time of the file, or its modification time on filesystems without one.
    pub created_at: DateTime<Utc>,
    pub content: Vec<u8>,
}
