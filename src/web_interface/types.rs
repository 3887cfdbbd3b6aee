use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::capture_service::SavedCapture;
use crate::storage::Capture;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct CaptureSavedResponse {
    pub success: bool,
    pub message: &'static str,
    pub filename: String,
    pub date: String,
}

impl From<SavedCapture> for CaptureSavedResponse {
    fn from(saved: SavedCapture) -> Self {
        Self {
            success: true,
            message: "Capture saved",
            filename: saved.filename,
            date: saved.date,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSummary {
    pub filename: String,
    pub size: u64,
    pub created_at: String, // ISO8601, milliseconds
    pub url: String,        // data URL
}

impl From<&Capture> for CaptureSummary {
    fn from(capture: &Capture) -> Self {
        Self {
            filename: capture.filename.clone(),
            size: capture.size_bytes,
            created_at: iso_timestamp(&capture.created_at),
            url: png_data_url(&capture.content),
        }
    }
}

#[derive(Serialize)]
pub struct CaptureListResponse {
    pub captures: Vec<CaptureSummary>,
    pub count: usize,
}

impl From<&[Capture]> for CaptureListResponse {
    fn from(captures: &[Capture]) -> Self {
        let captures: Vec<CaptureSummary> = captures.iter().map(CaptureSummary::from).collect();
        Self {
            count: captures.len(),
            captures,
        }
    }
}

#[derive(Serialize)]
pub struct CaptureDeletedResponse {
    pub success: bool,
    pub message: &'static str,
    pub filename: String,
}

impl CaptureDeletedResponse {
    pub fn new(filename: String) -> Self {
        Self {
            success: true,
            message: "Capture deleted",
            filename,
        }
    }
}

pub fn iso_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn png_data_url(content: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_summary_shape() {
        let capture = Capture {
            filename: "img_01012024120000.png".into(),
            size_bytes: 5,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            content: b"hello".to_vec(),
        };
        let value = serde_json::to_value(CaptureSummary::from(&capture)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "filename": "img_01012024120000.png",
                "size": 5,
                "createdAt": "2024-01-01T12:00:00.000Z",
                "url": "data:image/png;base64,aGVsbG8=",
            })
        );
    }

    #[test]
    fn test_list_response_counts() {
        let empty: &[Capture] = &[];
        let list = CaptureListResponse::from(empty);
        assert_eq!(list.count, 0);
        let value = serde_json::to_value(list).unwrap();
        assert_eq!(value, serde_json::json!({"captures": [], "count": 0}));
    }
}
