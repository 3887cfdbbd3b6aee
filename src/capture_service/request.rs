use base64::Engine;
use serde_json::{Map, Value};

use crate::auth::guard::BASE64_LENIENT;
use crate::error_handling::types::ServiceError;

const REQUIRED_FIELDS: [&str; 2] = ["date", "image"];

/// Body of `POST /capture`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Capture date as reported by the camera. Echoed back, not interpreted.
    pub date: String,
    /// Base64 encoded image.
    pub image: String,
}

impl CaptureRequest {
    /// Parses and validates a JSON body. The first failing rule determines the message.
    pub fn from_json(body: &[u8]) -> Result<Self, ServiceError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| ServiceError::Validation("Invalid JSON body".to_string()))?;
        let object = match value {
            Value::Object(object) => object,
            _ => return Err(invalid_request()),
        };

        for field in REQUIRED_FIELDS {
            if !object.contains_key(field) {
                return Err(ServiceError::Validation(format!(
                    "Missing required field: {}",
                    field
                )));
            }
        }
        if let Some(unknown) = object
            .keys()
            .find(|key| !REQUIRED_FIELDS.contains(&key.as_str()))
        {
            return Err(ServiceError::Validation(format!(
                "Unknown field: {}",
                unknown
            )));
        }

        let date = string_field(&object, "date")?;
        let image = string_field(&object, "image")?;
        if image.is_empty() {
            return Err(ServiceError::Validation(
                "image cannot be empty".to_string(),
            ));
        }

        Ok(Self { date, image })
    }

    /// Decodes the image payload. Padding is optional.
    pub fn decode_image(&self) -> Result<Vec<u8>, ServiceError> {
        BASE64_LENIENT
            .decode(self.image.as_bytes())
            .map_err(|_| ServiceError::Validation("image must be base64 encoded".to_string()))
    }
}

fn invalid_request() -> ServiceError {
    ServiceError::Validation("Invalid request".to_string())
}

fn string_field(object: &Map<String, Value>, field: &str) -> Result<String, ServiceError> {
    match object.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(invalid_request()),
    }
}
