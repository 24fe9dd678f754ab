use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::common::Frame;
use crate::error::FrameError;

const DATA_URI_SCHEME: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// Base64 JPEG body of a captured still, without any data-URI prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    base64: String,
}

impl ImagePayload {
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let jpeg = frame.to_jpeg()?;
        Ok(Self {
            base64: STANDARD.encode(jpeg),
        })
    }

    /// Accepts either a bare base64 body or a `data:image/<kind>;base64,` URI.
    pub fn from_data_uri(input: &str) -> Result<Self, FrameError> {
        let body = strip_data_uri_prefix(input.trim());
        if body.is_empty() {
            return Err(FrameError::Payload("empty image body".to_string()));
        }
        Ok(Self {
            base64: body.to_string(),
        })
    }

    pub fn as_base64(&self) -> &str {
        &self.base64
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.base64)
    }
}

fn strip_data_uri_prefix(input: &str) -> &str {
    let Some(rest) = input.strip_prefix(DATA_URI_SCHEME) else {
        return input;
    };
    match rest.find(BASE64_MARKER) {
        Some(end)
            if end > 0
                && rest[..end]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            &rest[end + BASE64_MARKER.len()..]
        }
        _ => input,
    }
}
