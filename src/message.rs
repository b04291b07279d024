//! Request and response messages
//!
//! A decode request names a canvas by an opaque `id` and carries its base64
//! payload, dimensions and raw format tag. Every request gets exactly one
//! response with the same `id`: either a PNG data URI or an error message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Result, WzImageError};
use crate::source::EncodedAsset;

/// One canvas to decode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeRequest {
    /// Caller-chosen identifier, echoed back unchanged
    #[serde(default)]
    pub id: Value,
    /// Base64 payload
    pub basedata: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Raw WZ format tag, `null` when unknown
    #[serde(default)]
    pub wzrawformat: Option<i32>,
}

impl DecodeRequest {
    /// Create a request
    pub fn new(
        id: impl Into<Value>,
        basedata: impl Into<String>,
        width: u32,
        height: u32,
        wzrawformat: Option<i32>,
    ) -> Self {
        Self {
            id: id.into(),
            basedata: basedata.into(),
            width,
            height,
            wzrawformat,
        }
    }

    /// Parse a single request from JSON
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode the base64 payload into an [`EncodedAsset`]
    pub fn to_asset(&self) -> Result<EncodedAsset> {
        EncodedAsset::from_base64(&self.basedata, self.width, self.height, self.wzrawformat)
    }
}

/// Parse a batch of requests: a JSON array, or one JSON object per line
pub fn parse_batch(text: &str) -> Result<Vec<DecodeRequest>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(DecodeRequest::from_json)
        .collect()
}

/// Outcome of one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecodeResponse {
    /// Decoded canvas as a PNG data URI
    Image {
        /// Request identifier
        id: Value,
        /// `data:image/png;base64,...`
        #[serde(rename = "dataUrl")]
        data_url: String,
    },
    /// Decoding failed
    Error {
        /// Request identifier
        id: Value,
        /// Human-readable error message
        error: String,
    },
}

impl DecodeResponse {
    /// Successful response
    pub fn image(id: Value, data_url: String) -> Self {
        DecodeResponse::Image { id, data_url }
    }

    /// Error response carrying `error`'s message
    pub fn error(id: Value, error: &WzImageError) -> Self {
        DecodeResponse::Error {
            id,
            error: error.to_string(),
        }
    }

    /// Request identifier
    pub fn id(&self) -> &Value {
        match self {
            DecodeResponse::Image { id, .. } | DecodeResponse::Error { id, .. } => id,
        }
    }

    /// Whether this is an error response
    pub fn is_error(&self) -> bool {
        matches!(self, DecodeResponse::Error { .. })
    }

    /// Serialize as a JSON object
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_fields() {
        let request = DecodeRequest::from_json(
            r#"{"id": 7, "basedata": "AQID", "width": 2, "height": 3, "wzrawformat": 513}"#,
        )
        .unwrap();
        assert_eq!(request, DecodeRequest::new(7, "AQID", 2, 3, Some(513)));

        let asset = request.to_asset().unwrap();
        assert_eq!(asset.payload, vec![1, 2, 3]);
        assert_eq!(asset.declared_format, Some(513));
    }

    #[test]
    fn test_request_unknown_format() {
        let with_null = DecodeRequest::from_json(
            r#"{"id": "a", "basedata": "", "width": 1, "height": 1, "wzrawformat": null}"#,
        )
        .unwrap();
        let missing =
            DecodeRequest::from_json(r#"{"id": "a", "basedata": "", "width": 1, "height": 1}"#)
                .unwrap();
        assert_eq!(with_null.wzrawformat, None);
        assert_eq!(with_null, missing);
    }

    #[test]
    fn test_request_missing_fields() {
        assert!(matches!(
            DecodeRequest::from_json(r#"{"id": 1, "width": 1, "height": 1}"#),
            Err(WzImageError::Json(_))
        ));
    }

    #[test]
    fn test_response_wire_shape() {
        let image = DecodeResponse::image(json!(1), "data:image/png;base64,AA==".into());
        assert_eq!(
            serde_json::to_value(&image).unwrap(),
            json!({"id": 1, "dataUrl": "data:image/png;base64,AA=="})
        );

        let error = DecodeResponse::error(json!("x"), &WzImageError::InvalidData("bad".into()));
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"id": "x", "error": "Invalid data: bad"})
        );
        assert!(error.is_error());
        assert_eq!(error.id(), &json!("x"));
    }

    #[test]
    fn test_response_parses_back() {
        let text = r#"[{"id": 1, "dataUrl": "u"}, {"id": 2, "error": "e"}]"#;
        let responses: Vec<DecodeResponse> = serde_json::from_str(text).unwrap();
        assert!(!responses[0].is_error());
        assert!(responses[1].is_error());
        assert_eq!(responses[0].to_json().unwrap(), r#"{"id":1,"dataUrl":"u"}"#);
    }

    #[test]
    fn test_parse_batch_array_and_lines() {
        let array = r#"[
            {"id": 1, "basedata": "AA==", "width": 1, "height": 1},
            {"id": 2, "basedata": "AA==", "width": 1, "height": 1, "wzrawformat": 2}
        ]"#;
        let lines = "{\"id\": 1, \"basedata\": \"AA==\", \"width\": 1, \"height\": 1}\n\n\
                     {\"id\": 2, \"basedata\": \"AA==\", \"width\": 1, \"height\": 1, \"wzrawformat\": 2}\n";

        let from_array = parse_batch(array).unwrap();
        assert_eq!(from_array.len(), 2);
        assert_eq!(from_array, parse_batch(lines).unwrap());
        assert!(parse_batch("").unwrap().is_empty());
        assert!(parse_batch("{not json}").is_err());
    }
}
