//! HTTP status and JSON body shapes for store errors.
//!
//! Both directions live here: the server encodes a [`StoreError`] into a
//! status and body, and a client decodes whatever comes back into a
//! [`StoreError`]. Call sites never inspect response bodies themselves.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::error::StoreError;

/// An error as it travels over HTTP.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub status: u16,
    pub body: Value,
}

impl ErrorBody {
    pub fn from_error(err: &StoreError) -> Self {
        let (status, body) = match err {
            StoreError::Fields(fields) => (400, json!(fields)),
            StoreError::Rejected(message) => (400, json!({ "non_field_errors": [message] })),
            StoreError::BadRequest(message) => (400, json!({ "detail": message })),
            StoreError::NotFound(message) => (404, json!({ "detail": message })),
            StoreError::Unauthorized(message) => (401, json!({ "detail": message })),
            StoreError::Forbidden(message) => (403, json!({ "detail": message })),
            StoreError::Transport(message) => (503, json!({ "detail": message })),
        };
        Self { status, body }
    }

    /// Decodes an error response. Anything unrecognised is a transport failure.
    pub fn decode(status: u16, bytes: &[u8]) -> StoreError {
        let body: Option<Value> = serde_json::from_slice(bytes).ok();
        let detail = body.as_ref().and_then(detail_of);

        match status {
            400 => body
                .as_ref()
                .and_then(Value::as_object)
                .map(decode_bad_request)
                .unwrap_or_else(|| StoreError::Transport(format!("Unreadable error response ({status})."))),
            401 => StoreError::Unauthorized(
                detail.unwrap_or_else(|| "Authentication credentials were not provided.".to_string()),
            ),
            403 => StoreError::Forbidden(
                detail.unwrap_or_else(|| "You do not have permission to perform this action.".to_string()),
            ),
            404 => StoreError::NotFound(detail.unwrap_or_else(|| "Not found.".to_string())),
            _ => StoreError::Transport(
                detail.unwrap_or_else(|| format!("Request failed with status {status}.")),
            ),
        }
    }
}

fn detail_of(body: &Value) -> Option<String> {
    ["detail", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str).map(str::to_string))
}

fn decode_bad_request(object: &Map<String, Value>) -> StoreError {
    if let Some(errors) = object.get("non_field_errors") {
        let messages = messages_of(errors);
        return StoreError::Rejected(
            messages
                .into_iter()
                .next()
                .unwrap_or_else(|| "Request rejected.".to_string()),
        );
    }
    if let Some(detail) = detail_of(&Value::Object(object.clone())) {
        return StoreError::BadRequest(detail);
    }

    let fields: BTreeMap<String, Vec<String>> = object
        .iter()
        .map(|(field, value)| (field.clone(), messages_of(value)))
        .filter(|(_, messages)| !messages.is_empty())
        .collect();
    if fields.is_empty() {
        StoreError::BadRequest("Invalid input.".to_string())
    } else {
        StoreError::Fields(fields)
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(message) => vec![message.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(status: u16, body: Value) -> StoreError {
        ErrorBody::decode(status, body.to_string().as_bytes())
    }

    #[test]
    fn test_non_field_errors_decode_as_rejection() {
        let err = decode(
            400,
            json!({ "non_field_errors": ["Room is already booked for the selected date range."] }),
        );
        assert_eq!(
            err,
            StoreError::Rejected("Room is already booked for the selected date range.".into())
        );
    }

    #[test]
    fn test_field_map_decodes_as_fields() {
        let err = decode(400, json!({ "national_id": ["Customer with this national id already exists."] }));
        assert_eq!(
            err,
            StoreError::field("national_id", "Customer with this national id already exists.")
        );
    }

    #[test]
    fn test_error_key_decodes_as_bad_request() {
        let err = decode(400, json!({ "error": "check_in and check_out are required." }));
        assert_eq!(err, StoreError::BadRequest("check_in and check_out are required.".into()));
    }

    #[test]
    fn test_server_failure_is_transport() {
        assert!(matches!(
            ErrorBody::decode(500, b"<html>oops</html>"),
            StoreError::Transport(_)
        ));
        assert!(matches!(ErrorBody::decode(400, b"not json"), StoreError::Transport(_)));
    }

    #[test]
    fn test_status_codes() {
        assert!(matches!(decode(404, json!({ "detail": "Not found." })), StoreError::NotFound(_)));
        assert!(matches!(decode(401, json!({})), StoreError::Unauthorized(_)));
        assert!(matches!(decode(403, json!({})), StoreError::Forbidden(_)));
    }

    #[test]
    fn test_encoding_is_readable_by_decoder() {
        for err in [
            StoreError::field("room_number", "room with this room number already exists."),
            StoreError::Rejected("Customer profile not found.".into()),
            StoreError::not_found(),
            StoreError::forbidden(),
        ] {
            let encoded = ErrorBody::from_error(&err);
            assert_eq!(decode(encoded.status, encoded.body), err);
        }
    }
}
