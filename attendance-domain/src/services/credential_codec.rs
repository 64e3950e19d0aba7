// Credential text codec
// Turns an identity payload into the text embedded in a credential and back

use serde_json::{Map, Value};
use thiserror::Error;

use crate::entities::IdentityPayload;

const FIELD_REGISTRATION: &str = "registrationNumber";
const FIELD_NAME: &str = "name";
const FIELD_EVENT: &str = "event";
const FIELD_TIMESTAMP: &str = "timestamp";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The scanned text is not JSON at all.
    #[error("Invalid QR code data")]
    Malformed,
    /// JSON, but `registrationNumber` or `name` is missing.
    #[error("Invalid QR code format")]
    IncompleteFields,
}

pub fn encode_payload_text(payload: &IdentityPayload) -> anyhow::Result<String> {
    Ok(serde_json::to_string(payload)?)
}

/// Rebuilds a payload from scanned text.
///
/// Only `registrationNumber` and `name` are checked; both must be non-empty
/// strings. `event` and `timestamp` default to empty, and any other keys are
/// carried along untouched in `extra`.
pub fn decode_payload(raw: &str) -> Result<IdentityPayload, DecodeError> {
    let value: Value = serde_json::from_str(raw.trim()).map_err(|_| DecodeError::Malformed)?;
    let Value::Object(mut fields) = value else {
        return Err(DecodeError::IncompleteFields);
    };

    let registration_number = take_required(&mut fields, FIELD_REGISTRATION)?;
    let name = take_required(&mut fields, FIELD_NAME)?;
    let event = take_lenient(&mut fields, FIELD_EVENT);
    let timestamp = take_lenient(&mut fields, FIELD_TIMESTAMP);

    Ok(IdentityPayload {
        registration_number,
        name,
        event,
        timestamp,
        extra: fields,
    })
}

fn take_required(fields: &mut Map<String, Value>, key: &str) -> Result<String, DecodeError> {
    match fields.remove(key) {
        Some(Value::String(text)) if !text.is_empty() => Ok(text),
        _ => Err(DecodeError::IncompleteFields),
    }
}

fn take_lenient(fields: &mut Map<String, Value>, key: &str) -> String {
    match fields.remove(key) {
        Some(Value::String(text)) => text,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> IdentityPayload {
        IdentityPayload::new(
            "REG-001",
            "Ada Lovelace",
            "Inferno Verse 2025",
            "2025-03-01T09:30:00.000Z",
        )
    }

    #[test]
    fn encoded_text_uses_wire_field_names_in_order() {
        let text = encode_payload_text(&sample()).expect("encode");
        assert_eq!(
            text,
            r#"{"registrationNumber":"REG-001","name":"Ada Lovelace","event":"Inferno Verse 2025","timestamp":"2025-03-01T09:30:00.000Z"}"#
        );
    }

    #[test]
    fn decode_restores_encoded_payload() {
        let payload = sample();
        let text = encode_payload_text(&payload).expect("encode");
        assert_eq!(decode_payload(&text), Ok(payload));
    }

    #[test]
    fn decode_keeps_unknown_fields() {
        let raw = json!({
            "registrationNumber": "REG-002",
            "name": "Grace",
            "seat": 14,
        })
        .to_string();
        let payload = decode_payload(&raw).expect("decode");
        assert_eq!(payload.event, "");
        assert_eq!(payload.timestamp, "");
        assert_eq!(payload.extra.get("seat"), Some(&json!(14)));

        let again = encode_payload_text(&payload).expect("encode");
        assert_eq!(decode_payload(&again), Ok(payload));
    }

    #[test]
    fn non_json_is_malformed() {
        assert_eq!(decode_payload("https://example.org"), Err(DecodeError::Malformed));
        assert_eq!(decode_payload("{\"name\":"), Err(DecodeError::Malformed));
        assert_eq!(decode_payload(""), Err(DecodeError::Malformed));
    }

    #[test]
    fn missing_or_empty_required_fields_are_incomplete() {
        assert_eq!(
            decode_payload(r#"{"name":"Ada"}"#),
            Err(DecodeError::IncompleteFields)
        );
        assert_eq!(
            decode_payload(r#"{"registrationNumber":"REG-001"}"#),
            Err(DecodeError::IncompleteFields)
        );
        assert_eq!(
            decode_payload(r#"{"registrationNumber":"","name":"Ada"}"#),
            Err(DecodeError::IncompleteFields)
        );
        assert_eq!(
            decode_payload(r#"{"registrationNumber":7,"name":"Ada"}"#),
            Err(DecodeError::IncompleteFields)
        );
    }

    #[test]
    fn json_that_is_not_an_object_is_incomplete() {
        assert_eq!(decode_payload("42"), Err(DecodeError::IncompleteFields));
        assert_eq!(decode_payload("[1,2]"), Err(DecodeError::IncompleteFields));
    }

    #[test]
    fn error_messages_match_operator_notices() {
        assert_eq!(DecodeError::Malformed.to_string(), "Invalid QR code data");
        assert_eq!(DecodeError::IncompleteFields.to_string(), "Invalid QR code format");
    }
}
