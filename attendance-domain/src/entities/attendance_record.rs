// Attendance record entity
// Proof that a participant's credential was scanned and confirmed

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::entities::{IdentityPayload, UserIdentity};

/// Row sent to the datastore. Server-side fields are left for the datastore
/// to assign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttendanceRecord {
    pub registration_number: String,
    pub participant_name: String,
    pub marked_by_volunteer: String,
    pub event_name: String,
}

impl NewAttendanceRecord {
    /// Builds the row for a confirmed scan. `event_name` is the configured
    /// edition, whatever the scanned payload claims.
    pub fn from_scan(payload: &IdentityPayload, volunteer: &UserIdentity, event_name: &str) -> Self {
        Self {
            registration_number: payload.registration_number.clone(),
            participant_name: payload.name.clone(),
            marked_by_volunteer: volunteer.volunteer_label(),
            event_name: event_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default, deserialize_with = "deserialize_record_id")]
    pub id: Option<String>,
    pub registration_number: String,
    pub participant_name: String,
    pub marked_by_volunteer: String,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub marked_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl AttendanceRecord {
    pub fn unsaved(record: NewAttendanceRecord) -> Self {
        Self {
            id: None,
            registration_number: record.registration_number,
            participant_name: record.participant_name,
            marked_by_volunteer: record.marked_by_volunteer,
            event_name: Some(record.event_name),
            marked_at: None,
            created_at: None,
        }
    }
}

// Datastores hand back either uuid strings or serial integers.
fn deserialize_record_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_configured_event_not_scanned_one() {
        let payload = IdentityPayload::new("REG-001", "Ada Lovelace", "Some Other Event", "");
        let record = NewAttendanceRecord::from_scan(
            &payload,
            &UserIdentity::named("Grace Hopper"),
            "Inferno Verse 2025",
        );
        assert_eq!(record.registration_number, "REG-001");
        assert_eq!(record.participant_name, "Ada Lovelace");
        assert_eq!(record.marked_by_volunteer, "Grace Hopper");
        assert_eq!(record.event_name, "Inferno Verse 2025");
    }

    #[test]
    fn record_id_accepts_numbers_and_strings() {
        let numeric: AttendanceRecord = serde_json::from_str(
            r#"{"id":42,"registration_number":"R","participant_name":"P","marked_by_volunteer":"V"}"#,
        )
        .expect("numeric id");
        assert_eq!(numeric.id.as_deref(), Some("42"));

        let textual: AttendanceRecord = serde_json::from_str(
            r#"{"id":"7f1c","registration_number":"R","participant_name":"P","marked_by_volunteer":"V","marked_at":"2025-03-01T09:30:00Z"}"#,
        )
        .expect("string id");
        assert_eq!(textual.id.as_deref(), Some("7f1c"));
        assert_eq!(textual.marked_at.as_deref(), Some("2025-03-01T09:30:00Z"));
    }
}
