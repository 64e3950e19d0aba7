// Identity payload entity
// The flat record embedded in a scannable credential

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Participant identity as carried inside a credential.
///
/// Serialized as a JSON object whose known keys are `registrationNumber`,
/// `name`, `event` and `timestamp`. Keys the decoder does not know about are
/// kept in `extra` and written back out on the next encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityPayload {
    #[serde(rename = "registrationNumber")]
    pub registration_number: String,
    pub name: String,
    #[serde(default)]
    pub event: String,
    /// Instant the credential was generated, not when attendance happened.
    #[serde(default)]
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdentityPayload {
    pub fn new(
        registration_number: impl Into<String>,
        name: impl Into<String>,
        event: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            registration_number: registration_number.into(),
            name: name.into(),
            event: event.into(),
            timestamp: timestamp.into(),
            extra: Map::new(),
        }
    }
}
