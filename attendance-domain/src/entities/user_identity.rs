// User identity entity
// What the identity provider tells us about the signed-in operator

use serde::{Deserialize, Serialize};

pub const UNKNOWN_VOLUNTEER: &str = "Unknown Volunteer";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl UserIdentity {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            ..Self::default()
        }
    }

    /// Label written into `marked_by_volunteer`: display name, then email,
    /// then the placeholder.
    pub fn volunteer_label(&self) -> String {
        non_blank(self.display_name.as_deref())
            .or_else(|| non_blank(self.email.as_deref()))
            .unwrap_or(UNKNOWN_VOLUNTEER)
            .to_string()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|raw| !raw.is_empty())
}
