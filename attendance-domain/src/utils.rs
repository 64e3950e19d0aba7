use chrono::{SecondsFormat, Utc};

/// Current instant as `2025-03-01T09:30:00.000Z`.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `<prefix>-<registration>.png`, with anything outside `[A-Za-z0-9._-]`
/// in the registration number replaced so the name stays a single path
/// component.
pub fn credential_file_name(prefix: &str, registration_number: &str) -> String {
    let safe: String = registration_number
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let safe = if safe.trim_matches('.').is_empty() {
        "credential".to_string()
    } else {
        safe
    };
    format!("{}-{}.png", prefix, safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_keeps_plain_registration_numbers() {
        assert_eq!(
            credential_file_name("inferno-verse", "REG-001"),
            "inferno-verse-REG-001.png"
        );
    }

    #[test]
    fn file_name_neutralizes_path_separators() {
        assert_eq!(
            credential_file_name("inferno-verse", "../etc/passwd"),
            "inferno-verse-.._etc_passwd.png"
        );
        assert_eq!(credential_file_name("x", ".."), "x-credential.png");
    }

    #[test]
    fn timestamp_is_utc_millis() {
        let stamp = now_iso8601();
        assert!(stamp.ends_with('Z'));
        assert_eq!(stamp.len(), "2025-03-01T09:30:00.000Z".len());
    }
}
