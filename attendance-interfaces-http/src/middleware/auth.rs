use axum::http::HeaderMap;

use attendance_domain::ports::IdentityProvider;
use attendance_domain::{RuntimeConfig, UserIdentity};

pub const VOLUNTEER_NAME_HEADER: &str = "X-Volunteer-Name";
pub const VOLUNTEER_EMAIL_HEADER: &str = "X-Volunteer-Email";

pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

/// Volunteer identity forwarded by the front end of an authorized request.
pub struct HeaderIdentity {
    user: Option<UserIdentity>,
}

impl HeaderIdentity {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let name = header_text(headers, VOLUNTEER_NAME_HEADER);
        let email = header_text(headers, VOLUNTEER_EMAIL_HEADER);
        let user = (name.is_some() || email.is_some()).then(|| UserIdentity {
            display_name: name,
            email,
            photo_url: None,
        });
        Self { user }
    }
}

impl IdentityProvider for HeaderIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user.clone()
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config(api_token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            api_token: api_token.map(ToString::to_string),
            event_name: "Inferno Verse 2025".to_string(),
            credential_file_prefix: "inferno-verse".to_string(),
            credential_dir: "./credentials".to_string(),
            render_style: Default::default(),
            capture: Default::default(),
            reset_delay_ms: 3000,
            duplicate_check: false,
            max_body_bytes: 1024,
            request_timeout_seconds: 5,
        }
    }

    #[test]
    fn open_when_no_token_configured() {
        assert!(authorize(&config(None), &HeaderMap::new()));
    }

    #[test]
    fn bearer_token_must_match() {
        let config = config(Some("secret"));
        let mut headers = HeaderMap::new();
        assert!(!authorize(&config, &headers));
        headers.insert("Authorization", HeaderValue::from_static("Bearer wrong"));
        assert!(!authorize(&config, &headers));
        headers.insert("Authorization", HeaderValue::from_static("Bearer secret"));
        assert!(authorize(&config, &headers));
    }

    #[test]
    fn volunteer_comes_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(HeaderIdentity::from_headers(&headers).current_user().is_none());

        headers.insert(VOLUNTEER_EMAIL_HEADER, HeaderValue::from_static("grace@example.org"));
        headers.insert(VOLUNTEER_NAME_HEADER, HeaderValue::from_static("  "));
        let user = HeaderIdentity::from_headers(&headers)
            .current_user()
            .expect("volunteer");
        assert_eq!(user.display_name, None);
        assert_eq!(user.volunteer_label(), "grace@example.org");
    }
}
