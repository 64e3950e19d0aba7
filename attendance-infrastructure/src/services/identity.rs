use attendance_domain::ports::IdentityProvider;
use attendance_domain::UserIdentity;

/// Volunteer identity fixed for the lifetime of the process (CLI desk).
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    user: Option<UserIdentity>,
}

impl StaticIdentityProvider {
    pub fn new(name: Option<String>, email: Option<String>) -> Self {
        if name.is_none() && email.is_none() {
            return Self { user: None };
        }
        Self {
            user: Some(UserIdentity {
                display_name: name,
                email,
                photo_url: None,
            }),
        }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user.clone()
    }
}
