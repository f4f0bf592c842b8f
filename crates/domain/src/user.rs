use serde::{Deserialize, Serialize};

/// Identity used when no account is connected. Data stays local and
/// remote sync is disabled.
pub const GUEST_EMAIL: &str = "guest@local.app";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: String,
}

impl UserProfile {
    #[must_use]
    pub fn guest() -> Self {
        Self {
            name: "Guest".to_string(),
            email: GUEST_EMAIL.to_string(),
            picture: String::new(),
        }
    }

    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.email == GUEST_EMAIL
    }
}
