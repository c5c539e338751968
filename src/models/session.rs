//! Presentation-layer session state.

use crate::models::account::Profile;
use serde::{Deserialize, Serialize};

/// The cached profile of the logged-in user, as persisted under `userProfile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub logged_in: bool,
    pub user: Option<SessionUser>,
}

impl Session {
    pub fn logged_in_as(username: &str, profile: Profile) -> Self {
        Self {
            logged_in: true,
            user: Some(SessionUser {
                username: username.to_string(),
                profile,
            }),
        }
    }

    /// Username of the logged-in user, if both the flag and the cache are present.
    pub fn username(&self) -> Option<&str> {
        if !self.logged_in {
            return None;
        }
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_user_flattens_profile() {
        let user = SessionUser {
            username: "alice".into(),
            profile: Profile {
                first_name: "Alice".into(),
                ..Profile::default()
            },
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["firstName"], "Alice");
    }

    #[test]
    fn test_username_requires_flag() {
        let mut session = Session::logged_in_as("alice", Profile::default());
        assert_eq!(session.username(), Some("alice"));
        session.logged_in = false;
        assert_eq!(session.username(), None);
    }
}
