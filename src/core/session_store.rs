//! Persistence for the presentation layer's [`Session`].
//!
//! Two keys in the `session` namespace, kept apart from account records:
//! `isLoggedIn` (`"true"` or absent) and `userProfile` (cached profile JSON).

use crate::constants;
use crate::core::error::{StorageContext, StoreError};
use crate::core::local_storage::LocalStorage;
use crate::models::session::{Session, SessionUser};
use std::io;

#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: LocalStorage,
}

impl SessionStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Restore the persisted session. Missing keys mean logged out; an
    /// unreadable profile cache restores as logged in without a profile.
    pub fn load(&self) -> Result<Session, StoreError> {
        let flag = self
            .storage
            .get_item(constants::LOGGED_IN_KEY)
            .storage_context(|| "read session flag")?;
        let logged_in = flag.as_deref().map(str::trim) == Some("true");

        let user = self
            .storage
            .get_item(constants::USER_PROFILE_KEY)
            .storage_context(|| "read cached profile")?
            .and_then(|raw| serde_json::from_str::<SessionUser>(&raw).ok());

        Ok(Session { logged_in, user })
    }

    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.storage
            .ensure()
            .storage_context(|| format!("open namespace {}", self.storage.dir().display()))?;

        match &session.user {
            Some(user) => {
                let json = serde_json::to_string(user)
                    .map_err(io::Error::from)
                    .storage_context(|| "serialize cached profile")?;
                self.storage
                    .set_item(constants::USER_PROFILE_KEY, &json)
                    .storage_context(|| "write cached profile")?;
            }
            None => self
                .storage
                .remove_item(constants::USER_PROFILE_KEY)
                .storage_context(|| "remove cached profile")?,
        }

        if session.logged_in {
            self.storage
                .set_item(constants::LOGGED_IN_KEY, "true")
                .storage_context(|| "write session flag")
        } else {
            self.storage
                .remove_item(constants::LOGGED_IN_KEY)
                .storage_context(|| "remove session flag")
        }
    }

    /// Forget the session entirely (logout).
    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage
            .remove_item(constants::LOGGED_IN_KEY)
            .storage_context(|| "remove session flag")?;
        self.storage
            .remove_item(constants::USER_PROFILE_KEY)
            .storage_context(|| "remove cached profile")
    }
}
