//! Account flow used by the front end: form checks, login/registration
//! submit, logout, and profile edits, with the session kept as an explicit
//! value and persisted through [`SessionStore`].

use crate::core::credential_store::CredentialStore;
use crate::core::error::{AccountError, StoreError, ValidationError};
use crate::core::session_store::SessionStore;
use crate::core::validation;
use crate::models::account::Profile;
use crate::models::session::{Session, SessionUser};
use zeroize::Zeroizing;

/// A filled-in registration form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: Zeroizing<String>,
    pub profile: Profile,
}

pub struct AccountService<S> {
    store: S,
    sessions: SessionStore,
    session: Session,
    validate_profile_updates: bool,
}

impl<S: CredentialStore> AccountService<S> {
    pub fn new(store: S, sessions: SessionStore) -> Self {
        Self {
            store,
            sessions,
            session: Session::default(),
            validate_profile_updates: true,
        }
    }

    pub fn with_profile_validation(mut self, enabled: bool) -> Self {
        self.validate_profile_updates = enabled;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Initialize the store and restore the persisted session.
    pub fn start(&mut self) -> Result<&Session, AccountError> {
        self.store.initialize()?;
        self.session = self.sessions.load()?;
        Ok(&self.session)
    }

    /// Register a new account. Does not log in; the new profile is cached
    /// unless someone is already logged in.
    pub fn submit_registration(&mut self, form: &Registration) -> Result<(), AccountError> {
        if form.username.is_empty() {
            return Err(ValidationError::MissingField("username").into());
        }
        if form.password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }
        validation::require_profile_fields(&form.profile)?;
        validation::validate_contact_fields(&form.profile)?;

        self.store
            .register(&form.username, &form.password, form.profile.clone())?;

        if !self.session.logged_in {
            let cached = Session {
                logged_in: false,
                user: Some(SessionUser {
                    username: form.username.clone(),
                    profile: form.profile.clone(),
                }),
            };
            self.sessions.save(&cached)?;
            self.session = cached;
        }
        Ok(())
    }

    /// Log in and persist the session. Wrong credentials are
    /// [`AccountError::InvalidCredentials`] without saying which part was wrong.
    pub fn submit_login(&mut self, username: &str, password: &str) -> Result<&Session, AccountError> {
        if username.is_empty() {
            return Err(ValidationError::MissingField("username").into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }

        if !self.store.login(username, password)? {
            return Err(AccountError::InvalidCredentials);
        }

        let profile = self
            .store
            .profile(username)?
            .ok_or_else(|| StoreError::NotFound(username.to_string()))?;
        let session = Session::logged_in_as(username, profile);
        self.sessions.save(&session)?;
        self.session = session;
        Ok(&self.session)
    }

    /// Clear the session. Accounts are untouched.
    pub fn logout(&mut self) -> Result<(), AccountError> {
        self.sessions.clear()?;
        self.session = Session::default();
        Ok(())
    }

    /// Save an edited profile for the logged-in user (wholesale replace).
    pub fn save_profile(&mut self, profile: Profile) -> Result<(), AccountError> {
        let username = self
            .session
            .username()
            .ok_or(AccountError::NotLoggedIn)?
            .to_string();

        if self.validate_profile_updates {
            validation::validate_contact_fields(&profile)?;
        }

        self.store.update_profile(&username, profile.clone())?;

        let session = Session::logged_in_as(&username, profile);
        self.sessions.save(&session)?;
        self.session = session;
        Ok(())
    }
}
