//! Error types for the credential store and the account flow.

use std::io;
use thiserror::Error;

/// Field-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    /// A required form field was left blank.
    #[error("please fill in all fields ({0} is empty)")]
    MissingField(&'static str),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid phone number (expected 10 digits)")]
    InvalidContactNumber,
}

/// Errors reported by a [`CredentialStore`](crate::core::credential_store::CredentialStore).
///
/// A failed login is not an error: `login` returns `Ok(false)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persistence layer could not be opened, read, or written.
    #[error("storage unavailable: {context}")]
    StorageUnavailable {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Profile update for an account that does not exist.
    #[error("account '{0}' not found")]
    NotFound(String),
}

impl StoreError {
    pub(crate) fn storage(context: impl Into<String>, source: io::Error) -> Self {
        StoreError::StorageUnavailable {
            context: context.into(),
            source,
        }
    }
}

/// Extension for attaching store context to I/O results.
pub(crate) trait StorageContext<T> {
    fn storage_context<F, C>(self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> StorageContext<T> for io::Result<T> {
    fn storage_context<F, C>(self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| StoreError::storage(f(), e))
    }
}

/// Errors surfaced by the account flow to the presentation layer.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Wrong password or unknown username; deliberately not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("not logged in")]
    NotLoggedIn,
}
