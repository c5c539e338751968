//! Durable storage and lookup of user accounts.
//!
//! The account collection is a single JSON value stored under the
//! `accounts` key of the `db` namespace. Mutations run under an exclusive
//! flock on `store.lock` and publish the whole collection with an atomic
//! rename, so readers never observe a half-written record.

use crate::constants;
use crate::core::error::{StorageContext, StoreError};
use crate::core::file_lock::FileLock;
use crate::core::local_storage::LocalStorage;
use crate::core::paths::StorePaths;
use crate::core::{password, validation};
use crate::models::account::{AccountsFile, Profile, UserAccount};
use crate::util::fs as store_fs;
use argon2::Params;
use chrono::Utc;
use std::io;
use std::path::PathBuf;

/// The contract the presentation layer calls into.
pub trait CredentialStore {
    /// Prepare storage. Safe to call any number of times.
    fn initialize(&self) -> Result<(), StoreError>;

    /// Create a new account.
    fn register(&self, username: &str, password: &str, profile: Profile) -> Result<(), StoreError>;

    /// `Ok(false)` for an unknown username or a wrong password.
    fn login(&self, username: &str, password: &str) -> Result<bool, StoreError>;

    /// Stored profile for `username`, if the account exists.
    fn profile(&self, username: &str) -> Result<Option<Profile>, StoreError>;

    /// Replace the stored profile wholesale.
    fn update_profile(&self, username: &str, profile: Profile) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Cost for newly hashed passwords. Existing records keep their own.
    pub argon2: Params,
    pub min_password_length: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            argon2: Params::default(),
            min_password_length: constants::DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

/// File-backed [`CredentialStore`].
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    root: PathBuf,
    lock_path: PathBuf,
    db: LocalStorage,
    options: StoreOptions,
}

impl FileCredentialStore {
    pub fn new(paths: &StorePaths, options: StoreOptions) -> Self {
        Self {
            root: paths.root.clone(),
            lock_path: paths.store_lock.clone(),
            db: LocalStorage::new(paths.db.clone()),
            options,
        }
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> Result<usize, StoreError> {
        Ok(self.load()?.accounts.len())
    }

    fn load(&self) -> Result<AccountsFile, StoreError> {
        let raw = self
            .db
            .get_item(constants::ACCOUNTS_KEY)
            .storage_context(|| format!("read accounts in {}", self.db.dir().display()))?
            .ok_or_else(|| {
                StoreError::storage(
                    "account store not initialized",
                    io::Error::new(io::ErrorKind::NotFound, "accounts collection missing"),
                )
            })?;
        parse_accounts(&raw)
    }

    fn save(&self, accounts: &AccountsFile) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(accounts)
            .map_err(io::Error::from)
            .storage_context(|| "serialize accounts")?;
        self.db
            .set_item(constants::ACCOUNTS_KEY, &json)
            .storage_context(|| format!("write accounts in {}", self.db.dir().display()))
    }

    fn lock(&self) -> Result<FileLock, StoreError> {
        FileLock::exclusive(&self.lock_path)
            .storage_context(|| format!("acquire lock {}", self.lock_path.display()))
    }
}

fn hash_failure(context: &str, e: argon2::password_hash::Error) -> StoreError {
    StoreError::storage(context, io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

fn parse_accounts(raw: &str) -> Result<AccountsFile, StoreError> {
    serde_json::from_str(raw)
        .map_err(io::Error::from)
        .storage_context(|| "parse accounts (corrupted store?)")
}

impl CredentialStore for FileCredentialStore {
    fn initialize(&self) -> Result<(), StoreError> {
        store_fs::ensure_dir(&self.root, constants::STORE_DIR_MODE)
            .storage_context(|| format!("open store root {}", self.root.display()))?;
        self.db
            .ensure()
            .storage_context(|| format!("open namespace {}", self.db.dir().display()))?;

        let _lock = self.lock()?;
        match self
            .db
            .get_item(constants::ACCOUNTS_KEY)
            .storage_context(|| "read accounts")?
        {
            Some(raw) => parse_accounts(&raw).map(|_| ()),
            None => self.save(&AccountsFile::default()),
        }
    }

    fn register(&self, username: &str, password: &str, profile: Profile) -> Result<(), StoreError> {
        validation::validate_username(username)?;
        validation::validate_password(password, self.options.min_password_length)?;
        validation::validate_contact_fields(&profile)?;

        let _lock = self.lock()?;
        let mut accounts = self.load()?;
        if accounts.accounts.contains_key(username) {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }

        let secret = password::hash_new(password, &self.options.argon2)
            .map_err(|e| hash_failure("hash password", e))?;
        let now = Utc::now();
        let account = UserAccount {
            username: username.to_string(),
            secret,
            profile,
            created_at: now,
            updated_at: now,
        };
        accounts.accounts.insert(username.to_string(), account);
        self.save(&accounts)
    }

    fn login(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let accounts = self.load()?;
        match accounts.accounts.get(username) {
            Some(account) => password::verify(password, &account.secret)
                .map_err(|e| hash_failure("parse stored password hash (corrupted store?)", e)),
            None => {
                password::verify_dummy(password, &self.options.argon2);
                Ok(false)
            }
        }
    }

    fn profile(&self, username: &str) -> Result<Option<Profile>, StoreError> {
        let mut accounts = self.load()?;
        Ok(accounts.accounts.remove(username).map(|a| a.profile))
    }

    fn update_profile(&self, username: &str, profile: Profile) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        let mut accounts = self.load()?;
        let account = accounts
            .accounts
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound(username.to_string()))?;
        account.profile = profile;
        account.updated_at = Utc::now();
        self.save(&accounts)
    }
}
