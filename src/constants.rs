//! Centralized constants for permissions, paths, and limits.

/// Store root used when neither `--root`, `AUTHSTORE_ROOT` nor `$HOME` is set.
pub const DEFAULT_STORE_ROOT: &str = ".authstore";

/// Directory name of the store root under `$HOME`.
pub const HOME_STORE_DIR: &str = ".authstore";

/// Permission mode for the store root and storage namespaces.
pub const STORE_DIR_MODE: u32 = 0o700;

/// Permission mode for stored values (accounts, session keys).
pub const ITEM_FILE_MODE: u32 = 0o600;

/// Permission mode for store.toml.
pub const STORE_TOML_MODE: u32 = 0o600;

/// Permission mode for the audit log.
pub const AUDIT_LOG_MODE: u32 = 0o600;

/// Storage namespace holding the account collection.
pub const DB_NAMESPACE: &str = "db";

/// Storage namespace holding session state.
pub const SESSION_NAMESPACE: &str = "session";

/// Key of the account collection inside the `db` namespace.
pub const ACCOUNTS_KEY: &str = "accounts";

/// Session key holding the logged-in flag.
pub const LOGGED_IN_KEY: &str = "isLoggedIn";

/// Session key holding the cached profile JSON.
pub const USER_PROFILE_KEY: &str = "userProfile";

/// Default minimum password length.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 1;

/// Maximum password size accepted from stdin or prompt (64 KiB).
pub const MAX_SECRET_SIZE: usize = 65_536;

/// Tag used when forwarding audit lines to journald.
pub const JOURNALD_TAG: &str = "authstore";
