//! Store path resolution and directory structure.

use crate::constants;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct StorePaths {
    pub root: PathBuf,
    pub db: PathBuf,
    pub session: PathBuf,
    pub store_toml: PathBuf,
    pub store_lock: PathBuf,
    pub audit_log: PathBuf,
    pub audit_lock: PathBuf,
}

impl StorePaths {
    /// Resolve store paths from CLI arg, env var, or the home directory.
    pub fn resolve(root_arg: Option<PathBuf>) -> Self {
        if let Some(root) = root_arg {
            return Self::from_root(root);
        }
        if let Some(root) = env::var_os("AUTHSTORE_ROOT").filter(|v| !v.is_empty()) {
            return Self::from_root(PathBuf::from(root));
        }
        if let Some(home) = env::var_os("HOME").filter(|v| !v.is_empty()) {
            return Self::from_root(PathBuf::from(home).join(constants::HOME_STORE_DIR));
        }
        Self::from_root(PathBuf::from(constants::DEFAULT_STORE_ROOT))
    }

    /// Create store paths from a root directory.
    pub fn from_root(root: PathBuf) -> Self {
        Self {
            db: root.join(constants::DB_NAMESPACE),
            session: root.join(constants::SESSION_NAMESPACE),
            store_toml: root.join("store.toml"),
            store_lock: root.join("store.lock"),
            audit_log: root.join("audit.log"),
            audit_lock: root.join("audit.lock"),
            root,
        }
    }
}

impl std::fmt::Display for StorePaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "authstore@{}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_root() {
        let paths = StorePaths::from_root(PathBuf::from("/test"));
        assert_eq!(paths.root, PathBuf::from("/test"));
        assert_eq!(paths.db, PathBuf::from("/test/db"));
        assert_eq!(paths.session, PathBuf::from("/test/session"));
        assert_eq!(paths.store_toml, PathBuf::from("/test/store.toml"));
        assert_eq!(paths.store_lock, PathBuf::from("/test/store.lock"));
        assert_eq!(paths.audit_log, PathBuf::from("/test/audit.log"));
        assert_eq!(paths.audit_lock, PathBuf::from("/test/audit.lock"));
    }

    #[test]
    fn test_resolve_prefers_explicit_root() {
        let paths = StorePaths::resolve(Some(PathBuf::from("/explicit")));
        assert_eq!(paths.root, PathBuf::from("/explicit"));
    }

    #[test]
    fn test_display() {
        let paths = StorePaths::from_root(PathBuf::from("/data"));
        assert_eq!(paths.to_string(), "authstore@/data");
    }
}
