//! Key-based local storage: one namespace directory, one file per key.
//!
//! Values are replaced atomically (temp file + rename in the same
//! directory), so a reader sees either the previous or the new value.

use crate::constants;
use crate::util::fs as store_fs;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the namespace directory with owner-only permissions.
    pub fn ensure(&self) -> io::Result<()> {
        store_fs::ensure_dir(&self.dir, constants::STORE_DIR_MODE)
    }

    pub fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.item_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.item_path(key)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".item-")
            .tempfile_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        store_fs::set_permissions(tmp.path(), constants::ITEM_FILE_MODE)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Remove a key. Removing an absent key is not an error.
    pub fn remove_item(&self, key: &str) -> io::Result<()> {
        let path = self.item_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn item_path(&self, key: &str) -> io::Result<PathBuf> {
        validate_key(key).map_err(|msg| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("key '{}': {}", key, msg))
        })?;
        Ok(self.dir.join(key))
    }
}

fn validate_key(key: &str) -> Result<(), &'static str> {
    if key.is_empty() {
        return Err("key cannot be empty");
    }
    if key.contains("..") {
        return Err("path traversal not allowed");
    }
    if key.starts_with(".item-") {
        return Err("reserved prefix");
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
    {
        return Err("only [a-zA-Z0-9._-] allowed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("ns"));
        storage.ensure().unwrap();
        (dir, storage)
    }

    #[test]
    fn test_get_missing_is_none() {
        let (_dir, storage) = storage();
        assert_eq!(storage.get_item("isLoggedIn").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let (_dir, storage) = storage();
        storage.set_item("isLoggedIn", "true").unwrap();
        assert_eq!(storage.get_item("isLoggedIn").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_set_overwrites() {
        let (_dir, storage) = storage();
        storage.set_item("k", "first").unwrap();
        storage.set_item("k", "second").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let (_dir, storage) = storage();
        storage.set_item("k", "v").unwrap();
        let names: Vec<String> = fs::read_dir(storage.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["k".to_string()]);
    }

    #[test]
    fn test_remove_item_idempotent() {
        let (_dir, storage) = storage();
        storage.set_item("k", "v").unwrap();
        storage.remove_item("k").unwrap();
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let (_dir, storage) = storage();
        assert!(storage.set_item("", "v").is_err());
        assert!(storage.set_item("../escape", "v").is_err());
        assert!(storage.set_item("a/b", "v").is_err());
        assert!(storage.get_item("sp ace").is_err());
        assert!(storage.set_item(".item-x", "v").is_err());
    }

    #[test]
    fn test_namespaces_are_separate() {
        let dir = TempDir::new().unwrap();
        let a = LocalStorage::new(dir.path().join("a"));
        let b = LocalStorage::new(dir.path().join("b"));
        a.ensure().unwrap();
        b.ensure().unwrap();
        a.set_item("k", "from-a").unwrap();
        assert_eq!(b.get_item("k").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_item_mode_owner_only() {
        let (_dir, storage) = storage();
        storage.set_item("k", "v").unwrap();
        assert_eq!(
            store_fs::mode_of(&storage.dir().join("k")),
            Some(constants::ITEM_FILE_MODE)
        );
    }
}
