//! File-based locking using flock(2) to serialize account mutations.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// An exclusive file lock. Released on drop (file close releases flock).
pub struct FileLock {
    _file: File,
}

impl FileLock {
    /// Acquire an exclusive lock, blocking until available.
    pub fn exclusive(path: &Path) -> io::Result<Self> {
        let file = open_lock_file(path)?;
        file.lock_exclusive()?;
        Ok(Self { _file: file })
    }
}

/// Whether a lock on `path` is currently held, as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No lock file yet; nothing has ever locked the store.
    Absent,
    Free,
    Held,
}

/// Inspect the lock without creating the lock file.
pub fn lock_state(path: &Path) -> io::Result<LockState> {
    let file = match OpenOptions::new().read(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LockState::Absent),
        Err(e) => return Err(e),
    };
    match file.try_lock_exclusive() {
        Ok(()) => Ok(LockState::Free),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(LockState::Held),
        // fs2 on Linux may report EAGAIN as Other
        Err(e) if e.raw_os_error() == Some(11) => Ok(LockState::Held),
        Err(e) => Err(e),
    }
}

fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_exclusive_creates_lock_file() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("store.lock");
        let lock = FileLock::exclusive(&lock_path).unwrap();
        assert!(lock_path.exists());
        drop(lock);
    }

    #[test]
    fn test_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("store.lock");
        {
            let _held = FileLock::exclusive(&lock_path).unwrap();
        }
        let _again = FileLock::exclusive(&lock_path).unwrap();
    }

    #[test]
    fn test_lock_state_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("store.lock");
        assert_eq!(lock_state(&lock_path).unwrap(), LockState::Absent);
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_lock_state_free_and_held() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("store.lock");
        {
            let _held = FileLock::exclusive(&lock_path).unwrap();
            assert_eq!(lock_state(&lock_path).unwrap(), LockState::Held);
        }
        assert_eq!(lock_state(&lock_path).unwrap(), LockState::Free);
    }

    #[test]
    fn test_missing_parent_is_error() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("nope/store.lock");
        assert!(FileLock::exclusive(&lock_path).is_err());
    }
}
