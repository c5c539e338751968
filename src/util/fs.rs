use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Create `path` (and parents) with `mode` if missing. An existing
/// directory keeps whatever permissions the user gave it.
pub fn ensure_dir(path: &Path, mode: u32) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a directory", path.display()),
        ));
    }
    fs::create_dir_all(path)?;
    set_permissions(path, mode)
}

pub fn set_permissions(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = (path, mode);
    Ok(())
}

/// Permission bits of `path`, or `None` where unsupported.
pub fn mode_of(path: &Path) -> Option<u32> {
    #[cfg(unix)]
    {
        fs::metadata(path)
            .ok()
            .map(|m| m.permissions().mode() & 0o777)
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested, 0o700).unwrap();
        assert!(nested.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_dir_applies_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store");
        ensure_dir(&path, 0o700).unwrap();
        assert_eq!(mode_of(&path), Some(0o700));
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_dir_keeps_existing_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shared");
        fs::create_dir(&path).unwrap();
        set_permissions(&path, 0o755).unwrap();

        ensure_dir(&path, 0o700).unwrap();
        assert_eq!(mode_of(&path), Some(0o755));
    }

    #[test]
    fn test_ensure_dir_rejects_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain");
        fs::write(&path, "x").unwrap();
        let err = ensure_dir(&path, 0o700).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }
}
