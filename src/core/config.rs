//! Load and save store.toml.

use crate::constants;
use crate::models::store_config::StoreFile;
use crate::util::fs as store_fs;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Load store.toml, or defaults when the file does not exist.
pub fn load(path: &Path) -> Result<StoreFile> {
    if !path.exists() {
        return Ok(StoreFile::default());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let mut file: StoreFile =
        toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))?;
    if file.store.version == 0 {
        file.store.version = 1;
    }
    Ok(file)
}

pub fn save(path: &Path, file: &StoreFile) -> Result<()> {
    let content = toml::to_string_pretty(file).context("serialize config")?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).context("create temp config")?;
    tmp.write_all(content.as_bytes()).context("write config")?;
    tmp.flush().context("flush config")?;
    store_fs::set_permissions(tmp.path(), constants::STORE_TOML_MODE)
        .context("set permissions on temp config")?;
    tmp.persist(path)
        .map_err(|err| anyhow::anyhow!("persist config: {}", err))?;
    Ok(())
}

/// Write a default store.toml unless one already exists. Returns whether it wrote.
pub fn ensure_default(path: &Path) -> Result<bool> {
    if path.exists() {
        load(path)?;
        return Ok(false);
    }
    save(path, &StoreFile::default())?;
    Ok(true)
}
