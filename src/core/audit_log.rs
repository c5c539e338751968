//! Append-only, hash-chained audit trail of account actions.
//!
//! Entries never carry secrets: only the action, the account name, the OS
//! actor and the outcome.

use crate::constants;
use crate::core::file_lock::FileLock;
use crate::core::paths::StorePaths;
use crate::util::fs as store_fs;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Actions recorded in the trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Init,
    Register,
    Login,
    Logout,
    UpdateProfile,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditAction::Init => "init",
            AuditAction::Register => "register",
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::UpdateProfile => "update_profile",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub actor: String,
    pub account: String,
    pub result: AuditResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_hash: Option<String>,
}

/// Entries read back from the log, plus how many lines failed to parse.
#[derive(Debug, Default)]
pub struct AuditLog {
    pub entries: Vec<AuditEntry>,
    pub malformed: usize,
}

fn detect_actor() -> String {
    if let Ok(user) = std::env::var("SUDO_USER") {
        if !user.is_empty() {
            return format!("{}(sudo)", user);
        }
    }
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

/// Append an entry for `action` on `account`. Returns the serialized line.
pub fn record(
    paths: &StorePaths,
    action: AuditAction,
    account: &str,
    error: Option<String>,
) -> Result<String> {
    record_as(paths, action, account, &detect_actor(), error)
}

pub fn record_as(
    paths: &StorePaths,
    action: AuditAction,
    account: &str,
    actor: &str,
    error: Option<String>,
) -> Result<String> {
    store_fs::ensure_dir(&paths.root, constants::STORE_DIR_MODE)
        .with_context(|| format!("create store root {}", paths.root.display()))?;
    let _lock = FileLock::exclusive(&paths.audit_lock)
        .with_context(|| format!("acquire lock {}", paths.audit_lock.display()))?;

    let mut entry = AuditEntry {
        timestamp: Utc::now(),
        action,
        actor: actor.to_string(),
        account: account.to_string(),
        result: AuditResult {
            success: error.is_none(),
            error,
        },
        prev_hash: last_entry_hash(&paths.audit_log)?,
        entry_hash: None,
    };
    entry.entry_hash = Some(compute_entry_hash(&entry)?);

    let line = serde_json::to_string(&entry).context("serialize audit entry")?;
    append_line(&paths.audit_log, &line)?;
    Ok(line)
}

/// SHA-256 over canonical JSON of the entry without its own hash.
fn compute_entry_hash(entry: &AuditEntry) -> Result<String> {
    let mut value = serde_json::to_value(entry).context("serialize for hash")?;
    if let Some(obj) = value.as_object_mut() {
        obj.remove("entry_hash");
    }
    let canonical = serde_json::to_string(&canonicalize_value(&value))
        .context("serialize canonical json")?;
    Ok(format!("{:064x}", Sha256::digest(canonical.as_bytes())))
}

/// Recursively sort object keys.
fn canonicalize_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = serde_json::Map::new();
            for k in keys {
                out.insert(k.clone(), canonicalize_value(&map[k]));
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(canonicalize_value).collect())
        }
        other => other.clone(),
    }
}

fn append_line(audit_path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(audit_path)
        .with_context(|| format!("open audit log {}", audit_path.display()))?;
    writeln!(file, "{}", line).context("write audit entry")?;
    store_fs::set_permissions(audit_path, constants::AUDIT_LOG_MODE)
        .context("set audit log permissions")?;
    Ok(())
}

/// Bytes read per step when scanning the log backwards.
const TAIL_CHUNK: u64 = 8192;

/// Hash the next entry chains to: the last entry's `entry_hash`, or the raw
/// SHA-256 of the last line when it does not parse.
fn last_entry_hash(path: &Path) -> Result<Option<String>> {
    last_entry_hash_with(path, TAIL_CHUNK)
}

fn last_entry_hash_with(path: &Path, chunk: u64) -> Result<Option<String>> {
    let Some(line) = last_line(path, chunk)? else {
        return Ok(None);
    };
    let hash = serde_json::from_slice::<AuditEntry>(&line)
        .ok()
        .and_then(|e| e.entry_hash)
        .unwrap_or_else(|| format!("{:064x}", Sha256::digest(&line)));
    Ok(Some(hash))
}

/// Last non-blank line of `path`, trimmed. Reads backwards from the end so
/// appends stay cheap however long the log grows.
fn last_line(path: &Path, chunk: u64) -> Result<Option<Vec<u8>>> {
    let mut file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("open audit log {}", path.display())),
    };
    let mut offset = file
        .metadata()
        .with_context(|| format!("stat {}", path.display()))?
        .len();

    let mut tail: Vec<u8> = Vec::new();
    while offset > 0 {
        let step = chunk.min(offset);
        offset -= step;
        file.seek(SeekFrom::Start(offset))
            .with_context(|| format!("seek {}", path.display()))?;
        let mut piece = vec![0u8; step as usize];
        file.read_exact(&mut piece)
            .with_context(|| format!("read {}", path.display()))?;
        piece.extend_from_slice(&tail);
        tail = piece;

        // The line is complete once a newline precedes its last byte.
        if let Some(end) = tail.iter().rposition(|b| !b.is_ascii_whitespace()) {
            if let Some(nl) = tail[..end].iter().rposition(|b| *b == b'\n') {
                return Ok(Some(tail[nl + 1..=end].trim_ascii().to_vec()));
            }
        }
    }

    let line = tail.trim_ascii();
    Ok((!line.is_empty()).then(|| line.to_vec()))
}

fn read_entries(path: &Path) -> Result<AuditLog> {
    if !path.exists() {
        return Ok(AuditLog::default());
    }
    let file =
        fs::File::open(path).with_context(|| format!("open audit log {}", path.display()))?;
    let mut log = AuditLog::default();
    for line in BufReader::new(file).lines() {
        let line = line.context("read audit log line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<AuditEntry>(trimmed) {
            Ok(entry) => log.entries.push(entry),
            Err(_) => log.malformed += 1,
        }
    }
    Ok(log)
}

/// Read the whole trail, oldest first.
pub fn read_log(paths: &StorePaths) -> Result<AuditLog> {
    read_entries(&paths.audit_log)
}

/// Verify the hash chain. Returns (total, errors).
pub fn verify_chain(paths: &StorePaths) -> Result<(usize, Vec<String>)> {
    let log = read_log(paths)?;
    let mut errors = Vec::new();
    if log.malformed > 0 {
        errors.push(format!("{} malformed lines", log.malformed));
    }

    let mut prev: Option<&String> = None;
    for (i, entry) in log.entries.iter().enumerate() {
        if i > 0 && entry.prev_hash.as_ref() != prev {
            errors.push(format!(
                "entry {}: prev_hash mismatch (expected {:?}, got {:?})",
                i + 1,
                prev,
                entry.prev_hash
            ));
        }
        match &entry.entry_hash {
            Some(stored) => match compute_entry_hash(entry) {
                Ok(computed) if &computed == stored => {}
                Ok(_) => errors.push(format!("entry {}: entry_hash mismatch (tampered?)", i + 1)),
                Err(e) => errors.push(format!("entry {}: cannot compute hash: {}", i + 1, e)),
            },
            None => errors.push(format!("entry {}: missing entry_hash", i + 1)),
        }
        prev = entry.entry_hash.as_ref();
    }

    Ok((log.entries.len(), errors))
}
