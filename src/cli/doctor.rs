//! Read-only diagnostics for the store layout and integrity.

use crate::cli::CliContext;
use crate::constants;
use crate::core::audit_log;
use crate::core::file_lock::{self, LockState};
use crate::core::session_store::SessionStore;
use crate::core::local_storage::LocalStorage;
use crate::util::fs as store_fs;
use anyhow::Result;
use clap::Args;
use std::path::Path;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Also verify the audit chain
    #[arg(long)]
    pub audit: bool,
}

#[derive(Default)]
struct Tally {
    ok: u32,
    warn: u32,
    fail: u32,
}

impl Tally {
    fn pass(&mut self, msg: impl AsRef<str>) {
        println!("  [PASS] {}", msg.as_ref());
        self.ok += 1;
    }

    fn warn(&mut self, msg: impl AsRef<str>) {
        println!("  [WARN] {}", msg.as_ref());
        self.warn += 1;
    }

    fn fail(&mut self, msg: impl AsRef<str>) {
        println!("  [FAIL] {}", msg.as_ref());
        self.fail += 1;
    }
}

pub fn run(ctx: &CliContext, args: DoctorArgs) -> Result<()> {
    let paths = &ctx.paths;
    let mut t = Tally::default();

    println!("Doctor: {}", paths);
    if let Some(w) = &ctx.policy_load_warning {
        t.warn(w);
    }

    if !paths.root.is_dir() {
        t.fail(format!("store root missing: {} (run: authstore init)", paths.root.display()));
        return finish(t);
    }
    t.pass(format!("store root exists: {}", paths.root.display()));
    check_mode(&mut t, "store root", &paths.root, constants::STORE_DIR_MODE);

    if paths.db.is_dir() {
        check_mode(&mut t, "db namespace", &paths.db, constants::STORE_DIR_MODE);
        match ctx.store() {
            Ok(store) => match store.account_count() {
                Ok(n) => t.pass(format!("account collection readable ({} accounts)", n)),
                Err(e) => t.fail(format!("account collection: {}", e)),
            },
            Err(e) => t.fail(format!("{:#}", e)),
        }
    } else {
        t.fail(format!("db namespace missing: {}", paths.db.display()));
    }

    match SessionStore::new(LocalStorage::new(paths.session.clone())).load() {
        Ok(session) if session.logged_in && session.user.is_none() => {
            t.warn("session flag set but cached profile unreadable")
        }
        Ok(session) => t.pass(format!(
            "session readable ({})",
            session.username().unwrap_or("logged out")
        )),
        Err(e) => t.fail(format!("session: {}", e)),
    }

    if paths.store_toml.exists() {
        t.pass("store.toml present");
    } else {
        t.warn("store.toml missing (defaults in effect)");
    }

    match file_lock::lock_state(&paths.store_lock) {
        Ok(LockState::Absent) => t.pass("store lock free (no lock file yet)"),
        Ok(LockState::Free) => t.pass("store lock free"),
        Ok(LockState::Held) => t.warn("store lock held by another process"),
        Err(e) => t.fail(format!("store lock: {}", e)),
    }

    if args.audit {
        match audit_log::verify_chain(paths) {
            Ok((total, errors)) if errors.is_empty() => {
                t.pass(format!("audit chain ok ({} entries)", total))
            }
            Ok((_, errors)) => t.fail(format!("audit chain: {} errors", errors.len())),
            Err(e) => t.fail(format!("audit chain: {:#}", e)),
        }
    }

    finish(t)
}

fn check_mode(t: &mut Tally, label: &str, path: &Path, expected: u32) {
    match store_fs::mode_of(path) {
        Some(mode) if mode == expected => t.pass(format!("{} mode ok: {:04o}", label, mode)),
        Some(mode) => t.warn(format!(
            "{} mode: {:04o} (expected {:04o})",
            label, mode, expected
        )),
        None => {}
    }
}

fn finish(t: Tally) -> Result<()> {
    println!();
    println!("Doctor summary: {} pass, {} warn, {} fail", t.ok, t.warn, t.fail);
    if t.fail > 0 {
        std::process::exit(1);
    }
    Ok(())
}
