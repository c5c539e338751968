//! `authstore audit`: browse and check the account audit trail.

use crate::cli::CliContext;
use crate::core::audit_log::{self, AuditEntry};
use anyhow::{bail, Result};
use chrono::{DateTime, Local};
use clap::{Args, Subcommand};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, Table};

#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// Show recent account activity
    Log(AuditLogArgs),
    /// Check that no entry was altered, dropped or reordered
    Verify,
}

#[derive(Args, Debug)]
pub struct AuditLogArgs {
    /// Show at most this many of the newest matching entries
    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    /// Only entries for this account
    #[arg(long)]
    pub account: Option<String>,

    /// Only failed attempts
    #[arg(long)]
    pub failures: bool,

    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

pub fn run(ctx: &CliContext, cmd: AuditCommand) -> Result<()> {
    match cmd {
        AuditCommand::Log(args) => run_log(ctx, args),
        AuditCommand::Verify => run_verify(ctx),
    }
}

/// Newest `args.limit` entries passing the account and failure filters,
/// oldest first.
fn select<'a>(entries: &'a [AuditEntry], args: &AuditLogArgs) -> Vec<&'a AuditEntry> {
    let mut picked: Vec<&AuditEntry> = entries
        .iter()
        .filter(|e| args.account.as_deref().map_or(true, |a| e.account == a))
        .filter(|e| !args.failures || !e.result.success)
        .collect();
    let excess = picked.len().saturating_sub(args.limit);
    picked.drain(..excess);
    picked
}

fn outcome_cell(entry: &AuditEntry) -> Cell {
    match (entry.result.success, entry.result.error.as_deref()) {
        (true, _) => Cell::new("ok").fg(Color::Green),
        (false, reason) => Cell::new(format!("failed: {}", reason.unwrap_or("unknown")))
            .fg(Color::Red),
    }
}

fn run_log(ctx: &CliContext, args: AuditLogArgs) -> Result<()> {
    if !matches!(args.format.as_str(), "table" | "json") {
        bail!("unknown format '{}' (use table or json)", args.format);
    }

    let log = audit_log::read_log(&ctx.paths)?;
    if log.malformed > 0 {
        eprintln!("warning: skipped {} unreadable audit lines", log.malformed);
    }
    let shown = select(&log.entries, &args);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("Nothing recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(
        ["When", "Account", "Action", "Outcome", "By"]
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    for entry in &shown {
        let when: DateTime<Local> = entry.timestamp.into();
        table.add_row(vec![
            Cell::new(when.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&entry.account),
            Cell::new(entry.action),
            outcome_cell(entry),
            Cell::new(&entry.actor),
        ]);
    }
    println!("{table}");

    let failed = shown.iter().filter(|e| !e.result.success).count();
    println!("{} shown, {} failed", shown.len(), failed);
    Ok(())
}

fn run_verify(ctx: &CliContext) -> Result<()> {
    let (total, problems) = audit_log::verify_chain(&ctx.paths)?;
    if problems.is_empty() {
        println!("audit trail intact ({} entries)", total);
        return Ok(());
    }

    eprintln!("audit trail damaged ({} entries checked):", total);
    for p in &problems {
        eprintln!("  - {}", p);
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit_log::{AuditAction, AuditResult};
    use chrono::Utc;

    fn entry(account: &str, error: Option<&str>) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            action: AuditAction::Login,
            actor: "tester".into(),
            account: account.into(),
            result: AuditResult {
                success: error.is_none(),
                error: error.map(String::from),
            },
            prev_hash: None,
            entry_hash: None,
        }
    }

    fn args(limit: usize, account: Option<&str>, failures: bool) -> AuditLogArgs {
        AuditLogArgs {
            limit,
            account: account.map(String::from),
            failures,
            format: "table".into(),
        }
    }

    #[test]
    fn test_select_filters_before_limit() {
        let entries = vec![
            entry("alice", None),
            entry("bob", None),
            entry("alice", Some("invalid credentials")),
            entry("bob", Some("invalid credentials")),
            entry("alice", None),
        ];

        let picked = select(&entries, &args(2, Some("alice"), false));
        assert_eq!(picked.len(), 2);
        assert!(picked[0].result.error.is_some());
        assert!(picked[1].result.success);

        let picked = select(&entries, &args(50, None, true));
        let names: Vec<&str> = picked.iter().map(|e| e.account.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn test_select_zero_limit() {
        let entries = vec![entry("alice", None)];
        assert!(select(&entries, &args(0, None, false)).is_empty());
    }

    #[test]
    fn test_outcome_cell_text() {
        assert_eq!(outcome_cell(&entry("a", None)).content(), "ok");
        assert_eq!(
            outcome_cell(&entry("a", Some("duplicate username"))).content(),
            "failed: duplicate username"
        );
    }
}
