//! CLI routing and command dispatch.

use crate::core::account_service::AccountService;
use crate::core::audit_log::{self, AuditAction};
use crate::core::credential_store::{FileCredentialStore, StoreOptions};
use crate::core::local_storage::LocalStorage;
use crate::core::paths::StorePaths;
use crate::core::session_store::SessionStore;
use crate::models::policy::PolicySection;
use crate::util::journald::{self, Priority};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod account;
pub mod audit;
pub mod doctor;
pub mod init;
pub mod profile;
mod prompt;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: StorePaths,
    pub non_interactive: bool,
    pub policy: PolicySection,
    pub policy_load_warning: Option<String>,
}

impl CliContext {
    pub fn store(&self) -> Result<FileCredentialStore> {
        let argon2 = self
            .policy
            .argon2_params()
            .map_err(|e| anyhow!("invalid argon2 settings in store.toml: {}", e))?;
        Ok(FileCredentialStore::new(
            &self.paths,
            StoreOptions {
                argon2,
                min_password_length: self.policy.min_password_length,
            },
        ))
    }

    /// Build the account service and restore the persisted session.
    pub fn start_service(&self) -> Result<AccountService<FileCredentialStore>> {
        let sessions = SessionStore::new(LocalStorage::new(self.paths.session.clone()));
        let mut service = AccountService::new(self.store()?, sessions)
            .with_profile_validation(self.policy.validate_profile_updates);
        service.start()?;
        Ok(service)
    }

    /// Write an audit entry, and optionally forward it to journald.
    /// Failures are reported but never abort the command.
    pub fn audit(&self, action: AuditAction, account: &str, error: Option<String>) {
        let priority = if error.is_some() {
            Priority::Warning
        } else {
            Priority::Info
        };
        match audit_log::record(&self.paths, action, account, error) {
            Ok(line) => {
                if self.policy.journald_audit {
                    journald::forward(priority, &line);
                }
            }
            Err(e) => eprintln!("warning: audit log failed: {:#}", e),
        }
    }

    /// Audit the outcome of `result` and hand it back unchanged.
    pub fn audited<T, E: std::fmt::Display>(
        &self,
        action: AuditAction,
        account: &str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        self.audit(action, account, result.as_ref().err().map(|e| e.to_string()));
        result
    }
}

#[derive(Parser, Debug)]
#[command(name = "authstore", version, about = "Local account registration, login and profiles")]
pub struct Cli {
    /// Store root directory (default: $AUTHSTORE_ROOT or ~/.authstore)
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Run in non-interactive mode (no prompts, suitable for automation)
    #[arg(long, global = true, env = "AUTHSTORE_NON_INTERACTIVE")]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let paths = StorePaths::resolve(self.root);

        // A broken store.toml should not lock the user out; fall back to defaults.
        let mut policy_load_warning: Option<String> = None;
        let policy = match crate::core::config::load(&paths.store_toml) {
            Ok(file) => file.policy,
            Err(e) => {
                policy_load_warning = Some(format!("cannot read policy from store.toml: {:#}", e));
                PolicySection::default()
            }
        };

        let ctx = CliContext {
            paths,
            non_interactive: self.non_interactive,
            policy,
            policy_load_warning,
        };

        if let Some(w) = &ctx.policy_load_warning {
            if !matches!(self.command, Commands::Doctor(_)) {
                eprintln!("warning: {}", w);
            }
        }

        match self.command {
            Commands::Init(args) => init::run(&ctx, args),
            Commands::Register(args) => account::run_register(&ctx, args),
            Commands::Login(args) => account::run_login(&ctx, args),
            Commands::Logout => account::run_logout(&ctx),
            Commands::Status(args) => profile::run_status(&ctx, args),
            Commands::Profile { command } => profile::run(&ctx, command),
            Commands::Audit { command } => audit::run(&ctx, command),
            Commands::Doctor(args) => doctor::run(&ctx, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the store directory and default config
    Init(init::InitArgs),
    /// Register a new account
    Register(account::RegisterArgs),
    /// Log in and remember the session
    Login(account::LoginArgs),
    /// Forget the current session
    Logout,
    /// Show the current session and profile
    Status(profile::StatusArgs),
    /// View or edit the logged-in profile
    Profile {
        #[command(subcommand)]
        command: profile::ProfileCommand,
    },
    /// View the audit trail
    Audit {
        #[command(subcommand)]
        command: audit::AuditCommand,
    },
    /// Diagnose the store layout and integrity (read-only)
    Doctor(doctor::DoctorArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_register() {
        let cli = Cli::try_parse_from([
            "authstore",
            "--root",
            "/tmp/x",
            "register",
            "alice",
            "--first-name",
            "Alice",
            "--last-name",
            "A",
            "--email",
            "a@x.com",
            "--contact-number",
            "1234567890",
            "--address",
            "1 Main St",
            "--from-stdin",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Commands::Register(args) => {
                assert_eq!(args.username, "alice");
                assert_eq!(args.contact_number, "1234567890");
                assert_eq!(args.picture, "");
                assert!(args.from_stdin);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_register_requires_profile_flags() {
        let result = Cli::try_parse_from(["authstore", "register", "alice"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_login_and_global_flag_after_subcommand() {
        let cli =
            Cli::try_parse_from(["authstore", "login", "alice", "--non-interactive", "--from-stdin"])
                .unwrap();
        assert!(cli.non_interactive);
        assert!(matches!(cli.command, Commands::Login(ref a) if a.username == "alice"));
    }

    #[test]
    fn test_empty_username_rejected() {
        assert!(Cli::try_parse_from(["authstore", "login", ""]).is_err());
    }

    #[test]
    fn test_parse_profile_edit() {
        let cli = Cli::try_parse_from([
            "authstore",
            "profile",
            "edit",
            "--address",
            "2 Side St",
        ])
        .unwrap();
        match cli.command {
            Commands::Profile {
                command: profile::ProfileCommand::Edit(args),
            } => {
                assert_eq!(args.address.as_deref(), Some("2 Side St"));
                assert!(args.first_name.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_audit_log_filters() {
        let cli = Cli::try_parse_from([
            "authstore",
            "audit",
            "log",
            "--account",
            "alice",
            "--failures",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Audit {
                command: audit::AuditCommand::Log(args),
            } => {
                assert_eq!(args.account.as_deref(), Some("alice"));
                assert!(args.failures);
                assert_eq!(args.format, "json");
                assert_eq!(args.limit, 50);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_audited_passes_result_through() {
        let dir = tempfile::TempDir::new().unwrap();
        let ctx = CliContext {
            paths: StorePaths::from_root(dir.path().to_path_buf()),
            non_interactive: true,
            policy: PolicySection::default(),
            policy_load_warning: None,
        };
        let ok: Result<u8, String> = ctx.audited(AuditAction::Login, "alice", Ok(7));
        assert_eq!(ok, Ok(7));
        let err: Result<u8, String> =
            ctx.audited(AuditAction::Login, "alice", Err("invalid credentials".into()));
        assert!(err.is_err());

        let log = audit_log::read_log(&ctx.paths).unwrap();
        assert_eq!(log.entries.len(), 2);
        assert!(log.entries[0].result.success);
        assert!(!log.entries[1].result.success);
    }
}
