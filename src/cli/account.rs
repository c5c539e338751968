//! register, login and logout.

use crate::cli::{prompt, CliContext};
use crate::core::account_service::Registration;
use crate::core::audit_log::AuditAction;
use crate::core::error::AccountError;
use crate::models::account::Profile;
use anyhow::{bail, Result};
use clap::Args;

pub(crate) fn parse_username(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("username cannot be empty".into());
    }
    if s.trim().is_empty() {
        return Err("username cannot be blank".into());
    }
    if s.chars().any(char::is_control) {
        return Err("control characters not allowed".into());
    }
    Ok(s.to_string())
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Username (case-sensitive, unique)
    #[arg(value_parser = parse_username)]
    pub username: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    /// Ten-digit contact number
    #[arg(long)]
    pub contact_number: String,

    #[arg(long)]
    pub address: String,

    /// Profile picture URI
    #[arg(long, default_value = "")]
    pub picture: String,

    /// Read password from stdin instead of interactive prompt
    #[arg(long)]
    pub from_stdin: bool,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(value_parser = parse_username)]
    pub username: String,

    /// Read password from stdin instead of interactive prompt
    #[arg(long)]
    pub from_stdin: bool,
}

pub fn run_register(ctx: &CliContext, args: RegisterArgs) -> Result<()> {
    if ctx.non_interactive && !args.from_stdin {
        bail!("--non-interactive requires --from-stdin for register");
    }

    let mut service = ctx.start_service()?;
    let password = prompt::read_password(args.from_stdin, &args.username, true)?;
    let form = Registration {
        username: args.username,
        password,
        profile: Profile {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            contact_number: args.contact_number,
            address: args.address,
            profile_picture: args.picture,
        },
    };

    let result = service.submit_registration(&form);
    ctx.audited(AuditAction::Register, &form.username, result)?;

    println!("Registration successful");
    println!("Log in with: authstore login {}", form.username);
    Ok(())
}

pub fn run_login(ctx: &CliContext, args: LoginArgs) -> Result<()> {
    if ctx.non_interactive && !args.from_stdin {
        bail!("--non-interactive requires --from-stdin for login");
    }

    let mut service = ctx.start_service()?;
    if let Some(current) = service.session().username() {
        bail!("already logged in as {} (run: authstore logout)", current);
    }

    let password = prompt::read_password(args.from_stdin, &args.username, false)?;
    let result = service
        .submit_login(&args.username, &password)
        .cloned();
    let session = match ctx.audited(AuditAction::Login, &args.username, result) {
        Ok(session) => session,
        Err(AccountError::InvalidCredentials) => bail!("Invalid credentials"),
        Err(e) => return Err(e.into()),
    };

    println!("Logged in successfully");
    if let Some(user) = &session.user {
        println!("Hello, {}!", user.profile.display_name());
    }
    Ok(())
}

pub fn run_logout(ctx: &CliContext) -> Result<()> {
    let mut service = ctx.start_service()?;
    let account = service
        .session()
        .user
        .as_ref()
        .map(|u| u.username.clone())
        .unwrap_or_else(|| "-".to_string());
    let was_logged_in = service.session().logged_in;

    let result = service.logout();
    ctx.audited(AuditAction::Logout, &account, result)?;

    if was_logged_in {
        println!("Logged out");
    } else {
        println!("Not logged in; session cleared");
    }
    Ok(())
}
