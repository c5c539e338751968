//! `authstore status` and `authstore profile edit`: show the session and
//! cached profile, and save an edited profile for the logged-in user.

use crate::cli::{prompt, CliContext};
use crate::core::audit_log::AuditAction;
use crate::models::account::Profile;
use crate::models::session::Session;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Edit and save the logged-in profile
    Edit(EditArgs),
}

/// Fields left out keep their current value; the result is saved as a whole.
#[derive(Args, Debug)]
pub struct EditArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub contact_number: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub picture: Option<String>,
}

impl EditArgs {
    fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.contact_number.is_none()
            && self.address.is_none()
            && self.picture.is_none()
    }

    fn apply(self, mut profile: Profile) -> Profile {
        if let Some(v) = self.first_name {
            profile.first_name = v;
        }
        if let Some(v) = self.last_name {
            profile.last_name = v;
        }
        if let Some(v) = self.email {
            profile.email = v;
        }
        if let Some(v) = self.contact_number {
            profile.contact_number = v;
        }
        if let Some(v) = self.address {
            profile.address = v;
        }
        if let Some(v) = self.picture {
            profile.profile_picture = v;
        }
        profile
    }
}

#[derive(Serialize)]
struct StatusView<'a> {
    logged_in: bool,
    username: Option<&'a str>,
    profile: Option<&'a Profile>,
}

impl<'a> From<&'a Session> for StatusView<'a> {
    fn from(session: &'a Session) -> Self {
        let user = session.user.as_ref().filter(|_| session.logged_in);
        Self {
            logged_in: session.logged_in,
            username: user.map(|u| u.username.as_str()),
            profile: user.map(|u| &u.profile),
        }
    }
}

pub fn run(ctx: &CliContext, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Edit(args) => run_edit(ctx, args),
    }
}

pub fn run_status(ctx: &CliContext, args: StatusArgs) -> Result<()> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }
    let service = ctx.start_service()?;
    let view = StatusView::from(service.session());

    if args.format == "json" {
        let json = serde_json::to_string_pretty(&view).context("serialize status")?;
        println!("{}", json);
        return Ok(());
    }

    if !view.logged_in {
        println!("Not logged in");
        return Ok(());
    }
    let (Some(username), Some(profile)) = (view.username, view.profile) else {
        println!("Logged in (cached profile unavailable; log out and back in)");
        return Ok(());
    };

    println!("Hello, {}!", profile.display_name());
    println!("{}", profile_table(username, profile));
    Ok(())
}

fn profile_table(username: &str, profile: &Profile) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Field").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    let dash = |v: &str| if v.is_empty() { "-".to_string() } else { v.to_string() };
    table.add_row(vec!["Username".to_string(), username.to_string()]);
    table.add_row(vec!["First name".to_string(), dash(&profile.first_name)]);
    table.add_row(vec!["Last name".to_string(), dash(&profile.last_name)]);
    table.add_row(vec!["Email".to_string(), dash(&profile.email)]);
    table.add_row(vec!["Contact number".to_string(), dash(&profile.contact_number)]);
    table.add_row(vec!["Address".to_string(), dash(&profile.address)]);
    table.add_row(vec!["Picture".to_string(), dash(&profile.profile_picture)]);
    table
}

fn run_edit(ctx: &CliContext, args: EditArgs) -> Result<()> {
    let mut service = ctx.start_service()?;
    let Some(user) = service.session().user.clone().filter(|_| service.session().logged_in) else {
        bail!("not logged in (run: authstore login <username>)");
    };

    let edited = if args.is_empty() {
        if ctx.non_interactive {
            bail!("--non-interactive requires at least one field flag for profile edit");
        }
        prompt_profile(&user.profile)?
    } else {
        args.apply(user.profile.clone())
    };

    if edited == user.profile {
        println!("No changes");
        return Ok(());
    }

    let result = service.save_profile(edited);
    ctx.audited(AuditAction::UpdateProfile, &user.username, result)?;
    println!("Profile updated");
    Ok(())
}

fn prompt_profile(current: &Profile) -> Result<Profile> {
    Ok(Profile {
        first_name: prompt::edit_field("First name", &current.first_name)?,
        last_name: prompt::edit_field("Last name", &current.last_name)?,
        email: prompt::edit_field("Email", &current.email)?,
        contact_number: prompt::edit_field("Contact number", &current.contact_number)?,
        address: prompt::edit_field("Address", &current.address)?,
        profile_picture: prompt::edit_field("Picture", &current.profile_picture)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            first_name: "Alice".into(),
            last_name: "A".into(),
            email: "a@x.com".into(),
            contact_number: "1234567890".into(),
            address: "1 Main St".into(),
            profile_picture: String::new(),
        }
    }

    #[test]
    fn test_apply_overrides_only_given_fields() {
        let args = EditArgs {
            first_name: None,
            last_name: None,
            email: Some("new@x.com".into()),
            contact_number: None,
            address: Some(String::new()),
            picture: None,
        };
        assert!(!args.is_empty());
        let edited = args.apply(profile());
        assert_eq!(edited.email, "new@x.com");
        assert_eq!(edited.address, "");
        assert_eq!(edited.first_name, "Alice");
    }

    #[test]
    fn test_status_view_hides_cache_when_logged_out() {
        let mut session = Session::logged_in_as("alice", profile());
        session.logged_in = false;
        let view = StatusView::from(&session);
        assert!(view.username.is_none());
        assert!(view.profile.is_none());
    }

    #[test]
    fn test_status_view_json() {
        let session = Session::logged_in_as("alice", profile());
        let json = serde_json::to_value(StatusView::from(&session)).unwrap();
        assert_eq!(json["logged_in"], true);
        assert_eq!(json["username"], "alice");
        assert_eq!(json["profile"]["firstName"], "Alice");
    }

    #[test]
    fn test_profile_table_renders_dash_for_empty() {
        let rendered = profile_table("alice", &profile()).to_string();
        assert!(rendered.contains("alice"));
        assert!(rendered.contains("1 Main St"));
        assert!(rendered.contains('-'));
    }
}
