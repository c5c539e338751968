//! Secret and field input shared by the account commands.

use crate::constants;
use anyhow::{bail, Context, Result};
use dialoguer::{Input, Password};
use std::io::Read;
use zeroize::Zeroizing;

/// Read a password from stdin or a masked prompt. `confirm` asks twice.
pub fn read_password(from_stdin: bool, username: &str, confirm: bool) -> Result<Zeroizing<String>> {
    let password = if from_stdin {
        let mut buf = Zeroizing::new(String::new());
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read password from stdin")?;
        Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string())
    } else {
        let mut prompt = Password::new()
            .with_prompt(format!("Password for {}", username))
            .allow_empty_password(false);
        if confirm {
            prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
        }
        Zeroizing::new(prompt.interact().context("read password from prompt")?)
    };
    check_size(&password)?;
    Ok(password)
}

fn check_size(password: &str) -> Result<()> {
    if password.len() > constants::MAX_SECRET_SIZE {
        bail!(
            "password exceeds maximum size ({} bytes, max {} bytes)",
            password.len(),
            constants::MAX_SECRET_SIZE
        );
    }
    Ok(())
}

/// Prompt for a profile field, prefilled with its current value.
pub fn edit_field(label: &str, current: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .with_context(|| format!("read {}", label))
}
