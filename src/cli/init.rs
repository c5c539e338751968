//! `authstore init`: create the store layout and a default `store.toml`.
//! Re-running it is harmless.

use crate::cli::CliContext;
use crate::core::audit_log::AuditAction;
use crate::core::config;
use crate::core::credential_store::CredentialStore;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Do not write a default store.toml
    #[arg(long)]
    pub no_config: bool,
}

pub fn run(ctx: &CliContext, args: InitArgs) -> Result<()> {
    let paths = &ctx.paths;
    let store = ctx.store()?;
    let result = store.initialize();
    ctx.audited(AuditAction::Init, "-", result)?;

    if !args.no_config && config::ensure_default(&paths.store_toml)? {
        println!("Wrote {}", paths.store_toml.display());
    }

    println!("store initialized at {}", paths.root.display());
    println!("accounts: {}", store.account_count()?);
    Ok(())
}
