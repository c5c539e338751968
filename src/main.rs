use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    authstore::cli::Cli::parse().run()
}
