//! `segpush init`: write a default configuration file.

use clap::Args;
use std::path::PathBuf;

use crate::config::PushConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the configuration.
    #[arg(default_value = "segpush.toml")]
    pub path: PathBuf,

    /// Replace an existing file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    if args.path.exists() && !args.force {
        anyhow::bail!("configuration file already exists at {}", args.path.display());
    }

    PushConfig::default().save(&args.path)?;
    tracing::info!(path = %args.path.display(), "wrote default config");
    println!("Edit {} to point at your SCION installation.", args.path.display());
    println!("Run 'segpush push' to build and register the segments.");
    Ok(())
}
