//! `validate-manifest`: load and validate without dispatching.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use planton_iac::{Engine, SilentPresenter};

use super::args::ManifestArgs;

#[derive(Args, Debug, Clone)]
pub struct ValidateManifestArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

pub async fn execute(args: ValidateManifestArgs) -> Result<()> {
    let engine = Engine::from_env()?;
    let loaded = engine
        .load(&args.manifest.source(), &args.manifest.overrides, true, &SilentPresenter)
        .await?;

    let manifest = &loaded.manifest;
    println!(
        "{} {} {} is valid",
        "✓".green().bold(),
        manifest.kind,
        manifest.name().bold()
    );
    println!("  Provider: {}", manifest.kind.provider().display_name());
    Ok(())
}
