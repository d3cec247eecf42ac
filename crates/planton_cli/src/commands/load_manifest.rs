//! `load-manifest`: print the effective manifest.

use anyhow::Result;
use clap::Args;
use planton_iac::{Engine, SilentPresenter};

use super::args::ManifestArgs;

#[derive(Args, Debug, Clone)]
pub struct LoadManifestArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

pub async fn execute(args: LoadManifestArgs) -> Result<()> {
    let engine = Engine::from_env()?;
    let loaded = engine
        .load(&args.manifest.source(), &args.manifest.overrides, true, &SilentPresenter)
        .await?;

    print!("{}", loaded.manifest.to_yaml()?);
    Ok(())
}
