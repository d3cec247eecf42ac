//! `tofu load-tfvars` / `terraform load-tfvars`

use anyhow::Result;
use clap::Args;
use planton_iac::{render_tfvars, Engine, SilentPresenter};
use planton_manifest::ManifestSource;

#[derive(Args, Debug, Clone)]
pub struct LoadTfvarsArgs {
    /// Manifest file path or http(s) URL
    #[arg(value_name = "MANIFEST")]
    pub manifest: Option<String>,

    /// Field override, e.g. --set spec.replicas=3 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

pub async fn execute(args: LoadTfvarsArgs) -> Result<()> {
    let engine = Engine::from_env()?;
    let source = ManifestSource {
        manifest: args.manifest,
        ..Default::default()
    };
    let loaded = engine
        .load(&source, &args.overrides, true, &SilentPresenter)
        .await?;

    print!("{}", render_tfvars(&loaded.manifest)?);
    Ok(())
}
