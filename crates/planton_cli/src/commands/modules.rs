//! `pull`, `checkout` and `modules-version` over the staging clone.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use planton_iac::{Engine, StagingInfo};

#[derive(Args, Debug, Clone)]
pub struct CheckoutArgs {
    /// Tag, branch or commit
    #[arg(id = "checkout_version", value_name = "VERSION")]
    pub version: String,
}

pub async fn pull() -> Result<()> {
    let engine = Engine::from_env()?;
    engine.dirs().ensure()?;
    let version = engine.staging().pull(engine.runner())?;
    println!(
        "{} IaC modules updated{}",
        "✓".green().bold(),
        if version.is_empty() {
            String::new()
        } else {
            format!(" to {}", version.bold())
        }
    );
    Ok(())
}

pub async fn checkout(args: CheckoutArgs) -> Result<()> {
    let engine = Engine::from_env()?;
    engine.dirs().ensure()?;
    engine.staging().checkout(engine.runner(), &args.version)?;
    println!(
        "{} IaC modules checked out at {}",
        "✓".green().bold(),
        args.version.bold()
    );
    Ok(())
}

pub async fn version() -> Result<()> {
    let engine = Engine::from_env()?;
    print!("{}", render_info(&engine.staging().info()));
    Ok(())
}

fn render_info(info: &StagingInfo) -> String {
    let mut out = String::new();
    if !info.exists {
        out.push_str("No IaC modules cached yet.\n\n");
        out.push_str("Run one of:\n");
        out.push_str("  project-planton pull                 # clone the latest modules\n");
        out.push_str("  project-planton checkout <version>   # clone and pin a version\n");
        return out;
    }

    let title = "IaC Modules Staging Area";
    out.push_str(&format!("{}\n{}\n\n", title, "=".repeat(title.len())));
    out.push_str(&format!("Location: {}\n", info.path.display()));
    match &info.version {
        Some(v) => out.push_str(&format!("Version:  {}\n", v)),
        None => out.push_str("Version:  (unknown - .version file not found)\n"),
    }
    out.push_str("\nCommands:\n");
    out.push_str("  project-planton pull                 # update to the latest version\n");
    out.push_str("  project-planton checkout <version>   # switch to a specific version\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_missing_staging() {
        let info = StagingInfo {
            exists: false,
            version: None,
            path: PathBuf::from("/home/u/.project-planton/staging/project-planton"),
        };
        let out = render_info(&info);
        assert!(out.starts_with("No IaC modules cached yet."));
        assert!(out.contains("project-planton pull"));
    }

    #[test]
    fn test_render_staging_with_version() {
        let info = StagingInfo {
            exists: true,
            version: Some("v0.2.270".to_string()),
            path: PathBuf::from("/tmp/staging/project-planton"),
        };
        let out = render_info(&info);
        assert!(out.contains("IaC Modules Staging Area\n========================"));
        assert!(out.contains("Location: /tmp/staging/project-planton"));
        assert!(out.contains("Version:  v0.2.270"));
    }

    #[test]
    fn test_render_staging_without_version_file() {
        let info = StagingInfo {
            exists: true,
            version: None,
            path: PathBuf::from("/tmp/staging/project-planton"),
        };
        assert!(render_info(&info).contains("(unknown - .version file not found)"));
    }
}
