//! `version`

use anyhow::Result;

pub async fn execute() -> Result<()> {
    println!("project-planton {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
