use anyhow::{bail, Result};

use newsx_core::AppConfig;

/// Write the default configuration so it can be edited by hand
pub fn run(force: bool) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    AppConfig::default().save()?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
