//! Initialize a tc-shipyard configuration for a plugin project

use crate::core::config::ShipyardConfig;
use crate::core::error::{ResultExt, ShipyardError, ShipyardResult};
use std::env;
use std::fs;

/// Write a starter .shipyard/config.toml
pub fn run_init() -> ShipyardResult<()> {
  let root = env::current_dir()?;

  if ShipyardConfig::exists(&root) {
    return Err(ShipyardError::with_help(
      format!("{} already exists", ShipyardConfig::config_path(&root).display()),
      "Edit the existing file instead, or remove it to start over.",
    ));
  }

  let dir = root.join(".shipyard");
  fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

  let config_path = ShipyardConfig::config_path(&root);
  fs::write(&config_path, ShipyardConfig::starter())
    .with_context(|| format!("Failed to write {}", config_path.display()))?;

  println!("✅ Created {}", config_path.display());
  println!();
  println!("Next steps:");
  println!("  1. Adjust [project] and the [[environments.entry]] version table");
  println!("  2. Declare your [[dependencies]] for `tc-shipyard check`");
  println!("  3. Run `tc-shipyard environments` to verify the matrix");

  Ok(())
}
