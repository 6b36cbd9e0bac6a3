//! Environment matrix command

use crate::core::config::ShipyardConfig;
use crate::core::environment::EnvironmentMatrix;
use crate::core::error::ShipyardResult;
use std::env;

/// Show the environment matrix
pub fn run_environments(json: bool) -> ShipyardResult<()> {
  let root = env::current_dir()?;
  let config = ShipyardConfig::load(&root)?;
  let matrix = EnvironmentMatrix::from_config(&config)?;

  if json {
    println!("{}", serde_json::to_string_pretty(matrix.environments())?);
    return Ok(());
  }

  println!("🧪 Environment Matrix\n");
  println!("{:<20} {:<12} {:<12} Module", "Environment", "Host", "Test");
  println!("──────────────────────────────────────────────────────────────");
  for env in matrix.environments() {
    println!(
      "{:<20} {:<12} {:<12} {}",
      env.name, env.host_version, env.test_version, env.module
    );
  }

  match matrix.primary_home_dir() {
    Some(home) => println!("\nPrimary home dir: {}", home.display()),
    None => println!("\n⚠️  No '{}' environment declared", crate::core::environment::PRIMARY_ENVIRONMENT),
  }

  Ok(())
}
