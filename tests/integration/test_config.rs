//! Integration tests for config loading and lossless version bumps

use crate::helpers::TestProject;
use anyhow::Result;
use std::fs;
use tc_shipyard::core::config::ShipyardConfig;
use tc_shipyard::core::error::ShipyardError;

#[test]
fn test_load_starter_config() {
  let project = TestProject::new();
  let config = project.config();

  assert_eq!(config.project.version, "1.1.1-SNAPSHOT");
  assert_eq!(config.plugin.name, "ssh-tunnel");
  assert_eq!(config.plugin.requires, vec!["ssh-manager".to_string()]);
}

#[test]
fn test_missing_config_reports_init_hint() {
  let dir = tempfile::TempDir::new().unwrap();

  let err = ShipyardConfig::load(dir.path()).unwrap_err();
  assert!(matches!(err, ShipyardError::Config(_)));
  assert!(err.help_message().unwrap().contains("tc-shipyard init"));
}

#[test]
fn test_save_load_roundtrip() -> Result<()> {
  let project = TestProject::new();
  let mut config = project.config();
  config.project.version = "2.0.0".to_string();
  config.save(&project.root)?;

  let reloaded = project.config();
  assert_eq!(reloaded.project.version, "2.0.0");
  Ok(())
}

#[test]
fn test_version_bump_preserves_comments_and_layout() -> Result<()> {
  let project = TestProject::new();

  // plant a comment the rewrite must not destroy
  let config_path = ShipyardConfig::config_path(&project.root);
  let content = fs::read_to_string(&config_path)?;
  let commented = content.replace(
    "[plugin]",
    "# host version table is maintained by hand\n[plugin]",
  );
  fs::write(&config_path, commented)?;

  ShipyardConfig::write_version(&project.root, "1.1.1")?;

  let after = fs::read_to_string(&config_path)?;
  assert!(after.contains("# host version table is maintained by hand"));
  assert!(after.contains("version = \"1.1.1\""));
  assert!(!after.contains("1.1.1-SNAPSHOT"));

  let reloaded = project.config();
  assert_eq!(reloaded.project.version, "1.1.1");
  Ok(())
}

#[test]
fn test_with_version_fixture() {
  let project = TestProject::with_version("3.1.4");
  assert_eq!(project.config().project.version, "3.1.4");
}
