//! Integration tests for release planning and the pipeline driver

use crate::helpers::TestProject;
use std::fs;
use tc_shipyard::commands::release::pipeline::{self, StageKind};
use tc_shipyard::core::config::ShipyardConfig;
use tc_shipyard::core::error::{ShipyardError, ValidationError};
use tc_shipyard::github::Credentials;

#[test]
fn test_snapshot_version_skips_publish_stages() {
  let project = TestProject::new(); // starter is 1.1.1-SNAPSHOT
  let plan = pipeline::build_plan(&project.config()).unwrap();

  assert!(!plan.release_version);
  assert!(!plan.includes_publish());

  let stage_names: Vec<String> = plan.stages.iter().map(StageKind::name).collect();
  assert!(stage_names.contains(&"version-bump".to_string()));
  assert!(stage_names.contains(&"tag".to_string()));
  assert!(stage_names.contains(&"package:server".to_string()));
  assert!(stage_names.contains(&"package:serverPre2018.2".to_string()));
  assert!(!stage_names.contains(&"publish".to_string()));
}

#[test]
fn test_release_version_schedules_full_pipeline() {
  let project = TestProject::with_version("1.2.0");
  let plan = pipeline::build_plan(&project.config()).unwrap();

  assert!(plan.release_version);
  assert!(plan.includes_publish());
  assert_eq!(plan.tag_name, "v1.2.0");
  assert!(plan.skipped.is_empty());
}

#[test]
fn test_dry_run_touches_nothing() {
  let project = TestProject::new();
  let config = project.config();
  let plan = pipeline::build_plan(&config).unwrap();

  let outcome = pipeline::execute(&config, &plan, &project.root, None, &Credentials::default(), false).unwrap();

  assert_eq!(outcome.completed.len(), plan.stages.len());
  assert!(outcome.artifacts.is_empty());
  assert!(outcome.release_url.is_none());
  // nothing was packaged, nothing was rewritten
  assert!(!project.path("build/distributions").exists());
  assert_eq!(project.config().project.version, "1.1.1-SNAPSHOT");
}

#[test]
fn test_publishing_run_refuses_without_credentials() {
  let project = TestProject::with_version("1.2.0");
  let config = project.config();
  let plan = pipeline::build_plan(&config).unwrap();

  let err = pipeline::execute(&config, &plan, &project.root, None, &Credentials::default(), true).unwrap_err();

  assert!(matches!(
    err,
    ShipyardError::Validation(ValidationError::MissingCredential)
  ));
  // pre-flight failed before any stage ran
  assert!(!project.path("build/distributions").exists());
}

#[test]
fn test_apply_halts_at_first_failing_stage() {
  // snapshot project without a git repository: the bump succeeds, the tag
  // stage cannot, and nothing after it runs
  let project = TestProject::new();
  let config = project.config();
  let plan = pipeline::build_plan(&config).unwrap();

  let err = pipeline::execute(&config, &plan, &project.root, None, &Credentials::default(), true).unwrap_err();
  assert!(err.to_string().contains("git repository"));

  // the bump stage completed and is not rolled back
  assert_eq!(project.config().project.version, "1.1.1");
  // the packaging stages never ran
  assert!(!project.path("build/distributions").exists());
}

#[test]
fn test_version_bump_commit_message_prefix_is_tooling_prefix() {
  use tc_shipyard::commands::release::notes::TOOLING_COMMIT_PREFIX;
  use tc_shipyard::core::vcs::CommitInfo;
  use tc_shipyard::commands::release::notes::format_release_body;

  // a body built from a log that contains the pipeline's own bump commit
  let commits = vec![
    CommitInfo {
      sha: "a".repeat(40),
      short_sha: "aaaaaaa".to_string(),
      summary: "fix tunnel cleanup".to_string(),
    },
    CommitInfo {
      sha: "b".repeat(40),
      short_sha: "bbbbbbb".to_string(),
      summary: format!("{}prepare release v1.2.0", TOOLING_COMMIT_PREFIX),
    },
  ];

  let body = format_release_body(&commits);
  assert_eq!(body, "- fix tunnel cleanup [aaaaaaa]");
}

#[test]
fn test_plan_json_roundtrips() {
  let project = TestProject::new();
  let plan = pipeline::build_plan(&project.config()).unwrap();

  let json = plan.to_json().unwrap();
  let value: serde_json::Value = serde_json::from_str(&json).unwrap();

  assert_eq!(value["release_version"], serde_json::Value::Bool(false));
  assert_eq!(value["tag_name"], "v1.1.1");
}

#[test]
fn test_config_version_file_drives_the_gate() {
  let project = TestProject::new();
  ShipyardConfig::write_version(&project.root, "2.0.0").unwrap();

  let plan = pipeline::build_plan(&project.config()).unwrap();
  assert!(plan.release_version);

  // flipping back to a snapshot flips the gate
  ShipyardConfig::write_version(&project.root, "2.0.1-SNAPSHOT").unwrap();
  let plan = pipeline::build_plan(&project.config()).unwrap();
  assert!(!plan.release_version);

  let raw = fs::read_to_string(ShipyardConfig::config_path(&project.root)).unwrap();
  assert!(raw.contains("2.0.1-SNAPSHOT"));
}
