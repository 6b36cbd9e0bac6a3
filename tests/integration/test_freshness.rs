//! Integration tests for the freshness check: scan, merge, report file

use crate::helpers::TestProject;
use tc_shipyard::core::config::{DependencyDecl, ExemptDependency};
use tc_shipyard::freshness::{self, FixtureSource, FreshnessReport, ReleaseChannel, ToolStatus};

fn decl(group: &str, name: &str, version: &str) -> DependencyDecl {
  DependencyDecl {
    group: group.to_string(),
    name: name.to_string(),
    version: version.to_string(),
  }
}

#[test]
fn test_scan_merge_and_write_report() {
  let project = TestProject::new();
  let config = project.config();

  // a nested sub-build already produced its own report
  let nested = r#"{
    "current": { "count": 1, "dependencies": [
      { "group": "org.nested", "name": "helper", "version": "1.0" }
    ]},
    "outdated": { "count": 0, "dependencies": [] },
    "exceeded": { "count": 0, "dependencies": [] },
    "unresolved": { "count": 0, "dependencies": [] }
  }"#;
  project.write_file("buildSrc/build/dependencyUpdates/report.json", nested.as_bytes());

  let source = FixtureSource::new()
    .with_versions("org.slf4j", "slf4j-api", &["1.7.25", "1.7.26"])
    .with_versions("org.jetbrains.teamcity", "server-api", &["2018.1.2", "2019.1"]);

  let dependencies = vec![
    decl("org.slf4j", "slf4j-api", "1.7.26"),
    decl("org.jetbrains.teamcity", "server-api", "2018.1.2"),
  ];

  let mut report = freshness::scan(&dependencies, &source, ReleaseChannel::Release, false);

  let nested_path = project.root.join(&config.repositories.nested_report_path);
  assert!(nested_path.is_file());
  report.merge(FreshnessReport::load(&nested_path).unwrap());

  let exempt = vec![ExemptDependency {
    group: "org.jetbrains.teamcity".to_string(),
    name: "server-api".to_string(),
    version: Some("2018.1.2".to_string()),
  }];
  let ignored = report.apply_exemptions(&exempt);

  assert_eq!(ignored.len(), 1);
  assert_eq!(report.current.count, 2);
  assert_eq!(report.outdated.count, 0);

  let report_path = project.root.join(&config.repositories.report_path);
  report.write(&report_path).unwrap();
  assert!(report_path.is_file());

  // the written report parses back with counts intact
  let reloaded = FreshnessReport::load(&report_path).unwrap();
  assert_eq!(reloaded.current.count, 2);
  assert!(reloaded.evaluate(&ToolStatus::Skipped).is_ok());
}

#[test]
fn test_stale_dependency_gates_the_build() {
  let source = FixtureSource::new().with_versions("org.slf4j", "slf4j-api", &["1.7.25", "1.7.26"]);
  let dependencies = vec![decl("org.slf4j", "slf4j-api", "1.7.25")];

  let report = freshness::scan(&dependencies, &source, ReleaseChannel::Release, false);
  let err = report.evaluate(&ToolStatus::Skipped).unwrap_err();

  assert!(err.to_string().contains("Outdated libraries found"));
}

#[test]
fn test_preliminary_only_candidates_pass_the_gate() {
  let source =
    FixtureSource::new().with_versions("org.example", "lib", &["1.0", "2.0-alpha1", "2.0-rc-2", "2.0.M3"]);
  let dependencies = vec![decl("org.example", "lib", "1.0")];

  let report = freshness::scan(&dependencies, &source, ReleaseChannel::Release, false);

  assert_eq!(report.outdated.count, 0);
  assert!(report.evaluate(&ToolStatus::Skipped).is_ok());
}

#[test]
fn test_unresolved_dependency_fails_before_outdated() {
  let source = FixtureSource::new().with_versions("org.slf4j", "slf4j-api", &["1.7.25", "1.7.26"]);
  let dependencies = vec![
    decl("org.slf4j", "slf4j-api", "1.7.25"),
    decl("org.example", "vanished", "0.9"),
  ];

  let report = freshness::scan(&dependencies, &source, ReleaseChannel::Release, false);
  let err = report.evaluate(&ToolStatus::Skipped).unwrap_err();

  assert!(err.to_string().contains("Unresolved libraries found"));
}
