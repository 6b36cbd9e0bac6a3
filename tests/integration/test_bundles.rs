//! Integration tests for bundle assembly

use crate::helpers::{TestProject, zip_entry_names, zip_entry_text};
use tc_shipyard::core::bundle::{self, BuildInfo};

fn fake_build_outputs(project: &TestProject) {
  project.write_file("server/build/libs/ssh-tunnel-server.jar", b"server-jar");
  project.write_file("serverPre2018.2/build/libs/ssh-tunnel-serverPre2018.2.jar", b"legacy-jar");
  project.write_file("commonServer/build/libs/ssh-tunnel-commonServer.jar", b"common-server-jar");
  project.write_file("common/build/libs/ssh-tunnel-common.jar", b"common-jar");
  project.write_file("agent/build/libs/ssh-tunnel-agent.jar", b"agent-jar");
  project.write_file("commonServer/resources/kotlin-dsl/ssh-tunnel.xml", b"<dsl/>");
}

fn build_info() -> BuildInfo {
  BuildInfo {
    version: "1.1.1-SNAPSHOT".to_string(),
    commit_id: "abc1234".to_string(),
    timestamp: "2024-01-01T00:00:00+00:00".to_string(),
  }
}

#[test]
fn test_server_bundle_layout() {
  let project = TestProject::new();
  fake_build_outputs(&project);

  let config = project.config();
  let module = config.module("server").unwrap();
  let out_dir = project.path("build/distributions");

  let output = bundle::build_server_bundle(&config, &module, &build_info(), &project.root, &out_dir).unwrap();

  // archive name carries the module-resolved version
  assert!(
    output
      .path
      .file_name()
      .unwrap()
      .to_string_lossy()
      .contains("ssh-tunnel-1.1.1+b-SNAPSHOT")
  );
  assert_eq!(output.sha256.len(), 64);

  let names = zip_entry_names(&output.path);
  assert!(names.contains(&"teamcity-plugin.xml".to_string()));
  assert!(names.contains(&"version.properties".to_string()));
  assert!(names.contains(&"server/ssh-tunnel-server.jar".to_string()));
  assert!(names.contains(&"server/ssh-tunnel-commonServer.jar".to_string()));
  assert!(names.contains(&"server/ssh-tunnel-common.jar".to_string()));
  assert!(names.contains(&"agent/ssh-tunnel.zip".to_string()));
  assert!(names.contains(&"kotlin-dsl/ssh-tunnel.xml".to_string()));
  // the legacy module's jar stays out of the current bundle
  assert!(!names.iter().any(|n| n.contains("serverPre2018.2")));
}

#[test]
fn test_server_bundle_descriptor_per_target() {
  let project = TestProject::new();
  fake_build_outputs(&project);

  let config = project.config();
  let out_dir = project.path("build/distributions");

  let current = config.module("server").unwrap();
  let current_out =
    bundle::build_server_bundle(&config, &current, &build_info(), &project.root, &out_dir).unwrap();
  let current_xml = zip_entry_text(&current_out.path, "teamcity-plugin.xml");
  assert!(current_xml.contains("min-build=\"60925\""));
  assert!(current_xml.contains("allow-runtime-reload=\"true\""));

  let legacy = config.module("serverPre2018.2").unwrap();
  let legacy_out =
    bundle::build_server_bundle(&config, &legacy, &build_info(), &project.root, &out_dir).unwrap();
  let legacy_xml = zip_entry_text(&legacy_out.path, "teamcity-plugin.xml");
  assert!(legacy_xml.contains("max-build=\"58744\""));
  assert!(!legacy_xml.contains("min-build"));
}

#[test]
fn test_version_properties_embedded() {
  let project = TestProject::new();
  fake_build_outputs(&project);

  let config = project.config();
  let module = config.module("server").unwrap();
  let out_dir = project.path("build/distributions");

  let output = bundle::build_server_bundle(&config, &module, &build_info(), &project.root, &out_dir).unwrap();
  let properties = zip_entry_text(&output.path, "version.properties");

  assert!(properties.contains("version=1.1.1-SNAPSHOT"));
  assert!(properties.contains("commitId=abc1234"));
  assert!(properties.contains("buildTimestamp=2024-01-01T00:00:00+00:00"));
}

#[test]
fn test_standalone_agent_bundle() {
  let project = TestProject::new();
  fake_build_outputs(&project);

  let config = project.config();
  let out_dir = project.path("build/distributions");

  let output = bundle::build_agent_bundle(&config, &project.root, &out_dir).unwrap();
  assert_eq!(output.path.file_name().unwrap().to_string_lossy(), "ssh-tunnel.zip");

  let names = zip_entry_names(&output.path);
  assert!(names.contains(&"teamcity-agent-plugin.xml".to_string()));
  assert!(names.contains(&"lib/ssh-tunnel-agent.jar".to_string()));
  assert!(names.contains(&"lib/ssh-tunnel-common.jar".to_string()));

  let descriptor = zip_entry_text(&output.path, "teamcity-agent-plugin.xml");
  assert!(descriptor.contains("use-separate-classloader=\"true\""));
  assert!(descriptor.contains("<plugin name=\"ssh-manager\"/>"));
}

#[test]
fn test_bundles_tolerate_missing_build_outputs() {
  // no jars anywhere: the bundle still assembles with descriptor + metadata
  let project = TestProject::new();
  let config = project.config();
  let module = config.module("server").unwrap();
  let out_dir = project.path("build/distributions");

  let output = bundle::build_server_bundle(&config, &module, &build_info(), &project.root, &out_dir).unwrap();
  let names = zip_entry_names(&output.path);

  assert!(names.contains(&"teamcity-plugin.xml".to_string()));
  assert!(names.contains(&"version.properties".to_string()));
  assert!(!names.iter().any(|n| n.ends_with(".jar")));
}
