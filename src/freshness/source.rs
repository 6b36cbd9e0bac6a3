//! Version sources
//!
//! Where available dependency versions come from: a Maven repository's
//! `maven-metadata.xml` in production, an in-memory fixture in tests. The
//! trait keeps the checker independent of the transport.

use crate::core::error::{ApiError, ShipyardError, ShipyardResult};
use crate::freshness::channel::{AvailableVersions, ReleaseChannel};
use crate::freshness::report::ToolStatus;
use crate::{TOOL_GROUP, TOOL_NAME, TOOL_VERSION};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

/// Source of published versions for a (group, name) coordinate pair
pub trait VersionSource: Sync {
  /// All published versions, unordered and unfiltered
  fn available_versions(&self, group: &str, name: &str) -> ShipyardResult<Vec<String>>;
}

/// Fetches version lists from a Maven repository's metadata files
pub struct MavenMetadataSource {
  base_url: String,
  client: reqwest::blocking::Client,
}

impl MavenMetadataSource {
  pub fn new(base_url: &str) -> Self {
    let client = reqwest::blocking::Client::builder()
      .user_agent(concat!("tc-shipyard/", env!("CARGO_PKG_VERSION")))
      .timeout(Duration::from_secs(30))
      .build()
      .unwrap_or_default();

    Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      client,
    }
  }

  fn metadata_url(&self, group: &str, name: &str) -> String {
    format!("{}/{}/{}/maven-metadata.xml", self.base_url, group.replace('.', "/"), name)
  }
}

impl VersionSource for MavenMetadataSource {
  fn available_versions(&self, group: &str, name: &str) -> ShipyardResult<Vec<String>> {
    let url = self.metadata_url(group, name);
    let response = self.client.get(&url).send()?;

    let status = response.status();
    if !status.is_success() {
      return Err(ShipyardError::Api(ApiError::Status {
        status: status.as_u16(),
        url,
        body: response.text().unwrap_or_default(),
      }));
    }

    Ok(parse_metadata_versions(&response.text()?))
  }
}

fn version_tag_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"<version>([^<]+)</version>").expect("static pattern"))
}

/// Extract the `<version>` entries from a `maven-metadata.xml` body
pub fn parse_metadata_versions(xml: &str) -> Vec<String> {
  version_tag_pattern()
    .captures_iter(xml)
    .map(|cap| cap[1].trim().to_string())
    .collect()
}

/// In-memory version source for tests and offline runs
#[derive(Debug, Default)]
pub struct FixtureSource {
  versions: HashMap<(String, String), Vec<String>>,
}

impl FixtureSource {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register versions for a coordinate pair
  pub fn with_versions(mut self, group: &str, name: &str, versions: &[&str]) -> Self {
    self.versions.insert(
      (group.to_string(), name.to_string()),
      versions.iter().map(|s| s.to_string()).collect(),
    );
    self
  }
}

impl VersionSource for FixtureSource {
  fn available_versions(&self, group: &str, name: &str) -> ShipyardResult<Vec<String>> {
    self
      .versions
      .get(&(group.to_string(), name.to_string()))
      .cloned()
      .ok_or_else(|| ShipyardError::message(format!("No metadata for {}:{}", group, name)))
  }
}

/// Whether `latest` is newer than the running tool version. Tool releases
/// are semver; fall back to the lenient comparison for anything that isn't.
fn tool_is_behind(running: &str, latest: &str) -> bool {
  match (semver::Version::parse(running), semver::Version::parse(latest)) {
    (Ok(running), Ok(latest)) => running < latest,
    _ => crate::core::version::compare_versions(running, latest) == std::cmp::Ordering::Less,
  }
}

/// Check whether a newer tc-shipyard release exists.
///
/// A failed lookup counts as unresolved, exactly like any other dependency;
/// the check command can be told to skip this with `--no-tool-check`.
pub fn check_tool_update(source: &dyn VersionSource) -> ToolStatus {
  let candidates = match source.available_versions(TOOL_GROUP, TOOL_NAME) {
    Ok(candidates) => candidates,
    Err(_) => return ToolStatus::Unresolved,
  };

  let available = AvailableVersions::from_candidates(&candidates);
  match available.for_channel(ReleaseChannel::Release) {
    Some(latest) if tool_is_behind(TOOL_VERSION, latest) => ToolStatus::UpdateAvailable {
      running: TOOL_VERSION.to_string(),
      latest: latest.to_string(),
    },
    Some(_) => ToolStatus::Current,
    None => ToolStatus::Current,
  }
}
