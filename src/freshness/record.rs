//! Dependency records and freshness classification

use crate::freshness::channel::{AvailableVersions, ReleaseChannel, compare_to_latest};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Resolution state of a dependency, decided once per check invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessStatus {
  Current,
  Outdated,
  Exceeded,
  Unresolved,
}

/// A classified dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
  pub group: String,
  pub name: String,
  pub version: String,
  #[serde(default)]
  pub available: AvailableVersions,
}

impl DependencyRecord {
  /// `group:name [version]` display form
  pub fn coordinates(&self) -> String {
    format!("{}:{} [{}]", self.group, self.name, self.version)
  }
}

/// Classify a declared dependency against its candidate versions.
///
/// Candidates matching the preliminary pattern never take part in the
/// comparison; when nothing newer survives the filter, the dependency is
/// current. A declared version ahead of the channel's latest is exceeded.
pub fn classify(
  group: &str,
  name: &str,
  declared: &str,
  candidates: &[String],
  channel: ReleaseChannel,
) -> (DependencyRecord, FreshnessStatus) {
  let available = AvailableVersions::from_candidates(candidates);

  let status = match available.for_channel(channel) {
    None => FreshnessStatus::Current,
    Some(latest) => match compare_to_latest(declared, latest) {
      Ordering::Equal => FreshnessStatus::Current,
      Ordering::Less => FreshnessStatus::Outdated,
      Ordering::Greater => FreshnessStatus::Exceeded,
    },
  };

  let record = DependencyRecord {
    group: group.to_string(),
    name: name.to_string(),
    version: declared.to_string(),
    available,
  };

  (record, status)
}

/// Record for a dependency whose lookup failed
pub fn unresolved(group: &str, name: &str, declared: &str) -> (DependencyRecord, FreshnessStatus) {
  (
    DependencyRecord {
      group: group.to_string(),
      name: name.to_string(),
      version: declared.to_string(),
      available: AvailableVersions::default(),
    },
    FreshnessStatus::Unresolved,
  )
}
