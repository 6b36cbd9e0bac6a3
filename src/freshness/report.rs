//! Freshness report: classification buckets, exempt filtering, merge and
//! persistence
//!
//! Four buckets with counts, written as JSON to a fixed relative path,
//! optionally merged with the report of a nested sub-build.

use crate::core::config::ExemptDependency;
use crate::core::error::{ResultExt, ShipyardError, ShipyardResult, ValidationError};
use crate::freshness::record::{DependencyRecord, FreshnessStatus};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Outcome of the tool self-update check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
  /// Running the latest version
  Current,
  /// A newer tool version exists
  UpdateAvailable { running: String, latest: String },
  /// The tool's coordinates could not be resolved
  Unresolved,
  /// Check disabled
  Skipped,
}

/// One classification bucket
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bucket {
  pub count: usize,
  pub dependencies: Vec<DependencyRecord>,
}

impl Bucket {
  fn push(&mut self, record: DependencyRecord) {
    self.dependencies.push(record);
    self.count = self.dependencies.len();
  }

  fn extend(&mut self, records: Vec<DependencyRecord>) {
    self.dependencies.extend(records);
    self.count = self.dependencies.len();
  }
}

/// Classification of all declared dependencies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreshnessReport {
  pub current: Bucket,
  pub outdated: Bucket,
  pub exceeded: Bucket,
  pub unresolved: Bucket,
}

impl FreshnessReport {
  /// Insert a classified record into its bucket
  pub fn insert(&mut self, record: DependencyRecord, status: FreshnessStatus) {
    match status {
      FreshnessStatus::Current => self.current.push(record),
      FreshnessStatus::Outdated => self.outdated.push(record),
      FreshnessStatus::Exceeded => self.exceeded.push(record),
      FreshnessStatus::Unresolved => self.unresolved.push(record),
    }
  }

  /// Remove known-exempt entries from the outdated bucket and return them.
  ///
  /// An exempt entry matches on group and name, and on the declared version
  /// too when it carries one. Nothing else is touched, regardless of report
  /// ordering.
  pub fn apply_exemptions(&mut self, exempt: &[ExemptDependency]) -> Vec<DependencyRecord> {
    let matches = |record: &DependencyRecord| {
      exempt.iter().any(|e| {
        e.group == record.group
          && e.name == record.name
          && e.version.as_deref().is_none_or(|v| v == record.version)
      })
    };

    let (ignored, kept): (Vec<_>, Vec<_>) = self.outdated.dependencies.drain(..).partition(|r| matches(r));

    self.outdated.dependencies = kept;
    self.outdated.count = self.outdated.dependencies.len();
    ignored
  }

  /// Merge another report (e.g. a nested sub-build's) into this one
  pub fn merge(&mut self, other: FreshnessReport) {
    self.current.extend(other.current.dependencies);
    self.outdated.extend(other.outdated.dependencies);
    self.exceeded.extend(other.exceeded.dependencies);
    self.unresolved.extend(other.unresolved.dependencies);
  }

  /// Load a report from a JSON file
  pub fn load(path: &Path) -> ShipyardResult<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read report from {}", path.display()))?;
    let report = serde_json::from_str(&content)
      .with_context(|| format!("Failed to parse report from {}", path.display()))?;
    Ok(report)
  }

  /// Write the report as pretty JSON, creating parent directories
  pub fn write(&self, path: &Path) -> ShipyardResult<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(self)?;
    fs::write(path, json).with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
  }

  /// Gate the build on the report: unresolved dependencies (or an
  /// unresolvable tool check) fail first, then outdated dependencies (or an
  /// available tool update).
  pub fn evaluate(&self, tool: &ToolStatus) -> ShipyardResult<()> {
    if *tool == ToolStatus::Unresolved || self.unresolved.count != 0 {
      return Err(ShipyardError::Validation(ValidationError::UnresolvedDependencies {
        count: self.unresolved.count,
      }));
    }

    if let ToolStatus::UpdateAvailable { running, latest } = tool {
      return Err(ShipyardError::Validation(ValidationError::ToolUpdateAvailable {
        running: running.clone(),
        latest: latest.clone(),
      }));
    }

    if self.outdated.count != 0 {
      return Err(ShipyardError::Validation(ValidationError::OutdatedDependencies {
        count: self.outdated.count,
      }));
    }

    Ok(())
  }

  /// Sectioned plain-text summary
  pub fn format_summary(&self, ignored: &[DependencyRecord]) -> String {
    let mut out = String::new();

    if !self.current.dependencies.is_empty() {
      out.push_str("The following dependencies are using the latest release version:\n");
      for dep in &self.current.dependencies {
        out.push_str(&format!(" - {}\n", dep.coordinates()));
      }
    }

    if !self.exceeded.dependencies.is_empty() {
      out.push_str("\nThe following dependencies exceed the version found at the release revision level:\n");
      for dep in &self.exceeded.dependencies {
        out.push_str(&format!(" - {}\n", dep.coordinates()));
      }
    }

    if !self.outdated.dependencies.is_empty() {
      out.push_str("\nThe following dependencies have later release versions:\n");
      for dep in &self.outdated.dependencies {
        let latest = dep.available.release.as_deref().unwrap_or("?");
        out.push_str(&format!(" - {}:{} [{} -> {}]\n", dep.group, dep.name, dep.version, latest));
      }
    }

    if !self.unresolved.dependencies.is_empty() {
      out.push_str("\nFailed to determine the latest version for the following dependencies:\n");
      for dep in &self.unresolved.dependencies {
        out.push_str(&format!(" - {}:{}\n", dep.group, dep.name));
      }
    }

    if !ignored.is_empty() {
      out.push_str("\nThe following dependencies have later release versions but were ignored:\n");
      for dep in ignored {
        let latest = dep.available.release.as_deref().unwrap_or("?");
        out.push_str(&format!(" - {}:{} [{} -> {}]\n", dep.group, dep.name, dep.version, latest));
      }
    }

    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::freshness::channel::AvailableVersions;

  fn record(group: &str, name: &str, version: &str) -> DependencyRecord {
    DependencyRecord {
      group: group.to_string(),
      name: name.to_string(),
      version: version.to_string(),
      available: AvailableVersions::default(),
    }
  }

  fn exempt(group: &str, name: &str, version: Option<&str>) -> ExemptDependency {
    ExemptDependency {
      group: group.to_string(),
      name: name.to_string(),
      version: version.map(str::to_string),
    }
  }

  #[test]
  fn test_exempt_filter_removes_exact_entries_only() {
    let mut report = FreshnessReport::default();
    report.insert(record("org.a", "one", "1.0"), FreshnessStatus::Outdated);
    report.insert(record("org.a", "two", "1.0"), FreshnessStatus::Outdated);
    report.insert(record("org.b", "one", "1.0"), FreshnessStatus::Outdated);

    let ignored = report.apply_exemptions(&[exempt("org.a", "one", None)]);

    assert_eq!(ignored.len(), 1);
    assert_eq!(ignored[0].group, "org.a");
    assert_eq!(ignored[0].name, "one");
    assert_eq!(report.outdated.count, 2);
  }

  #[test]
  fn test_exempt_filter_respects_version_pin() {
    let mut report = FreshnessReport::default();
    report.insert(record("org.a", "one", "1.0"), FreshnessStatus::Outdated);
    report.insert(record("org.a", "one", "2.0"), FreshnessStatus::Outdated);

    let ignored = report.apply_exemptions(&[exempt("org.a", "one", Some("1.0"))]);

    assert_eq!(ignored.len(), 1);
    assert_eq!(ignored[0].version, "1.0");
    assert_eq!(report.outdated.count, 1);
    assert_eq!(report.outdated.dependencies[0].version, "2.0");
  }

  #[test]
  fn test_exempt_filter_does_not_touch_other_buckets() {
    let mut report = FreshnessReport::default();
    report.insert(record("org.a", "one", "1.0"), FreshnessStatus::Current);
    report.insert(record("org.a", "one", "1.0"), FreshnessStatus::Unresolved);

    let ignored = report.apply_exemptions(&[exempt("org.a", "one", None)]);

    assert!(ignored.is_empty());
    assert_eq!(report.current.count, 1);
    assert_eq!(report.unresolved.count, 1);
  }

  #[test]
  fn test_merge_accumulates_counts() {
    let mut report = FreshnessReport::default();
    report.insert(record("org.a", "one", "1.0"), FreshnessStatus::Current);

    let mut nested = FreshnessReport::default();
    nested.insert(record("org.b", "two", "1.0"), FreshnessStatus::Current);
    nested.insert(record("org.b", "three", "1.0"), FreshnessStatus::Outdated);

    report.merge(nested);

    assert_eq!(report.current.count, 2);
    assert_eq!(report.outdated.count, 1);
  }

  #[test]
  fn test_evaluate_passes_on_clean_report() {
    let mut report = FreshnessReport::default();
    report.insert(record("org.a", "one", "1.0"), FreshnessStatus::Current);
    assert!(report.evaluate(&ToolStatus::Current).is_ok());
    assert!(report.evaluate(&ToolStatus::Skipped).is_ok());
  }

  #[test]
  fn test_evaluate_fails_on_unresolved_before_outdated() {
    let mut report = FreshnessReport::default();
    report.insert(record("org.a", "one", "1.0"), FreshnessStatus::Outdated);
    report.insert(record("org.b", "two", "1.0"), FreshnessStatus::Unresolved);

    let err = report.evaluate(&ToolStatus::Current).unwrap_err();
    assert!(err.to_string().contains("Unresolved"));
  }

  #[test]
  fn test_evaluate_fails_on_tool_update() {
    let report = FreshnessReport::default();
    let tool = ToolStatus::UpdateAvailable {
      running: "0.3.0".to_string(),
      latest: "0.4.0".to_string(),
    };

    let err = report.evaluate(&tool).unwrap_err();
    assert!(err.to_string().contains("outdated"));
  }
}
