//! Dependency freshness checking
//!
//! Scans the declared dependencies against a version source, classifies
//! every one of them (current, outdated, exceeded, unresolved) and produces
//! a structured report that gates the build.

pub mod channel;
pub mod record;
pub mod report;
pub mod source;

pub use channel::{AvailableVersions, ReleaseChannel};
pub use record::{DependencyRecord, FreshnessStatus};
pub use report::{FreshnessReport, ToolStatus};
pub use source::{FixtureSource, MavenMetadataSource, VersionSource, check_tool_update};

use crate::core::config::DependencyDecl;
use crate::ui::progress::MultiProgress;
use rayon::prelude::*;

/// Scan all declared dependencies in parallel and build the report.
///
/// Classification itself is deterministic; only the lookups run
/// concurrently, and records are inserted in declaration order.
pub fn scan(
  dependencies: &[DependencyDecl],
  source: &dyn VersionSource,
  release_channel: ReleaseChannel,
  show_progress: bool,
) -> FreshnessReport {
  let progress = if show_progress {
    Some(MultiProgress::new())
  } else {
    None
  };
  let bar = progress
    .as_ref()
    .map(|mp| mp.add_bar(dependencies.len(), "Checking dependencies".to_string()));

  let classified: Vec<(DependencyRecord, FreshnessStatus)> = dependencies
    .par_iter()
    .map(|dep| {
      let result = source.available_versions(&dep.group, &dep.name);
      if let (Some(mp), Some(bar)) = (&progress, &bar) {
        mp.inc(bar);
      }

      match result {
        Ok(candidates) => record::classify(&dep.group, &dep.name, &dep.version, &candidates, release_channel),
        Err(_) => record::unresolved(&dep.group, &dep.name, &dep.version),
      }
    })
    .collect();

  let mut report = FreshnessReport::default();
  for (record, status) in classified {
    report.insert(record, status);
  }
  report
}
