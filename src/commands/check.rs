//! Dependency freshness check command
//!
//! Scans the declared dependencies, merges the nested sub-build report when
//! one is present, filters known-exempt entries, writes the structured
//! report and fails the build on unexpected staleness.

use crate::core::config::ShipyardConfig;
use crate::core::error::ShipyardResult;
use crate::freshness::{self, FreshnessReport, ReleaseChannel, ToolStatus};
use crate::freshness::source::{MavenMetadataSource, check_tool_update};
use std::env;

/// Run the freshness check
pub fn run_check(json: bool, no_tool_check: bool) -> ShipyardResult<()> {
  let root = env::current_dir()?;
  let config = ShipyardConfig::load(&root)?;
  let source = MavenMetadataSource::new(&config.repositories.maven);

  if !json {
    println!("🔍 Checking {} dependencies...\n", config.dependencies.len());
  }

  let mut report = freshness::scan(&config.dependencies, &source, ReleaseChannel::Release, !json);

  // A nested sub-build contributes its own report when present
  let nested_path = root.join(&config.repositories.nested_report_path);
  if nested_path.is_file() {
    let nested = FreshnessReport::load(&nested_path)?;
    report.merge(nested);
    if !json {
      println!("   Merged nested report from {}", nested_path.display());
    }
  }

  let ignored = report.apply_exemptions(&config.exempt);

  let report_path = root.join(&config.repositories.report_path);
  report.write(&report_path)?;

  let tool = if no_tool_check {
    ToolStatus::Skipped
  } else {
    check_tool_update(&source)
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    println!();
    print!("{}", report.format_summary(&ignored));
    println!("\nReport written to {}", report_path.display());

    match &tool {
      ToolStatus::UpdateAvailable { running, latest } => {
        println!("⚠️  tc-shipyard {} is available (running {})", latest, running)
      }
      ToolStatus::Unresolved => println!("⚠️  Could not determine the latest tc-shipyard version"),
      _ => {}
    }
  }

  report.evaluate(&tool)
}
