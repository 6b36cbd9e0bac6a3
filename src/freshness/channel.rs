//! Release channels and the preliminary-release filter
//!
//! Candidate versions matching the preliminary-release pattern are rejected
//! before any comparison; the survivors are assigned to the three report
//! channels (release, milestone, integration).

use crate::core::version::compare_versions;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Stability tier used when comparing available dependency versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseChannel {
  /// Final versions only
  Release,
  /// Final versions plus pre-releases that survived the preliminary filter
  Milestone,
  /// Everything, snapshots included
  Integration,
}

fn preliminary_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?i)[.-](alpha|beta|rc|cr|m|preview|test|pre|b|ea)[.\d-]*").expect("static pattern")
  })
}

/// Whether a candidate version is a preliminary release (alpha, beta, rc,
/// cr, m, preview, test, pre, b, ea markers, optionally followed by digits,
/// dots or dashes). Case-insensitive.
pub fn is_preliminary(version: &str) -> bool {
  preliminary_pattern().is_match(version)
}

fn is_snapshot_like(version: &str) -> bool {
  let lower = version.to_ascii_lowercase();
  lower.contains("snapshot") || lower.contains("-dev")
}

fn is_final(version: &str) -> bool {
  version
    .split(['.', '-', '+'])
    .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit()))
}

fn max_version<'a, I: Iterator<Item = &'a String>>(candidates: I) -> Option<String> {
  candidates
    .max_by(|a, b| compare_versions(a, b))
    .cloned()
}

/// Latest available versions per channel, computed from a candidate list
/// that has already passed the preliminary filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AvailableVersions {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub release: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub milestone: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub integration: Option<String>,
}

impl AvailableVersions {
  /// Compute the per-channel latest from raw candidates; preliminary
  /// releases are excluded from every channel.
  pub fn from_candidates(candidates: &[String]) -> Self {
    let accepted: Vec<&String> = candidates.iter().filter(|v| !is_preliminary(v)).collect();

    Self {
      release: max_version(accepted.iter().copied().filter(|v| is_final(v))),
      milestone: max_version(accepted.iter().copied().filter(|v| !is_snapshot_like(v))),
      integration: max_version(accepted.iter().copied()),
    }
  }

  /// Latest version for the given channel
  pub fn for_channel(&self, channel: ReleaseChannel) -> Option<&str> {
    match channel {
      ReleaseChannel::Release => self.release.as_deref(),
      ReleaseChannel::Milestone => self.milestone.as_deref(),
      ReleaseChannel::Integration => self.integration.as_deref(),
    }
  }
}

/// Compare a declared version against the channel's latest
pub fn compare_to_latest(declared: &str, latest: &str) -> Ordering {
  compare_versions(declared, latest)
}
