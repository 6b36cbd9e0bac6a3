//! VCS abstraction for the release pipeline
//!
//! The pipeline only needs a narrow slice of version control: head/dirty
//! state for the embedded build info, the commit log since the last release
//! for the release body, tag creation and the remote URL for deriving the
//! hosting repository. The trait keeps that seam swappable for tests.

pub mod system_git;

use crate::core::error::ShipyardResult;
use std::path::Path;

/// Minimal VCS surface consumed by packaging and the release pipeline
pub trait Vcs {
  /// Repository working tree root
  fn root(&self) -> &Path;

  /// Current HEAD commit SHA
  fn head_commit(&self) -> ShipyardResult<String>;

  /// Whether the working tree has no uncommitted changes
  fn is_clean(&self) -> ShipyardResult<bool>;

  /// URL of the given remote, if configured
  fn remote_url(&self, name: &str) -> ShipyardResult<Option<String>>;

  /// Commits reachable from HEAD and not from `since_tag`, oldest first.
  /// With no tag, the full history.
  fn commits_since(&self, since_tag: Option<&str>) -> ShipyardResult<Vec<CommitInfo>>;

  /// Whether a tag with this name exists
  fn tag_exists(&self, name: &str) -> ShipyardResult<bool>;

  /// Create a signed annotated tag at HEAD
  fn create_signed_tag(&self, name: &str, message: &str) -> ShipyardResult<()>;

  /// Stage the given paths and commit them with the given message
  fn commit_paths(&self, paths: &[&Path], message: &str) -> ShipyardResult<()>;
}

/// Information about a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
  pub sha: String,
  pub short_sha: String,
  /// First line of the commit message
  pub summary: String,
}
