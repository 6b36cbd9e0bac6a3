//! Release body generation
//!
//! The release body is the commit log since the previously published tag,
//! oldest first, with the pipeline's own auto-commits filtered out and each
//! entry formatted as `- <summary> [<short-hash>]`. Without VCS info the
//! body degrades to empty.

use crate::core::vcs::{CommitInfo, Vcs};

/// Prefix of commits the pipeline creates itself; excluded from release notes
pub const TOOLING_COMMIT_PREFIX: &str = "[tc-shipyard] ";

/// Format commit summaries into the release body, excluding tooling commits
pub fn format_release_body(commits: &[CommitInfo]) -> String {
  commits
    .iter()
    .filter(|c| !c.summary.starts_with(TOOLING_COMMIT_PREFIX))
    .map(|c| format!("- {} [{}]", c.summary, c.short_sha))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Build the release body from the repository log since `previous_tag`.
///
/// Degrades to an empty body when there is no repository or the log cannot
/// be read (for example, the previous tag only exists on the hosting side).
pub fn release_body(vcs: Option<&dyn Vcs>, previous_tag: Option<&str>) -> String {
  let Some(vcs) = vcs else {
    return String::new();
  };

  match vcs.commits_since(previous_tag) {
    Ok(commits) => format_release_body(&commits),
    Err(_) => String::new(),
  }
}
