//! System git backend
//!
//! Uses git plumbing commands through a subprocess with an isolated
//! environment. Tag signing in particular has to go through the git CLI so
//! the user's signing configuration applies.

use super::{CommitInfo, Vcs};
use crate::core::error::{GitError, ResultExt, ShipyardError, ShipyardResult};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  repo_path: PathBuf,
  work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository, or return None when the path is not inside one.
  pub fn discover(path: &Path) -> Option<Self> {
    Self::open(path).ok()
  }

  /// Open a git repository
  pub fn open(path: &Path) -> ShipyardResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      return Err(ShipyardError::Git(GitError::RepoNotFound {
        path: path.to_path_buf(),
      }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = PathBuf::from(stdout.trim());

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree,
    })
  }

  /// Create a safe git command with an isolated environment
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(&self.repo_path);

    // Don't trust global config beyond what git needs to run
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }

  fn run(&self, args: &[&str]) -> ShipyardResult<String> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
      return Err(ShipyardError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }
}

impl Vcs for SystemGit {
  fn root(&self) -> &Path {
    &self.work_tree
  }

  fn head_commit(&self) -> ShipyardResult<String> {
    Ok(self.run(&["rev-parse", "HEAD"])?.trim().to_string())
  }

  fn is_clean(&self) -> ShipyardResult<bool> {
    Ok(self.run(&["status", "--porcelain"])?.trim().is_empty())
  }

  fn remote_url(&self, name: &str) -> ShipyardResult<Option<String>> {
    let output = self
      .git_cmd()
      .args(["remote", "get-url", name])
      .output()
      .context("Failed to execute git remote get-url")?;

    if !output.status.success() {
      return Ok(None);
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(if url.is_empty() { None } else { Some(url) })
  }

  fn commits_since(&self, since_tag: Option<&str>) -> ShipyardResult<Vec<CommitInfo>> {
    // Unit separator keeps summaries with brackets parseable
    let format = "--format=%H\u{1f}%h\u{1f}%s";
    let range;
    let mut args = vec!["log", "--reverse", format];
    if let Some(tag) = since_tag {
      range = format!("{}..HEAD", tag);
      args.push(&range);
    }

    let stdout = self.run(&args)?;
    let mut commits = Vec::new();
    for line in stdout.lines() {
      let mut fields = line.split('\u{1f}');
      let (Some(sha), Some(short_sha), Some(summary)) = (fields.next(), fields.next(), fields.next()) else {
        continue;
      };
      commits.push(CommitInfo {
        sha: sha.to_string(),
        short_sha: short_sha.to_string(),
        summary: summary.to_string(),
      });
    }

    Ok(commits)
  }

  fn tag_exists(&self, name: &str) -> ShipyardResult<bool> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &format!("refs/tags/{}", name)])
      .output()
      .context("Failed to execute git rev-parse")?;
    Ok(output.status.success())
  }

  fn create_signed_tag(&self, name: &str, message: &str) -> ShipyardResult<()> {
    self.run(&["tag", "-s", name, "-m", message])?;
    Ok(())
  }

  fn commit_paths(&self, paths: &[&Path], message: &str) -> ShipyardResult<()> {
    let mut add_args: Vec<String> = vec!["add".to_string(), "--".to_string()];
    for path in paths {
      add_args.push(path.display().to_string());
    }
    let add_refs: Vec<&str> = add_args.iter().map(String::as_str).collect();
    self.run(&add_refs)?;

    self.run(&["commit", "-m", message])?;
    Ok(())
  }
}
