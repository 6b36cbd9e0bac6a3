//! Release pipeline: stage graph construction and the sequential driver
//!
//! The pipeline is a small DAG (version bump, tag, one packaging stage per
//! server module, publish, milestone rollover) topologically executed in a
//! single thread. Whether the publish and milestone stages run at all is
//! decided once, statically, from the starting version string. Validation
//! that needs the resolved stage list (credentials, clean tree) happens in a
//! pre-flight pass before the first stage runs.

use crate::commands::release::milestone;
use crate::commands::release::notes::{self, TOOLING_COMMIT_PREFIX};
use crate::core::bundle::{self, BuildInfo, BundleOutput};
use crate::core::config::ShipyardConfig;
use crate::core::error::{GitError, ShipyardError, ShipyardResult, ValidationError};
use crate::core::version::{is_snapshot, strip_snapshot};
use crate::core::vcs::Vcs;
use crate::github::{Credentials, GitHubClient, repository_slug};
use crate::ui::progress::MultiProgress;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A node in the release stage graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "kebab-case")]
pub enum StageKind {
  VersionBump,
  Tag,
  Package { module: String },
  Publish,
  FinishMilestone,
}

impl StageKind {
  /// Display name of the stage
  pub fn name(&self) -> String {
    match self {
      StageKind::VersionBump => "version-bump".to_string(),
      StageKind::Tag => "tag".to_string(),
      StageKind::Package { module } => format!("package:{}", module),
      StageKind::Publish => "publish".to_string(),
      StageKind::FinishMilestone => "finish-milestone".to_string(),
    }
  }

  /// Stages gated on the release-version flag
  fn gated(&self) -> bool {
    matches!(self, StageKind::Publish | StageKind::FinishMilestone)
  }
}

impl fmt::Display for StageKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// The resolved release plan: ordered stage list plus the statically
/// computed version facts every stage consumes.
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
  pub starting_version: String,
  /// True iff the starting version does not end with the pre-release marker;
  /// gates the publish and milestone stages.
  pub release_version: bool,
  pub effective_version: String,
  pub tag_name: String,
  pub stages: Vec<StageKind>,
  pub skipped: Vec<StageKind>,
}

impl ReleasePlan {
  /// Whether a publishing stage made it into the resolved stage list
  pub fn includes_publish(&self) -> bool {
    self.stages.iter().any(|s| s.gated())
  }

  /// Human-readable plan
  pub fn format_table(&self) -> String {
    let mut out = String::from("🚀 Release Plan\n\n");
    out.push_str(&format!(
      "Version: {} → {}\n",
      self.starting_version, self.effective_version
    ));
    out.push_str(&format!("Tag:     {}\n", self.tag_name));
    out.push_str(&format!(
      "Publish: {}\n\n",
      if self.release_version {
        "enabled"
      } else {
        "skipped (snapshot version)"
      }
    ));

    out.push_str("Stages\n──────\n");
    for (idx, stage) in self.stages.iter().enumerate() {
      out.push_str(&format!(" {}. {}\n", idx + 1, stage));
    }

    if !self.skipped.is_empty() {
      let skipped: Vec<String> = self.skipped.iter().map(StageKind::name).collect();
      out.push_str(&format!("\nSkipped: {}\n", skipped.join(", ")));
    }

    out
  }

  /// JSON output for CI
  pub fn to_json(&self) -> ShipyardResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}

/// Build the release plan for the project.
///
/// Packaging stages depend on the tag, publish depends on every packaging
/// stage, milestone rollover depends on publish. Gated stages drop out of
/// the resolved list when the starting version is a snapshot.
pub fn build_plan(config: &ShipyardConfig) -> ShipyardResult<ReleasePlan> {
  let starting_version = config.project.version.clone();
  let release_version = !is_snapshot(&starting_version);
  let effective_version = strip_snapshot(&starting_version).to_string();
  let tag_name = format!("v{}", effective_version);

  // Edges point dependent → dependency; the reversed toposort yields
  // execution order.
  let mut graph: DiGraph<StageKind, ()> = DiGraph::new();

  let bump = graph.add_node(StageKind::VersionBump);
  let tag = graph.add_node(StageKind::Tag);
  graph.add_edge(tag, bump, ());

  let mut package_nodes = Vec::new();
  for module in config.modules().iter().filter(|m| m.is_server_bundle()) {
    let node = graph.add_node(StageKind::Package {
      module: module.name.clone(),
    });
    graph.add_edge(node, tag, ());
    package_nodes.push(node);
  }

  let publish = graph.add_node(StageKind::Publish);
  graph.add_edge(publish, tag, ());
  for &package in &package_nodes {
    graph.add_edge(publish, package, ());
  }

  let finish = graph.add_node(StageKind::FinishMilestone);
  graph.add_edge(finish, publish, ());

  let sorted = toposort(&graph, None).map_err(|_| ShipyardError::message("Release stage graph has a cycle"))?;
  let ordered: Vec<StageKind> = sorted.into_iter().rev().map(|idx| graph[idx].clone()).collect();

  let (stages, skipped): (Vec<StageKind>, Vec<StageKind>) =
    ordered.into_iter().partition(|s| release_version || !s.gated());

  Ok(ReleasePlan {
    starting_version,
    release_version,
    effective_version,
    tag_name,
    stages,
    skipped,
  })
}

/// Pre-flight validation over the resolved stage list.
///
/// Credentials are demanded only when a publishing stage is actually
/// scheduled, so builds that never publish never ask for a token. The bump
/// stage needs a clean working tree to commit from.
pub fn preflight(plan: &ReleasePlan, credentials: &Credentials, vcs: Option<&dyn Vcs>) -> ShipyardResult<()> {
  if plan.includes_publish() && !credentials.is_usable() {
    return Err(ShipyardError::Validation(ValidationError::MissingCredential));
  }

  if let Some(vcs) = vcs {
    if !vcs.is_clean()? {
      return Err(ShipyardError::Git(GitError::DirtyWorkTree));
    }
  }

  Ok(())
}

/// What a pipeline run produced
#[derive(Debug, Default)]
pub struct PipelineOutcome {
  pub completed: Vec<String>,
  pub artifacts: Vec<BundleOutput>,
  pub release_url: Option<String>,
}

fn build_client(
  config: &ShipyardConfig,
  vcs: Option<&dyn Vcs>,
  credentials: &Credentials,
) -> ShipyardResult<GitHubClient> {
  let remote_slug = vcs
    .and_then(|v| v.remote_url("origin").ok().flatten())
    .and_then(|url| repository_slug(&url));

  let slug = remote_slug
    .or_else(|| config.project.github_slug.clone())
    .ok_or_else(|| {
      ShipyardError::with_help(
        "No GitHub repository could be determined",
        "Add an 'origin' remote pointing at github.com, or set project.github_slug in .shipyard/config.toml.",
      )
    })?;

  Ok(GitHubClient::new(slug, credentials.clone()))
}

/// Execute the plan sequentially. The first failing stage halts everything
/// after it; completed stages are not rolled back.
pub fn execute(
  config: &ShipyardConfig,
  plan: &ReleasePlan,
  project_root: &Path,
  vcs: Option<&dyn Vcs>,
  credentials: &Credentials,
  apply: bool,
) -> ShipyardResult<PipelineOutcome> {
  // Dry-runs execute nothing, so they demand nothing
  if apply {
    preflight(plan, credentials, vcs)?;
  }

  // Packaging and publishing see the release version, whatever is still on
  // disk when their stage runs.
  let mut release_config = config.clone();
  release_config.project.version = plan.effective_version.clone();

  let github = if apply && plan.includes_publish() {
    Some(build_client(config, vcs, credentials)?)
  } else {
    None
  };

  let out_dir = project_root.join("build").join("distributions");
  let mut outcome = PipelineOutcome::default();

  for stage in &plan.stages {
    println!("▶ {}", stage.name());

    if !apply {
      print_dry_run(stage, plan);
      outcome.completed.push(stage.name());
      continue;
    }

    let result = run_stage(
      stage,
      plan,
      &release_config,
      project_root,
      vcs,
      github.as_ref(),
      &out_dir,
      &mut outcome,
    );

    if let Err(err) = result {
      eprintln!("\n❌ Stage '{}' failed; remaining stages aborted", stage.name());
      return Err(err);
    }

    outcome.completed.push(stage.name());
  }

  for stage in &plan.skipped {
    println!("⏭  {} (snapshot version, publish disabled)", stage.name());
  }

  Ok(outcome)
}

fn print_dry_run(stage: &StageKind, plan: &ReleasePlan) {
  match stage {
    StageKind::VersionBump => {
      if is_snapshot(&plan.starting_version) {
        println!("   💡 Would set version to {} and commit", plan.effective_version);
      } else {
        println!("   💡 Version {} is already a release version", plan.starting_version);
      }
    }
    StageKind::Tag => println!("   💡 Would create signed tag {}", plan.tag_name),
    StageKind::Package { module } => {
      println!("   💡 Would package module '{}' into build/distributions", module)
    }
    StageKind::Publish => println!(
      "   💡 Would create draft release {} and upload the produced bundles",
      plan.tag_name
    ),
    StageKind::FinishMilestone => println!(
      "   💡 Would roll the '{}' milestone over to {}",
      milestone::NEXT_VERSION_TITLE,
      plan.tag_name
    ),
  }
}

#[allow(clippy::too_many_arguments)]
fn run_stage(
  stage: &StageKind,
  plan: &ReleasePlan,
  release_config: &ShipyardConfig,
  project_root: &Path,
  vcs: Option<&dyn Vcs>,
  github: Option<&GitHubClient>,
  out_dir: &Path,
  outcome: &mut PipelineOutcome,
) -> ShipyardResult<()> {
  match stage {
    StageKind::VersionBump => {
      if !is_snapshot(&plan.starting_version) {
        println!("   ℹ️  Version {} is already a release version", plan.starting_version);
        return Ok(());
      }

      ShipyardConfig::write_version(project_root, &plan.effective_version)?;
      if let Some(vcs) = vcs {
        let config_path = PathBuf::from(".shipyard").join("config.toml");
        vcs.commit_paths(
          &[config_path.as_path()],
          &format!("{}prepare release v{}", TOOLING_COMMIT_PREFIX, plan.effective_version),
        )?;
      }
      println!("   📝 Version set to {}", plan.effective_version);
      Ok(())
    }

    StageKind::Tag => {
      let vcs = vcs.ok_or_else(|| ShipyardError::message("Tagging requires a git repository"))?;
      if vcs.tag_exists(&plan.tag_name)? {
        return Err(ShipyardError::message(format!("Tag {} already exists", plan.tag_name)));
      }
      vcs.create_signed_tag(&plan.tag_name, &format!("Release {}", plan.tag_name))?;
      println!("   🏷️  Created signed tag {}", plan.tag_name);
      Ok(())
    }

    StageKind::Package { module } => {
      let module = release_config.module(module)?;
      let info = BuildInfo::collect(&plan.effective_version, vcs, std::env::var("BUILD_VCS_NUMBER").ok());
      let output = bundle::build_server_bundle(release_config, &module, &info, project_root, out_dir)?;

      println!("   📦 {}", output.path.display());
      println!("      sha256 {}", output.sha256);
      outcome.artifacts.push(output);
      Ok(())
    }

    StageKind::Publish => {
      let github = github.ok_or_else(|| ShipyardError::message("Publishing requires a GitHub repository"))?;

      let previous = github.latest_release()?.map(|r| r.tag_name);
      let body = notes::release_body(vcs, previous.as_deref());
      let release = github.create_release(&plan.tag_name, &plan.tag_name, &body, true)?;
      println!("   🚀 Created draft release {}", release.tag_name);

      if !outcome.artifacts.is_empty() {
        let progress = MultiProgress::new();
        let bar = progress.add_bar(outcome.artifacts.len(), "Uploading bundles".to_string());
        for artifact in &outcome.artifacts {
          github.upload_asset(&release, &artifact.path)?;
          progress.inc(&bar);
        }
      }

      outcome.release_url = Some(release.html_url.clone());
      Ok(())
    }

    StageKind::FinishMilestone => {
      let github = github.ok_or_else(|| ShipyardError::message("Milestone rollover requires a GitHub repository"))?;
      milestone::finish_milestone(github, &plan.tag_name)?;
      println!(
        "   🎯 Milestone '{}' rolled over to {}",
        milestone::NEXT_VERSION_TITLE,
        plan.tag_name
      );
      Ok(())
    }
  }
}
