//! Release automation commands
//!
//! - `plan`: resolve the stage list, show what would run and why
//! - `run`: execute the pipeline (dry-run by default, `--apply` to release)
//!
//! ## Safety
//! - Pre-flight validation happens before the first stage touches anything
//! - Publish and milestone stages are statically gated on the version string
//! - A failed stage halts everything after it; completed stages stay

pub mod milestone;
pub mod notes;
pub mod pipeline;

use crate::core::config::ShipyardConfig;
use crate::core::error::ShipyardResult;
use crate::core::vcs::Vcs;
use crate::core::vcs::system_git::SystemGit;
use crate::github::Credentials;
use clap::Subcommand;
use std::env;

/// Release pipeline subcommands
#[derive(Debug, Subcommand)]
pub enum ReleaseCommand {
  /// Show the resolved release plan
  ///
  /// Computes the stage list, the release-version gate and the tag name
  /// without touching the repository or the network.
  Plan {
    /// Output as JSON for CI integration
    #[arg(long)]
    json: bool,
  },

  /// Run the release pipeline
  ///
  /// Bumps the version, creates the signed tag, packages every server
  /// bundle, publishes a draft release with the generated notes and rolls
  /// the milestone over. Dry-run unless `--apply` is given.
  Run {
    /// Actually execute the stages (dry-run by default)
    #[arg(long)]
    apply: bool,
  },
}

impl ReleaseCommand {
  /// Execute the release subcommand
  pub fn execute(&self) -> ShipyardResult<()> {
    match self {
      ReleaseCommand::Plan { json } => run_release_plan(*json),
      ReleaseCommand::Run { apply } => run_release_run(*apply),
    }
  }
}

fn run_release_plan(json: bool) -> ShipyardResult<()> {
  let root = env::current_dir()?;
  let config = ShipyardConfig::load(&root)?;
  let plan = pipeline::build_plan(&config)?;

  if json {
    println!("{}", plan.to_json()?);
    return Ok(());
  }

  println!("{}", plan.format_table());

  let credentials = Credentials::resolve(&config.credentials);
  if plan.includes_publish() && !credentials.is_usable() {
    println!("⚠️  Publishing is scheduled but no credentials are configured; `release run` will refuse.");
  }

  Ok(())
}

fn run_release_run(apply: bool) -> ShipyardResult<()> {
  let root = env::current_dir()?;
  let config = ShipyardConfig::load(&root)?;
  let plan = pipeline::build_plan(&config)?;
  let credentials = Credentials::resolve(&config.credentials);

  let vcs = SystemGit::discover(&root);
  let vcs_ref: Option<&dyn Vcs> = vcs.as_ref().map(|v| v as &dyn Vcs);

  println!("{}", plan.format_table());

  let outcome = pipeline::execute(&config, &plan, &root, vcs_ref, &credentials, apply)?;

  println!();
  if !apply {
    println!("💡 This was a dry-run. Use --apply to execute the release.");
  } else {
    println!("🎉 Release pipeline completed ({} stages).", outcome.completed.len());
    if let Some(url) = &outcome.release_url {
      println!("   Draft release: {}", url);
    }
    for artifact in &outcome.artifacts {
      println!("   Bundle: {}", artifact.path.display());
    }
  }

  Ok(())
}
