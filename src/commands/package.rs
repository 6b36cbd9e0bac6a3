//! Artifact packaging command
//!
//! Builds plugin bundles per module. The default packages both server
//! bundles (which embed the agent bundle); `--module agent` produces the
//! standalone agent bundle. Packaging probes for the ssh-manager style host
//! plugins the bundles require at runtime and warns when they are absent:
//! that is a deployment precondition it cannot satisfy itself.

use crate::core::bundle::{self, BuildInfo};
use crate::core::config::ShipyardConfig;
use crate::core::environment::EnvironmentMatrix;
use crate::core::error::{ShipyardError, ShipyardResult};
use crate::core::module::ModuleKind;
use crate::core::vcs::Vcs;
use crate::core::vcs::system_git::SystemGit;
use std::env;
use std::path::PathBuf;

/// Run the package command
pub fn run_package(module: Option<String>, all: bool, output: Option<PathBuf>) -> ShipyardResult<()> {
  let root = env::current_dir()?;
  let config = ShipyardConfig::load(&root)?;
  let matrix = EnvironmentMatrix::from_config(&config)?;

  let out_dir = output.unwrap_or_else(|| root.join("build").join("distributions"));

  let vcs = SystemGit::discover(&root);
  let vcs_ref: Option<&dyn Vcs> = vcs.as_ref().map(|v| v as &dyn Vcs);
  let info = BuildInfo::collect(&config.project.version, vcs_ref, env::var("BUILD_VCS_NUMBER").ok());

  // The required host plugins must already be installed in the test
  // environment; packaging can only check, not install.
  if let Some(home) = matrix.primary_home_dir() {
    for plugin in &config.plugin.requires {
      let jar = bundle::host_plugin_jar(&home, plugin);
      if !jar.is_file() {
        println!("⚠️  Host plugin '{}' not found at {} (deployment precondition)", plugin, jar.display());
      }
    }
  }

  let modules = match (&module, all) {
    (Some(name), _) => vec![config.module(name)?],
    // --all adds the standalone agent bundle next to the server bundles
    (None, true) => config
      .modules()
      .into_iter()
      .filter(|m| m.kind != ModuleKind::Jar)
      .collect(),
    (None, false) => config.modules().into_iter().filter(|m| m.is_server_bundle()).collect(),
  };

  if modules.is_empty() {
    println!("ℹ️  Nothing to package");
    return Ok(());
  }

  println!("📦 Packaging {} bundle(s)\n", modules.len());

  for module in &modules {
    let output = match module.kind {
      ModuleKind::ServerBundle => bundle::build_server_bundle(&config, module, &info, &root, &out_dir)?,
      ModuleKind::AgentBundle => bundle::build_agent_bundle(&config, &root, &out_dir)?,
      ModuleKind::Jar => {
        return Err(ShipyardError::with_help(
          format!("Module '{}' is a plain jar, not a plugin bundle", module.name),
          "Package one of: agent, server, serverPre2018.2.",
        ));
      }
    };

    println!("📌 {} ({})", module.name, module.resolved_version(&config.project.version));
    println!("   {}", output.path.display());
    println!("   sha256 {}", output.sha256);
    println!();
  }

  Ok(())
}
