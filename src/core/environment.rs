//! Environment matrix construction
//!
//! Materializes one environment per entry of the host version table, each
//! bound to the server module whose bundle deploys against that host
//! generation. Built once at startup from the config table and immutable
//! afterwards.

use crate::core::config::ShipyardConfig;
use crate::core::error::{ConfigError, ShipyardError, ShipyardResult};
use crate::core::module::LEGACY_BOUNDARY;
use crate::core::version::compare_versions;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::PathBuf;

/// Name of the primary environment whose home directory packaging consumes
pub const PRIMARY_ENVIRONMENT: &str = "teamcity";

/// A named (host version, test host version) pairing bound to the server
/// module deployed there.
#[derive(Debug, Clone, Serialize)]
pub struct Environment {
  pub name: String,
  pub host_version: String,
  pub test_version: String,
  /// Module whose server bundle is deployed into this environment
  pub module: String,
}

/// The full environment matrix, in declaration order
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentMatrix {
  environments: Vec<Environment>,
  base_home_dir: PathBuf,
  home_dir_override: Option<PathBuf>,
}

impl EnvironmentMatrix {
  /// Build the matrix from the config version table.
  ///
  /// Host versions older than the legacy boundary bind the legacy server
  /// module; everything else binds the current one. Duplicate names are a
  /// configuration error.
  pub fn from_config(config: &ShipyardConfig) -> ShipyardResult<Self> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut environments = Vec::with_capacity(config.environments.entries.len());

    for entry in &config.environments.entries {
      if !seen.insert(entry.name.as_str()) {
        return Err(ShipyardError::Config(ConfigError::DuplicateEnvironment {
          name: entry.name.clone(),
        }));
      }

      let module = if compare_versions(&entry.host_version, LEGACY_BOUNDARY) == Ordering::Less {
        "serverPre2018.2"
      } else {
        "server"
      };

      environments.push(Environment {
        name: entry.name.clone(),
        host_version: entry.host_version.clone(),
        test_version: entry.test_version.clone(),
        module: module.to_string(),
      });
    }

    Ok(Self {
      environments,
      base_home_dir: config.environments.base_home_dir.clone(),
      home_dir_override: config.environments.home_dir.clone(),
    })
  }

  /// All environments in declaration order
  pub fn environments(&self) -> &[Environment] {
    &self.environments
  }

  /// The primary environment, when declared
  pub fn primary(&self) -> Option<&Environment> {
    self.environments.iter().find(|e| e.name == PRIMARY_ENVIRONMENT)
  }

  /// Resolved home directory of the primary environment: the explicit
  /// override when configured, otherwise `<base>/TeamCity-<test version>`.
  pub fn primary_home_dir(&self) -> Option<PathBuf> {
    if let Some(explicit) = &self.home_dir_override {
      return Some(explicit.clone());
    }
    self
      .primary()
      .map(|env| self.base_home_dir.join(format!("TeamCity-{}", env.test_version)))
  }
}
