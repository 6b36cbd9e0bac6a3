//! Project configuration, stored in .shipyard/config.toml
//!
//! Plugin metadata, the human-edited host version matrix, declared
//! dependencies and the exempt list, repository endpoints and optional
//! credentials. Version bumps edit the file losslessly so comments and
//! formatting survive a release.

use crate::core::error::{ConfigError, ResultExt, ShipyardError, ShipyardResult};
use crate::core::module::Module;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, value};

/// Configuration for tc-shipyard, stored in .shipyard/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipyardConfig {
  pub project: ProjectConfig,
  pub plugin: PluginConfig,
  pub server: ServerConfig,
  pub environments: EnvironmentsConfig,
  #[serde(default)]
  pub dependencies: Vec<DependencyDecl>,
  #[serde(default)]
  pub exempt: Vec<ExemptDependency>,
  #[serde(default)]
  pub repositories: RepositoriesConfig,
  #[serde(default)]
  pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
  pub name: String,
  pub version: String,
  pub description: String,
  pub vendor_name: String,
  pub vendor_url: String,
  pub email: String,
  pub download_url: String,
  /// Fallback owner/repo pair when no usable git remote is present
  #[serde(skip_serializing_if = "Option::is_none")]
  pub github_slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
  pub name: String,
  pub display_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub archive_name: Option<String>,
  /// Host plugins that must be present at runtime (deployment precondition)
  #[serde(default)]
  pub requires: Vec<String>,
}

impl PluginConfig {
  /// Archive base name, defaulting to the plugin name
  pub fn archive_name(&self) -> &str {
    self.archive_name.as_deref().unwrap_or(&self.name)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
  /// Host API version the current server module builds against
  pub teamcity_version: String,
  pub minimum_build: String,
  #[serde(default = "default_true")]
  pub allow_runtime_reload: bool,
  pub legacy: LegacyServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyServerConfig {
  pub maximum_build: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentsConfig {
  #[serde(default = "default_base_home_dir")]
  pub base_home_dir: PathBuf,
  /// Explicit home directory for the primary environment
  #[serde(skip_serializing_if = "Option::is_none")]
  pub home_dir: Option<PathBuf>,
  #[serde(rename = "entry", default)]
  pub entries: Vec<EnvironmentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentEntry {
  pub name: String,
  pub host_version: String,
  pub test_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyDecl {
  pub group: String,
  pub name: String,
  pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptDependency {
  pub group: String,
  pub name: String,
  /// When present, only this exact declared version is exempt
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoriesConfig {
  #[serde(default = "default_maven_repo")]
  pub maven: String,
  #[serde(default = "default_report_path")]
  pub report_path: PathBuf,
  #[serde(default = "default_nested_report_path")]
  pub nested_report_path: PathBuf,
}

impl Default for RepositoriesConfig {
  fn default() -> Self {
    Self {
      maven: default_maven_repo(),
      report_path: default_report_path(),
      nested_report_path: default_nested_report_path(),
    }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub token: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub password: Option<String>,
}

fn default_true() -> bool {
  true
}

fn default_base_home_dir() -> PathBuf {
  PathBuf::from(".teamcity/environments")
}

fn default_maven_repo() -> String {
  "https://repo1.maven.org/maven2".to_string()
}

fn default_report_path() -> PathBuf {
  PathBuf::from("build/dependencyUpdates/report.json")
}

fn default_nested_report_path() -> PathBuf {
  PathBuf::from("buildSrc/build/dependencyUpdates/report.json")
}

impl ShipyardConfig {
  /// Path of the config file under a project root
  pub fn config_path(root: &Path) -> PathBuf {
    root.join(".shipyard").join("config.toml")
  }

  /// Check if config exists at the given path
  pub fn exists(root: &Path) -> bool {
    Self::config_path(root).is_file()
  }

  /// Load config from .shipyard/config.toml
  pub fn load(root: &Path) -> ShipyardResult<Self> {
    let config_path = Self::config_path(root);
    if !config_path.is_file() {
      return Err(ShipyardError::Config(ConfigError::NotFound {
        project_root: root.to_path_buf(),
      }));
    }

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ShipyardConfig =
      toml::from_str(&content).with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    if config.project.version.is_empty() {
      return Err(ShipyardError::Config(ConfigError::MissingField {
        field: "project.version".to_string(),
      }));
    }

    Ok(config)
  }

  /// Save config to .shipyard/config.toml
  pub fn save(&self, root: &Path) -> ShipyardResult<()> {
    let dir = root.join(".shipyard");
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let config_path = Self::config_path(root);
    let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content)
      .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(())
  }

  /// Rewrite `project.version` in place, preserving comments and formatting.
  pub fn write_version(root: &Path, new_version: &str) -> ShipyardResult<()> {
    let config_path = Self::config_path(root);
    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

    let mut doc: DocumentMut = content
      .parse()
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;
    doc["project"]["version"] = value(new_version);

    fs::write(&config_path, doc.to_string())
      .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(())
  }

  /// The fixed module table with this project's build-number bounds
  pub fn modules(&self) -> Vec<Module> {
    Module::all(
      &self.server.legacy.maximum_build,
      &self.server.minimum_build,
      self.server.allow_runtime_reload,
    )
  }

  /// Look up a module by name
  pub fn module(&self, name: &str) -> ShipyardResult<Module> {
    self
      .modules()
      .into_iter()
      .find(|m| m.name == name)
      .ok_or_else(|| ShipyardError::Config(ConfigError::ModuleNotFound { name: name.to_string() }))
  }

  /// Starter configuration written by `tc-shipyard init`
  pub fn starter() -> &'static str {
    STARTER_CONFIG
  }
}

/// Starter config mirroring the ssh-tunnel plugin project this tool grew on.
const STARTER_CONFIG: &str = r#"[project]
name = "teamcity-ssh-tunnel"
version = "1.1.1-SNAPSHOT"
description = "Establish SSH tunnels for builds"
vendor_name = "Björn Kautler"
vendor_url = "https://github.com/Vampire/teamcity-ssh-tunnel"
email = "Bjoern@Kautler.net"
download_url = "https://github.com/Vampire/teamcity-ssh-tunnel/releases/latest"

[plugin]
name = "ssh-tunnel"
display_name = "SSH Tunnel"
requires = ["ssh-manager"]

[server]
teamcity_version = "2019.1"
minimum_build = "60925"
allow_runtime_reload = true

[server.legacy]
maximum_build = "58744"

[environments]
base_home_dir = ".teamcity/environments"

[[environments.entry]]
name = "teamcity"
host_version = "2019.1"
test_version = "2019.1"

[[environments.entry]]
name = "teamcity2018.2"
host_version = "2018.2"
test_version = "2018.2.4"

[[environments.entry]]
name = "teamcity2018.1"
host_version = "2018.1"
test_version = "2018.1.5"

[[dependencies]]
group = "org.slf4j"
name = "slf4j-api"
version = "1.7.26"

[[dependencies]]
group = "org.jetbrains.teamcity"
name = "server-api"
version = "2019.1"

[[exempt]]
group = "org.jetbrains.teamcity"
name = "server-api"
version = "2018.1.2"

[repositories]
maven = "https://repo1.maven.org/maven2"
"#;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_starter_config_parses() {
    let config: ShipyardConfig = toml::from_str(ShipyardConfig::starter()).unwrap();
    assert_eq!(config.project.name, "teamcity-ssh-tunnel");
    assert_eq!(config.plugin.archive_name(), "ssh-tunnel");
    assert_eq!(config.environments.entries.len(), 3);
    assert_eq!(config.exempt.len(), 1);
    assert!(config.server.allow_runtime_reload);
  }

  #[test]
  fn test_defaults() {
    let repos = RepositoriesConfig::default();
    assert_eq!(repos.report_path, PathBuf::from("build/dependencyUpdates/report.json"));
    assert_eq!(
      repos.nested_report_path,
      PathBuf::from("buildSrc/build/dependencyUpdates/report.json")
    );
  }

  #[test]
  fn test_module_lookup() {
    let config: ShipyardConfig = toml::from_str(ShipyardConfig::starter()).unwrap();
    assert!(config.module("server").is_ok());
    assert!(config.module("nonsense").is_err());
  }
}
