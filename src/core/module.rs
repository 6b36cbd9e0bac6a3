//! The buildable units of the plugin project
//!
//! The module set is fixed by the project layout: a build-agent part, shared
//! code, server-side shared code, and one server bundle per supported host
//! generation.

use crate::core::version::resolve_module_version;
use serde::Serialize;

/// Names of the five project modules, in build order.
pub const MODULE_NAMES: [&str; 5] = ["common", "agent", "commonServer", "server", "serverPre2018.2"];

/// Host version at which the server API generation changed; server bundles
/// for anything older come from the legacy module.
pub const LEGACY_BOUNDARY: &str = "2018.2";

/// What a module packages into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleKind {
  /// Plain library jar
  Jar,
  /// Agent-side plugin bundle
  AgentBundle,
  /// Server-side plugin bundle (embeds the agent bundle)
  ServerBundle,
}

/// Host-build-number constraints per server generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "kebab-case")]
pub enum ServerTarget {
  /// Pre-2018.2 hosts: upper-bounded only, no runtime reload
  Legacy { maximum_build: String },
  /// Current hosts: lower-bounded, runtime reload enabled
  Current {
    minimum_build: String,
    allow_runtime_reload: bool,
  },
}

/// A buildable unit of the plugin project
#[derive(Debug, Clone, Serialize)]
pub struct Module {
  pub name: String,
  pub kind: ModuleKind,
  /// Present only for server bundles
  pub server_target: Option<ServerTarget>,
}

impl Module {
  /// The full fixed module table, with build-number bounds taken from the
  /// given config values.
  pub fn all(legacy_maximum_build: &str, current_minimum_build: &str, allow_runtime_reload: bool) -> Vec<Module> {
    vec![
      Module {
        name: "common".to_string(),
        kind: ModuleKind::Jar,
        server_target: None,
      },
      Module {
        name: "agent".to_string(),
        kind: ModuleKind::AgentBundle,
        server_target: None,
      },
      Module {
        name: "commonServer".to_string(),
        kind: ModuleKind::Jar,
        server_target: None,
      },
      Module {
        name: "server".to_string(),
        kind: ModuleKind::ServerBundle,
        server_target: Some(ServerTarget::Current {
          minimum_build: current_minimum_build.to_string(),
          allow_runtime_reload,
        }),
      },
      Module {
        name: "serverPre2018.2".to_string(),
        kind: ModuleKind::ServerBundle,
        server_target: Some(ServerTarget::Legacy {
          maximum_build: legacy_maximum_build.to_string(),
        }),
      },
    ]
  }

  /// Whether this module produces a server-type plugin bundle
  pub fn is_server_bundle(&self) -> bool {
    self.kind == ModuleKind::ServerBundle
  }

  /// Resolved version for this module given the project base version
  pub fn resolved_version(&self, base_version: &str) -> String {
    resolve_module_version(base_version, &self.name)
  }
}
