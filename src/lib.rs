//! tc-shipyard: build, verify and release TeamCity plugin bundles.
//!
//! The crate drives the full pipeline for a multi-module TeamCity plugin
//! project: per-module version resolution, dependency freshness gating,
//! environment-matrix materialization, plugin bundle packaging and an
//! orchestrated tag/publish/milestone release.

pub mod commands;
pub mod core;
pub mod freshness;
pub mod github;
pub mod ui;

/// Version of the running tool, used for the self-update check.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maven coordinates under which tool releases are published.
pub const TOOL_GROUP: &str = "dev.shipyard";
pub const TOOL_NAME: &str = "tc-shipyard";
