//! Plugin descriptor rendering
//!
//! Renders the server (`teamcity-plugin.xml`) and agent
//! (`teamcity-agent-plugin.xml`) descriptors a host expects inside a plugin
//! bundle. Build-number bounds come from the module's server target; the
//! classloader is always isolated; the descriptor declares the host plugins
//! the bundle requires at runtime.

use crate::core::config::ShipyardConfig;
use crate::core::error::{ShipyardError, ShipyardResult};
use crate::core::module::{Module, ServerTarget};

pub const SERVER_DESCRIPTOR_NAME: &str = "teamcity-plugin.xml";
pub const AGENT_DESCRIPTOR_NAME: &str = "teamcity-agent-plugin.xml";

fn xml_escape(raw: &str) -> String {
  let mut escaped = String::with_capacity(raw.len());
  for c in raw.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&apos;"),
      other => escaped.push(other),
    }
  }
  escaped
}

fn dependencies_block(requires: &[String], indent: &str) -> String {
  if requires.is_empty() {
    return String::new();
  }

  let mut block = format!("{}<dependencies>\n", indent);
  for plugin in requires {
    block.push_str(&format!("{}  <plugin name=\"{}\"/>\n", indent, xml_escape(plugin)));
  }
  block.push_str(&format!("{}</dependencies>\n", indent));
  block
}

/// Render the server plugin descriptor for a server-bundle module.
///
/// The legacy target is upper-bounded only; the current target is
/// lower-bounded and may be reloaded at runtime.
pub fn server_descriptor(config: &ShipyardConfig, module: &Module) -> ShipyardResult<String> {
  let target = module
    .server_target
    .as_ref()
    .ok_or_else(|| ShipyardError::message(format!("Module '{}' is not a server plugin", module.name)))?;

  let version = module.resolved_version(&config.project.version);

  let (requirements, deployment) = match target {
    ServerTarget::Legacy { maximum_build } => (
      format!("  <requirements max-build=\"{}\"/>\n", xml_escape(maximum_build)),
      "  <deployment use-separate-classloader=\"true\"/>\n".to_string(),
    ),
    ServerTarget::Current {
      minimum_build,
      allow_runtime_reload,
    } => (
      format!("  <requirements min-build=\"{}\"/>\n", xml_escape(minimum_build)),
      format!(
        "  <deployment use-separate-classloader=\"true\" allow-runtime-reload=\"{}\"/>\n",
        allow_runtime_reload
      ),
    ),
  };

  let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
  xml.push_str(
    "<teamcity-plugin xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n                 \
     xsi:noNamespaceSchemaLocation=\"urn:schemas-jetbrains-com:teamcity-plugin-v1-xml\">\n",
  );
  xml.push_str("  <info>\n");
  xml.push_str(&format!("    <name>{}</name>\n", xml_escape(&config.plugin.name)));
  xml.push_str(&format!(
    "    <display-name>{}</display-name>\n",
    xml_escape(&config.plugin.display_name)
  ));
  xml.push_str(&format!("    <version>{}</version>\n", xml_escape(&version)));
  xml.push_str(&format!(
    "    <description>{}</description>\n",
    xml_escape(&config.project.description)
  ));
  xml.push_str(&format!(
    "    <download-url>{}</download-url>\n",
    xml_escape(&config.project.download_url)
  ));
  xml.push_str(&format!("    <email>{}</email>\n", xml_escape(&config.project.email)));
  xml.push_str("    <vendor>\n");
  xml.push_str(&format!("      <name>{}</name>\n", xml_escape(&config.project.vendor_name)));
  xml.push_str(&format!("      <url>{}</url>\n", xml_escape(&config.project.vendor_url)));
  xml.push_str("    </vendor>\n");
  xml.push_str("  </info>\n");
  xml.push_str(&requirements);
  xml.push_str(&deployment);
  xml.push_str(&dependencies_block(&config.plugin.requires, "  "));
  xml.push_str("</teamcity-plugin>\n");

  Ok(xml)
}

/// Render the agent plugin descriptor.
pub fn agent_descriptor(config: &ShipyardConfig) -> String {
  let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
  xml.push_str(
    "<teamcity-agent-plugin xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n                       \
     xsi:noNamespaceSchemaLocation=\"urn:schemas-jetbrains-com:teamcity-agent-plugin-v1-xml\">\n",
  );
  xml.push_str("  <plugin-deployment use-separate-classloader=\"true\"/>\n");
  xml.push_str(&dependencies_block(&config.plugin.requires, "  "));
  xml.push_str("</teamcity-agent-plugin>\n");
  xml
}
