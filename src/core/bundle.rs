//! Plugin bundle assembly
//!
//! Builds the agent bundle (descriptor + lib jars) and the server bundles
//! (descriptor, server jars, embedded agent bundle, kotlin-dsl extras) as
//! zip archives, embedding a generated `version.properties` with version,
//! commit id and build timestamp. Every produced archive gets a SHA-256
//! digest.

use crate::core::config::ShipyardConfig;
use crate::core::descriptor::{self, AGENT_DESCRIPTOR_NAME, SERVER_DESCRIPTOR_NAME};
use crate::core::error::{ResultExt, ShipyardResult};
use crate::core::module::Module;
use crate::core::vcs::Vcs;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Build information embedded into every bundle
#[derive(Debug, Clone)]
pub struct BuildInfo {
  pub version: String,
  pub commit_id: String,
  pub timestamp: String,
}

impl BuildInfo {
  /// Collect build info: an explicit VCS number override wins, then the head
  /// commit (suffixed `-dirty` when the tree has local changes), then
  /// `<unknown>` outside a repository.
  pub fn collect(version: &str, vcs: Option<&dyn Vcs>, vcs_number: Option<String>) -> Self {
    let commit_id = match (vcs_number, vcs) {
      (Some(number), _) if !number.trim().is_empty() => number,
      (_, Some(vcs)) => match vcs.head_commit() {
        Ok(head) => {
          let dirty = !vcs.is_clean().unwrap_or(true);
          if dirty { format!("{}-dirty", head) } else { head }
        }
        Err(_) => "<unknown>".to_string(),
      },
      _ => "<unknown>".to_string(),
    };

    Self {
      version: version.to_string(),
      commit_id,
      timestamp: chrono::Utc::now().to_rfc3339(),
    }
  }

  /// Render as the `version.properties` resource
  pub fn to_properties(&self) -> String {
    format!(
      "version={}\ncommitId={}\nbuildTimestamp={}\n",
      self.version, self.commit_id, self.timestamp
    )
  }
}

/// A produced bundle archive with its digest
#[derive(Debug, Clone)]
pub struct BundleOutput {
  pub path: PathBuf,
  pub sha256: String,
}

fn zip_options() -> SimpleFileOptions {
  SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Jars a module contributes, from `<module>/build/libs`. Missing
/// directories contribute nothing; packaging does not compile modules.
fn module_jars(project_root: &Path, module_name: &str) -> Vec<PathBuf> {
  let libs_dir = project_root.join(module_name).join("build").join("libs");
  let Ok(entries) = fs::read_dir(&libs_dir) else {
    return Vec::new();
  };

  let mut jars: Vec<PathBuf> = entries
    .filter_map(|e| e.ok())
    .map(|e| e.path())
    .filter(|p| p.extension().is_some_and(|ext| ext == "jar"))
    .collect();
  jars.sort();
  jars
}

fn add_file_entry<W: Write + std::io::Seek>(
  zip: &mut ZipWriter<W>,
  entry_name: &str,
  bytes: &[u8],
) -> ShipyardResult<()> {
  zip.start_file(entry_name, zip_options())?;
  zip.write_all(bytes)?;
  Ok(())
}

fn add_jar_entries<W: Write + std::io::Seek>(
  zip: &mut ZipWriter<W>,
  prefix: &str,
  jars: &[PathBuf],
) -> ShipyardResult<()> {
  for jar in jars {
    let name = jar
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_default();
    let bytes = fs::read(jar).with_context(|| format!("Failed to read {}", jar.display()))?;
    add_file_entry(zip, &format!("{}/{}", prefix, name), &bytes)?;
  }
  Ok(())
}

fn add_tree_entries<W: Write + std::io::Seek>(
  zip: &mut ZipWriter<W>,
  prefix: &str,
  dir: &Path,
) -> ShipyardResult<()> {
  let Ok(entries) = fs::read_dir(dir) else {
    return Ok(());
  };

  let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
  paths.sort();

  for path in paths {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_default();
    let entry_name = format!("{}/{}", prefix, name);
    if path.is_dir() {
      add_tree_entries(zip, &entry_name, &path)?;
    } else {
      let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
      add_file_entry(zip, &entry_name, &bytes)?;
    }
  }
  Ok(())
}

fn sha256_hex(path: &Path) -> ShipyardResult<String> {
  let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let digest = Sha256::digest(&bytes);
  Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

/// Assemble the agent bundle as bytes: agent descriptor at the root and the
/// agent/common jars under `lib/`.
pub fn agent_bundle_bytes(config: &ShipyardConfig, project_root: &Path) -> ShipyardResult<Vec<u8>> {
  let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

  add_file_entry(&mut zip, AGENT_DESCRIPTOR_NAME, descriptor::agent_descriptor(config).as_bytes())?;

  let mut jars = module_jars(project_root, "agent");
  jars.extend(module_jars(project_root, "common"));
  add_jar_entries(&mut zip, "lib", &jars)?;

  let cursor = zip.finish()?;
  Ok(cursor.into_inner())
}

/// Build the standalone agent bundle archive.
pub fn build_agent_bundle(
  config: &ShipyardConfig,
  project_root: &Path,
  out_dir: &Path,
) -> ShipyardResult<BundleOutput> {
  fs::create_dir_all(out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;

  let path = out_dir.join(format!("{}.zip", config.plugin.archive_name()));
  let bytes = agent_bundle_bytes(config, project_root)?;
  fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;

  let sha256 = sha256_hex(&path)?;
  Ok(BundleOutput { path, sha256 })
}

/// Build a server bundle archive for a server-type module.
///
/// Layout: server descriptor at the root, `version.properties`, the
/// server-side jars under `server/`, the agent bundle under `agent/` and any
/// `kotlin-dsl/**` resources from the commonServer module.
pub fn build_server_bundle(
  config: &ShipyardConfig,
  module: &Module,
  info: &BuildInfo,
  project_root: &Path,
  out_dir: &Path,
) -> ShipyardResult<BundleOutput> {
  fs::create_dir_all(out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;

  let version = module.resolved_version(&config.project.version);
  let path = out_dir.join(format!("{}-{}.zip", config.plugin.archive_name(), version));

  let file = fs::File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
  let mut zip = ZipWriter::new(file);

  let descriptor_xml = descriptor::server_descriptor(config, module)?;
  add_file_entry(&mut zip, SERVER_DESCRIPTOR_NAME, descriptor_xml.as_bytes())?;
  add_file_entry(&mut zip, "version.properties", info.to_properties().as_bytes())?;

  let mut server_jars = module_jars(project_root, &module.name);
  server_jars.extend(module_jars(project_root, "commonServer"));
  server_jars.extend(module_jars(project_root, "common"));
  add_jar_entries(&mut zip, "server", &server_jars)?;

  let agent_bytes = agent_bundle_bytes(config, project_root)?;
  add_file_entry(
    &mut zip,
    &format!("agent/{}.zip", config.plugin.archive_name()),
    &agent_bytes,
  )?;

  let kotlin_dsl = project_root.join("commonServer").join("resources").join("kotlin-dsl");
  add_tree_entries(&mut zip, "kotlin-dsl", &kotlin_dsl)?;

  zip.finish()?;

  let sha256 = sha256_hex(&path)?;
  Ok(BundleOutput { path, sha256 })
}

/// Path of the ssh-manager style host plugin jar a deployed agent needs;
/// packaging can only probe for it, not provide it.
pub fn host_plugin_jar(home_dir: &Path, plugin: &str) -> PathBuf {
  home_dir
    .join("buildAgent")
    .join("plugins")
    .join(plugin)
    .join(format!("{}.jar", plugin))
}
