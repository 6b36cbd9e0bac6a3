//! Shared test fixtures: tempdir-staged plugin projects

use std::fs;
use std::path::{Path, PathBuf};
use tc_shipyard::core::config::ShipyardConfig;
use tempfile::TempDir;

/// A throwaway plugin project with a starter config
pub struct TestProject {
  _dir: TempDir,
  pub root: PathBuf,
}

impl TestProject {
  pub fn new() -> Self {
    let dir = TempDir::new().expect("create tempdir");
    let root = dir.path().to_path_buf();

    fs::create_dir_all(root.join(".shipyard")).expect("create .shipyard");
    fs::write(ShipyardConfig::config_path(&root), ShipyardConfig::starter()).expect("write config");

    Self { _dir: dir, root }
  }

  /// Project with a specific base version
  pub fn with_version(version: &str) -> Self {
    let project = Self::new();
    ShipyardConfig::write_version(&project.root, version).expect("set version");
    project
  }

  /// Write a file relative to the project root, creating parents
  pub fn write_file(&self, relative: &str, content: &[u8]) {
    let path = self.root.join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(&path, content).expect("write file");
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.root.join(relative)
  }

  pub fn config(&self) -> ShipyardConfig {
    ShipyardConfig::load(&self.root).expect("load config")
  }
}

/// Read a zip entry into a string
pub fn zip_entry_text(archive_path: &Path, entry: &str) -> String {
  use std::io::Read;

  let file = fs::File::open(archive_path).expect("open archive");
  let mut archive = zip::ZipArchive::new(file).expect("read archive");
  let mut entry = archive.by_name(entry).expect("entry present");
  let mut text = String::new();
  entry.read_to_string(&mut text).expect("read entry");
  text
}

/// List all entry names of a zip archive
pub fn zip_entry_names(archive_path: &Path) -> Vec<String> {
  let file = fs::File::open(archive_path).expect("open archive");
  let archive = zip::ZipArchive::new(file).expect("read archive");
  archive.file_names().map(str::to_string).collect()
}
