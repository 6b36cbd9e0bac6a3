//! Progress indicators for long-running operations
//!
//! Uses `linya` for allocation-free progress bars that are safe to drive
//! from rayon worker threads.

use linya::{Bar, Progress};
use std::sync::Mutex;

/// Shared progress display usable from parallel scans and uploads
pub struct MultiProgress {
  progress: Mutex<Progress>,
}

impl MultiProgress {
  pub fn new() -> Self {
    Self {
      progress: Mutex::new(Progress::new()),
    }
  }

  /// Register a new bar
  pub fn add_bar(&self, total: usize, label: String) -> Bar {
    self
      .progress
      .lock()
      .expect("progress state poisoned")
      .bar(total, label)
  }

  /// Increment a bar by 1
  pub fn inc(&self, bar: &Bar) {
    if let Ok(mut progress) = self.progress.lock() {
      progress.inc_and_draw(bar, 1);
    }
  }

  /// Set a bar to a specific position
  pub fn set(&self, bar: &Bar, value: usize) {
    if let Ok(mut progress) = self.progress.lock() {
      progress.set_and_draw(bar, value);
    }
  }
}

impl Default for MultiProgress {
  fn default() -> Self {
    Self::new()
  }
}
