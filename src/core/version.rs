//! Version resolution for plugin modules
//!
//! Computes per-module version strings (a module-specific marker appended
//! before any `-SNAPSHOT` suffix) and provides the lenient Maven-style
//! version comparison used by the freshness checker and the environment
//! matrix.

use std::cmp::Ordering;

/// Pre-release suffix recognized on project versions
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Resolve the version string for a module.
///
/// The legacy server module gets marker `a`, the current server module gets
/// marker `b`, appended as a build-metadata marker before any `-SNAPSHOT`
/// suffix. All other modules use the base version unchanged. Pure function
/// of (base version, module name).
pub fn resolve_module_version(base: &str, module: &str) -> String {
  let marker = match module {
    "serverPre2018.2" => Some('a'),
    "server" => Some('b'),
    _ => None,
  };

  match marker {
    None => base.to_string(),
    Some(m) => match base.strip_suffix(SNAPSHOT_SUFFIX) {
      Some(stripped) => format!("{}+{}{}", stripped, m, SNAPSHOT_SUFFIX),
      None => format!("{}+{}", base, m),
    },
  }
}

/// Whether a version string carries the pre-release marker
pub fn is_snapshot(version: &str) -> bool {
  version.ends_with(SNAPSHOT_SUFFIX)
}

/// Strip the pre-release marker, if present
pub fn strip_snapshot(version: &str) -> &str {
  version.strip_suffix(SNAPSHOT_SUFFIX).unwrap_or(version)
}

/// Next development version: bump the last numeric component and re-append
/// the `-SNAPSHOT` suffix.
pub fn next_snapshot(version: &str) -> String {
  let base = strip_snapshot(version);
  let mut parts: Vec<String> = base.split('.').map(str::to_string).collect();
  if let Some(last) = parts.last_mut() {
    if let Ok(n) = last.parse::<u64>() {
      *last = (n + 1).to_string();
    }
  }
  format!("{}{}", parts.join("."), SNAPSHOT_SUFFIX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
  Number(u64),
  Qualifier(String),
}

fn tokenize(version: &str) -> Vec<Token> {
  version
    .split(['.', '-', '+'])
    .filter(|s| !s.is_empty())
    .map(|seg| match seg.parse::<u64>() {
      Ok(n) => Token::Number(n),
      Err(_) => Token::Qualifier(seg.to_ascii_lowercase()),
    })
    .collect()
}

/// Lenient version comparison for Maven-style version strings.
///
/// Numeric components compare numerically, qualifiers lexicographically, and
/// a numeric component always outranks a qualifier. A trailing qualifier
/// makes a version older than its unqualified prefix (`1.0-SNAPSHOT < 1.0`),
/// while a trailing zero is neutral (`1.0.0 == 1.0`).
pub fn compare_versions(a: &str, b: &str) -> Ordering {
  let ta = tokenize(a);
  let tb = tokenize(b);
  let len = ta.len().max(tb.len());

  for i in 0..len {
    match (ta.get(i), tb.get(i)) {
      (Some(Token::Number(x)), Some(Token::Number(y))) => {
        if x != y {
          return x.cmp(y);
        }
      }
      (Some(Token::Qualifier(x)), Some(Token::Qualifier(y))) => {
        if x != y {
          return x.cmp(y);
        }
      }
      (Some(Token::Number(_)), Some(Token::Qualifier(_))) => return Ordering::Greater,
      (Some(Token::Qualifier(_)), Some(Token::Number(_))) => return Ordering::Less,
      (Some(Token::Number(x)), None) => {
        if *x != 0 {
          return Ordering::Greater;
        }
      }
      (None, Some(Token::Number(y))) => {
        if *y != 0 {
          return Ordering::Less;
        }
      }
      (Some(Token::Qualifier(_)), None) => return Ordering::Less,
      (None, Some(Token::Qualifier(_))) => return Ordering::Greater,
      (None, None) => break,
    }
  }

  Ordering::Equal
}
