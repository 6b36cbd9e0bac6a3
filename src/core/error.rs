//! Error types for tc-shipyard with contextual messages and exit codes
//!
//! A unified error type that categorizes errors and carries contextual help
//! messages so failures name the stage and the precondition that was unmet.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for tc-shipyard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// Validation failure (stale dependencies, unmet preconditions)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for tc-shipyard
#[derive(Debug)]
pub enum ShipyardError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Hosting/repository API errors
  Api(ApiError),

  /// Pipeline validation errors
  Validation(ValidationError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ShipyardError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ShipyardError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ShipyardError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ShipyardError::Message { message, context, help } => ShipyardError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      other => ShipyardError::Message {
        message: other.to_string(),
        context: Some(ctx_str),
        help: other.help_message(),
      },
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ShipyardError::Config(_) => ExitCode::User,
      ShipyardError::Git(_) => ExitCode::System,
      ShipyardError::Api(_) => ExitCode::System,
      ShipyardError::Validation(_) => ExitCode::Validation,
      ShipyardError::Io(_) => ExitCode::System,
      ShipyardError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ShipyardError::Config(e) => e.help_message(),
      ShipyardError::Api(e) => e.help_message(),
      ShipyardError::Validation(e) => e.help_message(),
      ShipyardError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ShipyardError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShipyardError::Config(e) => write!(f, "{}", e),
      ShipyardError::Git(e) => write!(f, "{}", e),
      ShipyardError::Api(e) => write!(f, "{}", e),
      ShipyardError::Validation(e) => write!(f, "{}", e),
      ShipyardError::Io(e) => write!(f, "I/O error: {}", e),
      ShipyardError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ShipyardError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ShipyardError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ShipyardError {
  fn from(err: io::Error) -> Self {
    ShipyardError::Io(err)
  }
}

impl From<String> for ShipyardError {
  fn from(msg: String) -> Self {
    ShipyardError::message(msg)
  }
}

impl From<&str> for ShipyardError {
  fn from(msg: &str) -> Self {
    ShipyardError::message(msg)
  }
}

impl From<toml::de::Error> for ShipyardError {
  fn from(err: toml::de::Error) -> Self {
    ShipyardError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml::ser::Error> for ShipyardError {
  fn from(err: toml::ser::Error) -> Self {
    ShipyardError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<toml_edit::TomlError> for ShipyardError {
  fn from(err: toml_edit::TomlError) -> Self {
    ShipyardError::message(format!("TOML edit error: {}", err))
  }
}

impl From<serde_json::Error> for ShipyardError {
  fn from(err: serde_json::Error) -> Self {
    ShipyardError::message(format!("JSON error: {}", err))
  }
}

impl From<reqwest::Error> for ShipyardError {
  fn from(err: reqwest::Error) -> Self {
    ShipyardError::Api(ApiError::Transport {
      message: err.to_string(),
    })
  }
}

impl From<zip::result::ZipError> for ShipyardError {
  fn from(err: zip::result::ZipError) -> Self {
    ShipyardError::message(format!("Archive error: {}", err))
  }
}

impl From<semver::Error> for ShipyardError {
  fn from(err: semver::Error) -> Self {
    ShipyardError::message(format!("Version parse error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ShipyardError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ShipyardError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// .shipyard/config.toml not found
  NotFound { project_root: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// Module not found in the built-in module table
  ModuleNotFound { name: String },

  /// Two environments share a name
  DuplicateEnvironment { name: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Run `tc-shipyard init` to create a configuration file.".to_string())
      }
      ConfigError::ModuleNotFound { name } => Some(format!(
        "Known modules are: agent, common, commonServer, server, serverPre2018.2. '{}' is not one of them.",
        name
      )),
      ConfigError::DuplicateEnvironment { .. } => {
        Some("Environment names must be unique; rename one entry in [[environments.entry]].".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { project_root } => {
        write!(
          f,
          "No tc-shipyard configuration found.\nExpected file: {}/.shipyard/config.toml",
          project_root.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::ModuleNotFound { name } => {
        write!(f, "Module '{}' is not part of the plugin project", name)
      }
      ConfigError::DuplicateEnvironment { name } => {
        write!(f, "Environment '{}' is declared more than once", name)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Working tree has uncommitted changes
  DirtyWorkTree,

  /// No such remote configured
  NoRemote { name: String },
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::DirtyWorkTree => {
        write!(f, "Working tree has uncommitted changes")
      }
      GitError::NoRemote { name } => {
        write!(f, "Remote '{}' is not configured", name)
      }
    }
  }
}

/// Hosting/repository API errors
#[derive(Debug)]
pub enum ApiError {
  /// HTTP transport failure
  Transport { message: String },

  /// Non-success status from the API
  Status { status: u16, url: String, body: String },

  /// Expected open "Next Version" milestone is absent
  MilestoneNotFound { title: String },

  /// More than one open milestone carries the expected title
  MilestoneAmbiguous { title: String, count: usize },
}

impl ApiError {
  fn help_message(&self) -> Option<String> {
    match self {
      ApiError::MilestoneNotFound { title } => Some(format!(
        "The release was published; open a milestone titled '{}' on GitHub and re-run `tc-shipyard release run` \
         or finish the rollover by hand.",
        title
      )),
      ApiError::Status { status: 401 | 403, .. } => {
        Some("Check that the configured GitHub credentials are valid and have repo scope.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Transport { message } => write!(f, "API request failed: {}", message),
      ApiError::Status { status, url, body } => {
        write!(f, "API request to {} failed with status {}: {}", url, status, body)
      }
      ApiError::MilestoneNotFound { title } => {
        write!(f, "No open milestone titled '{}' was found", title)
      }
      ApiError::MilestoneAmbiguous { title, count } => {
        write!(f, "Found {} open milestones titled '{}', expected exactly one", count, title)
      }
    }
  }
}

/// Pipeline validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Publish scheduled without usable credentials
  MissingCredential,

  /// Freshness check found unresolvable dependencies
  UnresolvedDependencies { count: usize },

  /// Freshness check found outdated dependencies
  OutdatedDependencies { count: usize },

  /// A newer tc-shipyard is available
  ToolUpdateAvailable { running: String, latest: String },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::MissingCredential => Some(
        "Set SHIPYARD_GITHUB_TOKEN (or github token/username+password under [credentials] in \
         .shipyard/config.toml) before running a publishing release."
          .to_string(),
      ),
      ValidationError::OutdatedDependencies { .. } => Some(
        "Update the versions in [[dependencies]], or add known-good entries to [[exempt]].".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::MissingCredential => {
        write!(f, "Publishing requires a token, or a username and password")
      }
      ValidationError::UnresolvedDependencies { count } => {
        write!(f, "Unresolved libraries found ({})", count)
      }
      ValidationError::OutdatedDependencies { count } => {
        write!(f, "Outdated libraries found ({})", count)
      }
      ValidationError::ToolUpdateAvailable { running, latest } => {
        write!(f, "tc-shipyard {} is outdated, {} is available", running, latest)
      }
    }
  }
}

/// Result type alias for tc-shipyard
pub type ShipyardResult<T> = Result<T, ShipyardError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ShipyardResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ShipyardResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ShipyardError>,
{
  fn context(self, ctx: impl Into<String>) -> ShipyardResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ShipyardResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ShipyardError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for ShipyardError {
  fn from(err: anyhow::Error) -> Self {
    ShipyardError::message(err.to_string())
  }
}
