//! GitHub hosting API client
//!
//! Blocking client for the release and milestone surface the pipeline
//! needs: latest-release lookup, draft release creation, asset upload and
//! milestone CRUD. The repository slug is derived from the `origin` remote
//! URL, with a configured fallback. No retries; any failure is fatal to the
//! pipeline invocation.

use crate::core::config::CredentialsConfig;
use crate::core::error::{ApiError, ResultExt, ShipyardError, ShipyardResult};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variables consulted for publish credentials
pub const TOKEN_ENV: &str = "SHIPYARD_GITHUB_TOKEN";
pub const USERNAME_ENV: &str = "SHIPYARD_GITHUB_USERNAME";
pub const PASSWORD_ENV: &str = "SHIPYARD_GITHUB_PASSWORD";

/// Publish credentials: a token, or a username and password
#[derive(Debug, Clone, Default)]
pub struct Credentials {
  pub token: Option<String>,
  pub username: Option<String>,
  pub password: Option<String>,
}

impl Credentials {
  pub fn from_parts(token: Option<String>, username: Option<String>, password: Option<String>) -> Self {
    let clean = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    Self {
      token: clean(token),
      username: clean(username),
      password: clean(password),
    }
  }

  /// Resolve credentials: environment wins over config
  pub fn resolve(config: &CredentialsConfig) -> Self {
    Self::from_parts(
      std::env::var(TOKEN_ENV).ok().or_else(|| config.token.clone()),
      std::env::var(USERNAME_ENV).ok().or_else(|| config.username.clone()),
      std::env::var(PASSWORD_ENV).ok().or_else(|| config.password.clone()),
    )
  }

  /// Whether publishing can authenticate: a token, or username + password
  pub fn is_usable(&self) -> bool {
    self.token.is_some() || (self.username.is_some() && self.password.is_some())
  }
}

fn slug_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(
      r"(?x)
        (?:
          ://(?:[^@/]+@)?github\.com(?::\d+)?/ |
          (?:[^@]+@)?github\.com:
        )
        (?P<repository>.+?)
        \.git$
      ",
    )
    .expect("static pattern")
  })
}

/// Derive the owner/repo pair from a git remote URL (https and ssh forms)
pub fn repository_slug(remote_url: &str) -> Option<String> {
  slug_pattern()
    .captures(remote_url)
    .map(|cap| cap["repository"].to_string())
}

/// A hosting-platform release
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseInfo {
  pub id: u64,
  pub tag_name: String,
  #[serde(default)]
  pub draft: bool,
  #[serde(default)]
  pub html_url: String,
}

/// A hosting-platform milestone
#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneInfo {
  pub number: u64,
  pub title: String,
}

/// Milestone operations, kept behind a trait so the rollover logic is
/// testable without a network.
pub trait MilestoneApi {
  fn list_open_milestones(&self) -> ShipyardResult<Vec<MilestoneInfo>>;

  /// Patch a milestone: retitle it, close it, or both in one call
  fn update_milestone(&self, number: u64, title: Option<&str>, close: bool) -> ShipyardResult<()>;

  fn create_milestone(&self, title: &str) -> ShipyardResult<MilestoneInfo>;
}

/// Blocking GitHub API client
pub struct GitHubClient {
  client: reqwest::blocking::Client,
  api_base: String,
  uploads_base: String,
  slug: String,
  credentials: Credentials,
}

impl GitHubClient {
  pub fn new(slug: impl Into<String>, credentials: Credentials) -> Self {
    let client = reqwest::blocking::Client::builder()
      .user_agent(concat!("tc-shipyard/", env!("CARGO_PKG_VERSION")))
      .timeout(Duration::from_secs(120))
      .build()
      .unwrap_or_default();

    Self {
      client,
      api_base: "https://api.github.com".to_string(),
      uploads_base: "https://uploads.github.com".to_string(),
      slug: slug.into(),
      credentials,
    }
  }

  /// Owner/repo pair this client talks to
  pub fn slug(&self) -> &str {
    &self.slug
  }

  fn authorize(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
    let request = request.header("Accept", "application/vnd.github+json");
    if let Some(token) = &self.credentials.token {
      request.bearer_auth(token)
    } else if let (Some(user), Some(pass)) = (&self.credentials.username, &self.credentials.password) {
      request.basic_auth(user, Some(pass))
    } else {
      request
    }
  }

  fn check(url: &str, response: reqwest::blocking::Response) -> ShipyardResult<reqwest::blocking::Response> {
    let status = response.status();
    if !status.is_success() {
      return Err(ShipyardError::Api(ApiError::Status {
        status: status.as_u16(),
        url: url.to_string(),
        body: response.text().unwrap_or_default(),
      }));
    }
    Ok(response)
  }

  /// Latest published release, or None when the repository has none
  pub fn latest_release(&self) -> ShipyardResult<Option<ReleaseInfo>> {
    let url = format!("{}/repos/{}/releases/latest", self.api_base, self.slug);
    let response = self.authorize(self.client.get(&url)).send()?;

    if response.status().as_u16() == 404 {
      return Ok(None);
    }

    let release = Self::check(&url, response)?.json::<ReleaseInfo>()?;
    Ok(Some(release))
  }

  /// Create a release; the pipeline always creates drafts
  pub fn create_release(&self, tag_name: &str, name: &str, body: &str, draft: bool) -> ShipyardResult<ReleaseInfo> {
    let url = format!("{}/repos/{}/releases", self.api_base, self.slug);
    let payload = serde_json::json!({
      "tag_name": tag_name,
      "name": name,
      "body": body,
      "draft": draft,
    });

    let response = self.authorize(self.client.post(&url)).json(&payload).send()?;
    let release = Self::check(&url, response)?.json::<ReleaseInfo>()?;
    Ok(release)
  }

  /// Attach a binary artifact to a release
  pub fn upload_asset(&self, release: &ReleaseInfo, path: &Path) -> ShipyardResult<()> {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .ok_or_else(|| ShipyardError::message(format!("Artifact {} has no file name", path.display())))?;
    let bytes =
      std::fs::read(path).with_context(|| format!("Failed to read artifact {}", path.display()))?;

    let url = format!(
      "{}/repos/{}/releases/{}/assets?name={}",
      self.uploads_base, self.slug, release.id, name
    );
    let response = self
      .authorize(self.client.post(&url))
      .header("Content-Type", "application/zip")
      .body(bytes)
      .send()?;
    Self::check(&url, response)?;
    Ok(())
  }
}

impl MilestoneApi for GitHubClient {
  fn list_open_milestones(&self) -> ShipyardResult<Vec<MilestoneInfo>> {
    let url = format!("{}/repos/{}/milestones?state=open", self.api_base, self.slug);
    let response = self.authorize(self.client.get(&url)).send()?;
    let milestones = Self::check(&url, response)?.json::<Vec<MilestoneInfo>>()?;
    Ok(milestones)
  }

  fn update_milestone(&self, number: u64, title: Option<&str>, close: bool) -> ShipyardResult<()> {
    let url = format!("{}/repos/{}/milestones/{}", self.api_base, self.slug, number);
    let mut payload = serde_json::Map::new();
    if let Some(title) = title {
      payload.insert("title".to_string(), serde_json::Value::String(title.to_string()));
    }
    if close {
      payload.insert("state".to_string(), serde_json::Value::String("closed".to_string()));
    }

    let response = self.authorize(self.client.patch(&url)).json(&payload).send()?;
    Self::check(&url, response)?;
    Ok(())
  }

  fn create_milestone(&self, title: &str) -> ShipyardResult<MilestoneInfo> {
    let url = format!("{}/repos/{}/milestones", self.api_base, self.slug);
    let payload = serde_json::json!({ "title": title });

    let response = self.authorize(self.client.post(&url)).json(&payload).send()?;
    let milestone = Self::check(&url, response)?.json::<MilestoneInfo>()?;
    Ok(milestone)
  }
}
