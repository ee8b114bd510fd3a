//! Run configuration and environment variable parsing.
//!
//! The report runs as a one-shot job inside a CI host (GitHub Actions), so every
//! setting arrives through the environment: the `since` action input, the
//! repository the workflow runs in, and the token the host hands out.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

const DEFAULT_API_URL: &str = "https://api.github.com";

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepoId {
    /// The owner of the repository (e.g., "facebook").
    pub owner: String,
    /// The name of the repository (e.g., "react").
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split('/').map(str::trim).collect::<Vec<_>>()[..] {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(format!("expected \"owner/repo\", got \"{s}\"")),
        }
    }
}

/// Run configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// ISO-8601 duration describing how far back to look (e.g. "P7D").
    /// Kept unparsed so an invalid value is reported by the run itself.
    #[serde(rename = "input_since")]
    pub since: String,

    /// Repository to read pull requests from and file the report in.
    /// Expected format: "owner/repo".
    #[serde(rename = "github_repository", deserialize_with = "deserialize_repo")]
    pub repository: RepoId,

    /// Token used to authenticate against the GitHub API.
    pub github_token: Option<String>,

    /// Base URL of the GitHub REST API. Defaults to the public API.
    #[serde(default = "default_api_url")]
    pub github_api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

fn deserialize_repo<'de, D>(deserializer: D) -> Result<RepoId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}
