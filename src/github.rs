use crate::config::RepoId;
use crate::types::PullRequest;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use http::Uri;
use octocrab::{Octocrab, Page};
use serde::{Deserialize, Serialize};

const PER_PAGE: &str = "100";

/// Login GitHub shows for PRs whose author account has been deleted.
const GHOST_LOGIN: &str = "ghost";

#[derive(Debug, Deserialize)]
struct ApiPullRequest {
    title: String,
    html_url: String,
    user: Option<ApiUser>,
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    labels: Vec<ApiLabel>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiLabel {
    name: String,
}

impl From<ApiPullRequest> for PullRequest {
    fn from(pr: ApiPullRequest) -> Self {
        Self {
            title: pr.title,
            url: pr.html_url,
            author_login: pr
                .user
                .map_or_else(|| GHOST_LOGIN.to_string(), |user| user.login),
            updated_at: pr.updated_at,
            labels: pr.labels.into_iter().map(|label| label.name).collect(),
        }
    }
}

#[derive(Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    body: &'a str,
}

/// The part of a created issue the caller reports back.
#[derive(Clone, Debug, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub html_url: String,
}

/// Where the next page of a listing comes from.
enum Cursor {
    First,
    Next(Uri),
    Exhausted,
}

pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    pub fn new(token: Option<String>, api_base: &str) -> Result<Self> {
        let base_uri: Uri = api_base
            .parse()
            .with_context(|| format!("Invalid GitHub API URL: {api_base}"))?;

        let mut builder = Octocrab::builder().base_uri(base_uri)?;
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }

        Ok(Self {
            octocrab: builder.build()?,
        })
    }

    /// Lists closed pull requests, most recently updated first, one page per item.
    ///
    /// Pages are requested lazily: nothing is sent until the stream is polled, and
    /// dropping the stream stops pagination.
    pub fn closed_pull_pages<'a>(
        &'a self,
        repo: &'a RepoId,
    ) -> impl Stream<Item = Result<Vec<PullRequest>>> + 'a {
        stream::try_unfold(Cursor::First, move |cursor| self.fetch_page(repo, cursor))
    }

    async fn fetch_page(
        &self,
        repo: &RepoId,
        cursor: Cursor,
    ) -> Result<Option<(Vec<PullRequest>, Cursor)>> {
        let page: Page<ApiPullRequest> = match cursor {
            Cursor::First => {
                let route = format!("/repos/{}/{}/pulls", repo.owner, repo.repo);
                let params = [
                    ("state", "closed"),
                    ("sort", "updated"),
                    ("direction", "desc"),
                    ("per_page", PER_PAGE),
                    ("page", "1"),
                ];
                self.octocrab
                    .get(route, Some(&params))
                    .await
                    .with_context(|| format!("Failed to list pull requests for {repo}"))?
            }
            Cursor::Next(uri) => {
                let next = self
                    .octocrab
                    .get_page(&Some(uri))
                    .await
                    .with_context(|| format!("Failed to list pull requests for {repo}"))?;
                match next {
                    Some(page) => page,
                    None => return Ok(None),
                }
            }
            Cursor::Exhausted => return Ok(None),
        };

        let cursor = page.next.map_or(Cursor::Exhausted, Cursor::Next);
        let prs = page.items.into_iter().map(PullRequest::from).collect();

        Ok(Some((prs, cursor)))
    }

    pub async fn create_issue(&self, repo: &RepoId, title: &str, body: &str) -> Result<CreatedIssue> {
        let route = format!("/repos/{}/{}/issues", repo.owner, repo.repo);

        self.octocrab
            .post(route, Some(&NewIssue { title, body }))
            .await
            .with_context(|| format!("Failed to create issue in {repo}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_pull_request_conversion() {
        let api: ApiPullRequest = serde_json::from_value(json!({
            "title": "Fix login",
            "html_url": "https://github.com/o/r/pull/1",
            "user": { "login": "alice" },
            "updated_at": "2024-01-10T12:00:00Z",
            "labels": [{ "name": "merge-milestone" }, { "name": "merge-milestone:Beta" }],
            "number": 1,
            "state": "closed"
        }))
        .unwrap();

        let pr = PullRequest::from(api);

        assert_eq!(pr.title, "Fix login");
        assert_eq!(pr.url, "https://github.com/o/r/pull/1");
        assert_eq!(pr.author_login, "alice");
        assert_eq!(pr.updated_at.unwrap().timestamp(), 1_704_888_000);
        assert_eq!(pr.labels, vec!["merge-milestone", "merge-milestone:Beta"]);
    }

    #[test]
    fn test_deleted_author_becomes_ghost() {
        let api: ApiPullRequest = serde_json::from_value(json!({
            "title": "Orphaned",
            "html_url": "u",
            "user": null,
            "updated_at": null
        }))
        .unwrap();

        let pr = PullRequest::from(api);

        assert_eq!(pr.author_login, "ghost");
        assert!(pr.updated_at.is_none());
        assert!(pr.labels.is_empty());
    }
}
