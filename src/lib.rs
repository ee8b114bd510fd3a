pub mod config;
pub mod duration;
pub mod fetcher;
pub mod github;
pub mod milestones;
pub mod report;
pub mod types;

use chrono::{DateTime, Utc};
use config::AppConfig;
use duration::{DurationError, IsoDuration};
use fetcher::Window;
use github::GitHubClient;
use std::fmt;
use thiserror::Error;

/// How a successful run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No gated PR with a milestone label was closed in the window; nothing was filed.
    NoMilestones,
    /// The report was filed as a new issue.
    Reported { number: u64, url: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMilestones => f.write_str("No milestones hit"),
            Self::Reported { .. } => f.write_str("Report created"),
        }
    }
}

/// Why a run failed. Nothing has been written to GitHub when either is returned.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    InvalidDuration(#[from] DurationError),

    #[error(transparent)]
    Remote(#[from] anyhow::Error),
}

/// Builds and files the milestone report for the configured repository.
///
/// The duration is validated before any request is made. Listing happens page by
/// page, and the issue is created last, so a failure at any point leaves the
/// repository untouched.
pub async fn run(
    config: &AppConfig,
    client: &GitHubClient,
    now: DateTime<Utc>,
) -> Result<Outcome, RunError> {
    let since: IsoDuration = config.since.parse()?;
    let span = since
        .span_from(now)
        .ok_or_else(|| DurationError {
            input: config.since.clone(),
        })?;

    let window = Window::ending_at(now, span);
    tracing::debug!(since = %config.since, cutoff = ?window.cutoff(), "Computed reporting window");

    let repo = &config.repository;
    let prs = fetcher::collect_within_window(client.closed_pull_pages(repo), &window).await?;
    tracing::info!(repo = %repo, count = prs.len(), "Collected closed pull requests in window");

    let grouping = milestones::group_by_milestone(prs);
    if !grouping.unassigned.is_empty() {
        let urls: Vec<&str> = grouping.unassigned.iter().map(|pr| pr.url.as_str()).collect();
        tracing::warn!(
            count = urls.len(),
            ?urls,
            "Pull requests labelled {} have no {}<name> label and are left out of the report",
            milestones::GATE_LABEL,
            milestones::MILESTONE_PREFIX
        );
    }

    if grouping.milestones.is_empty() {
        return Ok(Outcome::NoMilestones);
    }
    tracing::info!(milestones = grouping.milestones.len(), "Grouped pull requests by milestone");

    let body = report::render(&grouping.milestones);
    let issue = client.create_issue(repo, report::ISSUE_TITLE, &body).await?;
    tracing::info!(number = issue.number, url = %issue.html_url, "Created milestone report issue");

    Ok(Outcome::Reported {
        number: issue.number,
        url: issue.html_url,
    })
}
