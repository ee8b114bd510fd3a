//! Collects the closed pull requests that fall inside the reporting window.

use crate::types::PullRequest;
use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use futures::{Stream, StreamExt};

const MILLIS_PER_SECOND: i64 = 1_000;

/// The span of time a report covers, ending at the moment the run started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    /// Exclusive lower bound, in Unix milliseconds.
    cutoff_millis: i64,
}

impl Window {
    /// Builds the window `(floor(now) - span, now]`.
    pub fn ending_at(now: DateTime<Utc>, span: TimeDelta) -> Self {
        Self {
            cutoff_millis: now.timestamp() * MILLIS_PER_SECOND - span.num_milliseconds(),
        }
    }

    /// The exclusive lower bound as a timestamp, for logging.
    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.cutoff_millis)
    }

    /// Whether the PR was updated after the cutoff. Update times are floored to the second.
    pub fn contains(&self, pr: &PullRequest) -> bool {
        pr.updated_at
            .is_some_and(|updated| updated.timestamp() * MILLIS_PER_SECOND > self.cutoff_millis)
    }
}

/// Pulls pages until one of them contains a PR outside the window, keeping only
/// the PRs inside it.
///
/// Pages are expected newest-updated first, so once a page holds anything older
/// than the cutoff the later pages can only hold older PRs and are never requested.
/// The window filter is applied to every page regardless of that ordering.
pub async fn collect_within_window<S>(pages: S, window: &Window) -> Result<Vec<PullRequest>>
where
    S: Stream<Item = Result<Vec<PullRequest>>>,
{
    let mut pages = std::pin::pin!(pages);
    let mut prs = Vec::new();
    let mut page_count = 0;

    while let Some(page) = pages.next().await {
        let page = page?;
        page_count += 1;

        let fetched = page.len();
        let kept: Vec<PullRequest> = page.into_iter().filter(|pr| window.contains(pr)).collect();
        let reached_cutoff = kept.len() < fetched;

        tracing::debug!(page = page_count, fetched, kept = kept.len(), "Fetched pull request page");
        prs.extend(kept);

        if reached_cutoff {
            tracing::debug!(page = page_count, "Reached cutoff, not requesting further pages");
            break;
        }
    }

    Ok(prs)
}
