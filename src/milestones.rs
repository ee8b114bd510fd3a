//! Label-based selection and grouping of pull requests.
//!
//! A PR takes part in the report only when it carries the gate label
//! `merge-milestone`. It is then filed under its first label named
//! `merge-milestone:<name>`.

use crate::types::PullRequest;

/// Label a PR must carry to be considered at all.
pub const GATE_LABEL: &str = "merge-milestone";

/// Prefix of the labels that name a milestone.
pub const MILESTONE_PREFIX: &str = "merge-milestone:";

/// Milestone label name to the PRs filed under it.
///
/// Milestones iterate in the order they were first seen, and PRs within a
/// milestone keep the order they were added in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MilestoneGroups {
    groups: Vec<(String, Vec<PullRequest>)>,
}

impl MilestoneGroups {
    pub fn push(&mut self, milestone: &str, pr: PullRequest) {
        match self.groups.iter_mut().find(|(name, _)| name == milestone) {
            Some((_, prs)) => prs.push(pr),
            None => self.groups.push((milestone.to_string(), vec![pr])),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PullRequest])> {
        self.groups
            .iter()
            .map(|(name, prs)| (name.as_str(), prs.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

/// Result of grouping: the groups plus the gated PRs that had nowhere to go.
#[derive(Clone, Debug, Default)]
pub struct Grouping {
    pub milestones: MilestoneGroups,
    /// PRs carrying the gate label but no milestone label. They are left out of
    /// the report.
    pub unassigned: Vec<PullRequest>,
}

/// The first label naming a milestone, in the PR's label order.
fn milestone_of(pr: &PullRequest) -> Option<&str> {
    pr.labels
        .iter()
        .map(String::as_str)
        .find(|label| label.starts_with(MILESTONE_PREFIX))
}

pub fn group_by_milestone(prs: Vec<PullRequest>) -> Grouping {
    let mut grouping = Grouping::default();

    for pr in prs.into_iter().filter(|pr| pr.has_label(GATE_LABEL)) {
        match milestone_of(&pr).map(str::to_string) {
            Some(milestone) => grouping.milestones.push(&milestone, pr),
            None => grouping.unassigned.push(pr),
        }
    }

    grouping
}
