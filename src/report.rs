use crate::milestones::MilestoneGroups;
use std::fmt::Write;

/// Title of the issue the report is filed as.
pub const ISSUE_TITLE: &str = "Milestone Update";

/// Renders the markdown issue body.
///
/// Each milestone gets a `## <label>` heading followed by one
/// `* [title](url) (@author)` entry per PR. Entries are concatenated without
/// separators, which is the format existing consumers of the issue expect.
pub fn render(milestones: &MilestoneGroups) -> String {
    let mut body = String::new();

    for (milestone, prs) in milestones.iter() {
        let _ = write!(body, "## {milestone}\n\n");
        for pr in prs {
            let _ = write!(body, "* [{}]({}) (@{})", pr.title, pr.url, pr.author_login);
        }
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PullRequest;

    fn pr(title: &str, url: &str, author: &str) -> PullRequest {
        PullRequest {
            title: title.to_string(),
            url: url.to_string(),
            author_login: author.to_string(),
            updated_at: None,
            labels: vec![],
        }
    }

    #[test]
    fn test_render_single_milestone() {
        let mut groups = MilestoneGroups::default();
        groups.push("merge-milestone:Beta", pr("Fix login", "u1", "alice"));
        groups.push("merge-milestone:Beta", pr("Add retry", "u2", "bob"));

        assert_eq!(
            render(&groups),
            "## merge-milestone:Beta\n\n* [Fix login](u1) (@alice)* [Add retry](u2) (@bob)"
        );
    }

    #[test]
    fn test_render_multiple_milestones_in_insertion_order() {
        let mut groups = MilestoneGroups::default();
        groups.push("merge-milestone:v2", pr("A", "ua", "x"));
        groups.push("merge-milestone:v1", pr("B", "ub", "y"));

        assert_eq!(
            render(&groups),
            "## merge-milestone:v2\n\n* [A](ua) (@x)## merge-milestone:v1\n\n* [B](ub) (@y)"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut groups = MilestoneGroups::default();
        groups.push("merge-milestone:v1", pr("A", "ua", "x"));
        groups.push("merge-milestone:v2", pr("B", "ub", "y"));

        assert_eq!(render(&groups), render(&groups));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&MilestoneGroups::default()), "");
    }
}
