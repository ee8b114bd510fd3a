use chrono::{DateTime, Utc};

/// Snapshot of a closed pull request, reduced to what the report needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullRequest {
    pub title: String,
    pub url: String,
    pub author_login: String,
    /// `None` only if GitHub omitted the timestamp; such PRs never fall inside a window.
    pub updated_at: Option<DateTime<Utc>>,
    /// Label names in the order GitHub returned them.
    pub labels: Vec<String>,
}

impl PullRequest {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label == name)
    }
}
