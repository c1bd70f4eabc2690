use serde::{Deserialize, Serialize};

/// Change status of a file as reported by the GitHub "list PR files" API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Modified,
    Added,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileStatus::Modified => "modified",
            FileStatus::Added => "added",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
        };
        f.write_str(name)
    }
}

/// A single file touched by a pull request.
///
/// Deserialized straight from a GitHub file record; every field the policy
/// does not look at (sha, blob_url, patch, ...) is dropped. Line counts are
/// optional so records without them are still accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path relative to the repository root (e.g., "src/auth/config.rs")
    pub filename: String,
    pub status: FileStatus,
    /// Lines added in this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additions: Option<u64>,
    /// Lines deleted in this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletions: Option<u64>,
}

#[cfg(test)]
impl ChangedFile {
    /// A file record without line counts.
    pub fn new(filename: impl Into<String>, status: FileStatus) -> Self {
        Self {
            filename: filename.into(),
            status,
            additions: None,
            deletions: None,
        }
    }

    pub fn with_counts(mut self, additions: u64, deletions: u64) -> Self {
        self.additions = Some(additions);
        self.deletions = Some(deletions);
        self
    }
}

/// Identifies the pull request whose files are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestIdentity {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl std::fmt::Display for PullRequestIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}
