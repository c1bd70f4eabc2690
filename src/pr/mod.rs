pub mod context;
pub mod types;

pub use context::{resolve_pull_request, EventContext};
pub use types::{ChangedFile, FileStatus, PullRequestIdentity};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, LINK};
use thiserror::Error;
use tracing::{debug, instrument};

/// Page size for the "list pull request files" endpoint (the API maximum).
const PER_PAGE: usize = 100;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Invalid PR URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid pull request number: the triggering event is not a pull request")]
    NotAPullRequest,

    #[error("Repository not found in context: set GITHUB_REPOSITORY to 'owner/repo'")]
    MissingRepository,

    #[error("Invalid repository '{0}': expected 'owner/repo'")]
    InvalidRepository(String),

    #[error("Failed to read event payload {0}")]
    EventPayload(String),
}

/// Source of the files changed by a pull request.
#[async_trait]
pub trait ChangedFileSource: Send + Sync {
    /// Return every changed file, in the order the platform lists them.
    async fn list_changed_files(
        &self,
        pull_request: &PullRequestIdentity,
    ) -> Result<Vec<ChangedFile>, PrError>;
}

/// GitHub REST client for the "list pull request files" endpoint.
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    api_url: String,
}

impl GitHubClient {
    pub fn new(token: &str, api_url: &str) -> Result<GitHubClient, PrError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("pr-file-policy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(http, token, api_url))
    }

    fn with_http(http: reqwest::Client, token: &str, api_url: &str) -> GitHubClient {
        GitHubClient {
            http,
            token: token.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn first_page_url(&self, pr: &PullRequestIdentity) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}/files?per_page={}",
            self.api_url, pr.owner, pr.repo, pr.number, PER_PAGE
        )
    }
}

#[async_trait]
impl ChangedFileSource for GitHubClient {
    #[instrument(skip(self), fields(pr = %pull_request))]
    async fn list_changed_files(
        &self,
        pull_request: &PullRequestIdentity,
    ) -> Result<Vec<ChangedFile>, PrError> {
        let mut files = Vec::new();
        let mut next_url = Some(self.first_page_url(pull_request));
        let mut page = 0usize;

        while let Some(url) = next_url.take() {
            page += 1;
            debug!(page, url = %url, "fetching changed files page");
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.token)
                .header(ACCEPT, "application/vnd.github+json")
                .header("X-GitHub-Api-Version", "2022-11-28")
                .send()
                .await?
                .error_for_status()?;

            next_url = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_page_link);

            let batch = response.json::<Vec<ChangedFile>>().await?;
            debug!(page, received = batch.len(), "received changed files page");
            files.extend(batch);
        }

        debug!(
            "List of changed files: {}",
            serde_json::to_string(&files).unwrap_or_default()
        );
        Ok(files)
    }
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
fn next_page_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
