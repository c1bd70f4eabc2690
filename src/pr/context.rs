use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

use super::types::PullRequestIdentity;
use super::PrError;

/// The triggering CI event, captured once at startup and passed around
/// explicitly.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    /// Name of the triggering event (e.g., "pull_request")
    pub event_name: Option<String>,
    /// `owner/name` from GITHUB_REPOSITORY
    pub repository: Option<String>,
    pub payload: EventPayload,
}

/// The subset of a webhook event payload the resolver reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub pull_request: Option<PullRequestPayload>,
    #[serde(default)]
    pub repository: Option<RepositoryPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestPayload {
    #[serde(default)]
    pub number: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    pub name: String,
    pub owner: OwnerPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerPayload {
    pub login: String,
}

impl EventContext {
    /// Read the context GitHub Actions exposes through the environment.
    pub fn from_env() -> Result<EventContext, PrError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the context from GitHub Actions variables fetched by `lookup`.
    ///
    /// A missing event file is not an error: the payload is left empty and
    /// resolution fails later if a pull request number is needed. Empty
    /// variables count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<EventContext, PrError> {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let payload = match var("GITHUB_EVENT_PATH") {
            Some(path) if Path::new(&path).exists() => Self::read_payload(Path::new(&path))?,
            Some(path) => {
                warn!(path = %path, "GITHUB_EVENT_PATH does not exist");
                EventPayload::default()
            }
            None => EventPayload::default(),
        };

        Ok(EventContext {
            event_name: var("GITHUB_EVENT_NAME"),
            repository: var("GITHUB_REPOSITORY"),
            payload,
        })
    }

    /// Build a context for a local run from a pull request URL.
    /// Expected format: https://github.com/{owner}/{repo}/pull/{number}
    pub fn from_pr_url(url: &str) -> Result<EventContext, PrError> {
        let invalid = || PrError::InvalidUrl(url.to_string());
        let parsed = reqwest::Url::parse(url).map_err(|_| invalid())?;

        if parsed.host_str() != Some("github.com") {
            return Err(invalid());
        }

        let segments: Vec<_> = parsed
            .path_segments()
            .ok_or_else(invalid)?
            .filter(|segment| !segment.is_empty())
            .collect();

        if segments.len() != 4 || segments[2] != "pull" {
            return Err(invalid());
        }

        let number = segments[3].parse::<u64>().map_err(|_| invalid())?;

        Ok(EventContext {
            event_name: Some("pull_request".to_string()),
            repository: Some(format!("{}/{}", segments[0], segments[1])),
            payload: EventPayload {
                pull_request: Some(PullRequestPayload {
                    number: Some(number),
                }),
                repository: None,
            },
        })
    }

    fn read_payload(path: &Path) -> Result<EventPayload, PrError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|err| PrError::EventPayload(format!("{}: {}", path.display(), err)))?;
        serde_json::from_str(&contents)
            .map_err(|err| PrError::EventPayload(format!("{}: {}", path.display(), err)))
    }

    /// Repository owner and name, preferring GITHUB_REPOSITORY over the
    /// payload.
    fn repository_coordinates(&self) -> Result<(String, String), PrError> {
        if let Some(repository) = &self.repository {
            return match repository.split_once('/') {
                Some((owner, repo))
                    if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
                {
                    Ok((owner.to_string(), repo.to_string()))
                }
                _ => Err(PrError::InvalidRepository(repository.clone())),
            };
        }

        self.payload
            .repository
            .as_ref()
            .map(|repo| (repo.owner.login.clone(), repo.name.clone()))
            .ok_or(PrError::MissingRepository)
    }
}

/// Resolve the pull request the current run targets.
pub fn resolve_pull_request(context: &EventContext) -> Result<PullRequestIdentity, PrError> {
    let (owner, repo) = context.repository_coordinates()?;
    let number = context
        .payload
        .pull_request
        .as_ref()
        .and_then(|pr| pr.number)
        .filter(|number| *number > 0)
        .ok_or(PrError::NotAPullRequest)?;

    debug!(event = ?context.event_name, %owner, %repo, number, "resolved pull request");
    Ok(PullRequestIdentity {
        owner,
        repo,
        number,
    })
}
