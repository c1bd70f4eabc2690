use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, ConfigError};
use crate::policy::{self, PolicyError};
use crate::pr::{self, ChangedFileSource, EventContext, PrError};
use crate::report::{self, ReportError, RunStatus};

/// Every way a run can fail before the policy verdict is published.
/// Each variant displays the underlying message unchanged.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    PullRequest(#[from] PrError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Check the pull request named by the event context against the configured
/// rule.
///
/// `load_context` reads the triggering event and runs only after the
/// required inputs are present. `connect` builds the file source from the
/// token and API base URL once the pull request is resolved.
pub async fn run<S, C, F>(
    config: &Config,
    load_context: C,
    connect: F,
) -> Result<RunStatus, RunError>
where
    S: ChangedFileSource,
    C: FnOnce() -> Result<EventContext, PrError>,
    F: FnOnce(&str, &str) -> Result<S, PrError>,
{
    let pattern = config.require_regex()?;
    let token = config.require_token()?;
    let context = load_context()?;
    let pull_request = pr::resolve_pull_request(&context)?;
    let flags = config.flags();

    debug!("regex: {}", pattern);
    debug!(?flags, "policy flags");

    let source = connect(&token, &config.api_url())?;
    info!(pr = %pull_request, "fetching changed files");
    let files = source.list_changed_files(&pull_request).await?;
    info!(files = files.len(), "fetched changed files");

    let evaluation = policy::evaluate(pattern, &files, &flags)?;

    let mut status = RunStatus::default();
    report::publish(&evaluation, &mut status)?;
    if let Some(path) = &config.report.summary {
        report::write_summary(path, pattern, &evaluation)?;
    }

    Ok(status)
}
