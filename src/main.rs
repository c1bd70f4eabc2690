mod action;
mod config;
mod policy;
mod pr;
mod report;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::task::JoinError;
use tracing::{error, info_span, Instrument};
use tracing_subscriber::EnvFilter;

use action::RunError;
use pr::{EventContext, GitHubClient};
use report::RunStatus;

/// PR File Policy: fails a GitHub Pull Request check when changed files
/// matching a pattern break the configured change-type rules.
#[derive(Parser, Debug)]
#[command(name = "pr-file-policy", version, about)]
struct Cli {
    #[command(flatten)]
    inputs: config::Inputs,

    /// Config file (defaults to .pr-file-policy.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check this pull request instead of the one in the GitHub Actions
    /// event (e.g., https://github.com/org/repo/pull/42)
    #[arg(long)]
    pr: Option<String>,

    /// Append a markdown summary to this file (e.g., $GITHUB_STEP_SUMMARY)
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let span = info_span!("pr_file_policy", pr = cli.pr.as_deref().unwrap_or("event"));
    let status = run_status(tokio::spawn(execute(cli).instrument(span)).await);

    report::finish(&status)
}

/// Fold the outcome of the run task into the run's final status. A task that
/// panicked carries no usable error, so it gets a generic message.
fn run_status(outcome: Result<Result<RunStatus, RunError>, JoinError>) -> RunStatus {
    match outcome {
        Ok(Ok(status)) => status,
        Ok(Err(err)) => RunStatus::failed(err.to_string()),
        Err(join_error) => {
            error!(error = %join_error, "run aborted");
            RunStatus::failed("Unknown error")
        }
    }
}

async fn execute(cli: Cli) -> Result<RunStatus, RunError> {
    let mut config = config::Config::load(cli.config.as_deref())?;
    config.apply_inputs(&cli.inputs);
    if let Some(summary) = cli.summary {
        config.report.summary = Some(summary);
    }

    let pr_url = cli.pr;
    let load_context = move || match pr_url.as_deref() {
        Some(url) => EventContext::from_pr_url(url),
        None => EventContext::from_env(),
    };

    action::run(&config, load_context, GitHubClient::new).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::pr::PrError;

    async fn panicking_run() -> Result<RunStatus, RunError> {
        panic!("run task blew up")
    }

    #[tokio::test]
    async fn test_panicked_run_is_unknown_error() {
        let outcome = tokio::spawn(panicking_run()).await;
        assert!(outcome.is_err());
        let status = run_status(outcome);
        assert_eq!(status.failure(), Some("Unknown error"));
    }

    #[tokio::test]
    async fn test_run_error_becomes_failure_message() {
        let outcome = tokio::spawn(async {
            Err::<RunStatus, RunError>(RunError::PullRequest(PrError::NotAPullRequest))
        })
        .await;
        let status = run_status(outcome);
        assert_eq!(
            status.failure(),
            Some("Invalid pull request number: the triggering event is not a pull request")
        );

        let outcome = tokio::spawn(async {
            Err::<RunStatus, RunError>(RunError::Config(ConfigError::MissingInput("regex")))
        })
        .await;
        assert_eq!(
            run_status(outcome).failure(),
            Some("Input required and not supplied: regex")
        );
    }

    #[tokio::test]
    async fn test_completed_run_keeps_its_status() {
        let outcome = tokio::spawn(async { Ok::<RunStatus, RunError>(RunStatus::default()) }).await;
        let status = run_status(outcome);
        assert!(!status.is_failed());
    }

    #[test]
    fn test_cli_reads_inputs() {
        let cli = Cli::try_parse_from([
            "pr-file-policy",
            "--regex",
            "^gen/",
            "--allow-new-files",
            "true",
            "--pr",
            "https://github.com/org/repo/pull/42",
        ])
        .unwrap();
        assert_eq!(cli.inputs.regex.as_deref(), Some("^gen/"));
        assert_eq!(cli.inputs.allow_new_files.as_deref(), Some("true"));
        assert_eq!(cli.pr.as_deref(), Some("https://github.com/org/repo/pull/42"));
    }
}
