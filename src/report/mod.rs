pub mod types;

pub use types::RunStatus;

use crate::policy::Evaluation;
use colored::Colorize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{debug, instrument};

pub const NO_VIOLATIONS: &str = "No files are infringing the rule";
pub const VIOLATIONS_FOUND: &str = "There are files infringing the rule";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write summary file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize infringing files: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Report the evaluation outcome and mark the run failed on violations.
///
/// The run is not halted here; the caller decides when to exit.
pub fn publish(evaluation: &Evaluation, status: &mut RunStatus) -> Result<(), ReportError> {
    if evaluation.passed() {
        println!("{}", NO_VIOLATIONS.green());
        status.info(NO_VIOLATIONS);
        return Ok(());
    }

    let notice = format!(
        "Infringing files: {}",
        serde_json::to_string(&evaluation.violations)?
    );
    println!("{}", notice.yellow());
    status.info(notice);
    status.set_failed(VIOLATIONS_FOUND);
    Ok(())
}

/// Append a markdown summary of the outcome to `path` (e.g., the file named
/// by GITHUB_STEP_SUMMARY).
#[instrument(skip(path, evaluation), fields(path = %path.display(), violations = evaluation.violations.len()))]
pub fn write_summary(path: &Path, pattern: &str, evaluation: &Evaluation) -> Result<(), ReportError> {
    let mut md = String::new();
    md.push_str("## Changed files policy\n\n");
    md.push_str(&format!("**Pattern:** `{}`\n\n", pattern));

    if evaluation.passed() {
        md.push_str(&format!("**Result: PASSED** - {}\n\n", NO_VIOLATIONS));
    } else {
        md.push_str(&format!("**Result: FAILED** - {}\n\n", VIOLATIONS_FOUND));
        md.push_str("| File | Status | Additions | Deletions |\n");
        md.push_str("|---|---|---|---|\n");
        for file in &evaluation.violations {
            md.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                file.filename,
                file.status,
                count_cell(file.additions),
                count_cell(file.deletions)
            ));
        }
        md.push('\n');
    }

    let mut summary = OpenOptions::new().create(true).append(true).open(path)?;
    summary.write_all(md.as_bytes())?;
    debug!("wrote markdown summary");
    Ok(())
}

fn count_cell(count: Option<u64>) -> String {
    count.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Emit the terminal status of the run and map it to a process exit code.
pub fn finish(status: &RunStatus) -> ExitCode {
    debug!(
        notices = status.notices().len(),
        failed = status.is_failed(),
        "run finished"
    );
    match status.failure() {
        Some(message) => {
            println!("{}", error_command(message));
            eprintln!("{} {}", "FAILED:".red().bold(), message);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}

/// The workflow command GitHub turns into a failed-step annotation.
fn error_command(message: &str) -> String {
    format!("::error::{}", escape_command_data(message))
}

/// Escape a message for use as GitHub workflow command data.
fn escape_command_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::{ChangedFile, FileStatus};

    fn failing_evaluation() -> Evaluation {
        Evaluation {
            violations: vec![
                ChangedFile::new("removed-file.ts", FileStatus::Removed).with_counts(0, 10),
                ChangedFile::new("legacy.ts", FileStatus::Modified),
            ],
        }
    }

    #[test]
    fn test_publish_without_violations() {
        let mut status = RunStatus::default();
        publish(&Evaluation { violations: vec![] }, &mut status).unwrap();
        assert_eq!(status.notices(), [NO_VIOLATIONS.to_string()]);
        assert!(!status.is_failed());
    }

    #[test]
    fn test_publish_with_violations() {
        let mut status = RunStatus::default();
        publish(&failing_evaluation(), &mut status).unwrap();
        assert_eq!(
            status.notices(),
            [r#"Infringing files: [{"filename":"removed-file.ts","status":"removed","additions":0,"deletions":10},{"filename":"legacy.ts","status":"modified"}]"#.to_string()]
        );
        assert_eq!(status.failure(), Some(VIOLATIONS_FOUND));
    }

    #[test]
    fn test_write_summary_with_violations() {
        let path = std::env::temp_dir().join("pr_file_policy_summary_failed.md");
        std::fs::remove_file(&path).ok();
        write_summary(&path, "\\.ts$", &failing_evaluation()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("## Changed files policy"));
        assert!(content.contains("**Pattern:** `\\.ts$`"));
        assert!(content.contains("**Result: FAILED**"));
        assert!(content.contains("| `removed-file.ts` | removed | 0 | 10 |"));
        assert!(content.contains("| `legacy.ts` | modified | - | - |"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_summary_appends() {
        let path = std::env::temp_dir().join("pr_file_policy_summary_append.md");
        std::fs::write(&path, "# Existing step output\n").unwrap();
        write_summary(&path, "gen/", &Evaluation { violations: vec![] }).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Existing step output\n"));
        assert!(content.contains("**Result: PASSED**"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_escape_command_data() {
        assert_eq!(
            escape_command_data("regex parse error:\n    (\n100%"),
            "regex parse error:%0A    (%0A100%25"
        );
    }

    #[test]
    fn test_error_command() {
        assert_eq!(
            error_command("There are files infringing the rule"),
            "::error::There are files infringing the rule"
        );
        assert_eq!(
            error_command("regex parse error:\n    (\nerror: unclosed group"),
            "::error::regex parse error:%0A    (%0Aerror: unclosed group"
        );
    }

    #[test]
    fn test_finish_exit_codes() {
        let exit_code = |status: &RunStatus| format!("{:?}", finish(status));

        assert_eq!(
            exit_code(&RunStatus::failed(VIOLATIONS_FOUND)),
            format!("{:?}", ExitCode::FAILURE)
        );
        assert_eq!(
            exit_code(&RunStatus::default()),
            format!("{:?}", ExitCode::SUCCESS)
        );

        let mut passed_with_notices = RunStatus::default();
        passed_with_notices.info(NO_VIOLATIONS);
        assert_eq!(
            exit_code(&passed_with_notices),
            format!("{:?}", ExitCode::SUCCESS)
        );
    }
}
