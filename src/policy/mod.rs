pub mod rules;

pub use rules::EvaluatorFlags;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::pr::ChangedFile;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("{0}")]
    MalformedPattern(#[from] regex::Error),
}

/// Outcome of checking a pull request's files against the rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Files that match the pattern and are not exempted, in input order
    pub violations: Vec<ChangedFile>,
}

impl Evaluation {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check every file against the rule.
///
/// A file violates the rule when its name matches `pattern` (anywhere in
/// the path, the match is not anchored) and no enabled flag exempts it.
pub fn evaluate(
    pattern: &str,
    files: &[ChangedFile],
    flags: &EvaluatorFlags,
) -> Result<Evaluation, PolicyError> {
    let regex = Regex::new(pattern)?;

    let violations: Vec<ChangedFile> = files
        .iter()
        .filter(|file| regex.is_match(&file.filename))
        .filter(|file| !rules::is_exempt(flags, file))
        .cloned()
        .collect();

    debug!(
        checked = files.len(),
        violations = violations.len(),
        "evaluated changed files"
    );
    Ok(Evaluation { violations })
}
