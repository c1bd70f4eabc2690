use serde::Deserialize;

use crate::pr::{ChangedFile, FileStatus};

/// Policy toggles. Each one exempts a single category of change from the
/// rule; all default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvaluatorFlags {
    pub allow_added_files: bool,
    pub allow_removed_files: bool,
    pub allow_additions: bool,
    pub allow_deletions: bool,
}

impl EvaluatorFlags {
    /// Exemptions switched on by these flags, in the order they are checked.
    pub fn enabled(&self) -> impl Iterator<Item = Exemption> + '_ {
        Exemption::ALL
            .into_iter()
            .filter(move |exemption| exemption.is_enabled(self))
    }
}

/// A category of change a flag can exempt from the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    AddedFile,
    RemovedFile,
    /// Lines added and none deleted
    PureAddition,
    /// Lines deleted and none added
    PureDeletion,
}

impl Exemption {
    pub const ALL: [Exemption; 4] = [
        Exemption::AddedFile,
        Exemption::RemovedFile,
        Exemption::PureAddition,
        Exemption::PureDeletion,
    ];

    fn is_enabled(self, flags: &EvaluatorFlags) -> bool {
        match self {
            Exemption::AddedFile => flags.allow_added_files,
            Exemption::RemovedFile => flags.allow_removed_files,
            Exemption::PureAddition => flags.allow_additions,
            Exemption::PureDeletion => flags.allow_deletions,
        }
    }

    /// Whether `file` falls in this category. Count-based categories never
    /// apply to records without line counts.
    pub fn applies_to(self, file: &ChangedFile) -> bool {
        match self {
            Exemption::AddedFile => file.status == FileStatus::Added,
            Exemption::RemovedFile => file.status == FileStatus::Removed,
            Exemption::PureAddition => {
                matches!((file.additions, file.deletions), (Some(a), Some(0)) if a > 0)
            }
            Exemption::PureDeletion => {
                matches!((file.additions, file.deletions), (Some(0), Some(d)) if d > 0)
            }
        }
    }
}

/// Whether any enabled exemption covers `file`.
pub fn is_exempt(flags: &EvaluatorFlags, file: &ChangedFile) -> bool {
    flags.enabled().any(|exemption| exemption.applies_to(file))
}
