//! Centralized error types for patchroll.

use std::path::PathBuf;
use thiserror::Error;

/// Why a `Date:` header could not be normalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Fewer than the four `day month year time` tokens.
    #[error("incomplete date format")]
    Incomplete,

    /// Month abbreviation outside the English `Jan`..`Dec` table.
    #[error("unrecognized month: {0}")]
    UnknownMonth(String),

    /// The time token does not have `hh:mm:ss` components.
    #[error("bad time format (expected hh:mm:ss): {0}")]
    BadTime(String),

    /// A component that must be a number is not.
    #[error("non-numeric date component: {0}")]
    NotNumeric(String),
}

/// Failure to turn one patch file into a record.
///
/// These never abort an export: the message is skipped and reported.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The patch file does not exist.
    #[error("patch file not found: {0}")]
    FileNotFound(PathBuf),

    /// The patch file exists but could not be read.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// None of the candidate encodings could decode the file.
    #[error("could not decode message as any of: {tried}")]
    Undecodable { tried: String },

    /// No line starts with `Subject:`.
    #[error("missing 'Subject:' header")]
    MissingSubject,

    /// A `Subject:` line exists but no line starts with `Date:`.
    #[error("missing 'Date:' header")]
    MissingDate,

    /// The `Date:` header could not be normalized.
    #[error("date processing failed for '{raw}': {reason}")]
    InvalidDate { raw: String, reason: DateError },
}

/// Run-level errors. Any of these aborts the export.
#[derive(Error, Debug)]
pub enum PatchrollError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// git exited with a non-zero status.
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    /// git could not be started at all.
    #[error("could not run '{program}': {source}")]
    GitUnavailable {
        program: String,
        source: std::io::Error,
    },

    /// git printed something this tool cannot parse.
    #[error("unexpected git output: {0:?}")]
    UnexpectedGitOutput(String),

    /// The selectors matched no commits.
    #[error("no commits found for the given range")]
    NoCommits,

    /// `format-patch` succeeded but wrote nothing.
    #[error("git format-patch produced no patch files")]
    NoPatchFiles,

    /// The per-file size budget is zero, negative, or not a number.
    #[error("maximum file size must be > 0 (got {0})")]
    InvalidBudget(String),

    /// The output prefix date is not `YYYY-MM-DD`.
    #[error("unsupported date format: {0:?} (expected YYYY-MM-DD)")]
    InvalidPrefixDate(String),

    /// A single-message extraction failed where the caller asked for exactly one.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Convenience alias for `Result<T, PatchrollError>`.
pub type Result<T> = std::result::Result<T, PatchrollError>;

impl PatchrollError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl ExtractError {
    /// Map a read failure, distinguishing a missing file.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_not_found() {
        let err = ExtractError::read(
            "/nope.patch",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, ExtractError::FileNotFound(_)));
    }

    #[test]
    fn test_invalid_date_message() {
        let err = ExtractError::InvalidDate {
            raw: "27 Foo 2025 10:00:00".into(),
            reason: DateError::UnknownMonth("Foo".into()),
        };
        assert_eq!(
            err.to_string(),
            "date processing failed for '27 Foo 2025 10:00:00': unrecognized month: Foo"
        );
    }
}
