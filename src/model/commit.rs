//! Commits selected from the repository log.

use chrono::NaiveDate;

/// One commit as listed by `git log`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Commit {
    /// Full object id.
    pub id: String,

    /// Abbreviated object id.
    pub short_id: String,

    /// Author date (`--date=short`).
    pub date: NaiveDate,

    /// First line of the commit message.
    pub subject: String,
}
