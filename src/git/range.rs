//! Commit selection: since/until/range selectors to an oldest-first commit
//! list and the revision spec `format-patch` needs to reproduce it.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{PatchrollError, Result};
use crate::git::command::Git;
use crate::model::commit::Commit;

/// `%H %h %ad %s`, NUL-separated.
const LOG_FORMAT: &str = "--pretty=format:%H%x00%h%x00%ad%x00%s";

/// Which commits to select. All fields are passed to git as-is.
#[derive(Debug, Clone, Default)]
pub struct RangeSelector {
    /// Git date expression for `--since`.
    pub since: Option<String>,
    /// Git date expression for `--until`.
    pub until: Option<String>,
    /// Explicit revision range, e.g. `A..B`.
    pub range: Option<String>,
}

impl RangeSelector {
    fn log_args(&self) -> Vec<String> {
        let mut args = vec![
            "log".to_string(),
            "--reverse".to_string(),
            "--date=short".to_string(),
            LOG_FORMAT.to_string(),
        ];
        if let Some(since) = &self.since {
            args.push(format!("--since={since}"));
        }
        if let Some(until) = &self.until {
            args.push(format!("--until={until}"));
        }
        if let Some(range) = &self.range {
            args.push(range.clone());
        }
        args
    }
}

/// What to hand to `git format-patch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionSpec {
    /// Revision or range argument.
    pub spec: String,
    /// Pass `--root` (the oldest commit has no parent).
    pub include_root: bool,
}

/// A non-empty commit selection and its revision spec.
#[derive(Debug, Clone)]
pub struct ResolvedRange {
    /// Selected commits, oldest first.
    pub commits: Vec<Commit>,
    /// Spec that makes `format-patch` emit exactly these commits.
    pub revision: RevisionSpec,
}

impl ResolvedRange {
    /// Date of the oldest selected commit.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.commits.first().map(|c| c.date)
    }
}

/// List the selected commits, oldest first. May be empty.
pub fn list_commits(git: &Git, repo: &Path, selector: &RangeSelector) -> Result<Vec<Commit>> {
    let out = git.output(repo, selector.log_args())?;
    let commits = parse_log_output(&out)?;
    debug!(count = commits.len(), "Listed commits");
    Ok(commits)
}

/// Parse `git log` output produced with [`LOG_FORMAT`].
pub fn parse_log_output(out: &str) -> Result<Vec<Commit>> {
    out.lines()
        .filter(|line| !line.is_empty())
        .map(parse_log_line)
        .collect()
}

fn parse_log_line(line: &str) -> Result<Commit> {
    let unexpected = || PatchrollError::UnexpectedGitOutput(line.to_string());
    let mut fields = line.splitn(4, '\0');
    let id = fields.next().ok_or_else(unexpected)?;
    let short_id = fields.next().ok_or_else(unexpected)?;
    let date = fields.next().ok_or_else(unexpected)?;
    let subject = fields.next().unwrap_or_default();
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| unexpected())?;
    Ok(Commit {
        id: id.to_string(),
        short_id: short_id.to_string(),
        date,
        subject: subject.to_string(),
    })
}

/// First parent of `commit`, or `None` for a root commit.
pub fn first_parent(git: &Git, repo: &Path, commit: &str) -> Result<Option<String>> {
    let out = git.output(repo, ["rev-list", "--parents", "-n", "1", commit])?;
    Ok(out.split_whitespace().nth(1).map(str::to_string))
}

/// Work out the `format-patch` argument for a selection.
///
/// An explicit range is passed through. Otherwise the selection runs from
/// the first parent of the oldest commit to the newest, or from the root
/// when the oldest commit has no parent.
pub fn revision_spec(
    git: &Git,
    repo: &Path,
    selector: &RangeSelector,
    commits: &[Commit],
) -> Result<RevisionSpec> {
    if let Some(range) = &selector.range {
        return Ok(RevisionSpec {
            spec: range.clone(),
            include_root: false,
        });
    }

    let (Some(oldest), Some(newest)) = (commits.first(), commits.last()) else {
        return Err(PatchrollError::NoCommits);
    };

    Ok(match first_parent(git, repo, &oldest.id)? {
        Some(parent) => RevisionSpec {
            spec: format!("{parent}..{}", newest.id),
            include_root: false,
        },
        None => RevisionSpec {
            spec: newest.id.clone(),
            include_root: true,
        },
    })
}

/// Select commits and compute the revision spec. Fails on an empty selection.
pub fn resolve(git: &Git, repo: &Path, selector: &RangeSelector) -> Result<ResolvedRange> {
    let commits = list_commits(git, repo, selector)?;
    if commits.is_empty() {
        return Err(PatchrollError::NoCommits);
    }
    let revision = revision_spec(git, repo, selector, &commits)?;
    info!(
        commits = commits.len(),
        spec = %revision.spec,
        root = revision.include_root,
        "Resolved commit range"
    );
    Ok(ResolvedRange { commits, revision })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_output() {
        let out = "aaaa\0aa\x002025-10-27\0First commit\nbbbb\0bb\x002025-10-28\0Second: with colon\n";
        let commits = parse_log_output(out).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].id, "aaaa");
        assert_eq!(commits[0].short_id, "aa");
        assert_eq!(
            commits[0].date,
            NaiveDate::from_ymd_opt(2025, 10, 27).unwrap()
        );
        assert_eq!(commits[1].subject, "Second: with colon");
    }

    #[test]
    fn test_parse_log_empty() {
        assert!(parse_log_output("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_log_empty_subject() {
        let commits = parse_log_output("cccc\0cc\x002024-01-01\0").unwrap();
        assert_eq!(commits[0].subject, "");
    }

    #[test]
    fn test_parse_log_garbage() {
        assert!(matches!(
            parse_log_output("not a log line"),
            Err(PatchrollError::UnexpectedGitOutput(_))
        ));
        assert!(matches!(
            parse_log_output("a\0b\0yesterday\0s"),
            Err(PatchrollError::UnexpectedGitOutput(_))
        ));
    }

    #[test]
    fn test_log_args() {
        let selector = RangeSelector {
            since: Some("2025-01-01".into()),
            until: None,
            range: Some("v1..v2".into()),
        };
        assert_eq!(
            selector.log_args(),
            [
                "log",
                "--reverse",
                "--date=short",
                LOG_FORMAT,
                "--since=2025-01-01",
                "v1..v2"
            ]
        );
    }

    #[test]
    fn test_explicit_range_passes_through() {
        let selector = RangeSelector {
            range: Some("A..B".into()),
            ..Default::default()
        };
        // No git call is made for an explicit range.
        let spec = revision_spec(&Git::new("unused"), Path::new("."), &selector, &[]).unwrap();
        assert_eq!(
            spec,
            RevisionSpec {
                spec: "A..B".into(),
                include_root: false
            }
        );
    }
}
