//! End-to-end export: select commits, generate patches, and pack the
//! extracted records into rolling output files.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{ExtractError, PatchrollError, Result};
use crate::export::rolling::RollingWriter;
use crate::git::command::Git;
use crate::git::patches::generate_patches;
use crate::git::range::{resolve, RangeSelector};
use crate::parser::patch::{extract_record, ExtractOptions};

/// Bytes in one MiB.
pub const MIB: f64 = 1024.0 * 1024.0;

/// Default size budget per output file, in MiB.
pub const DEFAULT_MAX_MIB: f64 = 64.0;

/// Everything `export_range` needs.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Repository to read.
    pub repo: PathBuf,
    /// Commit selection.
    pub selector: RangeSelector,
    /// Directory for the `{prefix}-{part}.txt` files.
    pub output_dir: PathBuf,
    /// Output prefix override; defaults to the first commit's date.
    pub prefix_date: Option<String>,
    /// Size budget per output file.
    pub max_bytes: u64,
    /// Record extraction settings.
    pub extract: ExtractOptions,
}

/// A patch file that did not produce a record.
#[derive(Debug)]
pub struct SkippedMessage {
    pub path: PathBuf,
    pub reason: ExtractError,
}

/// Outcome of writing a sequence of patch files.
#[derive(Debug, Default)]
pub struct RecordStats {
    /// Records written.
    pub exported: usize,
    /// Bytes written across all parts.
    pub bytes: u64,
    /// Messages skipped, in input order.
    pub skipped: Vec<SkippedMessage>,
}

/// Result of a full export run.
#[derive(Debug)]
pub struct ExportSummary {
    /// Commits selected by the range.
    pub commits: usize,
    /// Patch files generated.
    pub patches: usize,
    /// Prefix used for output names.
    pub prefix: String,
    /// Per-record outcome.
    pub records: RecordStats,
    /// Output files written, in part order.
    pub files: Vec<PathBuf>,
}

/// Convert a MiB budget to bytes, rejecting non-positive values.
pub fn max_bytes_from_mib(mib: f64) -> Result<u64> {
    let bytes = mib * MIB;
    if bytes.is_nan() || bytes < 1.0 || bytes.is_infinite() {
        return Err(PatchrollError::InvalidBudget(format!("{mib} MiB")));
    }
    Ok(bytes as u64)
}

/// Validate a `YYYY-MM-DD` prefix. Anything after the first ten characters
/// (e.g. a time) is dropped.
pub fn normalize_prefix_date(value: &str) -> Result<String> {
    let value = value.trim();
    let invalid = || PatchrollError::InvalidPrefixDate(value.to_string());
    let head = value.get(..10).ok_or_else(invalid)?;
    let date = NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|_| invalid())?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Run a complete export.
///
/// The budget and prefix override are validated before git is called. The
/// temporary patch directory is removed and the last output part closed on
/// every return path.
pub fn export_range(
    git: &Git,
    options: &ExportOptions,
    progress: Option<&dyn Fn(usize, usize)>,
) -> Result<ExportSummary> {
    if options.max_bytes == 0 {
        return Err(PatchrollError::InvalidBudget("0 bytes".to_string()));
    }
    let prefix_override = options
        .prefix_date
        .as_deref()
        .map(normalize_prefix_date)
        .transpose()?;

    let range = resolve(git, &options.repo, &options.selector)?;
    let prefix = match prefix_override {
        Some(prefix) => prefix,
        None => range
            .first_date()
            .ok_or(PatchrollError::NoCommits)?
            .format("%Y-%m-%d")
            .to_string(),
    };

    std::fs::create_dir_all(&options.output_dir)
        .map_err(|e| PatchrollError::io(&options.output_dir, e))?;
    let mut writer = RollingWriter::new(&options.output_dir, prefix.as_str(), options.max_bytes)?;

    let batch = generate_patches(git, &options.repo, &range.revision)?;
    if batch.len() != range.commits.len() {
        warn!(
            commits = range.commits.len(),
            patches = batch.len(),
            "Patch count differs from commit count (merge commits are not exported)"
        );
    }

    let written = write_patch_records(batch.files(), &mut writer, &options.extract, progress);
    let closed = writer.close();
    let patches = batch.len();
    drop(batch);
    let records = written?;
    closed?;

    info!(
        exported = records.exported,
        skipped = records.skipped.len(),
        files = writer.part(),
        "Export finished"
    );

    Ok(ExportSummary {
        commits: range.commits.len(),
        patches,
        prefix,
        records,
        files: writer.paths().to_vec(),
    })
}

/// Extract each patch file in order and append its record to `writer`.
///
/// Messages that fail extraction are logged and skipped; only write
/// failures abort.
pub fn write_patch_records(
    files: &[PathBuf],
    writer: &mut RollingWriter,
    options: &ExtractOptions,
    progress: Option<&dyn Fn(usize, usize)>,
) -> Result<RecordStats> {
    let mut stats = RecordStats::default();
    let total = files.len();

    for (i, path) in files.iter().enumerate() {
        if let Some(cb) = progress {
            cb(i, total);
        }
        match extract_record(path, options) {
            Ok(record) => {
                let text = record.to_text();
                writer.write_record(&text)?;
                stats.exported += 1;
                stats.bytes += text.len() as u64;
            }
            Err(reason) => {
                warn!(path = %display_name(path), error = %reason, "Skipping message");
                stats.skipped.push(SkippedMessage {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }
    if let Some(cb) = progress {
        cb(total, total);
    }

    Ok(stats)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
