//! Write one record to its own file, keeping the source encoding.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{PatchrollError, Result};
use crate::model::record::Record;

/// Write `record` as `{output_dir}/{record.name}`.
///
/// The bytes written are the source bytes from the `Subject:` line on, so
/// a GBK patch yields a GBK file. An existing file of the same name is
/// overwritten. Returns the path written.
pub fn export_single(record: &Record, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|e| PatchrollError::io(output_dir, e))?;

    let path = output_dir.join(&record.name);
    if path.exists() {
        warn!(path = %path.display(), "Output file already exists, overwriting");
    }

    std::fs::write(&path, &record.raw_body).map_err(|e| PatchrollError::io(&path, e))?;
    info!(
        path = %path.display(),
        encoding = %record.encoding,
        bytes = record.raw_body.len(),
        "Wrote record"
    );
    Ok(path)
}
