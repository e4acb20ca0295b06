//! Size-capped output files that roll over to a new numbered part.
//!
//! Records are appended whole. A new part is opened when the next record
//! would push the current one past the byte budget, unless the current part
//! is still empty: a record larger than the budget goes alone into its own
//! part instead of rolling forever.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{PatchrollError, Result};

/// The currently open output part.
#[derive(Debug)]
struct OutputPart {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes: u64,
}

/// Writes records into `{prefix}-{part}.txt` files of at most `max_bytes`.
#[derive(Debug)]
pub struct RollingWriter {
    output_dir: PathBuf,
    prefix: String,
    max_bytes: u64,
    part: u32,
    current: Option<OutputPart>,
    paths: Vec<PathBuf>,
}

impl RollingWriter {
    /// Create a writer. No file is opened until the first record.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        max_bytes: u64,
    ) -> Result<Self> {
        if max_bytes == 0 {
            return Err(PatchrollError::InvalidBudget("0 bytes".to_string()));
        }
        Ok(Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
            max_bytes,
            part: 0,
            current: None,
            paths: Vec::new(),
        })
    }

    /// Append one fully rendered record.
    pub fn write_record(&mut self, record_text: &str) -> Result<()> {
        let record_bytes = record_text.len() as u64;

        let mut part = match self.current.take() {
            Some(part) if part.bytes == 0 || part.bytes + record_bytes <= self.max_bytes => part,
            previous => {
                if let Some(previous) = previous {
                    finish(previous)?;
                }
                self.open_next()?
            }
        };

        let written = part
            .writer
            .write_all(record_text.as_bytes())
            .map_err(|e| PatchrollError::io(&part.path, e));
        part.bytes += record_bytes;
        if part.bytes > self.max_bytes {
            warn!(
                path = %part.path.display(),
                bytes = record_bytes,
                max_bytes = self.max_bytes,
                "Record exceeds the size budget; written alone"
            );
        }
        self.current = Some(part);
        written
    }

    /// Flush and close the current part, if any. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        match self.current.take() {
            Some(part) => finish(part),
            None => Ok(()),
        }
    }

    /// Number of the last part opened (0 before the first write).
    pub fn part(&self) -> u32 {
        self.part
    }

    /// Paths of every part opened so far, in order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn open_next(&mut self) -> Result<OutputPart> {
        self.part += 1;
        let path = self
            .output_dir
            .join(format!("{}-{}.txt", self.prefix, self.part));
        let file = File::create(&path).map_err(|e| PatchrollError::io(&path, e))?;
        debug!(path = %path.display(), part = self.part, "Opened output part");
        self.paths.push(path.clone());
        Ok(OutputPart {
            path,
            writer: BufWriter::new(file),
            bytes: 0,
        })
    }
}

fn finish(mut part: OutputPart) -> Result<()> {
    part.writer
        .flush()
        .map_err(|e| PatchrollError::io(&part.path, e))?;
    debug!(path = %part.path.display(), bytes = part.bytes, "Closed output part");
    Ok(())
}

impl Drop for RollingWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to flush output part on drop");
        }
    }
}
