//! Materialize one `.patch` file per commit into a scoped temp directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::info;

use crate::error::{PatchrollError, Result};
use crate::git::command::Git;
use crate::git::range::RevisionSpec;

/// Patch files written by `git format-patch`.
///
/// Owns the temporary directory; dropping the batch deletes it along with
/// every patch file, whichever way the export ends.
#[derive(Debug)]
pub struct PatchBatch {
    dir: TempDir,
    files: Vec<PathBuf>,
}

impl PatchBatch {
    /// Patch files in `format-patch` numbering order (oldest commit first).
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Directory holding the patch files.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Number of patch files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the batch holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Run `git format-patch` for `revision` into a fresh temp directory.
pub fn generate_patches(git: &Git, repo: &Path, revision: &RevisionSpec) -> Result<PatchBatch> {
    let dir = tempfile::Builder::new()
        .prefix("patchroll-patches-")
        .tempdir()
        .map_err(|e| PatchrollError::io(std::env::temp_dir(), e))?;

    let mut args: Vec<OsString> = vec![
        "format-patch".into(),
        "-o".into(),
        dir.path().into(),
        "--no-signature".into(),
        "--start-number=1".into(),
        "--quiet".into(),
    ];
    if revision.include_root {
        args.push("--root".into());
    }
    args.push(revision.spec.as_str().into());

    git.output(repo, &args)?;

    let files = collect_patch_files(dir.path())?;
    if files.is_empty() {
        return Err(PatchrollError::NoPatchFiles);
    }
    info!(count = files.len(), dir = %dir.path().display(), "Generated patch files");
    Ok(PatchBatch { dir, files })
}

/// `*.patch` files directly under `dir`, sorted by name.
fn collect_patch_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PatchrollError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PatchrollError::io(dir, e))?.path();
        if path.extension().is_some_and(|ext| ext == "patch") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_patch_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["0002-b.patch", "0001-a.patch", "notes.txt", "0010-c.patch"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let files = collect_patch_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["0001-a.patch", "0002-b.patch", "0010-c.patch"]);
    }
}
