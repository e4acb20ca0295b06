//! Blocking `git -C <repo> ...` invocations.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{PatchrollError, Result};

/// Handle on the git executable.
#[derive(Debug, Clone)]
pub struct Git {
    program: String,
}

impl Default for Git {
    fn default() -> Self {
        Self::new("git")
    }
}

impl Git {
    /// Use `program` as the git executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run git in `repo` and return its stdout (lossy UTF-8).
    ///
    /// Waits for the process to exit. A non-zero exit status becomes
    /// [`PatchrollError::Git`] carrying the trimmed stderr.
    pub fn output<I, S>(&self, repo: &Path, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let command = args
            .iter()
            .map(|a| a.as_ref().to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(repo = %repo.display(), command = %command, "Running git");

        let output = Command::new(&self.program)
            .arg("-C")
            .arg(repo)
            .args(&args)
            .output()
            .map_err(|source| PatchrollError::GitUnavailable {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(PatchrollError::Git { command, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let git = Git::new("patchroll-no-such-git-binary");
        let err = git.output(Path::new("."), ["--version"]).unwrap_err();
        assert!(matches!(err, PatchrollError::GitUnavailable { .. }));
    }
}
