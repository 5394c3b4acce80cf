//! Per-job scratch directory.
//!
//! A `Workspace` owns a uniquely named temporary directory holding the staged
//! copy of the input and every candidate the backends write. It is removed
//! by `release`, or by `Drop` on any other exit path (early return, error,
//! unwinding), so no job leaves files behind.

use crate::error::{Result, ShrinkError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

const STAGED_NAME: &str = "input.pdf";

pub struct Workspace {
    dir: TempDir,
    staged_input: PathBuf,
    original_size: u64,
}

impl Workspace {
    /// Creates a fresh directory (under `root`, or the system temp dir) and
    /// copies `input` into it verbatim.
    pub fn stage(input: &Path, root: Option<&Path>) -> Result<Self> {
        let stage_err = |source| ShrinkError::Stage {
            path: input.to_path_buf(),
            source,
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix("shrink-");
        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root).map_err(stage_err)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(stage_err)?;

        let staged_input = dir.path().join(STAGED_NAME);
        let original_size = fs::copy(input, &staged_input).map_err(stage_err)?;
        debug!(
            workspace = %dir.path().display(),
            size = original_size,
            "staged input"
        );

        Ok(Self {
            dir,
            staged_input,
            original_size,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn staged_input(&self) -> &Path {
        &self.staged_input
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    /// Candidate file for the `ordinal`-th backend; distinct per backend so a
    /// held candidate is never overwritten by a later attempt.
    pub fn candidate_path(&self, ordinal: usize, backend: &str) -> PathBuf {
        self.dir
            .path()
            .join(format!("candidate-{ordinal}-{backend}.pdf"))
    }

    /// Removes the directory tree, reporting failures instead of swallowing
    /// them as `Drop` would.
    pub fn release(self) -> Result<()> {
        let root = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(workspace = %root.display(), "released workspace");
        Ok(())
    }
}
