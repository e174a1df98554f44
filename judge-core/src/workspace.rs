use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::JudgeCoreError;
use crate::judge::ProgramConfig;

/// Scratch directory holding the compiled program and per-run capture files.
///
/// The directory and everything in it is removed when the workspace is dropped,
/// so cleanup happens on error paths as well.
#[derive(Debug)]
pub struct RuntimeWorkspace {
    dir: TempDir,
}

impl RuntimeWorkspace {
    pub fn create(parent: Option<&Path>) -> Result<Self, JudgeCoreError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("localjudge-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        log::debug!("Created runtime workspace {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn program_config(&self) -> ProgramConfig {
        ProgramConfig::in_dir(self.path())
    }

    pub fn compile_log_path(&self) -> PathBuf {
        self.path().join("compile.log")
    }

    /// Remove the workspace now and report failures instead of ignoring them.
    pub fn close(self) {
        let path = self.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => log::debug!("Removed runtime workspace {:?}", path),
            Err(e) => log::warn!("Failed to remove runtime workspace {:?}: {}", path, e),
        }
    }
}
