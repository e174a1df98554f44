use std::io;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use thiserror::Error;

/// Failures of the judge itself.
///
/// A submission that crashes, runs too long or prints the wrong answer is not an
/// error here: those are verdicts. Anything in this enum means the suite could
/// not be judged at all.
#[derive(Debug, Error)]
pub enum JudgeCoreError {
    #[error("io error: {0}")]
    IOError(#[from] io::Error),
    #[error("failed to launch {program:?}: {source}")]
    LaunchError {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to parse telemetry: {0}")]
    TelemetryError(String),
    #[error("malformed test data: {0}")]
    TestdataError(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("path not exist: {0:?}")]
    PathNotExist(PathBuf),
    #[error("nix errno: {0}")]
    NixErrno(#[from] Errno),
}

pub fn path_not_exist(path: &Path) -> JudgeCoreError {
    JudgeCoreError::PathNotExist(path.to_path_buf())
}

pub fn telemetry_error(msg: impl Into<String>) -> JudgeCoreError {
    JudgeCoreError::TelemetryError(msg.into())
}
