use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_derive::Serialize;

use crate::compiler::Compiler;
use crate::error::JudgeCoreError;
use crate::run::WrapperConfig;

pub mod result;
pub mod suite;

/// Limits applied to every test case of one suite run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceLimits {
    pub time_limit_secs: f64,
    pub memory_limit_mb: f64,
}

impl ResourceLimits {
    pub fn new(time_limit_secs: f64, memory_limit_mb: f64) -> Result<Self, JudgeCoreError> {
        for (name, value) in [
            ("time limit", time_limit_secs),
            ("memory limit", memory_limit_mb),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(JudgeCoreError::InvalidConfig(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(Self {
            time_limit_secs,
            memory_limit_mb,
        })
    }

    /// How long the judge waits for a run before killing it.
    ///
    /// Generous on purpose: the verdict comes from the wrapper's measurement,
    /// this bound only keeps a hung submission from stalling the suite.
    pub fn wall_clock_bound(&self) -> Duration {
        Duration::from_secs_f64(self.time_limit_secs * 2.0 + 1.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramConfig {
    pub executable_path: PathBuf,
    pub output_file_path: PathBuf,
    pub error_file_path: PathBuf,
    pub telemetry_file_path: PathBuf,
}

impl ProgramConfig {
    /// Scratch file layout for one compiled program inside `runtime_path`.
    pub fn in_dir(runtime_path: &Path) -> Self {
        Self {
            executable_path: runtime_path.join("program"),
            output_file_path: runtime_path.join("program.out"),
            error_file_path: runtime_path.join("program.err"),
            telemetry_file_path: runtime_path.join("telemetry.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestdataConfig {
    pub index: u32,
    pub input_file_path: PathBuf,
    pub answer_file_path: PathBuf,
}

/// Everything a suite run needs, passed in explicitly.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteConfig {
    pub limits: ResourceLimits,
    pub testdata_path: PathBuf,
    pub src_path: PathBuf,
    pub compiler: Compiler,
    pub wrapper: WrapperConfig,
    /// Parent for the scratch directory, system temp dir when `None`.
    pub work_dir: Option<PathBuf>,
}
