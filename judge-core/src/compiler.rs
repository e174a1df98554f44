use std::fs;
use std::path::{Path, PathBuf};

use serde_derive::Serialize;

use crate::error::{path_not_exist, JudgeCoreError};
use crate::run::{CommandRunner, CommandSpec};

pub const DEFAULT_COMPILER: &str = "g++";
pub const DEFAULT_COMPILER_FLAGS: &str = "-std=c++17 -O2 -Wall -Wextra";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compiler {
    pub program: PathBuf,
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationResult {
    pub success: bool,
    pub diagnostics: String,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILER, DEFAULT_COMPILER_FLAGS)
    }
}

impl Compiler {
    /// `flags` is split on whitespace, quoting is not interpreted.
    pub fn new(program: impl Into<PathBuf>, flags: &str) -> Self {
        Self {
            program: program.into(),
            flags: flags.split_whitespace().map(str::to_owned).collect(),
        }
    }

    fn get_command(&self, src_path: &Path, target_path: &Path, log_path: &Path) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(self.flags.iter().cloned())
            .arg(src_path.to_string_lossy())
            .arg("-o")
            .arg(target_path.to_string_lossy())
            .stdout(log_path)
            .stderr(log_path)
    }

    /// Build `src_path` into `target_path`, always from scratch.
    ///
    /// A failed build is an `Ok` with `success == false`; `Err` means the
    /// compiler could not be run.
    pub fn compile<R: CommandRunner>(
        &self,
        runner: &R,
        src_path: &Path,
        target_path: &Path,
        log_path: &Path,
    ) -> Result<CompilationResult, JudgeCoreError> {
        if !src_path.exists() {
            return Err(path_not_exist(src_path));
        }
        if target_path.exists() {
            fs::remove_file(target_path)?;
        }

        let command = self.get_command(src_path, target_path, log_path);
        log::debug!("Compiling with {:?}", command);
        let result = runner.run(&command)?;
        let diagnostics = match fs::read(log_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                log::warn!("Compiler log {:?} unreadable: {}", log_path, e);
                String::new()
            }
        };

        let success = result.exit_state.success() && target_path.exists();
        log::info!("Compile {:?}: success={}", src_path, success);
        Ok(CompilationResult {
            success,
            diagnostics,
        })
    }
}
