use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_derive::Serialize;

use crate::error::{path_not_exist, JudgeCoreError};
use crate::judge::{ProgramConfig, ResourceLimits};

pub mod process;
pub mod telemetry;

use self::telemetry::{Telemetry, TelemetryFormat};

/// One external command with its standard streams bound to files.
///
/// `None` streams are connected to the null device. When `stdout_path` and
/// `stderr_path` name the same file both streams share one handle.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub stdin_path: Option<PathBuf>,
    pub stdout_path: Option<PathBuf>,
    pub stderr_path: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            stdin_path: None,
            stdout_path: None,
            stderr_path: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin_path = Some(path.into());
        self
    }

    pub fn stdout(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_path = Some(path.into());
        self
    }

    pub fn stderr(mut self, path: impl Into<PathBuf>) -> Self {
        self.stderr_path = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// How the launched command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitState {
    Exited(i32),
    Signaled(i32),
    /// Killed by the judge after the hard wall-clock bound expired.
    TimedOut,
}

impl ExitState {
    /// Shell-style exit code; a signal `s` maps to `128 + s`.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            Self::Signaled(signal) => Some(128 + signal),
            Self::TimedOut => None,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code() == Some(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRunResult {
    pub exit_state: ExitState,
    pub real_time_cost: Duration,
}

/// Launch a command and wait for it.
///
/// Returns `Err` only when the command could not be run at all; whatever the
/// command itself does is reported through `RawRunResult`.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<RawRunResult, JudgeCoreError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, spec: &CommandSpec) -> Result<RawRunResult, JudgeCoreError> {
        (**self).run(spec)
    }
}

/// The external timing wrapper, GNU time or a compatible replacement.
#[derive(Debug, Clone, Serialize)]
pub struct WrapperConfig {
    pub program: PathBuf,
    pub format: TelemetryFormat,
}

impl WrapperConfig {
    pub fn new(program: impl Into<PathBuf>, format: TelemetryFormat) -> Self {
        Self {
            program: program.into(),
            format,
        }
    }

    pub fn build_command(&self, executable: &Path, telemetry_path: &Path) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(self.format.wrapper_args(telemetry_path))
            .arg(executable.to_string_lossy())
    }
}

/// Everything one run of the submission produced.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub exit_state: ExitState,
    /// Present only when the submission exited normally.
    pub telemetry: Option<Telemetry>,
    pub real_time_cost: Duration,
    pub stdout: Vec<u8>,
}

impl ExecutionRecord {
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_state.exit_code()
    }
}

/// Run the compiled program once with `input_path` as its stdin.
///
/// Telemetry is read only after a clean exit; a crash or timeout leaves it
/// `None` without touching the side file.
pub fn run_program<R: CommandRunner>(
    runner: &R,
    program: &ProgramConfig,
    wrapper: &WrapperConfig,
    input_path: &Path,
    limits: &ResourceLimits,
) -> Result<ExecutionRecord, JudgeCoreError> {
    if !input_path.exists() {
        return Err(path_not_exist(input_path));
    }
    // a stale report from the previous case must never be read for this one
    fs::write(&program.telemetry_file_path, "")?;

    let spec = wrapper
        .build_command(&program.executable_path, &program.telemetry_file_path)
        .stdin(input_path)
        .stdout(&program.output_file_path)
        .stderr(&program.error_file_path)
        .timeout(limits.wall_clock_bound());
    log::debug!("Running {:?}", spec);
    let raw = runner.run(&spec)?;
    log::debug!("Program finished: {:?}", raw);

    let stdout = fs::read(&program.output_file_path)?;
    let telemetry = if raw.exit_state.success() {
        let report = fs::read_to_string(&program.telemetry_file_path)?;
        Some(wrapper.format.parse(&report)?)
    } else {
        log_stderr_head(&program.error_file_path);
        None
    };

    Ok(ExecutionRecord {
        exit_state: raw.exit_state,
        telemetry,
        real_time_cost: raw.real_time_cost,
        stdout,
    })
}

fn log_stderr_head(path: &Path) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    match fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            let head: Vec<&str> = text.lines().take(10).collect();
            log::debug!("Program stderr:\n{}", head.join("\n"));
        }
        Err(e) => log::debug!("No stderr captured: {}", e),
    }
}
