use std::fs::File;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Instant;

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use wait_timeout::ChildExt;

use super::{CommandRunner, CommandSpec, ExitState, RawRunResult};
use crate::error::JudgeCoreError;

/// Runs commands as real child processes of the judge.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<RawRunResult, JudgeCoreError> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        command.stdin(match &spec.stdin_path {
            Some(path) => Stdio::from(File::open(path)?),
            None => Stdio::null(),
        });
        let stdout = spec.stdout_path.as_deref().map(create_truncated).transpose()?;
        let stderr = match (&spec.stderr_path, &stdout) {
            (Some(path), Some(out)) if Some(path) == spec.stdout_path.as_ref() => {
                Some(out.try_clone()?)
            }
            (Some(path), _) => Some(create_truncated(path)?),
            (None, _) => None,
        };
        command.stdout(stdout.map_or_else(Stdio::null, Stdio::from));
        command.stderr(stderr.map_or_else(Stdio::null, Stdio::from));
        if spec.timeout.is_some() {
            // a wrapper forks the real program, so kill them together
            command.process_group(0);
        }

        let begin_time = Instant::now();
        let mut child = command.spawn().map_err(|source| JudgeCoreError::LaunchError {
            program: spec.program.clone(),
            source,
        })?;
        log::debug!("Spawned {:?} pid={}", spec.program, child.id());

        let status = match spec.timeout {
            Some(timeout) => match child.wait_timeout(timeout)? {
                Some(status) => status,
                None => {
                    log::info!(
                        "Process pid={} exceeded {:?}, killing its group",
                        child.id(),
                        timeout
                    );
                    if let Err(e) = kill_process_group(child.id()) {
                        log::warn!("Failed to kill process group {}: {}", child.id(), e);
                        child.kill()?;
                    }
                    child.wait()?;
                    return Ok(RawRunResult {
                        exit_state: ExitState::TimedOut,
                        real_time_cost: begin_time.elapsed(),
                    });
                }
            },
            None => child.wait()?,
        };

        Ok(RawRunResult {
            exit_state: decode_status(status),
            real_time_cost: begin_time.elapsed(),
        })
    }
}

fn create_truncated(path: &Path) -> std::io::Result<File> {
    File::options()
        .write(true)
        .create(true)
        .truncate(true) // Overwrite the whole content of this file
        .open(path)
}

fn kill_process_group(pid: u32) -> Result<(), JudgeCoreError> {
    killpg(Pid::from_raw(pid as i32), Signal::SIGKILL)?;
    Ok(())
}

fn decode_status(status: ExitStatus) -> ExitState {
    match (status.code(), status.signal()) {
        (Some(code), _) => ExitState::Exited(code),
        (None, Some(signal)) => ExitState::Signaled(signal),
        // neither code nor signal only happens for stopped children
        (None, None) => ExitState::Signaled(0),
    }
}
