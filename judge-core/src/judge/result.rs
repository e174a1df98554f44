use std::fmt;

use serde_derive::Serialize;

use super::ResourceLimits;
use crate::error::{telemetry_error, JudgeCoreError};
use crate::run::{ExecutionRecord, ExitState};
use crate::utils::{compare_lines, split_lines};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JudgeVerdict {
    #[serde(rename = "AC")]
    Accepted,
    #[serde(rename = "WA")]
    WrongAnswer,
    #[serde(rename = "TLE")]
    TimeLimitExceeded,
    #[serde(rename = "MLE")]
    MemoryLimitExceeded,
    #[serde(rename = "RE")]
    RuntimeError,
}

impl JudgeVerdict {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Accepted => "AC",
            Self::WrongAnswer => "WA",
            Self::TimeLimitExceeded => "TLE",
            Self::MemoryLimitExceeded => "MLE",
            Self::RuntimeError => "RE",
        }
    }

    pub fn is_accepted(&self) -> bool {
        *self == Self::Accepted
    }
}

impl fmt::Display for JudgeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgeResultInfo {
    pub verdict: JudgeVerdict,
    pub exit_code: Option<i32>,
    pub time_usage_ms: Option<f64>,
    pub memory_usage_mb: Option<f64>,
}

/// Decide the verdict of one run. First matching rule wins:
///
/// 1. killed by the judge's wall-clock bound: TLE
/// 2. non-zero exit or signal: RE, telemetry is not consulted
/// 3. elapsed time over the limit: TLE
/// 4. peak memory over the limit: MLE
/// 5. normalized outputs differ: WA
/// 6. AC
pub fn check_result<S: AsRef<[u8]>>(
    record: &ExecutionRecord,
    limits: &ResourceLimits,
    expected: &[S],
) -> Result<JudgeResultInfo, JudgeCoreError> {
    let exit_code = record.exit_code();
    let metrics = |verdict| JudgeResultInfo {
        verdict,
        exit_code,
        time_usage_ms: record.telemetry.map(|t| t.elapsed_secs * 1000.0),
        memory_usage_mb: record.telemetry.map(|t| t.peak_memory_mb),
    };

    match record.exit_state {
        ExitState::TimedOut => return Ok(metrics(JudgeVerdict::TimeLimitExceeded)),
        state if !state.success() => {
            log::debug!("User program exit state: {:?}", state);
            return Ok(metrics(JudgeVerdict::RuntimeError));
        }
        _ => {}
    }

    let telemetry = record
        .telemetry
        .ok_or_else(|| telemetry_error("clean exit without telemetry"))?;
    if telemetry.elapsed_secs > limits.time_limit_secs {
        return Ok(metrics(JudgeVerdict::TimeLimitExceeded));
    }
    if telemetry.peak_memory_mb > limits.memory_limit_mb {
        return Ok(metrics(JudgeVerdict::MemoryLimitExceeded));
    }

    let actual = split_lines(&record.stdout);
    if compare_lines(expected, actual.as_slice()) {
        Ok(metrics(JudgeVerdict::Accepted))
    } else {
        Ok(metrics(JudgeVerdict::WrongAnswer))
    }
}
