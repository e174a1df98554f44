use std::{path::Path, str::FromStr};

use serde_derive::Serialize;

use crate::error::{telemetry_error, JudgeCoreError};

/// Resource usage of one wrapped run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Telemetry {
    pub elapsed_secs: f64,
    pub peak_memory_mb: f64,
}

/// Which text layout the timing wrapper writes into its side file.
///
/// Chosen by configuration, never guessed from the text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TelemetryFormat {
    /// GNU time's default report, e.g.
    /// `0.01user 0.00system 0:00.02elapsed 90%CPU (0avgtext+0avgdata 3456maxresident)k`
    GnuTime,
    /// A single `"<seconds> <kilobytes>"` line, as produced by `time -f "%e %M"`.
    Plain,
}

impl FromStr for TelemetryFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gnu" | "gnu-time" => Ok(Self::GnuTime),
            "plain" => Ok(Self::Plain),
            _ => Err(anyhow::anyhow!("Telemetry format not found: {}", s)),
        }
    }
}

const KILOBYTES_PER_MEGABYTE: f64 = 1000.0;

impl TelemetryFormat {
    /// Arguments for GNU time that make it emit this format into `telemetry_path`.
    pub fn wrapper_args(&self, telemetry_path: &Path) -> Vec<String> {
        let output = telemetry_path.to_string_lossy().into_owned();
        match self {
            Self::GnuTime => vec!["-o".to_string(), output],
            Self::Plain => vec![
                "-f".to_string(),
                "%e %M".to_string(),
                "-o".to_string(),
                output,
            ],
        }
    }

    pub fn parse(&self, raw: &str) -> Result<Telemetry, JudgeCoreError> {
        match self {
            Self::GnuTime => parse_gnu_time(raw),
            Self::Plain => parse_plain(raw),
        }
    }
}

fn parse_gnu_time(raw: &str) -> Result<Telemetry, JudgeCoreError> {
    // GNU time may print "Command exited with ..." before the report line
    let line = raw
        .lines()
        .find(|line| line.contains("avgdata"))
        .ok_or_else(|| telemetry_error(format!("no avgdata field in {:?}", raw)))?;

    let clock = line
        .split_whitespace()
        .find_map(|token| token.strip_suffix("elapsed"))
        .ok_or_else(|| telemetry_error(format!("no elapsed field in {:?}", line)))?;
    let elapsed_secs = parse_clock(clock)?;

    let after = match line.split_once("avgdata") {
        Some((_, after)) => after.trim_start(),
        None => return Err(telemetry_error(format!("no avgdata field in {:?}", line))),
    };
    let digits_end = after
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after.len());
    let kilobytes = parse_number(&after[..digits_end], "avgdata")?;

    Ok(Telemetry {
        elapsed_secs,
        peak_memory_mb: kilobytes / KILOBYTES_PER_MEGABYTE,
    })
}

/// `[h:]m:ss.ss` into seconds.
fn parse_clock(clock: &str) -> Result<f64, JudgeCoreError> {
    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() > 3 {
        return Err(telemetry_error(format!("bad elapsed clock {:?}", clock)));
    }
    parts.iter().try_fold(0.0, |acc, part| {
        Ok(acc * 60.0 + parse_number(part, "elapsed")?)
    })
}

fn parse_plain(raw: &str) -> Result<Telemetry, JudgeCoreError> {
    let line = raw
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| telemetry_error("telemetry is empty"))?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 2 {
        return Err(telemetry_error(format!(
            "expected \"<seconds> <kilobytes>\", got {:?}",
            line
        )));
    }
    Ok(Telemetry {
        elapsed_secs: parse_number(fields[0], "seconds")?,
        peak_memory_mb: parse_number(fields[1], "kilobytes")? / KILOBYTES_PER_MEGABYTE,
    })
}

fn parse_number(field: &str, name: &str) -> Result<f64, JudgeCoreError> {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(telemetry_error(format!(
            "{} field is not a number: {:?}",
            name, field
        ))),
    }
}
