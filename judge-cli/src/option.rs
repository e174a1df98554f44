use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use judge_core::{
    compiler::{Compiler, DEFAULT_COMPILER, DEFAULT_COMPILER_FLAGS},
    judge::{ResourceLimits, SuiteConfig},
    run::{telemetry::TelemetryFormat, WrapperConfig},
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "localjudge",
    author,
    version,
    about = "Compile a C++ submission and judge it against local test cases.",
    after_help = "Test data is read from pairs N.in / N.out numbered from 1. \
Every option can also be given through the environment variable shown, \
or in a .env file."
)]
pub struct JudgeOpt {
    /// For loading options from a .env file
    #[arg(long, default_value = ".env")]
    pub env_path: PathBuf,

    /// Execution time limit in seconds
    #[arg(
        short,
        long,
        env = "LOCALJUDGE_TIME_LIMIT",
        default_value = "2",
        value_parser = parse_positive
    )]
    pub time_limit: f64,

    /// Memory limit in megabytes
    #[arg(
        short,
        long,
        env = "LOCALJUDGE_MEMORY_LIMIT",
        default_value = "256",
        value_parser = parse_positive
    )]
    pub memory_limit: f64,

    /// Directory holding N.in / N.out pairs
    #[arg(short = 'd', long, env = "LOCALJUDGE_TEST_DIR", default_value = "test_cases")]
    pub test_dir: PathBuf,

    /// Submission source file
    #[arg(short, long, env = "LOCALJUDGE_SUBMISSION", default_value = "test.cpp")]
    pub submission: PathBuf,

    /// Flags passed to the compiler, separated by whitespace
    #[arg(
        short,
        long,
        env = "LOCALJUDGE_COMPILER_FLAGS",
        default_value = DEFAULT_COMPILER_FLAGS,
        allow_hyphen_values = true
    )]
    pub compiler_flags: String,

    /// Compiler executable
    #[arg(long, env = "LOCALJUDGE_COMPILER", default_value = DEFAULT_COMPILER)]
    pub compiler: PathBuf,

    /// GNU time executable used to measure each run (`gtime` on macOS)
    #[arg(long, env = "LOCALJUDGE_TIME_BIN", default_value = "/usr/bin/time")]
    pub time_bin: PathBuf,

    /// Layout of the timing report: `gnu` (default GNU time report) or `plain` ("<seconds> <kilobytes>")
    #[arg(long, env = "LOCALJUDGE_TELEMETRY_FORMAT", default_value = "gnu")]
    pub telemetry_format: TelemetryFormat,

    /// Where to create the scratch directory, system temp dir by default
    #[arg(long, env = "LOCALJUDGE_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Print the results as JSON instead of colored text
    #[arg(long)]
    pub json: bool,

    /// Show debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_positive(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        Ok(value) => Err(format!("must be a positive number, got {}", value)),
        Err(e) => Err(e.to_string()),
    }
}

impl JudgeOpt {
    pub fn suite_config(&self) -> anyhow::Result<SuiteConfig> {
        Ok(SuiteConfig {
            limits: ResourceLimits::new(self.time_limit, self.memory_limit)?,
            testdata_path: self.test_dir.clone(),
            src_path: self.submission.clone(),
            compiler: Compiler::new(&self.compiler, &self.compiler_flags),
            wrapper: WrapperConfig::new(&self.time_bin, self.telemetry_format),
            work_dir: self.work_dir.clone(),
        })
    }
}

/// Try to load env from a .env file, then parse the command line again so the
/// loaded variables act as defaults.
pub fn load_option() -> JudgeOpt {
    let opt = JudgeOpt::parse();
    if opt.env_path.exists() {
        dotenv::from_path(&opt.env_path).ok();
    } else {
        dotenv::dotenv().ok();
    }

    let opt = JudgeOpt::parse();
    setup_logger(opt.verbose);
    log::debug!("load opt: {:?}", opt);
    opt
}

fn setup_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(level);
    env_logger::Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:5} [{}:{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.file().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                &record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_is_valid() {
        JudgeOpt::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let opt = JudgeOpt::try_parse_from(["localjudge"]).unwrap();
        assert_eq!(opt.time_limit, 2.0);
        assert_eq!(opt.memory_limit, 256.0);
        assert_eq!(opt.test_dir, PathBuf::from("test_cases"));
        assert_eq!(opt.submission, PathBuf::from("test.cpp"));
        assert_eq!(opt.telemetry_format, TelemetryFormat::GnuTime);

        let config = opt.suite_config().unwrap();
        assert_eq!(config.compiler.flags, vec!["-std=c++17", "-O2", "-Wall", "-Wextra"]);
    }

    #[test]
    fn test_flags_starting_with_hyphen() {
        let opt = JudgeOpt::try_parse_from([
            "localjudge",
            "-t",
            "1.5",
            "-c",
            "-O0 -g",
            "--telemetry-format",
            "plain",
        ])
        .unwrap();
        assert_eq!(opt.time_limit, 1.5);
        assert_eq!(opt.compiler_flags, "-O0 -g");
        assert_eq!(opt.telemetry_format, TelemetryFormat::Plain);
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        assert!(JudgeOpt::try_parse_from(["localjudge", "--bogus"]).is_err());
        assert!(JudgeOpt::try_parse_from(["localjudge", "-t"]).is_err());
        assert!(JudgeOpt::try_parse_from(["localjudge", "-t", "0"]).is_err());
        assert!(JudgeOpt::try_parse_from(["localjudge", "-m", "lots"]).is_err());
        assert!(JudgeOpt::try_parse_from(["localjudge", "--telemetry-format", "bsd"]).is_err());
    }
}
