mod option;
mod report;

use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use judge_core::{
    judge::suite::{run_suite, SuiteOutcome},
    run::process::SystemCommandRunner,
};

fn main() -> ExitCode {
    let opt = option::load_option();
    match run(&opt) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("{}: {:#}", "Error".bright_red(), e);
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when the submission did not compile.
fn run(opt: &option::JudgeOpt) -> anyhow::Result<bool> {
    let config = opt.suite_config()?;
    let json = opt.json;

    let outcome = run_suite(
        &config,
        &SystemCommandRunner,
        |compilation| {
            if !json {
                report::print_compilation(compilation)
            }
        },
        |test_report| {
            if !json {
                report::print_report(test_report)
            }
        },
    )
    .with_context(|| format!("Failed to judge {:?}", config.src_path))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if let SuiteOutcome::Finished { reports, .. } = &outcome {
        report::print_summary(outcome.passed(), reports.len());
    }
    Ok(matches!(outcome, SuiteOutcome::Finished { .. }))
}
