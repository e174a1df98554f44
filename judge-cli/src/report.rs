use colored::Colorize;
use judge_core::{
    compiler::CompilationResult,
    judge::{result::JudgeVerdict, suite::TestReport},
};

pub fn print_compilation(compilation: &CompilationResult) {
    let diagnostics = compilation.diagnostics.trim_end();
    if !diagnostics.is_empty() {
        eprintln!("{}", diagnostics);
    }
    if compilation.success {
        println!("Compilation successful\n");
        println!("Results:");
    } else {
        eprintln!("{}", "Compilation failed".bright_red());
    }
}

pub fn print_report(report: &TestReport) {
    println!("Verdict for test case {}: {}", report.index, format_result(report));
}

pub fn print_summary(passed: usize, total: usize) {
    let line = format!("\n{}/{} test cases passed", passed, total);
    if passed == total {
        println!("{}", line.green());
    } else {
        println!("{}", line.bright_red());
    }
}

fn format_result(report: &TestReport) -> String {
    let verdict = report.verdict();
    let colored = match verdict {
        JudgeVerdict::Accepted => verdict.short_name().bright_green(),
        _ => verdict.short_name().bright_red(),
    };
    match (verdict, metrics(report)) {
        (JudgeVerdict::Accepted | JudgeVerdict::WrongAnswer, Some(metrics)) => {
            format!("{}  \t{}", colored, metrics)
        }
        _ => colored.to_string(),
    }
}

/// `<ms> ms <mb> mb`: time rounded to whole milliseconds (GNU time reports
/// hundredths of a second), memory rounded to one decimal.
fn metrics(report: &TestReport) -> Option<String> {
    let time_ms = report.result.time_usage_ms?;
    let memory_mb = report.result.memory_usage_mb?;
    Some(format!(
        "{:.0} ms {} mb",
        time_ms,
        (memory_mb * 10.0).round() / 10.0
    ))
}
