use serde_derive::Serialize;

use super::result::{check_result, JudgeResultInfo, JudgeVerdict};
use super::SuiteConfig;
use crate::compiler::CompilationResult;
use crate::error::{path_not_exist, JudgeCoreError};
use crate::package::load_testdata;
use crate::run::{run_program, CommandRunner};
use crate::utils::read_lines;
use crate::workspace::RuntimeWorkspace;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestReport {
    pub index: u32,
    #[serde(flatten)]
    pub result: JudgeResultInfo,
}

impl TestReport {
    pub fn verdict(&self) -> JudgeVerdict {
        self.result.verdict
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SuiteOutcome {
    CompilationFailed { compilation: CompilationResult },
    Finished {
        compilation: CompilationResult,
        reports: Vec<TestReport>,
    },
}

impl SuiteOutcome {
    pub fn reports(&self) -> &[TestReport] {
        match self {
            Self::CompilationFailed { .. } => &[],
            Self::Finished { reports, .. } => reports,
        }
    }

    pub fn passed(&self) -> usize {
        self.reports()
            .iter()
            .filter(|report| report.verdict().is_accepted())
            .count()
    }
}

/// Compile the submission and judge it against every test case in order.
///
/// `on_compiled` sees the compilation result before any case runs and
/// `on_report` sees each case as soon as its verdict is known. A failing case
/// never stops the suite; only judge-side failures do.
pub fn run_suite<R, C, F>(
    config: &SuiteConfig,
    runner: &R,
    mut on_compiled: C,
    mut on_report: F,
) -> Result<SuiteOutcome, JudgeCoreError>
where
    R: CommandRunner,
    C: FnMut(&CompilationResult),
    F: FnMut(&TestReport),
{
    if !config.src_path.exists() {
        return Err(path_not_exist(&config.src_path));
    }
    let testdata_configs = load_testdata(&config.testdata_path)?;

    let workspace = RuntimeWorkspace::create(config.work_dir.as_deref())?;
    let program = workspace.program_config();

    let compilation = config.compiler.compile(
        runner,
        &config.src_path,
        &program.executable_path,
        &workspace.compile_log_path(),
    )?;
    on_compiled(&compilation);
    if !compilation.success {
        workspace.close();
        return Ok(SuiteOutcome::CompilationFailed { compilation });
    }

    let mut reports = Vec::with_capacity(testdata_configs.len());
    for testdata in &testdata_configs {
        log::debug!("Running test case {}", testdata.index);
        let record = run_program(
            runner,
            &program,
            &config.wrapper,
            &testdata.input_file_path,
            &config.limits,
        )?;
        let expected = read_lines(&testdata.answer_file_path)?;
        let result = check_result(&record, &config.limits, expected.as_slice())?;
        log::info!("Test case {}: {:?}", testdata.index, result);

        let report = TestReport {
            index: testdata.index,
            result,
        };
        on_report(&report);
        reports.push(report);
    }

    workspace.close();
    Ok(SuiteOutcome::Finished {
        compilation,
        reports,
    })
}
