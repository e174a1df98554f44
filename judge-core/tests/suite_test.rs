use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;
use std::time::Duration;

use judge_core::{
    compiler::Compiler,
    error::JudgeCoreError,
    judge::{
        result::JudgeVerdict,
        suite::{run_suite, SuiteOutcome},
        ResourceLimits, SuiteConfig,
    },
    run::{
        telemetry::TelemetryFormat, CommandRunner, CommandSpec, ExitState, RawRunResult,
        WrapperConfig,
    },
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Stands in for both g++ and GNU time.
///
/// The compiler fails when the source mentions `syntax error`. A test input
/// names the behaviour of the wrapped program: `ac`, `wa`, `tle`, `mle`, `re`
/// or `hang`.
#[derive(Default)]
struct ScriptedRunner {
    compilations: Cell<usize>,
    executions: Cell<usize>,
    inputs: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    fn compile(&self, spec: &CommandSpec) -> Result<RawRunResult, JudgeCoreError> {
        self.compilations.set(self.compilations.get() + 1);
        let src = &spec.args[spec.args.len() - 3];
        let target = &spec.args[spec.args.len() - 1];
        let log = spec.stdout_path.as_ref().unwrap();
        let code = if fs::read_to_string(src)?.contains("syntax error") {
            fs::write(log, "main.cpp:3:5: error: expected ';' before '}' token\n")?;
            1
        } else {
            fs::write(log, "")?;
            fs::write(target, "#!binary")?;
            0
        };
        Ok(RawRunResult {
            exit_state: ExitState::Exited(code),
            real_time_cost: Duration::from_millis(20),
        })
    }

    fn execute(&self, spec: &CommandSpec) -> Result<RawRunResult, JudgeCoreError> {
        self.executions.set(self.executions.get() + 1);
        assert_eq!(spec.args[0], "-o");
        let telemetry_path = &spec.args[1];
        let input = fs::read_to_string(spec.stdin_path.as_ref().unwrap())?;
        let scenario = input.trim().to_string();
        self.inputs.borrow_mut().push(scenario.clone());

        let (stdout, clock, kilobytes, exit_state) = match scenario.as_str() {
            "ac" => ("42\n\n", "0:00.10", 2048, ExitState::Exited(0)),
            "wa" => ("41\n", "0:00.10", 2048, ExitState::Exited(0)),
            "tle" => ("42\n", "0:03.00", 2048, ExitState::Exited(0)),
            "mle" => ("42\n", "0:00.20", 300000, ExitState::Exited(0)),
            "re" => ("42\n", "0:00.01", 1024, ExitState::Exited(139)),
            "hang" => ("", "", 0, ExitState::TimedOut),
            other => panic!("unknown scenario {}", other),
        };
        fs::write(spec.stdout_path.as_ref().unwrap(), stdout)?;
        if exit_state == ExitState::Exited(0) {
            fs::write(
                telemetry_path,
                format!(
                    "0.05user 0.01system {}elapsed 95%CPU (0avgtext+0avgdata {}maxresident)k\n",
                    clock, kilobytes
                ),
            )?;
        }
        Ok(RawRunResult {
            exit_state,
            real_time_cost: Duration::from_millis(100),
        })
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<RawRunResult, JudgeCoreError> {
        if spec.program == Path::new("g++") {
            self.compile(spec)
        } else {
            self.execute(spec)
        }
    }
}

struct Fixture {
    root: tempfile::TempDir,
}

impl Fixture {
    fn new(source: &str, scenarios: &[&str]) -> Self {
        let root = tempfile::tempdir().unwrap();
        let testdata = root.path().join("test_cases");
        fs::create_dir(&testdata).unwrap();
        for (i, scenario) in scenarios.iter().enumerate() {
            fs::write(testdata.join(format!("{}.in", i + 1)), scenario).unwrap();
            fs::write(testdata.join(format!("{}.out", i + 1)), "42\n").unwrap();
        }
        fs::write(root.path().join("main.cpp"), source).unwrap();
        fs::create_dir(root.path().join("work")).unwrap();
        Self { root }
    }

    fn config(&self) -> SuiteConfig {
        SuiteConfig {
            limits: ResourceLimits::new(2.0, 256.0).unwrap(),
            testdata_path: self.root.path().join("test_cases"),
            src_path: self.root.path().join("main.cpp"),
            compiler: Compiler::new("g++", "-std=c++17 -O2"),
            wrapper: WrapperConfig::new("/usr/bin/time", TelemetryFormat::GnuTime),
            work_dir: Some(self.root.path().join("work")),
        }
    }

    fn work_dir_is_empty(&self) -> bool {
        fs::read_dir(self.root.path().join("work"))
            .unwrap()
            .next()
            .is_none()
    }
}

#[test]
fn test_every_verdict_in_order() {
    init();
    let fixture = Fixture::new("int main() {}", &["ac", "wa", "tle", "mle", "re", "hang"]);
    let runner = ScriptedRunner::default();
    let mut live = vec![];

    let outcome = run_suite(&fixture.config(), &runner, |_| {}, |report| {
        live.push(report.index)
    })
    .unwrap();

    let verdicts: Vec<JudgeVerdict> = outcome.reports().iter().map(|r| r.verdict()).collect();
    assert_eq!(
        verdicts,
        vec![
            JudgeVerdict::Accepted,
            JudgeVerdict::WrongAnswer,
            JudgeVerdict::TimeLimitExceeded,
            JudgeVerdict::MemoryLimitExceeded,
            JudgeVerdict::RuntimeError,
            JudgeVerdict::TimeLimitExceeded,
        ]
    );
    assert_eq!(live, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(outcome.passed(), 1);
    assert_eq!(runner.compilations.get(), 1);
    assert_eq!(runner.executions.get(), 6);

    let accepted = &outcome.reports()[0].result;
    assert_eq!(accepted.time_usage_ms, Some(100.0));
    assert_eq!(accepted.memory_usage_mb, Some(2.048));
    let crashed = &outcome.reports()[4].result;
    assert_eq!(crashed.exit_code, Some(139));
    assert_eq!(crashed.time_usage_ms, None);

    assert!(fixture.work_dir_is_empty());
}

#[test]
fn test_ascending_numeric_order() {
    init();
    let scenarios: Vec<&str> = (0..12).map(|i| if i == 9 { "wa" } else { "ac" }).collect();
    let fixture = Fixture::new("int main() {}", &scenarios);
    let runner = ScriptedRunner::default();

    let outcome = run_suite(&fixture.config(), &runner, |_| {}, |_| {}).unwrap();
    let indices: Vec<u32> = outcome.reports().iter().map(|r| r.index).collect();
    assert_eq!(indices, (1..=12).collect::<Vec<u32>>());
    assert_eq!(outcome.reports()[9].verdict(), JudgeVerdict::WrongAnswer);
    assert_eq!(runner.inputs.borrow().len(), 12);
}

#[test]
fn test_compilation_failure_runs_nothing() {
    init();
    let fixture = Fixture::new("int main() { syntax error }", &["ac", "ac"]);
    let runner = ScriptedRunner::default();
    let mut compiled = None;

    let outcome = run_suite(
        &fixture.config(),
        &runner,
        |compilation| compiled = Some(compilation.clone()),
        |_| panic!("no test case may run"),
    )
    .unwrap();

    match &outcome {
        SuiteOutcome::CompilationFailed { compilation } => {
            assert!(!compilation.success);
            assert!(compilation.diagnostics.contains("expected ';'"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(compiled.map(|c| c.success), Some(false));
    assert_eq!(runner.executions.get(), 0);
    assert!(outcome.reports().is_empty());
    assert!(fixture.work_dir_is_empty());
}

#[test]
fn test_missing_submission_is_reported_before_compiling() {
    init();
    let fixture = Fixture::new("int main() {}", &["ac"]);
    let mut config = fixture.config();
    config.src_path = fixture.root.path().join("absent.cpp");
    let runner = ScriptedRunner::default();

    let result = run_suite(&config, &runner, |_| {}, |_| {});
    assert!(matches!(result, Err(JudgeCoreError::PathNotExist(_))));
    assert_eq!(runner.compilations.get(), 0);
}

#[test]
fn test_malformed_testdata_aborts() {
    init();
    let fixture = Fixture::new("int main() {}", &["ac"]);
    fs::write(fixture.root.path().join("test_cases/2.in"), "ac").unwrap();
    let runner = ScriptedRunner::default();

    let result = run_suite(&fixture.config(), &runner, |_| {}, |_| {});
    assert!(matches!(result, Err(JudgeCoreError::TestdataError(_))));
    assert_eq!(runner.compilations.get(), 0);
}

#[test]
fn test_unparsable_telemetry_is_not_a_verdict() {
    init();

    struct SilentWrapper(ScriptedRunner);

    impl CommandRunner for SilentWrapper {
        fn run(&self, spec: &CommandSpec) -> Result<RawRunResult, JudgeCoreError> {
            if spec.program == Path::new("g++") {
                return self.0.compile(spec);
            }
            fs::write(spec.stdout_path.as_ref().unwrap(), "42\n")?;
            Ok(RawRunResult {
                exit_state: ExitState::Exited(0),
                real_time_cost: Duration::from_millis(1),
            })
        }
    }

    let fixture = Fixture::new("int main() {}", &["ac"]);
    let runner = SilentWrapper(ScriptedRunner::default());
    let result = run_suite(&fixture.config(), &runner, |_| {}, |_| {});
    assert!(matches!(result, Err(JudgeCoreError::TelemetryError(_))));
    assert!(fixture.work_dir_is_empty());
}
