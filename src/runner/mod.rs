pub mod shell;

use crate::parser::types::{Step, TestCase};
use crate::report::TestCaseReport;
use crate::utils::config::Config;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub use shell::ShellStepExecutor;

/// Executes the action behind a single step
pub trait StepExecutor {
    fn execute(&mut self, step: &Step) -> Result<()>;
}

/// How a test case run ended
#[derive(Debug)]
pub enum RunOutcome {
    Passed,
    Aborted { step: String, error: anyhow::Error },
}

impl RunOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, RunOutcome::Passed)
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Passed => 0,
            RunOutcome::Aborted { .. } => 1,
        }
    }
}

/// A test case file run through the shell executor
#[derive(Debug)]
pub struct FileRun {
    pub test_case: TestCase,
    pub outcome: RunOutcome,
    pub report_path: Option<PathBuf>,
}

/// Load the test case at `path` and run it, reporting into `config.reports_path`.
///
/// Step commands run in the directory containing the file.
pub fn run_file(path: &Path, config: Config) -> Result<FileRun> {
    let test_case = crate::parser::yaml::parse_test_file(path)?;

    let working_dir = path.parent().map(|p| p.to_path_buf());
    let mut executor = ShellStepExecutor::new(working_dir);
    let mut report = crate::report::local_report(config);

    let outcome = run_test_case(&test_case, &mut report, &mut executor)?;
    let report_path = report.last_report_path().map(|p| p.to_path_buf());

    Ok(FileRun {
        test_case,
        outcome,
        report_path,
    })
}

/// Run every step of `test_case` in order, recording it in `report`.
///
/// The first failing step aborts the run: its end marker and the abort line
/// are written and the remaining steps are skipped. Only a failure to begin
/// the report is returned as an error.
pub fn run_test_case(
    test_case: &TestCase,
    report: &mut TestCaseReport,
    executor: &mut dyn StepExecutor,
) -> Result<RunOutcome> {
    report.begin_report(test_case)?;

    for step in test_case.steps() {
        report.begin_step(step.name());
        let result = executor.execute(step);
        report.end_step(step.name());

        if let Err(error) = result {
            log::error!("Step '{}' failed: {:#}", step.name(), error);
            report.end_report(true);
            return Ok(RunOutcome::Aborted {
                step: step.name().to_string(),
                error,
            });
        }
    }

    report.end_report(false);
    Ok(RunOutcome::Passed)
}
