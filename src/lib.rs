pub mod parser;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use parser::{Step, Steps, TestCase};
pub use report::{ReportError, TestCaseReport};
pub use runner::{run_file, run_test_case, FileRun, RunOutcome, StepExecutor};
