pub mod error;
pub mod format;
pub mod testcase;

pub use error::ReportError;
pub use testcase::TestCaseReport;

use crate::utils::config::Config;
use crate::utils::filesystem::LocalFileSystem;

/// Reporter writing to the configured directory on the local disk
pub fn local_report(config: Config) -> TestCaseReport {
    TestCaseReport::new(Box::new(config), Box::new(LocalFileSystem))
}
