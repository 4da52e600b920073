//! Text formatting for test case reports.
//!
//! All functions take an explicit `NaiveDateTime` so the output does not
//! depend on the current time or locale.

use chrono::NaiveDateTime;

pub const STEP_SEPARATOR: &str = " -> ";
pub const ABORTED_LINE: &str = "Test case aborted!";

/// `yyyyMMddHHmm`, used in report file names
pub fn file_stamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y%m%d%H%M").to_string()
}

/// `yyyy.MM.dd HH:mm`, used in the report header
pub fn header_date(dt: &NaiveDateTime) -> String {
    dt.format("%Y.%m.%d %H:%M").to_string()
}

/// `<name>_<yyyyMMddHHmm>.txt`
pub fn report_file_name(test_name: &str, dt: &NaiveDateTime) -> String {
    format!("{}_{}.txt", test_name, file_stamp(dt))
}

pub fn steps_line<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(STEP_SEPARATOR)
}

/// The header block, including its trailing blank line
pub fn header<S: AsRef<str>>(test_name: &str, dt: &NaiveDateTime, steps: &[S]) -> String {
    format!(
        "Test: {}\ndate: {}\nsteps: {}\n\n",
        test_name,
        header_date(dt),
        steps_line(steps)
    )
}

pub fn begin_step_line(name: &str) -> String {
    format!("  begin step: {}", name)
}

pub fn end_step_line(name: &str) -> String {
    format!("  end step: {}", name)
}
