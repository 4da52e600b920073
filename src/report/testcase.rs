use super::error::ReportError;
use super::format;
use crate::parser::types::TestCase;
use crate::utils::clock::{Clock, LocalClock};
use crate::utils::config::ConfigProvider;
use crate::utils::filesystem::FileSystemProvider;
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes a plain-text report of one test case run.
///
/// A report is opened with [`begin_report`](Self::begin_report), receives
/// step markers, and is closed with [`end_report`](Self::end_report). Step
/// and end calls made while no report is open are ignored.
pub struct TestCaseReport {
    config: Box<dyn ConfigProvider>,
    fs: Box<dyn FileSystemProvider>,
    clock: Box<dyn Clock>,
    session: Option<ReportSession>,
    last_path: Option<PathBuf>,
}

struct ReportSession {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ReportSession {
    fn write_line(&mut self, line: &str, flush: bool) {
        let result = writeln!(self.writer, "{}", line).and_then(|_| {
            if flush {
                self.writer.flush()
            } else {
                Ok(())
            }
        });
        if let Err(e) = result {
            log::warn!("Failed to write to report {}: {}", self.path.display(), e);
        }
    }

    fn close(mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("Failed to flush report {}: {}", self.path.display(), e);
        }
        log::debug!("Closed report {}", self.path.display());
    }
}

impl TestCaseReport {
    pub fn new(config: Box<dyn ConfigProvider>, fs: Box<dyn FileSystemProvider>) -> Self {
        Self::with_clock(config, fs, Box::new(LocalClock))
    }

    pub fn with_clock(
        config: Box<dyn ConfigProvider>,
        fs: Box<dyn FileSystemProvider>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            config,
            fs,
            clock,
            session: None,
            last_path: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Path of the report currently being written
    pub fn report_path(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.path.as_path())
    }

    /// Path of the most recently opened report, kept after it is ended
    pub fn last_report_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }

    /// Open `<reportsPath>/<name>_<yyyyMMddHHmm>.txt` and write the header.
    ///
    /// A report left open by a previous run is closed first. On error no
    /// report is open.
    pub fn begin_report(&mut self, test_case: &TestCase) -> Result<(), ReportError> {
        if let Some(stale) = self.session.take() {
            log::warn!(
                "Report {} was not ended, closing it before starting {}",
                stale.path.display(),
                test_case.name()
            );
            stale.close();
        }

        let reports_path = self.config.reports_path();
        self.fs.make_path(&reports_path)?;

        let now = self.clock.now();
        let path = report_file_path(&reports_path, test_case.name(), &now);

        let file = File::create(&path).map_err(|source| ReportError::Open {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        let header = format::header(test_case.name(), &now, &test_case.steps().names());
        writer
            .write_all(header.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|source| ReportError::Write {
                path: path.clone(),
                source,
            })?;

        log::info!("Writing report for {} to {}", test_case.name(), path.display());
        self.last_path = Some(path.clone());
        self.session = Some(ReportSession { path, writer });
        Ok(())
    }

    /// Close the open report, marking it aborted if requested
    pub fn end_report(&mut self, aborted: bool) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        if aborted {
            session.write_line(format::ABORTED_LINE, false);
        }
        session.close();
    }

    /// Flushed immediately so the line survives a crash inside the step
    pub fn begin_step(&mut self, name: &str) {
        if let Some(session) = self.session.as_mut() {
            log::debug!("begin step: {}", name);
            session.write_line(&format::begin_step_line(name), true);
        }
    }

    pub fn end_step(&mut self, name: &str) {
        if let Some(session) = self.session.as_mut() {
            log::debug!("end step: {}", name);
            session.write_line(&format::end_step_line(name), false);
        }
    }
}

/// `<reports_path>/<name>_<stamp>.txt`, appended as text so a rooted name
/// still resolves inside `reports_path`
fn report_file_path(reports_path: &Path, test_name: &str, now: &NaiveDateTime) -> PathBuf {
    let mut path = reports_path.as_os_str().to_os_string();
    path.push("/");
    path.push(format::report_file_name(test_name, now));
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::Step;
    use crate::utils::clock::FixedClock;
    use crate::utils::config::Config;
    use crate::utils::filesystem::{FileSystemError, LocalFileSystem};
    use chrono::NaiveDate;

    fn sample_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 0)
            .unwrap()
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("autobot-report-{}", uuid::Uuid::new_v4()))
    }

    fn reporter(dir: &Path) -> TestCaseReport {
        TestCaseReport::with_clock(
            Box::new(Config {
                reports_path: dir.to_path_buf(),
            }),
            Box::new(LocalFileSystem),
            Box::new(FixedClock(sample_time())),
        )
    }

    fn foo_case() -> TestCase {
        TestCase::new("Foo", vec![Step::new("A"), Step::new("B")])
    }

    struct DeniedFileSystem;

    impl FileSystemProvider for DeniedFileSystem {
        fn make_path(&self, path: &Path) -> Result<(), FileSystemError> {
            Err(FileSystemError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
    }

    #[test]
    fn test_full_report() {
        let dir = scratch_dir().join("nested");
        let mut report = reporter(&dir);

        report.begin_report(&foo_case()).unwrap();
        let path = dir.join("Foo_202401020304.txt");
        assert!(report.is_open());
        assert_eq!(report.report_path(), Some(path.as_path()));

        report.begin_step("A");
        report.end_step("A");
        report.begin_step("B");
        report.end_step("B");
        report.end_report(false);
        assert!(!report.is_open());
        assert_eq!(report.last_report_path(), Some(path.as_path()));

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Test: Foo\n\
             date: 2024.01.02 03:04\n\
             steps: A -> B\n\
             \n  begin step: A\n  end step: A\n  begin step: B\n  end step: B\n"
        );

        std::fs::remove_dir_all(dir.parent().unwrap()).ok();
    }

    #[test]
    fn test_header_only_when_ended_immediately() {
        let dir = scratch_dir();
        let mut report = reporter(&dir);

        report.begin_report(&foo_case()).unwrap();
        report.end_report(false);

        let content = std::fs::read_to_string(dir.join("Foo_202401020304.txt")).unwrap();
        assert_eq!(content, "Test: Foo\ndate: 2024.01.02 03:04\nsteps: A -> B\n\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_aborted_report_has_single_abort_line() {
        let dir = scratch_dir();
        let mut report = reporter(&dir);

        report.begin_report(&foo_case()).unwrap();
        report.begin_step("A");
        report.end_report(true);
        report.end_report(true);

        let content = std::fs::read_to_string(dir.join("Foo_202401020304.txt")).unwrap();
        assert!(content.ends_with("  begin step: A\nTest case aborted!\n"));
        assert_eq!(content.matches("Test case aborted!").count(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_steps_ignored_while_closed() {
        let dir = scratch_dir();
        let mut report = reporter(&dir);

        report.begin_step("early");
        report.end_step("early");
        report.end_report(true);
        assert!(!dir.exists());

        report.begin_report(&foo_case()).unwrap();
        report.end_report(false);
        report.begin_step("late");
        report.end_step("late");

        let content = std::fs::read_to_string(dir.join("Foo_202401020304.txt")).unwrap();
        assert!(!content.contains("early"));
        assert!(!content.contains("late"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_second_begin_closes_first_report() {
        let dir = scratch_dir();
        let mut report = reporter(&dir);

        report.begin_report(&foo_case()).unwrap();
        report.begin_step("A");
        report.end_step("A");

        let bar = TestCase::new("Bar", vec![Step::new("X")]);
        report.begin_report(&bar).unwrap();
        assert_eq!(
            report.report_path(),
            Some(dir.join("Bar_202401020304.txt").as_path())
        );
        report.end_report(false);

        let first = std::fs::read_to_string(dir.join("Foo_202401020304.txt")).unwrap();
        assert!(first.ends_with("  begin step: A\n  end step: A\n"));
        assert!(!first.contains("aborted"));

        let second = std::fs::read_to_string(dir.join("Bar_202401020304.txt")).unwrap();
        assert!(second.starts_with("Test: Bar\n"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_reopen_after_end() {
        let dir = scratch_dir();
        let mut report = reporter(&dir);

        report.begin_report(&foo_case()).unwrap();
        report.end_report(false);
        report.begin_report(&foo_case()).unwrap();
        report.begin_step("again");
        report.end_report(false);

        let content = std::fs::read_to_string(dir.join("Foo_202401020304.txt")).unwrap();
        assert_eq!(content.matches("Test: Foo").count(), 1);
        assert!(content.contains("  begin step: again\n"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_directory_error_is_propagated() {
        let dir = scratch_dir();
        let mut report = TestCaseReport::with_clock(
            Box::new(Config {
                reports_path: dir.clone(),
            }),
            Box::new(DeniedFileSystem),
            Box::new(FixedClock(sample_time())),
        );

        let err = report.begin_report(&foo_case()).unwrap_err();
        assert!(matches!(
            err,
            ReportError::FileSystem(FileSystemError::PermissionDenied { ref path }) if *path == dir
        ));
        assert!(!report.is_open());
        assert!(!dir.exists());
    }

    #[test]
    fn test_open_error() {
        let dir = scratch_dir();
        let mut report = reporter(&dir);

        let case = TestCase::new("missing/Foo", vec![]);
        let err = report.begin_report(&case).unwrap_err();
        assert!(matches!(err, ReportError::Open { .. }));
        assert!(!report.is_open());

        report.begin_step("A");
        assert!(!dir.join("missing").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_rooted_name_stays_in_reports_dir() {
        let dir = scratch_dir();
        let mut report = reporter(&dir);

        let outside =
            std::env::temp_dir().join(format!("autobot-outside-{}", uuid::Uuid::new_v4()));
        let name = outside.to_string_lossy().to_string();
        let err = report.begin_report(&TestCase::new(&name, vec![])).unwrap_err();

        match err {
            ReportError::Open { ref path, .. } => assert!(path.starts_with(&dir)),
            other => panic!("unexpected error: {}", other),
        }
        assert!(!report.is_open());
        assert!(!PathBuf::from(format!("{}_202401020304.txt", name)).exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_begin_step_is_flushed_before_end_report() {
        let dir = scratch_dir();
        let mut report = reporter(&dir);
        let path = dir.join("Foo_202401020304.txt");

        report.begin_report(&foo_case()).unwrap();
        report.begin_step("A");
        let after_begin = std::fs::read_to_string(&path).unwrap();
        assert!(after_begin.ends_with("\n  begin step: A\n"));

        report.end_step("A");
        let after_end = std::fs::read_to_string(&path).unwrap();
        assert_eq!(after_end, after_begin);

        report.end_report(false);
        let closed = std::fs::read_to_string(&path).unwrap();
        assert!(closed.ends_with("  begin step: A\n  end step: A\n"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_step_list() {
        let dir = scratch_dir();
        let mut report = reporter(&dir);

        report
            .begin_report(&TestCase::new("NoSteps", vec![]))
            .unwrap();
        report.end_report(false);

        let content = std::fs::read_to_string(dir.join("NoSteps_202401020304.txt")).unwrap();
        assert_eq!(content, "Test: NoSteps\ndate: 2024.01.02 03:04\nsteps: \n\n");

        std::fs::remove_dir_all(&dir).ok();
    }
}
