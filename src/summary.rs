//! Report discovery and the overall counters.
//!
//! The counters trust what each report declares on its root element; the
//! per-test rows come from the streaming parser and are never cross-checked
//! against them.

use crate::model::TestSuite;
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// File naming convention of the reports, `<prefix><TestClassName><suffix>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportNaming {
    pub prefix: String,
    pub suffix: String,
}

impl Default for ReportNaming {
    fn default() -> Self {
        ReportNaming {
            prefix: String::from("TEST-"),
            suffix: String::from(".xml"),
        }
    }
}

impl ReportNaming {
    /// Test class encoded in `file_name`, if it follows the convention.
    pub fn test_class(&self, file_name: &str) -> Option<String> {
        file_name
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_suffix(self.suffix.as_str()))
            .filter(|class| !class.is_empty())
            .map(str::to_string)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportFile {
    pub path: PathBuf,
    pub test_class: String,
}

/// List the reports directly inside `dir`, sorted by file name.
///
/// Input problems never abort the run: a directory that is missing or cannot
/// be listed logs a warning and yields nothing, and an unreadable entry is
/// skipped.
pub fn discover(dir: &Path, naming: &ReportNaming) -> Vec<ReportFile> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!("Report directory {} does not exist", dir.display());
            return vec![];
        }
        Err(err) => {
            warn!("Unable to list report directory {}: {}", dir.display(), err);
            return vec![];
        }
    };

    let mut reports = vec![];
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping an entry of {}: {}", dir.display(), err);
                continue;
            }
        };
        if !entry.file_type().map(|kind| kind.is_file()).unwrap_or(false) {
            continue;
        }
        let file_name = entry.file_name();
        let test_class = match file_name.to_str().and_then(|name| naming.test_class(name)) {
            Some(class) => class,
            None => {
                debug!("Ignoring {:?}", file_name);
                continue;
            }
        };
        reports.push(ReportFile {
            path: entry.path(),
            test_class,
        });
    }
    reports.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    reports
}

/// Totals declared on the root element of `path`.
///
/// An unreadable report counts as all zeros after a warning.
pub fn read_declared_totals(path: &Path) -> TestSuite {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!("Unable to open {}: {}", path.display(), err);
            return TestSuite::default();
        }
    };
    let parsed: Result<TestSuite, String> = yaserde::de::from_reader(BufReader::new(file));
    match parsed {
        Ok(suite) => {
            debug!(
                "{}: suite '{}' declares {} tests",
                path.display(),
                suite.name,
                suite.tests
            );
            suite
        }
        Err(msg) => {
            warn!("Unable to read totals from {}: {}", path.display(), msg);
            TestSuite::default()
        }
    }
}

/// Overall counters of one aggregation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total: u64,
    pub passed: i64,
    pub failed: u64,
    pub errors: u64,
    pub skipped: u64,
}

impl ReportSummary {
    pub fn from_suites<'a, I>(suites: I) -> Self
    where
        I: IntoIterator<Item = &'a TestSuite>,
    {
        let (total, failed, errors, skipped) = suites.into_iter().fold(
            (0u64, 0u64, 0u64, 0u64),
            |(total, failed, errors, skipped), suite| {
                (
                    total + u64::from(suite.tests),
                    failed + u64::from(suite.failures),
                    errors + u64::from(suite.errors),
                    skipped + u64::from(suite.skipped),
                )
            },
        );
        let passed = total as i64 - failed as i64 - errors as i64 - skipped as i64;
        ReportSummary {
            total,
            passed,
            failed,
            errors,
            skipped,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.errors > 0
    }
}
