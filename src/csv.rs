//! CSV table of test case results.

use crate::model::TestCaseResult;
use std::io::{self, Write};

pub const HEADER: &str = "Test Class,Test Method,Result,Failure Reason";

/// Quote a field unconditionally, doubling embedded quotes.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn format_row(case: &TestCaseResult) -> String {
    [
        case.test_class.as_str(),
        case.test_method.as_str(),
        case.outcome.as_str(),
        case.reason.as_str(),
    ]
    .iter()
    .map(|field| quote(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Streams rows to `W`, header first.
pub struct CsvReport<W: Write> {
    writer: W,
    rows: usize,
}

impl<W: Write> CsvReport<W> {
    pub fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "{HEADER}")?;
        Ok(CsvReport { writer, rows: 0 })
    }

    pub fn row(&mut self, case: &TestCaseResult) -> io::Result<()> {
        writeln!(self.writer, "{}", format_row(case))?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and hand back the writer along with the number of rows written.
    pub fn finish(mut self) -> io::Result<(W, usize)> {
        self.writer.flush()?;
        Ok((self.writer, self.rows))
    }
}
