//! Self-contained interactive HTML report.
//!
//! The document is written in three passes: the header template with the run
//! metadata, one table row per test case, and the footer template carrying
//! the summary tiles and the bundled client script.

use crate::model::TestCaseResult;
use crate::summary::ReportSummary;
use std::io::{self, Write};

const HEADER_TEMPLATE: &str = include_str!("assets/header.html");
const FOOTER_TEMPLATE: &str = include_str!("assets/footer.html");
pub const CLIENT_SCRIPT: &str = include_str!("assets/report.js");

/// Metadata shown at the top of the report.
#[derive(Clone, Debug)]
pub struct RunInfo {
    pub generated_at: String,
    pub repo_type: String,
}

/// Escape text for HTML element content. Quotes are left alone.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn format_row(case: &TestCaseResult) -> String {
    format!(
        "<tr class=\"{outcome}\"><td>{class}</td><td>{method}</td><td class=\"outcome\">{outcome}</td><td class=\"reason\">{reason}</td></tr>",
        outcome = case.outcome,
        class = escape(&case.test_class),
        method = escape(&case.test_method),
        reason = escape(&case.reason),
    )
}

fn render_header(info: &RunInfo) -> String {
    HEADER_TEMPLATE
        .replace("{{generated_at}}", &escape(&info.generated_at))
        .replace("{{repo_type}}", &escape(&info.repo_type))
}

fn render_footer(summary: &ReportSummary) -> String {
    FOOTER_TEMPLATE
        .replace("{{total}}", &summary.total.to_string())
        .replace("{{passed}}", &summary.passed.to_string())
        .replace("{{failed}}", &summary.failed.to_string())
        .replace("{{errors}}", &summary.errors.to_string())
        .replace("{{skipped}}", &summary.skipped.to_string())
}

/// Streams the report to `W`. The header goes out on construction.
pub struct HtmlReport<W: Write> {
    writer: W,
}

impl<W: Write> HtmlReport<W> {
    pub fn new(mut writer: W, info: &RunInfo) -> io::Result<Self> {
        writer.write_all(render_header(info).as_bytes())?;
        Ok(HtmlReport { writer })
    }

    pub fn row(&mut self, case: &TestCaseResult) -> io::Result<()> {
        writeln!(self.writer, "{}", format_row(case))
    }

    pub fn finish(mut self, summary: &ReportSummary) -> io::Result<W> {
        self.writer.write_all(render_footer(summary).as_bytes())?;
        writeln!(self.writer, "<script>\n{CLIENT_SCRIPT}</script>\n</body>\n</html>")?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
