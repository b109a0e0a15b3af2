use crate::csv::CsvReport;
use crate::html::{HtmlReport, RunInfo};
use crate::model::TestSuite;
use crate::summary::{ReportNaming, ReportSummary};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{info, warn};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[macro_use]
extern crate yaserde_derive;

mod csv;
mod html;
mod model;
mod parser;
mod summary;

#[derive(StructOpt, Debug)]
#[structopt()]
struct Opt {
    /// Silence all output
    #[structopt(short = "q", long)]
    quiet: bool,

    /// Verbose mode (-v, -vv, -vvv). Warnings are always shown; the levels add informational, debugging, and trace messages.
    #[structopt(short = "v", long, parse(from_occurrences))]
    verbose: usize,

    /// Timestamp (sec, ms, ns, none)
    #[structopt(short = "t", long = "timestamp")]
    ts: Option<stderrlog::Timestamp>,

    /// Repository type shown in the HTML report.
    #[structopt(short = "r", long, default_value = "default")]
    repo_type: String,

    /// Where to write the CSV table.
    #[structopt(long, parse(from_os_str), default_value = "test-results.csv")]
    csv: PathBuf,

    /// Where to write the HTML report.
    #[structopt(long, parse(from_os_str), default_value = "test-results.html")]
    html: PathBuf,

    /// File name prefix of the reports.
    #[structopt(long, default_value = "TEST-")]
    prefix: String,

    /// File name suffix of the reports.
    #[structopt(long, default_value = ".xml")]
    suffix: String,

    /// Exit with an error when any report declares failures or errors.
    #[structopt(long)]
    strict: bool,

    /// Directory holding the XML test reports.
    #[structopt(parse(from_os_str))]
    report_dir: PathBuf,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    stderrlog::new()
        .module(module_path!())
        .quiet(opt.quiet)
        .verbosity(opt.verbose + 1)
        .timestamp(opt.ts.unwrap_or(stderrlog::Timestamp::Off))
        .init()?;

    let naming = ReportNaming {
        prefix: opt.prefix.clone(),
        suffix: opt.suffix.clone(),
    };
    let info = RunInfo {
        generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        repo_type: opt.repo_type.clone(),
    };

    let summary = run(&opt.report_dir, &naming, &info, &opt.csv, &opt.html)?;

    if opt.strict && summary.has_failures() {
        return Err(anyhow!(
            "{} failures and {} errors reported",
            summary.failed,
            summary.errors
        ));
    }
    Ok(())
}

/// Aggregate the reports in `report_dir` and write both outputs.
fn run(
    report_dir: &Path,
    naming: &ReportNaming,
    info: &RunInfo,
    csv_path: &Path,
    html_path: &Path,
) -> Result<ReportSummary> {
    let reports = summary::discover(report_dir, naming);
    if reports.is_empty() {
        warn!(
            "No test reports found in {}, generating an empty summary",
            report_dir.display()
        );
    }

    let suites: Vec<TestSuite> = reports
        .iter()
        .map(|report| summary::read_declared_totals(&report.path))
        .collect();
    for (report, suite) in reports.iter().zip(&suites) {
        println!(
            "{}: Tests: {}, Passed: {}, Failed: {}, Errors: {}, Skipped: {}",
            report.test_class,
            suite.tests,
            suite.passed(),
            suite.failures,
            suite.errors,
            suite.skipped
        );
    }
    let totals = ReportSummary::from_suites(&suites);

    let mut csv = CsvReport::new(create_output(csv_path)?)
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;
    let mut html = HtmlReport::new(create_output(html_path)?, info)
        .with_context(|| format!("Failed to write {}", html_path.display()))?;

    for report in &reports {
        let cases = match parser::parse_file(&report.path, &report.test_class) {
            Ok(cases) => cases,
            Err(err) => {
                warn!("{:#}", err);
                continue;
            }
        };
        for case in cases {
            csv.row(&case)
                .with_context(|| format!("Failed to write {}", csv_path.display()))?;
            html.row(&case)
                .with_context(|| format!("Failed to write {}", html_path.display()))?;
        }
    }

    let (_, rows) = csv
        .finish()
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;
    html.finish(&totals)
        .with_context(|| format!("Failed to write {}", html_path.display()))?;

    println!(
        "Total: {}, Passed: {}, Failed: {}, Errors: {}, Skipped: {}",
        totals.total, totals.passed, totals.failed, totals.errors, totals.skipped
    );
    info!("Wrote {} rows to {}", rows, csv_path.display());
    info!("Wrote HTML report to {}", html_path.display());
    Ok(totals)
}

/// Truncate or create `path`, creating missing parent directories.
fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Unable to create directory {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Unable to create output file {}", path.display()))?;
    Ok(BufWriter::new(file))
}
