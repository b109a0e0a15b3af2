//! Streaming reader for the test cases of a single JUnit report file.

use crate::model::{Outcome, TestCaseResult};
use anyhow::{Context, Result};
use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const TAG_TEST_CASE: &[u8] = b"testcase";
const TAG_FAILURE: &[u8] = b"failure";
const TAG_ERROR: &[u8] = b"error";
const TAG_SKIPPED: &[u8] = b"skipped";
const ATTR_NAME: &[u8] = b"name";
const ATTR_MESSAGE: &[u8] = b"message";

/// Open `path` and lazily yield its test cases, attributed to `test_class`.
///
/// Each call re-reads the file from the start.
pub fn parse_file(path: &Path, test_class: &str) -> Result<TestCases<BufReader<File>>> {
    let file = File::open(path)
        .with_context(|| format!("Unable to open test report {}", path.display()))?;
    Ok(TestCases::from_reader(
        BufReader::new(file),
        test_class,
        &path.display().to_string(),
    ))
}

/// What the parser cares about in the event stream.
enum Token {
    Open(String),
    Passed(String),
    Marker(Outcome, String),
    Close,
    Eof,
}

/// A `<testcase>` whose closing tag has not been seen yet.
struct OpenCase {
    name: String,
    marker: Option<(Outcome, String)>,
}

impl OpenCase {
    fn record(&mut self, outcome: Outcome, message: String) {
        let outranks = match &self.marker {
            Some((current, _)) => outcome.priority() > current.priority(),
            None => true,
        };
        if outranks {
            self.marker = Some((outcome, message));
        }
    }

    fn finish(self, test_class: &str) -> TestCaseResult {
        let (outcome, reason) = self
            .marker
            .unwrap_or_else(|| (Outcome::Passed, String::new()));
        TestCaseResult {
            test_class: test_class.to_string(),
            test_method: self.name,
            outcome,
            reason,
        }
    }
}

/// Iterator over the test cases of one report, in document order.
///
/// Entries that never close are dropped with a warning, and a syntax error
/// ends the sequence early. Neither is fatal.
pub struct TestCases<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    test_class: String,
    source: String,
    open: Option<OpenCase>,
    finished: bool,
}

impl<R: BufRead> TestCases<R> {
    pub fn from_reader(reader: R, test_class: &str, source: &str) -> Self {
        let mut reader = Reader::from_reader(reader);
        reader.config_mut().trim_text(true);
        reader.config_mut().check_end_names = false;
        TestCases {
            reader,
            buf: Vec::new(),
            test_class: test_class.to_string(),
            source: source.to_string(),
            open: None,
            finished: false,
        }
    }

    fn next_token(&mut self) -> quick_xml::Result<Token> {
        loop {
            self.buf.clear();
            let token = match self.reader.read_event_into(&mut self.buf)? {
                Event::Eof => Token::Eof,
                Event::Start(element) => match element.local_name().as_ref() {
                    TAG_TEST_CASE => Token::Open(attribute(&element, ATTR_NAME)),
                    tag => match marker(tag) {
                        Some(outcome) => Token::Marker(outcome, attribute(&element, ATTR_MESSAGE)),
                        None => continue,
                    },
                },
                Event::Empty(element) => match element.local_name().as_ref() {
                    TAG_TEST_CASE => Token::Passed(attribute(&element, ATTR_NAME)),
                    tag => match marker(tag) {
                        Some(outcome) => Token::Marker(outcome, attribute(&element, ATTR_MESSAGE)),
                        None => continue,
                    },
                },
                Event::End(element) if element.local_name().as_ref() == TAG_TEST_CASE => {
                    Token::Close
                }
                _ => continue,
            };
            return Ok(token);
        }
    }

    fn drop_open(&mut self, why: &str) {
        if let Some(case) = self.open.take() {
            warn!(
                "{}: dropping test case '{}' ({})",
                self.source, case.name, why
            );
        }
    }

    fn result(&self, name: String, outcome: Outcome) -> TestCaseResult {
        TestCaseResult {
            test_class: self.test_class.clone(),
            test_method: name,
            outcome,
            reason: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for TestCases<R> {
    type Item = TestCaseResult;

    fn next(&mut self) -> Option<TestCaseResult> {
        while !self.finished {
            match self.next_token() {
                Ok(Token::Passed(name)) => {
                    self.drop_open("no closing tag before the next test case");
                    return Some(self.result(name, Outcome::Passed));
                }
                Ok(Token::Open(name)) => {
                    self.drop_open("no closing tag before the next test case");
                    self.open = Some(OpenCase { name, marker: None });
                }
                Ok(Token::Marker(outcome, message)) => match self.open.as_mut() {
                    Some(case) => case.record(outcome, message),
                    None => debug!("{}: {} marker outside a test case", self.source, outcome),
                },
                Ok(Token::Close) => {
                    if let Some(case) = self.open.take() {
                        return Some(case.finish(&self.test_class));
                    }
                }
                Ok(Token::Eof) => {
                    self.drop_open("truncated report");
                    self.finished = true;
                }
                Err(err) => {
                    warn!(
                        "{}: malformed XML near byte {}: {}",
                        self.source,
                        self.reader.buffer_position(),
                        err
                    );
                    self.drop_open("malformed report");
                    self.finished = true;
                }
            }
        }
        None
    }
}

fn marker(tag: &[u8]) -> Option<Outcome> {
    match tag {
        TAG_FAILURE => Some(Outcome::Failed),
        TAG_ERROR => Some(Outcome::Error),
        TAG_SKIPPED => Some(Outcome::Skipped),
        _ => None,
    }
}

/// Unescaped attribute value, or an empty string when it is absent.
fn attribute(element: &BytesStart, key: &[u8]) -> String {
    match element.try_get_attribute(key) {
        Ok(Some(attr)) => match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        },
        _ => String::new(),
    }
}
