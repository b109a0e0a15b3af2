use std::fmt;

/// Totals a report file declares about itself on its root element.
///
/// Only the attributes are modelled; nested test cases are skipped during
/// deserialization and read separately by the streaming parser.
#[derive(Clone, Debug, Default, PartialEq, YaDeserialize)]
#[yaserde(rename = "testsuite")]
pub struct TestSuite {
    #[yaserde(attribute)]
    pub name: String,
    #[yaserde(attribute)]
    pub tests: u32,
    #[yaserde(attribute)]
    pub failures: u32,
    #[yaserde(attribute)]
    pub errors: u32,
    #[yaserde(attribute)]
    pub skipped: u32,
}

impl TestSuite {
    /// Passed count as implied by the declared totals. Negative when the
    /// file declares more non-passing cases than tests.
    pub fn passed(&self) -> i64 {
        i64::from(self.tests)
            - i64::from(self.failures)
            - i64::from(self.errors)
            - i64::from(self.skipped)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    Error,
    Skipped,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::Failed => "FAILED",
            Outcome::Error => "ERROR",
            Outcome::Skipped => "SKIPPED",
        }
    }

    /// Rank used when a test case carries more than one marker: failure
    /// beats error, error beats skipped.
    pub fn priority(self) -> u8 {
        match self {
            Outcome::Passed => 0,
            Outcome::Skipped => 1,
            Outcome::Error => 2,
            Outcome::Failed => 3,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCaseResult {
    pub test_class: String,
    pub test_method: String,
    pub outcome: Outcome,
    pub reason: String,
}
