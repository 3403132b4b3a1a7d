// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::TestStatusParseError;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A single event emitted by the external test engine.
///
/// Serialized as one JSON object per line, discriminated by the `type` field:
///
/// ```json
/// {"type":"test-begin","test":{"id":"t1","file":"a.spec.ts","group-path":["G1"],"title":"T2"}}
/// {"type":"step-end","test":{"id":"t1","file":"a.spec.ts","group-path":["G1"],"title":"T2"},"step":{"category":"test.step","has-error":false,"duration-ms":10}}
/// {"type":"test-end","test":{"id":"t1","file":"a.spec.ts","group-path":["G1"],"title":"T2"},"result":{"status":"failed","duration-ms":50}}
/// {"type":"run-end"}
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EngineEvent {
    /// A test started running.
    TestBegin {
        /// The test that started.
        test: TestSummary,
    },

    /// A test finished with a final status.
    TestEnd {
        /// The test that finished.
        test: TestSummary,

        /// The outcome of the test.
        result: TestResultSummary,
    },

    /// A step within a test finished.
    StepEnd {
        /// The test the step belongs to.
        test: TestSummary,

        /// The step that finished.
        step: StepSummary,
    },

    /// The run finished. No further events follow.
    RunEnd,
}

/// Identity and location of a test, as owned by the engine.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TestSummary {
    /// An identifier for this particular test result, unique within the run.
    ///
    /// Retries of a test get fresh identifiers.
    pub id: String,

    /// The source file that defines the test.
    pub file: Utf8PathBuf,

    /// Enclosing group names, outermost first. Doesn't include the test's own title.
    #[serde(default)]
    pub group_path: Vec<String>,

    /// The test's own title.
    pub title: String,
}

/// The outcome of a test, carried by [`EngineEvent::TestEnd`].
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TestResultSummary {
    /// The final status, in the form produced by [`TestStatus::as_str`].
    ///
    /// This is kept as a raw string so that consumers can report an unknown status as a contract
    /// violation rather than a parse failure.
    pub status: String,

    /// The time the engine measured for the test, in milliseconds.
    pub duration_ms: u64,
}

/// A step within a test, carried by [`EngineEvent::StepEnd`].
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct StepSummary {
    /// The step's category, for example `test.step` or `fixture`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// The step's title, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// True if the step ended with an error.
    #[serde(default)]
    pub has_error: bool,

    /// The time the engine measured for the step, in milliseconds.
    pub duration_ms: u64,
}

/// The final status of a test.
///
/// Statuses are mutually exclusive: every finished test has exactly one.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TestStatus {
    /// The test passed.
    Passed,

    /// The test failed.
    Failed,

    /// The test was skipped.
    Skipped,

    /// The test exceeded its time limit.
    TimedOut,

    /// The test was interrupted before it could finish.
    Interrupted,
}

impl TestStatus {
    /// Returns all the string forms accepted by [`FromStr`].
    pub fn variants() -> &'static [&'static str] {
        &["passed", "failed", "skipped", "timedOut", "interrupted"]
    }

    /// Returns the string form of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::TimedOut => "timedOut",
            Self::Interrupted => "interrupted",
        }
    }
}

impl FromStr for TestStatus {
    type Err = TestStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "skipped" => Self::Skipped,
            "timedOut" => Self::TimedOut,
            "interrupted" => Self::Interrupted,
            other => return Err(TestStatusParseError::new(other)),
        };
        Ok(status)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "proptest1")]
mod proptest_impls {
    use super::TestStatus;
    use proptest::prelude::*;

    impl Arbitrary for TestStatus {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
            prop_oneof![
                Just(TestStatus::Passed),
                Just(TestStatus::Failed),
                Just(TestStatus::Skipped),
                Just(TestStatus::TimedOut),
                Just(TestStatus::Interrupted),
            ]
            .boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("passed", TestStatus::Passed ; "passed")]
    #[test_case("failed", TestStatus::Failed ; "failed")]
    #[test_case("skipped", TestStatus::Skipped ; "skipped")]
    #[test_case("timedOut", TestStatus::TimedOut ; "timed out")]
    #[test_case("interrupted", TestStatus::Interrupted ; "interrupted")]
    fn parse_status(input: &str, expected: TestStatus) {
        assert_eq!(input.parse::<TestStatus>(), Ok(expected));
        assert_eq!(expected.as_str(), input, "as_str is the inverse of parse");
    }

    #[test_case("timedout" ; "wrong case")]
    #[test_case("PASSED" ; "upper case")]
    #[test_case("" ; "empty")]
    #[test_case("flaky" ; "unknown")]
    fn parse_status_rejects(input: &str) {
        let err = input
            .parse::<TestStatus>()
            .expect_err("status should be rejected");
        assert_eq!(err.input(), input);
    }

    #[test]
    fn deserialize_events() {
        let input = r#"{"type":"test-end","test":{"id":"t2","file":"a.spec","group-path":["G1","inner"],"title":"T2"},"result":{"status":"failed","duration-ms":50}}"#;
        let event: EngineEvent = serde_json::from_str(input).expect("test-end should parse");
        let EngineEvent::TestEnd { test, result } = &event else {
            panic!("expected test-end, found {event:?}");
        };
        assert_eq!(test.file, "a.spec");
        assert_eq!(test.group_path, ["G1", "inner"]);
        assert_eq!(result.status.parse::<TestStatus>(), Ok(TestStatus::Failed));
        assert_eq!(result.duration_ms, 50);

        // group-path, category, title and has-error all have defaults.
        let input = r#"{"type":"step-end","test":{"id":"t1","file":"a.spec","title":"T1"},"step":{"duration-ms":10}}"#;
        let event: EngineEvent = serde_json::from_str(input).expect("step-end should parse");
        let EngineEvent::StepEnd { test, step } = &event else {
            panic!("expected step-end, found {event:?}");
        };
        assert!(test.group_path.is_empty());
        assert_eq!(step.category, None);
        assert!(!step.has_error);

        let event: EngineEvent =
            serde_json::from_str(r#"{"type":"run-end"}"#).expect("run-end should parse");
        assert_eq!(event, EngineEvent::RunEnd);
    }

    #[test]
    fn deserialize_unknown_status_is_deferred() {
        // An unknown status is valid JSON: it's up to consumers to reject it.
        let input = r#"{"type":"test-end","test":{"id":"t","file":"a.spec","title":"T"},"result":{"status":"flaky","duration-ms":1}}"#;
        let event: EngineEvent = serde_json::from_str(input).expect("test-end should parse");
        let EngineEvent::TestEnd { result, .. } = event else {
            panic!("expected test-end");
        };
        assert!(result.status.parse::<TestStatus>().is_err());
    }
}
