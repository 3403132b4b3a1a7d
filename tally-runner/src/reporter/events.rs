// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8Path;
use chrono::{DateTime, FixedOffset};
use std::time::Duration;
use tally_metadata::{EngineEvent, StepSummary, TestSummary};

/// A test event.
///
/// Events are produced by the external test engine and consumed by a
/// [`Reporter`](crate::reporter::Reporter).
#[derive(Clone, Debug)]
pub struct TestEvent<'a> {
    /// The time at which the event was received, including the offset from UTC.
    pub timestamp: DateTime<FixedOffset>,

    /// The kind of test event this is.
    pub kind: TestEventKind<'a>,
}

impl<'a> TestEvent<'a> {
    /// Converts an event in the engine's wire format, received at `timestamp`.
    pub fn from_engine(event: &'a EngineEvent, timestamp: DateTime<FixedOffset>) -> Self {
        let kind = match event {
            EngineEvent::TestBegin { test } => TestEventKind::TestStarted {
                test_instance: TestInstance::new(test),
            },
            EngineEvent::TestEnd { test, result } => TestEventKind::TestFinished {
                test_instance: TestInstance::new(test),
                status: &result.status,
                duration: Duration::from_millis(result.duration_ms),
            },
            EngineEvent::StepEnd { test, step } => TestEventKind::StepFinished {
                test_instance: TestInstance::new(test),
                step: StepInstance::new(step),
            },
            EngineEvent::RunEnd => TestEventKind::RunFinished,
        };

        Self { timestamp, kind }
    }
}

/// The kind of test event this is.
///
/// Forms part of [`TestEvent`].
#[derive(Clone, Debug)]
pub enum TestEventKind<'a> {
    /// A test started running.
    TestStarted {
        /// The test instance that was started.
        test_instance: TestInstance<'a>,
    },

    /// A step within a test finished.
    StepFinished {
        /// The test instance the step belongs to.
        test_instance: TestInstance<'a>,

        /// The step that finished.
        step: StepInstance<'a>,
    },

    /// A test finished running.
    TestFinished {
        /// The test instance that finished running.
        test_instance: TestInstance<'a>,

        /// The final status, as sent by the engine. Not yet validated.
        status: &'a str,

        /// The time the engine measured for the test.
        duration: Duration,
    },

    /// The test run finished.
    RunFinished,
}

impl TestEventKind<'_> {
    /// Returns the name of this kind of event, as used in the engine's wire format.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TestStarted { .. } => "test-begin",
            Self::StepFinished { .. } => "step-end",
            Self::TestFinished { .. } => "test-end",
            Self::RunFinished => "run-end",
        }
    }
}

/// A test as seen by the reporter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TestInstance<'a> {
    /// An identifier for this test result, unique within the run.
    pub id: &'a str,

    /// The source file that defines the test.
    pub file: &'a Utf8Path,

    /// Enclosing group names, outermost first.
    pub group_path: &'a [String],

    /// The test's own title.
    pub title: &'a str,
}

impl<'a> TestInstance<'a> {
    /// Creates a new `TestInstance` borrowing from an engine summary.
    pub fn new(summary: &'a TestSummary) -> Self {
        Self {
            id: &summary.id,
            file: &summary.file,
            group_path: &summary.group_path,
            title: &summary.title,
        }
    }

    /// Returns the label the test is grouped under: the outermost enclosing group.
    ///
    /// Deeper groups aren't aggregated separately.
    pub fn group_label(&self) -> Option<&'a str> {
        self.group_path.first().map(String::as_str)
    }
}

/// A step within a test.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StepInstance<'a> {
    /// The step's category. `None` and the empty string both mean "no category".
    pub category: Option<&'a str>,

    /// The step's title, if any.
    pub title: Option<&'a str>,

    /// True if the step ended with an error.
    pub has_error: bool,

    /// The time the engine measured for the step.
    pub duration: Duration,
}

impl<'a> StepInstance<'a> {
    /// Creates a new `StepInstance` borrowing from an engine summary.
    pub fn new(summary: &'a StepSummary) -> Self {
        Self {
            category: summary.category.as_deref(),
            title: summary.title.as_deref(),
            has_error: summary.has_error,
            duration: Duration::from_millis(summary.duration_ms),
        }
    }
}
