// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{aggregator::Counter, sink::TabularSink};
use chrono::{DateTime, FixedOffset};
use std::io;
use tally_metadata::{EngineEvent, StepSummary, TestResultSummary, TestSummary};

/// A sink operation, as recorded by the `TabularSink` impl for `Vec<SinkOp>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) enum SinkOp {
    Open(String),
    Counter(Counter),
    Close,
}

impl TabularSink for Vec<SinkOp> {
    fn open_section(&mut self, label: &str) -> io::Result<()> {
        self.push(SinkOp::Open(label.to_owned()));
        Ok(())
    }

    fn write_counter(&mut self, counter: &Counter) -> io::Result<()> {
        self.push(SinkOp::Counter(*counter));
        Ok(())
    }

    fn close_section(&mut self) -> io::Result<()> {
        self.push(SinkOp::Close);
        Ok(())
    }
}

/// A sink whose every write fails.
pub(super) struct BrokenSink;

impl TabularSink for BrokenSink {
    fn open_section(&mut self, _label: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is broken"))
    }

    fn write_counter(&mut self, _counter: &Counter) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is broken"))
    }

    fn close_section(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is broken"))
    }
}

pub(super) fn summary(file: &str, group_path: &[&str], title: &str) -> TestSummary {
    TestSummary {
        id: format!("{file}::{title}"),
        file: file.into(),
        group_path: group_path.iter().map(|&group| group.to_owned()).collect(),
        title: title.to_owned(),
    }
}

pub(super) fn test_begin(test: &TestSummary) -> EngineEvent {
    EngineEvent::TestBegin { test: test.clone() }
}

pub(super) fn test_end(test: &TestSummary, status: &str, duration_ms: u64) -> EngineEvent {
    EngineEvent::TestEnd {
        test: test.clone(),
        result: TestResultSummary {
            status: status.to_owned(),
            duration_ms,
        },
    }
}

pub(super) fn step_end(
    test: &TestSummary,
    category: Option<&str>,
    has_error: bool,
    duration_ms: u64,
) -> EngineEvent {
    EngineEvent::StepEnd {
        test: test.clone(),
        step: StepSummary {
            category: category.map(ToOwned::to_owned),
            title: None,
            has_error,
            duration_ms,
        },
    }
}

pub(super) fn timestamp() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2026-01-01T12:00:00+00:00").expect("valid timestamp")
}
