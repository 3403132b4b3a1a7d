// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregation of test and step outcomes into per-file statistics.

use super::events::{StepInstance, TestInstance};
use crate::{config::ReportSettings, errors::ContractViolation};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::time::Duration;
use tally_metadata::TestStatus;
use tracing::{debug, trace};

/// Outcome tallies and accumulated duration for a set of tests or steps.
///
/// Every call to [`record`](Self::record) increments `total` and exactly one status bucket, so
/// `total` is always the sum of the buckets.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counter {
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    timed_out: usize,
    interrupted: usize,
    duration: Duration,
}

impl Counter {
    /// Creates a new, zeroed counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one outcome with the given status and duration.
    pub fn record(&mut self, status: TestStatus, duration: Duration) {
        self.total += 1;
        match status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Skipped => self.skipped += 1,
            TestStatus::TimedOut => self.timed_out += 1,
            TestStatus::Interrupted => self.interrupted += 1,
        }
        self.duration = self.duration.saturating_add(duration);
    }

    /// Returns the number of outcomes recorded.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the number of passed outcomes.
    pub fn passed(&self) -> usize {
        self.passed
    }

    /// Returns the number of failed outcomes.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Returns the number of skipped outcomes.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns the number of outcomes that timed out.
    pub fn timed_out(&self) -> usize {
        self.timed_out
    }

    /// Returns the number of interrupted outcomes.
    pub fn interrupted(&self) -> usize {
        self.interrupted
    }

    /// Returns the count for a single status.
    pub fn count(&self, status: TestStatus) -> usize {
        match status {
            TestStatus::Passed => self.passed,
            TestStatus::Failed => self.failed,
            TestStatus::Skipped => self.skipped,
            TestStatus::TimedOut => self.timed_out,
            TestStatus::Interrupted => self.interrupted,
        }
    }

    /// Returns the sum of all recorded durations.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn merge(&mut self, other: &Counter) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.timed_out += other.timed_out;
        self.interrupted += other.interrupted;
        self.duration = self.duration.saturating_add(other.duration);
    }
}

/// Statistics for a single source file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FileStats {
    describes: IndexMap<String, Counter>,
    tests: Counter,
    steps: Counter,
}

impl FileStats {
    /// Returns per-group counters keyed by group label, in the order groups were first seen.
    pub fn describes(&self) -> impl ExactSizeIterator<Item = (&str, &Counter)> + '_ {
        self.describes
            .iter()
            .map(|(label, counter)| (label.as_str(), counter))
    }

    /// Returns the counter for a single group label.
    pub fn describe(&self, label: &str) -> Option<&Counter> {
        self.describes.get(label)
    }

    /// Returns the counter for every test in the file.
    pub fn tests(&self) -> &Counter {
        &self.tests
    }

    /// Returns the counter for the file's qualifying steps.
    pub fn steps(&self) -> &Counter {
        &self.steps
    }
}

/// Per-file statistics for a run, in the order files were first seen.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunRegistry {
    files: IndexMap<Utf8PathBuf, FileStats>,
}

impl RunRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the statistics for a file.
    pub fn get(&self, file: &Utf8Path) -> Option<&FileStats> {
        self.files.get(file)
    }

    /// Iterates over files and their statistics in the order they were first seen.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Utf8Path, &FileStats)> + '_ {
        self.files
            .iter()
            .map(|(file, stats)| (file.as_path(), stats))
    }

    /// Returns the number of files seen.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no files have been seen.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sums test and step counters across every file.
    pub fn totals(&self) -> RunTotals {
        let mut totals = RunTotals {
            files: self.files.len(),
            ..RunTotals::default()
        };
        for stats in self.files.values() {
            totals.tests.merge(&stats.tests);
            totals.steps.merge(&stats.steps);
        }
        totals
    }

    fn file_entry(&mut self, file: &Utf8Path) -> &mut FileStats {
        self.files.entry(file.to_owned()).or_default()
    }
}

/// Run-wide sums, returned by [`RunRegistry::totals`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunTotals {
    /// The number of files seen.
    pub files: usize,

    /// Test counters summed across files.
    pub tests: Counter,

    /// Step counters summed across files.
    pub steps: Counter,
}

/// What happened to a finished step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepDisposition {
    /// The step counted towards its file's step totals.
    Counted,

    /// The step's category isn't tracked, so it was ignored.
    Discarded,
}

/// Applies finished tests and steps to a [`RunRegistry`].
#[derive(Clone, Debug)]
pub struct EventAggregator {
    test_step_category: String,
    ungrouped_label: Option<String>,
    registry: RunRegistry,
}

impl EventAggregator {
    /// Creates a new aggregator with an empty registry.
    pub fn new(settings: &ReportSettings) -> Self {
        Self {
            test_step_category: settings.test_step_category().to_owned(),
            ungrouped_label: settings.ungrouped_label().map(ToOwned::to_owned),
            registry: RunRegistry::new(),
        }
    }

    /// Returns the registry built up so far.
    pub fn registry(&self) -> &RunRegistry {
        &self.registry
    }

    /// Makes sure `file` has an entry, without recording any outcome.
    pub fn register_file(&mut self, file: &Utf8Path) {
        self.registry.file_entry(file);
    }

    /// Records a finished test.
    pub fn test_finished(
        &mut self,
        test_instance: &TestInstance<'_>,
        status: TestStatus,
        duration: Duration,
    ) {
        let label = test_instance
            .group_label()
            .or(self.ungrouped_label.as_deref());
        let stats = self.registry.file_entry(test_instance.file);

        if let Some(label) = label {
            stats
                .describes
                .entry(label.to_owned())
                .or_default()
                .record(status, duration);
        }
        stats.tests.record(status, duration);

        debug!(
            "recorded {status} test `{}` in {} ({}ms)",
            test_instance.title,
            test_instance.file,
            duration.as_millis(),
        );
    }

    /// Records a finished step.
    ///
    /// Steps whose category isn't the configured test step category are discarded. A counted
    /// step must belong to a file that already has an entry.
    pub fn step_finished(
        &mut self,
        test_instance: &TestInstance<'_>,
        step: &StepInstance<'_>,
    ) -> Result<StepDisposition, ContractViolation> {
        match step.category {
            Some(category) if !category.is_empty() && category != self.test_step_category => {
                trace!(
                    "discarding `{category}` step of `{}` in {}",
                    test_instance.title, test_instance.file,
                );
                return Ok(StepDisposition::Discarded);
            }
            _ => {}
        }

        let Some(stats) = self.registry.files.get_mut(test_instance.file) else {
            return Err(ContractViolation::StepForUnknownFile {
                file: test_instance.file.to_owned(),
                test_id: test_instance.id.to_owned(),
            });
        };

        let status = if step.has_error {
            TestStatus::Failed
        } else {
            TestStatus::Passed
        };
        stats.steps.record(status, step.duration);

        debug!(
            "recorded {status} step of `{}` in {} ({}ms)",
            test_instance.title,
            test_instance.file,
            step.duration.as_millis(),
        );
        Ok(StepDisposition::Counted)
    }
}
