// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{aggregator::RunRegistry, sink::TabularSink};
use std::io;
use tracing::debug;

/// Renders a [`RunRegistry`] as nested sections on a [`TabularSink`].
///
/// Each file gets one section, containing a section per group label followed by the file's
/// `Tests` and `Test Steps` sections.
pub struct ReportDisplayer<'a> {
    sink: Box<dyn TabularSink + 'a>,
}

impl<'a> ReportDisplayer<'a> {
    /// The label of the section holding every test in a file.
    pub const TESTS_SECTION: &'static str = "Tests";

    /// The label of the section holding a file's step counter.
    pub const STEPS_SECTION: &'static str = "Test Steps";

    /// Creates a new displayer writing to `sink`.
    pub fn new(sink: Box<dyn TabularSink + 'a>) -> Self {
        Self { sink }
    }

    /// Renders the registry and flushes the sink.
    ///
    /// The registry is only read, so rendering it again produces the same output.
    pub fn render(&mut self, registry: &RunRegistry) -> io::Result<()> {
        render_registry(registry, &mut *self.sink)?;
        self.sink.flush()
    }
}

impl std::fmt::Debug for ReportDisplayer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportDisplayer").finish_non_exhaustive()
    }
}

fn render_registry<S: TabularSink + ?Sized>(
    registry: &RunRegistry,
    sink: &mut S,
) -> io::Result<()> {
    debug!("rendering report for {} files", registry.len());

    for (file, stats) in registry.iter() {
        sink.open_section(file.as_str())?;

        for (label, counter) in stats.describes() {
            sink.open_section(label)?;
            sink.write_counter(counter)?;
            sink.close_section()?;
        }

        sink.open_section(ReportDisplayer::TESTS_SECTION)?;
        sink.write_counter(stats.tests())?;
        sink.close_section()?;

        sink.open_section(ReportDisplayer::STEPS_SECTION)?;
        sink.write_counter(stats.steps())?;
        sink.close_section()?;

        sink.close_section()?;
    }

    Ok(())
}
