// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    aggregator::{EventAggregator, RunRegistry},
    displayer::ReportDisplayer,
    events::{TestEvent, TestEventKind},
    sink::{GithubActionsSink, TabularSink, TerminalSink},
};
use crate::{
    config::{ReportFormat, ReportSettings},
    errors::{ContractViolation, WriteEventError},
};
use chrono::{DateTime, FixedOffset};
use std::{
    collections::HashMap,
    io::{self, BufWriter, Write},
};
use tally_metadata::TestStatus;
use tracing::debug;

/// Where the rendered report is written.
pub enum ReporterOutput<'a> {
    /// Write to standard output, buffered.
    Stdout,

    /// Write to a buffer.
    Buffer(&'a mut Vec<u8>),
}

/// Test reporter builder.
#[derive(Debug, Default)]
pub struct ReporterBuilder {
    should_colorize: bool,
    format: Option<ReportFormat>,
    in_github_actions: Option<bool>,
}

impl ReporterBuilder {
    /// Set to true if the reporter should colorize output.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.should_colorize = should_colorize;
        self
    }

    /// Sets the report format, overriding the configured one.
    pub fn set_format(&mut self, format: ReportFormat) -> &mut Self {
        self.format = Some(format);
        self
    }

    /// Sets whether [`ReportFormat::Auto`] should assume it's running in GitHub Actions.
    ///
    /// By default this is read from the environment.
    pub fn set_in_github_actions(&mut self, in_github_actions: bool) -> &mut Self {
        self.in_github_actions = Some(in_github_actions);
        self
    }

    /// Returns the report format that [`build`](Self::build) will use. This is never
    /// [`ReportFormat::Auto`].
    pub fn resolved_format(&self, settings: &ReportSettings) -> ReportFormat {
        let in_github_actions = self
            .in_github_actions
            .unwrap_or_else(ReportFormat::in_github_actions);
        self.format
            .unwrap_or_else(|| settings.format())
            .resolve(in_github_actions)
    }

    /// Creates a new reporter writing to `output`, in the resolved format.
    pub fn build<'a>(
        &self,
        settings: &ReportSettings,
        output: ReporterOutput<'a>,
    ) -> Reporter<'a> {
        let writer: Box<dyn Write + 'a> = match output {
            ReporterOutput::Stdout => Box::new(BufWriter::new(io::stdout())),
            ReporterOutput::Buffer(buf) => Box::new(buf),
        };

        let format = self.resolved_format(settings);
        debug!("writing report in {format:?} format");
        let sink: Box<dyn TabularSink + 'a> = match format {
            ReportFormat::Github => {
                Box::new(GithubActionsSink::new(writer, self.should_colorize))
            }
            ReportFormat::Terminal | ReportFormat::Auto => {
                Box::new(TerminalSink::new(writer, self.should_colorize))
            }
        };

        self.build_with_sink(settings, sink)
    }

    /// Creates a new reporter writing to a custom sink.
    pub fn build_with_sink<'a>(
        &self,
        settings: &ReportSettings,
        sink: Box<dyn TabularSink + 'a>,
    ) -> Reporter<'a> {
        Reporter {
            aggregator: EventAggregator::new(settings),
            displayer: ReportDisplayer::new(sink),
            start_times: HashMap::new(),
            run_finished: false,
            violated: false,
        }
    }
}

/// Aggregates test events and renders the report when the run finishes.
///
/// Events must be delivered one at a time, in the order the engine produced them.
#[derive(Debug)]
pub struct Reporter<'a> {
    aggregator: EventAggregator,
    displayer: ReportDisplayer<'a>,
    /// Start times by test ID, only used for logging.
    start_times: HashMap<String, DateTime<FixedOffset>>,
    run_finished: bool,
    /// Set once an event breaks the contract. Nothing is aggregated or rendered after that.
    violated: bool,
}

impl Reporter<'_> {
    /// Report a test event.
    ///
    /// On [`TestEventKind::RunFinished`], the report is rendered. Any event after that is a
    /// contract violation.
    ///
    /// A contract violation is fatal for the run: every later event is rejected with
    /// [`ContractViolation::EventAfterViolation`], and no report is rendered.
    pub fn report_event(&mut self, event: TestEvent<'_>) -> Result<(), WriteEventError> {
        if self.violated {
            return Err(ContractViolation::EventAfterViolation {
                event: event.kind.name(),
            }
            .into());
        }

        let res = self.report_event_impl(event);
        if let Err(WriteEventError::Contract(_)) = &res {
            self.violated = true;
        }
        res
    }

    fn report_event_impl(&mut self, event: TestEvent<'_>) -> Result<(), WriteEventError> {
        if self.run_finished {
            return Err(ContractViolation::EventAfterRunEnd {
                event: event.kind.name(),
            }
            .into());
        }

        match event.kind {
            TestEventKind::TestStarted { test_instance } => {
                self.start_times
                    .insert(test_instance.id.to_owned(), event.timestamp);
                self.aggregator.register_file(test_instance.file);
            }
            TestEventKind::TestFinished {
                test_instance,
                status,
                duration,
            } => {
                let status = status.parse::<TestStatus>().map_err(|err| {
                    ContractViolation::UnknownStatus {
                        file: test_instance.file.to_owned(),
                        test_id: test_instance.id.to_owned(),
                        err,
                    }
                })?;

                if let Some(started) = self.start_times.remove(test_instance.id) {
                    let wall_clock = event.timestamp.signed_duration_since(started);
                    debug!(
                        "test `{}` took {}ms by wall clock, {}ms reported by engine",
                        test_instance.title,
                        wall_clock.num_milliseconds(),
                        duration.as_millis(),
                    );
                }

                self.aggregator
                    .test_finished(&test_instance, status, duration);
            }
            TestEventKind::StepFinished {
                test_instance,
                step,
            } => {
                self.aggregator.step_finished(&test_instance, &step)?;
            }
            TestEventKind::RunFinished => {
                self.run_finished = true;
                self.displayer
                    .render(self.aggregator.registry())
                    .map_err(WriteEventError::Io)?;
            }
        }

        Ok(())
    }

    /// Returns true once a [`TestEventKind::RunFinished`] event has been reported.
    pub fn is_finished(&self) -> bool {
        self.run_finished
    }

    /// Returns the statistics aggregated so far.
    pub fn registry(&self) -> &RunRegistry {
        self.aggregator.registry()
    }
}
