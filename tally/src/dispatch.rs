// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use clap::{Args, Parser, ValueEnum};
use std::io::{self, BufRead, BufReader};
use tally_metadata::TallyExitCode;
use tally_runner::{
    config::{ReportFormat, ReportSettings, TallyConfig},
    reporter::{ReporterBuilder, RunTotals, TestEvent},
    stream::EventStream,
};
use tracing::{debug, info};

/// Aggregates the events of a test run into a per-file report.
///
/// Reads the JSON-lines event stream written by a test engine, and once the stream's run-end event
/// arrives prints per-file, per-group and step statistics to standard output.
#[derive(Debug, Parser)]
#[command(
    version,
    name = "tally",
    styles = crate::output::CLAP_STYLES,
    max_term_width = 100
)]
pub struct TallyApp {
    /// Event stream to read, one JSON object per line [default: standard input]
    #[arg(value_name = "EVENTS")]
    events: Option<Utf8PathBuf>,

    #[command(flatten)]
    config_opts: ConfigOpts,

    #[command(flatten)]
    report_opts: ReportOpts,

    #[command(flatten)]
    output: OutputOpts,
}

impl TallyApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code.
    pub fn exec(
        self,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32, ExpectedError> {
        let root = match self.config_opts.root {
            Some(root) => root,
            None => current_dir()?,
        };
        let config = TallyConfig::from_sources(&root, self.config_opts.config_file.as_deref())
            .map_err(ExpectedError::config_parse_error)?;
        let mut settings = config.report().clone();
        self.report_opts.apply(&mut settings);

        let input = EventInput::open(self.events.as_deref())?;

        let mut builder = ReporterBuilder::default();
        builder.set_colorize(output.color.should_colorize(supports_color::Stream::Stdout));
        debug!(
            "reading {} with step category `{}`, report format {:?}",
            input.label,
            settings.test_step_category(),
            builder.resolved_format(&settings),
        );
        let mut reporter = builder.build(&settings, output_writer.reporter_output());

        let mut events = 0;
        for event in EventStream::new(input.reader) {
            let event = event.map_err(|err| ExpectedError::EventStreamError {
                input: input.label.clone(),
                err,
            })?;
            let timestamp = Local::now().fixed_offset();
            reporter
                .report_event(TestEvent::from_engine(&event, timestamp))
                .map_err(|err| ExpectedError::write_event_error(&input.label, err))?;
            events += 1;
        }

        if !reporter.is_finished() {
            return Err(ExpectedError::IncompleteRun {
                input: input.label,
                events,
            });
        }

        log_summary(&reporter.registry().totals());
        Ok(TallyExitCode::OK)
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Config options")]
struct ConfigOpts {
    /// Config file [default: ROOT/.config/tally.toml]
    #[arg(long, value_name = "PATH", env = "TALLY_CONFIG")]
    config_file: Option<Utf8PathBuf>,

    /// Directory to look for .config/tally.toml in [default: current directory]
    #[arg(long, value_name = "DIR")]
    root: Option<Utf8PathBuf>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Report options")]
struct ReportOpts {
    /// Report layout [default: from config, or auto]
    #[arg(long, value_enum, value_name = "FORMAT", env = "TALLY_FORMAT")]
    format: Option<ReportFormatOpt>,

    /// Step category that counts towards step totals
    #[arg(long, value_name = "CATEGORY")]
    test_step_category: Option<String>,

    /// Aggregate tests outside any group under this label
    #[arg(long, value_name = "LABEL")]
    ungrouped_label: Option<String>,
}

impl ReportOpts {
    fn apply(self, settings: &mut ReportSettings) {
        if let Some(format) = self.format {
            settings.set_format(format.into());
        }
        if let Some(category) = self.test_step_category {
            settings.set_test_step_category(category);
        }
        if let Some(label) = self.ungrouped_label {
            settings.set_ungrouped_label(Some(label));
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormatOpt {
    /// GitHub Actions groups when GITHUB_ACTIONS=true, terminal otherwise
    Auto,
    /// Collapsible GitHub Actions groups
    Github,
    /// Indented tree
    Terminal,
}

impl From<ReportFormatOpt> for ReportFormat {
    fn from(opt: ReportFormatOpt) -> Self {
        match opt {
            ReportFormatOpt::Auto => ReportFormat::Auto,
            ReportFormatOpt::Github => ReportFormat::Github,
            ReportFormatOpt::Terminal => ReportFormat::Terminal,
        }
    }
}

struct EventInput {
    label: String,
    reader: Box<dyn BufRead>,
}

impl EventInput {
    fn open(path: Option<&Utf8Path>) -> Result<Self, ExpectedError> {
        match path {
            None => Ok(Self::stdin()),
            Some(path) if path.as_str() == "-" => Ok(Self::stdin()),
            Some(path) => {
                let file =
                    std::fs::File::open(path).map_err(|err| ExpectedError::InputOpenFailed {
                        path: path.to_owned(),
                        err,
                    })?;
                Ok(Self {
                    label: format!("`{path}`"),
                    reader: Box::new(BufReader::new(file)),
                })
            }
        }
    }

    fn stdin() -> Self {
        Self {
            label: "standard input".to_owned(),
            reader: Box::new(io::stdin().lock()),
        }
    }
}

fn current_dir() -> Result<Utf8PathBuf, ExpectedError> {
    let dir = std::env::current_dir().map_err(|err| ExpectedError::CurrentDirFailed { err })?;
    Utf8PathBuf::try_from(dir).map_err(|err| ExpectedError::CurrentDirInvalidUtf8 { err })
}

fn log_summary(totals: &RunTotals) {
    let tests = &totals.tests;
    info!(
        "{} tests across {} files: {} passed, {} failed, {} skipped, {} timed out, \
         {} interrupted ({} steps)",
        tests.total(),
        totals.files,
        tests.passed(),
        tests.failed(),
        tests.skipped(),
        tests.timed_out(),
        tests.interrupted(),
        totals.steps.total(),
    );
}
