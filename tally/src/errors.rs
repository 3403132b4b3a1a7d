// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::{FromPathBufError, Utf8PathBuf};
use owo_colors::OwoColorize;
use std::error::Error;
use tally_metadata::TallyExitCode;
use tally_runner::errors::{
    ConfigParseError, ContractViolation, EventStreamError, WriteEventError,
};
use thiserror::Error;
use tracing::error;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An error that is expected to happen, with a documented exit code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine the current directory")]
    CurrentDirFailed {
        #[source]
        err: std::io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 {
        #[source]
        err: FromPathBufError,
    },
    #[error("config parse error")]
    ConfigParseError {
        #[source]
        err: Box<ConfigParseError>,
    },
    #[error("failed to open event stream")]
    InputOpenFailed {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("invalid event stream")]
    EventStreamError {
        input: String,
        #[source]
        err: EventStreamError,
    },
    #[error("engine event contract violated")]
    ContractViolation {
        input: String,
        #[source]
        err: ContractViolation,
    },
    #[error("event stream ended before the run did")]
    IncompleteRun { input: String, events: usize },
    #[error("error writing report")]
    WriteEventError {
        #[source]
        err: WriteEventError,
    },
}

impl ExpectedError {
    pub(crate) fn config_parse_error(err: ConfigParseError) -> Self {
        Self::ConfigParseError { err: Box::new(err) }
    }

    pub(crate) fn write_event_error(input: &str, err: WriteEventError) -> Self {
        match err {
            WriteEventError::Contract(err) => Self::ContractViolation {
                input: input.to_owned(),
                err,
            },
            other => Self::WriteEventError { err: other },
        }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigParseError { .. }
            | Self::InputOpenFailed { .. } => TallyExitCode::SETUP_ERROR,
            Self::EventStreamError { .. } => TallyExitCode::INVALID_EVENT_STREAM,
            Self::ContractViolation { .. } => TallyExitCode::CONTRACT_VIOLATION,
            Self::IncompleteRun { .. } => TallyExitCode::INCOMPLETE_RUN,
            Self::WriteEventError { .. } => TallyExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::CurrentDirFailed { err } => {
                error!("could not determine the current directory");
                Some(err as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { err } => {
                error!(
                    "current directory `{}` is not valid UTF-8",
                    err.as_path().display().style(styles.bold)
                );
                None
            }
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse tally config at `{}`",
                    err.config_file().style(styles.bold)
                );
                Some(err.kind() as &dyn Error)
            }
            Self::InputOpenFailed { path, err } => {
                error!(
                    "failed to open event stream `{}`",
                    path.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::EventStreamError { input, err } => {
                error!(
                    "invalid event in {} at line {}",
                    input.style(styles.bold),
                    err.line().style(styles.bold)
                );
                err.source()
            }
            Self::ContractViolation { input, err } => {
                error!(
                    "{} broke the engine event contract: {err}",
                    input.style(styles.bold)
                );
                err.source()
            }
            Self::IncompleteRun { input, events } => {
                error!(
                    "{} ended after {} events without a run-end event, so no report was written",
                    input.style(styles.bold),
                    events.style(styles.bold)
                );
                None
            }
            Self::WriteEventError { err } => {
                error!("error writing report");
                err.source()
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
