// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by tally.

use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use tally_metadata::TestStatusParseError;
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse tally config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a config.
///
/// Returned by [`ConfigParseError::kind`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config: the file was missing or not valid TOML.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config into tally's settings.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}

/// An error that occurred while reading the engine's event stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EventStreamError {
    /// Reading from the underlying input failed.
    #[error("error reading event stream at line {line}")]
    Read {
        /// The 1-based line number being read.
        line: usize,

        /// The underlying IO error.
        #[source]
        err: std::io::Error,
    },

    /// A line was not a valid engine event.
    #[error("invalid engine event at line {line}")]
    Parse {
        /// The 1-based line number of the invalid event.
        line: usize,

        /// The underlying JSON error.
        #[source]
        err: serde_json::Error,
    },
}

impl EventStreamError {
    /// Returns the 1-based line number the error occurred at.
    pub fn line(&self) -> usize {
        match self {
            Self::Read { line, .. } | Self::Parse { line, .. } => *line,
        }
    }
}

/// The engine sent an event that breaks its event contract.
///
/// Contract violations are fatal: they mean that the engine (or the adapter wired to it) is
/// misbehaving, and aggregation for the run can't be trusted any more.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ContractViolation {
    /// A test finished with a status outside the known set.
    #[error("test `{test_id}` in `{file}` finished with an unrecognized status")]
    UnknownStatus {
        /// The file the test belongs to.
        file: Utf8PathBuf,

        /// The test's identifier.
        test_id: String,

        /// The parse error for the status.
        #[source]
        err: TestStatusParseError,
    },

    /// A step finished in a file that no test has begun or ended in.
    #[error("step of test `{test_id}` finished in `{file}`, but no test in that file has begun")]
    StepForUnknownFile {
        /// The file the step belongs to.
        file: Utf8PathBuf,

        /// The identifier of the step's test.
        test_id: String,
    },

    /// An event arrived after the run had already finished.
    #[error("received a {event} event after the run finished")]
    EventAfterRunEnd {
        /// The kind of event that arrived.
        event: &'static str,
    },

    /// An event arrived after an earlier event broke the contract, so the run was abandoned.
    #[error("received a {event} event after an earlier contract violation")]
    EventAfterViolation {
        /// The kind of event that arrived.
        event: &'static str,
    },
}

/// An error that occurs while writing an event.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing the report to the provided output.
    #[error("error writing to output")]
    Io(#[source] std::io::Error),

    /// The event broke the engine's contract.
    #[error("engine event contract violated")]
    Contract(#[from] ContractViolation),
}
