// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregates the events of a test run into a per-file report.
//!
//! `tally` reads the JSON-lines event stream a test engine writes while it runs (one event per
//! line, see the `tally-metadata` crate for the format), and once the run ends prints a report of
//! per-file, per-group and step-level statistics. Inside GitHub Actions the report uses
//! collapsible `::group::` sections.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter, StderrStyles};
