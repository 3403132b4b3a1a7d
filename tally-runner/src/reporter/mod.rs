// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate test events and report the results of a test run.
//!
//! The main type here is [`Reporter`], which is constructed via a [`ReporterBuilder`].

mod aggregator;
mod displayer;
mod events;
mod helpers;
mod imp;
mod sink;
#[cfg(test)]
mod test_helpers;

pub use aggregator::*;
pub use displayer::ReportDisplayer;
pub use events::*;
pub use imp::*;
pub use sink::{GithubActionsSink, TabularSink, TerminalSink};
