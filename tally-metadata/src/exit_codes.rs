// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `tally` failures.
///
/// `tally` only summarizes outcomes: failing tests in the event stream never change the exit code.
/// The codes below cover failures of tally itself or of the event stream it was handed.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum TallyExitCode {}

impl TallyExitCode {
    /// No errors occurred and the report was written.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up a tally invocation, for example an unreadable
    /// config or input file.
    pub const SETUP_ERROR: i32 = 96;

    /// A line of the event stream could not be read or parsed.
    pub const INVALID_EVENT_STREAM: i32 = 104;

    /// The event stream was well-formed but broke the engine's event contract, for example with an
    /// unknown test status.
    pub const CONTRACT_VIOLATION: i32 = 105;

    /// The event stream ended without a `run-end` event, so no report was rendered.
    pub const INCOMPLETE_RUN: i32 = 106;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
