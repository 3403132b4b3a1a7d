// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Machine-readable boundary types for tally.
//!
//! An external test engine describes a run as a stream of JSON objects, one per line. This crate
//! defines that format ([`EngineEvent`] and friends), the set of outcomes a test may end with
//! ([`TestStatus`]), and the documented exit codes of the `tally` binary ([`TallyExitCode`]).

mod errors;
mod events;
mod exit_codes;

pub use errors::*;
pub use events::*;
pub use exit_codes::*;
