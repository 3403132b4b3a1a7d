// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [tally](https://crates.io/crates/tally), a test-run aggregator.
//!
//! tally consumes the lifecycle events a test engine emits while it runs, and at the end of the
//! run renders a hierarchical report of per-file, per-group and step-level statistics. The
//! binary is in the `tally` crate; this crate contains the event model, the aggregator and the
//! report renderers.

pub mod config;
pub mod errors;
pub mod reporter;
pub mod stream;
