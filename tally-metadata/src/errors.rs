// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::TestStatus;
use std::{error, fmt};

/// An error that occurs while parsing a [`TestStatus`] from its string form.
///
/// The engine event format carries statuses as plain strings. Any value outside
/// [`TestStatus::variants`] means the engine broke its contract.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestStatusParseError {
    input: String,
}

impl TestStatusParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the string that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for TestStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unrecognized test status: {:?} (known statuses: {})",
            self.input,
            TestStatus::variants().join(", "),
        )
    }
}

impl error::Error for TestStatusParseError {}
