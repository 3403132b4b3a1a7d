// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading engine events from a JSON-lines stream.

use crate::errors::EventStreamError;
use std::io::BufRead;
use tally_metadata::EngineEvent;

/// Reads [`EngineEvent`]s from a JSON-lines stream, one event per line.
///
/// Blank lines are skipped.
#[derive(Debug)]
pub struct EventStream<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> EventStream<R> {
    /// Creates a new stream over `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Returns the 1-based number of the last line read, or 0 if nothing has been read yet.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Reads the next event, or returns `Ok(None)` at the end of the stream.
    pub fn next_event(&mut self) -> Result<Option<EngineEvent>, EventStreamError> {
        loop {
            self.buf.clear();
            let line = self.line + 1;
            let read = self
                .reader
                .read_line(&mut self.buf)
                .map_err(|err| EventStreamError::Read { line, err })?;
            if read == 0 {
                return Ok(None);
            }
            self.line = line;

            let trimmed = self.buf.trim();
            if trimmed.is_empty() {
                continue;
            }
            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(|err| EventStreamError::Parse { line, err });
        }
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<EngineEvent, EventStreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}
