// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destinations for the rendered report.

use super::{
    aggregator::Counter,
    helpers::{DisplaySeconds, Styles},
};
use owo_colors::{OwoColorize, Style};
use std::io::{self, Write};
use swrite::{SWrite, swrite, swriteln};
use tally_metadata::TestStatus;
use unicode_width::UnicodeWidthStr;

/// A destination that understands nested, labelled sections containing counter tables.
///
/// Sections are opened and closed in strict nesting order.
pub trait TabularSink {
    /// Opens a section with the given label, nested inside the currently open section.
    fn open_section(&mut self, label: &str) -> io::Result<()>;

    /// Writes a counter into the currently open section.
    fn write_counter(&mut self, counter: &Counter) -> io::Result<()>;

    /// Closes the most recently opened section.
    fn close_section(&mut self) -> io::Result<()>;

    /// Flushes any buffered output.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: TabularSink + ?Sized> TabularSink for &mut S {
    fn open_section(&mut self, label: &str) -> io::Result<()> {
        (**self).open_section(label)
    }

    fn write_counter(&mut self, counter: &Counter) -> io::Result<()> {
        (**self).write_counter(counter)
    }

    fn close_section(&mut self) -> io::Result<()> {
        (**self).close_section()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<S: TabularSink + ?Sized> TabularSink for Box<S> {
    fn open_section(&mut self, label: &str) -> io::Result<()> {
        (**self).open_section(label)
    }

    fn write_counter(&mut self, counter: &Counter) -> io::Result<()> {
        (**self).write_counter(counter)
    }

    fn close_section(&mut self) -> io::Result<()> {
        (**self).close_section()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Writes sections as GitHub Actions `::group::` workflow commands, so that each section shows up
/// as a collapsible group in the job log.
#[derive(Debug)]
pub struct GithubActionsSink<W> {
    writer: W,
    depth: usize,
    styles: Styles,
}

impl<W: Write> GithubActionsSink<W> {
    /// Creates a new sink writing to `writer`.
    pub fn new(writer: W, should_colorize: bool) -> Self {
        let mut styles = Styles::default();
        if should_colorize {
            styles.colorize();
        }
        Self {
            writer,
            depth: 0,
            styles,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TabularSink for GithubActionsSink<W> {
    fn open_section(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.writer, "::group::{}", escape_command_data(label))?;
        self.depth += 1;
        Ok(())
    }

    fn write_counter(&mut self, counter: &Counter) -> io::Result<()> {
        let table = CounterTable::new(counter, &self.styles).render();
        self.writer.write_all(table.as_bytes())
    }

    fn close_section(&mut self) -> io::Result<()> {
        self.depth = close_depth(self.depth)?;
        writeln!(self.writer, "::endgroup::")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Writes sections as an indented tree, for interactive terminals and plain log files.
#[derive(Debug)]
pub struct TerminalSink<W> {
    writer: W,
    depth: usize,
    styles: Styles,
}

impl<W: Write> TerminalSink<W> {
    const INDENT: &'static str = "  ";

    /// Creates a new sink writing to `writer`.
    pub fn new(writer: W, should_colorize: bool) -> Self {
        let mut styles = Styles::default();
        if should_colorize {
            styles.colorize();
        }
        Self {
            writer,
            depth: 0,
            styles,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn indent(&self) -> String {
        Self::INDENT.repeat(self.depth)
    }
}

impl<W: Write> TabularSink for TerminalSink<W> {
    fn open_section(&mut self, label: &str) -> io::Result<()> {
        writeln!(
            self.writer,
            "{}{}",
            self.indent(),
            label.style(self.styles.section)
        )?;
        self.depth += 1;
        Ok(())
    }

    fn write_counter(&mut self, counter: &Counter) -> io::Result<()> {
        let indent = self.indent();
        let table = CounterTable::new(counter, &self.styles).render();
        for line in table.lines() {
            writeln!(self.writer, "{indent}{line}")?;
        }
        Ok(())
    }

    fn close_section(&mut self) -> io::Result<()> {
        self.depth = close_depth(self.depth)?;
        if self.depth == 0 {
            // Separate top-level sections.
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Escapes workflow command data, which otherwise ends at the first newline.
fn escape_command_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn close_depth(depth: usize) -> io::Result<usize> {
    depth.checked_sub(1).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "section closed without a matching open",
        )
    })
}

/// A two-column `field | value` table for a [`Counter`].
pub(super) struct CounterTable<'a> {
    counter: &'a Counter,
    styles: &'a Styles,
}

struct CounterRow {
    field: &'static str,
    value: String,
    style: Option<Style>,
}

impl<'a> CounterTable<'a> {
    const FIELD_HEADER: &'static str = "field";
    const VALUE_HEADER: &'static str = "value";

    pub(super) fn new(counter: &'a Counter, styles: &'a Styles) -> Self {
        Self { counter, styles }
    }

    /// Renders the table, one line per row, each line ending with a newline.
    pub(super) fn render(&self) -> String {
        let rows = self.rows();
        let field_width = rows
            .iter()
            .map(|row| row.field.width())
            .chain(std::iter::once(Self::FIELD_HEADER.width()))
            .max()
            .unwrap_or_default();
        let value_width = rows
            .iter()
            .map(|row| row.value.width())
            .chain(std::iter::once(Self::VALUE_HEADER.width()))
            .max()
            .unwrap_or_default();

        let separator = format!(
            "+{}+{}+",
            "-".repeat(field_width + 2),
            "-".repeat(value_width + 2)
        );

        let mut out = String::new();
        swriteln!(out, "{}", separator.style(self.styles.border));
        swriteln!(
            out,
            "| {} | {} |",
            pad_right(Self::FIELD_HEADER, field_width),
            pad_left(Self::VALUE_HEADER, value_width),
        );
        swriteln!(out, "{}", separator.style(self.styles.border));
        for row in &rows {
            swrite!(out, "| {} | ", pad_right(row.field, field_width));
            let value = pad_left(&row.value, value_width);
            match row.style {
                Some(style) => swrite!(out, "{}", value.style(style)),
                None => out.push_str(&value),
            }
            out.push_str(" |\n");
        }
        swriteln!(out, "{}", separator.style(self.styles.border));
        out
    }

    fn rows(&self) -> Vec<CounterRow> {
        let counter = self.counter;
        let count_row = |field, count: usize, style| CounterRow {
            field,
            value: count.to_string(),
            style: (count > 0).then_some(style),
        };

        let mut rows = vec![count_row("total", counter.total(), Style::new())];
        rows.extend(
            [
                (TestStatus::Passed, self.styles.pass),
                (TestStatus::Failed, self.styles.fail),
                (TestStatus::Skipped, self.styles.skip),
                (TestStatus::TimedOut, self.styles.fail),
                (TestStatus::Interrupted, self.styles.fail),
            ]
            .into_iter()
            .map(|(status, style)| count_row(status.as_str(), counter.count(status), style)),
        );
        rows.push(CounterRow {
            field: "duration",
            value: DisplaySeconds(counter.duration()).to_string(),
            style: None,
        });
        rows
    }
}

fn pad_right(s: &str, width: usize) -> String {
    let mut out = s.to_owned();
    out.push_str(&" ".repeat(width.saturating_sub(s.width())));
    out
}

fn pad_left(s: &str, width: usize) -> String {
    let mut out = " ".repeat(width.saturating_sub(s.width()));
    out.push_str(s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn sample_counter() -> Counter {
        let mut counter = Counter::new();
        counter.record(TestStatus::Passed, Duration::from_millis(1000));
        counter.record(TestStatus::Failed, Duration::from_millis(200));
        counter.record(TestStatus::TimedOut, Duration::from_millis(50));
        counter
    }

    #[test]
    fn counter_table() {
        let styles = Styles::default();
        let counter = sample_counter();
        assert_eq!(
            CounterTable::new(&counter, &styles).render(),
            indoc! {"
                +-------------+--------+
                | field       |  value |
                +-------------+--------+
                | total       |      3 |
                | passed      |      1 |
                | failed      |      1 |
                | skipped     |      0 |
                | timedOut    |      1 |
                | interrupted |      0 |
                | duration    | 1.250s |
                +-------------+--------+
            "}
        );
    }

    #[test]
    fn counter_table_colorized() {
        let mut styles = Styles::default();
        styles.colorize();
        let counter = sample_counter();
        let table = CounterTable::new(&counter, &styles).render();

        let passed = format!("{}", "     1".style(styles.pass));
        let failed = format!("{}", "     1".style(styles.fail));
        assert!(table.contains(&format!("| passed      | {passed} |")), "{table}");
        assert!(table.contains(&format!("| failed      | {failed} |")), "{table}");
        // Zero counts stay plain.
        assert!(table.contains("| skipped     |      0 |"), "{table}");
    }

    #[test]
    fn github_actions_sink() {
        let mut sink = GithubActionsSink::new(Vec::new(), false);
        sink.open_section("a.spec").unwrap();
        sink.open_section("Tests").unwrap();
        sink.write_counter(&Counter::new()).unwrap();
        sink.close_section().unwrap();
        sink.close_section().unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            output,
            indoc! {"
                ::group::a.spec
                ::group::Tests
                +-------------+--------+
                | field       |  value |
                +-------------+--------+
                | total       |      0 |
                | passed      |      0 |
                | failed      |      0 |
                | skipped     |      0 |
                | timedOut    |      0 |
                | interrupted |      0 |
                | duration    | 0.000s |
                +-------------+--------+
                ::endgroup::
                ::endgroup::
            "}
        );
    }

    #[test]
    fn github_actions_label_escaping() {
        let mut sink = GithubActionsSink::new(Vec::new(), false);
        sink.open_section("multi\nline").unwrap();
        sink.open_section("100% done\r\n").unwrap();
        sink.open_section("%0A").unwrap();
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            output,
            indoc! {"
                ::group::multi%0Aline
                ::group::100%25 done%0D%0A
                ::group::%250A
            "}
        );
    }

    #[test]
    fn terminal_sink() {
        let mut counter = Counter::new();
        counter.record(TestStatus::Skipped, Duration::from_millis(5));

        let mut sink = TerminalSink::new(Vec::new(), false);
        sink.open_section("a.spec").unwrap();
        sink.open_section("G1").unwrap();
        sink.write_counter(&counter).unwrap();
        sink.close_section().unwrap();
        sink.close_section().unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            output,
            indoc! {"
                a.spec
                  G1
                    +-------------+--------+
                    | field       |  value |
                    +-------------+--------+
                    | total       |      1 |
                    | passed      |      0 |
                    | failed      |      0 |
                    | skipped     |      1 |
                    | timedOut    |      0 |
                    | interrupted |      0 |
                    | duration    | 0.005s |
                    +-------------+--------+

            "}
        );
    }

    #[test]
    fn unbalanced_close() {
        let mut sink = TerminalSink::new(Vec::new(), false);
        let error = sink
            .close_section()
            .expect_err("closing with nothing open fails");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);

        let mut sink = GithubActionsSink::new(Vec::new(), false);
        sink.close_section()
            .expect_err("closing with nothing open fails");
        assert_eq!(sink.into_inner(), b"");
    }
}
