// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use owo_colors::Style;
use std::{fmt, time::Duration};

#[derive(Clone, Debug, Default)]
pub(super) struct Styles {
    pub(super) section: Style,
    pub(super) border: Style,
    pub(super) pass: Style,
    pub(super) fail: Style,
    pub(super) skip: Style,
}

impl Styles {
    pub(super) fn colorize(&mut self) {
        self.section = Style::new().bold();
        self.border = Style::new().dimmed();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.skip = Style::new().yellow().bold();
    }
}

/// Displays a duration as seconds with millisecond precision, for example `1.250s`.
pub(super) struct DisplaySeconds(pub(super) Duration);

impl fmt::Display for DisplaySeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_seconds() {
        let tests: &[(u64, &str)] = &[
            (0, "0.000s"),
            (30, "0.030s"),
            (150, "0.150s"),
            (1250, "1.250s"),
            (61_001, "61.001s"),
        ];

        for &(millis, expected) in tests {
            assert_eq!(
                DisplaySeconds(Duration::from_millis(millis)).to_string(),
                expected,
                "for {millis}ms"
            );
        }
    }
}
