// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: JSON-lines event stream in, rendered report out.

use camino::Utf8Path;
use chrono::Local;
use color_eyre::eyre::{Result, WrapErr};
use indoc::indoc;
use pretty_assertions::assert_eq;
use tally_runner::{
    config::{ReportFormat, TallyConfig},
    errors::{ContractViolation, WriteEventError},
    reporter::{ReporterBuilder, ReporterOutput, TestEvent},
    stream::EventStream,
};

const TWO_FILES: &str = include_str!("fixtures/two-files.jsonl");

fn run_stream(input: &str, config: &TallyConfig, format: ReportFormat) -> Result<String> {
    let mut buf = Vec::new();
    let mut reporter = ReporterBuilder::default()
        .set_format(format)
        .build(config.report(), ReporterOutput::Buffer(&mut buf));

    for event in EventStream::new(input.as_bytes()) {
        let event = event.wrap_err("failed to read event")?;
        let timestamp = Local::now().fixed_offset();
        reporter.report_event(TestEvent::from_engine(&event, timestamp))?;
    }
    assert!(reporter.is_finished(), "stream contains a run-end event");
    drop(reporter);

    Ok(String::from_utf8(buf)?)
}

#[test]
fn terminal_report() -> Result<()> {
    let output = run_stream(
        TWO_FILES,
        &TallyConfig::default_config(),
        ReportFormat::Terminal,
    )?;

    assert_eq!(
        output,
        indoc! {"
            tests/login.spec.ts
              login
                +-------------+--------+
                | field       |  value |
                +-------------+--------+
                | total       |      2 |
                | passed      |      1 |
                | failed      |      0 |
                | skipped     |      0 |
                | timedOut    |      1 |
                | interrupted |      0 |
                | duration    | 1.250s |
                +-------------+--------+
              Tests
                +-------------+--------+
                | field       |  value |
                +-------------+--------+
                | total       |      2 |
                | passed      |      1 |
                | failed      |      0 |
                | skipped     |      0 |
                | timedOut    |      1 |
                | interrupted |      0 |
                | duration    | 1.250s |
                +-------------+--------+
              Test Steps
                +-------------+--------+
                | field       |  value |
                +-------------+--------+
                | total       |      2 |
                | passed      |      1 |
                | failed      |      1 |
                | skipped     |      0 |
                | timedOut    |      0 |
                | interrupted |      0 |
                | duration    | 0.150s |
                +-------------+--------+

            tests/cart.spec.ts
              Tests
                +-------------+--------+
                | field       |  value |
                +-------------+--------+
                | total       |      1 |
                | passed      |      0 |
                | failed      |      0 |
                | skipped     |      1 |
                | timedOut    |      0 |
                | interrupted |      0 |
                | duration    | 0.000s |
                +-------------+--------+
              Test Steps
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

        "}
    );

    Ok(())
}

#[test]
fn github_report_groups() -> Result<()> {
    let output = run_stream(
        TWO_FILES,
        &TallyConfig::default_config(),
        ReportFormat::Github,
    )?;

    let markers: Vec<_> = output
        .lines()
        .filter(|line| line.starts_with("::"))
        .collect();
    assert_eq!(
        markers,
        [
            "::group::tests/login.spec.ts",
            "::group::login",
            "::endgroup::",
            "::group::Tests",
            "::endgroup::",
            "::group::Test Steps",
            "::endgroup::",
            "::endgroup::",
            "::group::tests/cart.spec.ts",
            "::group::Tests",
            "::endgroup::",
            "::group::Test Steps",
            "::endgroup::",
            "::endgroup::",
        ]
    );

    Ok(())
}

#[test]
fn repo_config_changes_aggregation() -> Result<()> {
    let dir = camino_tempfile::tempdir()?;
    let config_dir = dir.path().join(".config");
    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(
        config_dir.join("tally.toml"),
        indoc! {r#"
            [report]
            test-step-category = "hook"
            ungrouped-label = "(top level)"
        "#},
    )?;
    let config = TallyConfig::from_sources(dir.path(), None)?;

    let mut buf = Vec::new();
    let mut reporter = ReporterBuilder::default()
        .set_format(ReportFormat::Terminal)
        .build(config.report(), ReporterOutput::Buffer(&mut buf));
    for event in EventStream::new(TWO_FILES.as_bytes()) {
        let timestamp = Local::now().fixed_offset();
        reporter.report_event(TestEvent::from_engine(&event?, timestamp))?;
    }

    let registry = reporter.registry();
    let login = registry
        .get(Utf8Path::new("tests/login.spec.ts"))
        .expect("login spec recorded");
    // The hook step and the uncategorized step count; the test and fixture steps don't.
    assert_eq!(login.steps().total(), 2);
    assert_eq!(login.steps().failed(), 1);

    let cart = registry
        .get(Utf8Path::new("tests/cart.spec.ts"))
        .expect("cart spec recorded");
    let top_level = cart.describe("(top level)").expect("ungrouped label used");
    assert_eq!(top_level.skipped(), 1);

    Ok(())
}

#[test]
fn unknown_status_aborts() -> Result<()> {
    let input = indoc! {r#"
        {"type":"test-begin","test":{"id":"t1","file":"a.spec","title":"T1"}}
        {"type":"test-end","test":{"id":"t1","file":"a.spec","title":"T1"},"result":{"status":"flaky","duration-ms":1}}
        {"type":"run-end"}
    "#};

    let mut buf = Vec::new();
    let mut reporter = ReporterBuilder::default()
        .set_format(ReportFormat::Terminal)
        .build(
            TallyConfig::default_config().report(),
            ReporterOutput::Buffer(&mut buf),
        );

    let mut error = None;
    for event in EventStream::new(input.as_bytes()) {
        let event = event?;
        let timestamp = Local::now().fixed_offset();
        if let Err(err) = reporter.report_event(TestEvent::from_engine(&event, timestamp)) {
            error = Some(err);
            break;
        }
    }
    assert!(!reporter.is_finished());
    drop(reporter);

    assert!(
        matches!(
            error,
            Some(WriteEventError::Contract(ContractViolation::UnknownStatus { .. }))
        ),
        "unexpected result: {error:?}"
    );
    assert!(buf.is_empty(), "nothing is rendered after a contract violation");

    Ok(())
}
