// Copyright (c) The tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for tally.
//!
//! Configuration is layered: the defaults embedded in the binary come first, then the repository's
//! `.config/tally.toml` (or a file passed in explicitly), then any command-line overrides applied
//! by the caller.

use crate::errors::{ConfigParseError, ConfigParseErrorKind};
use camino::Utf8Path;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Configuration for tally.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TallyConfig {
    report: ReportSettings,
}

impl TallyConfig {
    /// The location of the repository config, relative to the workspace root.
    pub const CONFIG_PATH: &'static str = ".config/tally.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the tally config from the given file, or if not specified from
    /// `.config/tally.toml` in the given workspace root.
    ///
    /// An explicitly specified file must exist. If no file is specified and the workspace root
    /// doesn't have `.config/tally.toml`, the default config is used.
    pub fn from_sources(
        workspace_root: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = workspace_root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (config, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        if !unknown.is_empty() {
            let unknown = unknown.into_iter().collect::<Vec<_>>().join(", ");
            warn!("in config file {config_file}, ignoring unknown configuration keys: {unknown}");
        }

        Ok(config.into_config())
    }

    /// Returns the config with only the embedded defaults applied.
    pub fn default_config() -> Self {
        let (config, _) = Self::build_and_deserialize_config(&Self::make_default_config())
            .expect("default config is always valid");
        config.into_config()
    }

    /// Returns the report settings.
    pub fn report(&self) -> &ReportSettings {
        &self.report
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    /// This returns a tuple of (config, ignored paths).
    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(TallyConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: TallyConfigDeserialize =
            serde_path_to_error::deserialize(ignored_de).map_err(|error| {
                // serde_path_to_error already tracks the key, so drop it from the config error.
                let path = error.path().clone();
                let error = match error.into_inner() {
                    ConfigError::At { error, .. } => *error,
                    other => other,
                };
                ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                    path, error,
                )))
            })?;

        Ok((config, ignored))
    }
}

/// Settings that control how events are aggregated and reported.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ReportSettings {
    test_step_category: String,
    #[serde(default)]
    ungrouped_label: Option<String>,
    format: ReportFormat,
}

impl ReportSettings {
    /// Returns the step category that counts towards step totals.
    pub fn test_step_category(&self) -> &str {
        &self.test_step_category
    }

    /// Returns the label that tests outside any group are aggregated under, if any.
    pub fn ungrouped_label(&self) -> Option<&str> {
        self.ungrouped_label.as_deref()
    }

    /// Returns the configured report format.
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Sets the step category that counts towards step totals.
    pub fn set_test_step_category(&mut self, category: impl Into<String>) -> &mut Self {
        self.test_step_category = category.into();
        self
    }

    /// Sets the label that tests outside any group are aggregated under.
    pub fn set_ungrouped_label(&mut self, label: Option<String>) -> &mut Self {
        self.ungrouped_label = label;
        self
    }

    /// Sets the report format.
    pub fn set_format(&mut self, format: ReportFormat) -> &mut Self {
        self.format = format;
        self
    }
}

/// The layout of the rendered report.
#[derive(Copy, Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Pick [`Github`](Self::Github) inside GitHub Actions, [`Terminal`](Self::Terminal)
    /// otherwise.
    #[default]
    Auto,

    /// Collapsible `::group::` sections understood by GitHub Actions logs.
    Github,

    /// An indented tree for interactive terminals.
    Terminal,
}

impl ReportFormat {
    /// Resolves [`Auto`](Self::Auto) to a concrete format.
    ///
    /// The return value is never `Auto`.
    pub fn resolve(self, in_github_actions: bool) -> Self {
        match self {
            Self::Auto if in_github_actions => Self::Github,
            Self::Auto => Self::Terminal,
            other => other,
        }
    }

    /// Returns true if the `GITHUB_ACTIONS` environment variable indicates a GitHub Actions run.
    pub fn in_github_actions() -> bool {
        std::env::var("GITHUB_ACTIONS").is_ok_and(|value| value == "true")
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TallyConfigDeserialize {
    report: ReportSettings,
}

impl TallyConfigDeserialize {
    fn into_config(self) -> TallyConfig {
        TallyConfig {
            report: self.report,
        }
    }
}
