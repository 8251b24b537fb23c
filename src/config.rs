// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Configuration document types describing devotion meters.
//!
//! The types in this module mirror the structure of the YAML documents
//! consumed by the CLI. They intentionally keep optional values flexible to
//! allow user-supplied overrides, and provide normalization into resolved
//! [`MeterSpec`] values that satisfy downstream invariants.

use std::{fs, path::{Path, PathBuf}};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, io_error},
    tier::{TierSpec, TierTable},
};

/// Default artifact path for SVG meters.
const DEFAULT_SVG_OUTPUT: &str = "generated/devotion.svg";

/// Default artifact path for Markdown meters.
const DEFAULT_MARKDOWN_OUTPUT: &str = "generated/devotion.md";

/// Default glyph count of the Markdown progress bar.
pub const DEFAULT_BAR_LENGTH: usize = 20;

/// Root configuration document describing all meters that should be rendered.
///
/// # Examples
///
/// ```
/// use devmeter::MeterConfig;
///
/// let yaml = r#"
/// meters:
///   - login: octocat
///     start_date: 2025-07-05
/// "#;
/// let config: MeterConfig = serde_yaml::from_str(yaml,).expect("valid configuration",);
/// assert_eq!(config.meters.len(), 1);
/// ```
#[derive(Debug, Deserialize, Serialize,)]
pub struct MeterConfig
{
    /// Collection of devotion meters to render.
    #[serde(default)]
    pub meters: Vec<MeterEntry,>,
}

/// Raw configuration entry describing a single meter before normalization.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct MeterEntry
{
    /// GitHub login whose contribution activity is measured.
    #[serde(alias = "user", alias = "username")]
    pub login: String,

    /// First day of the observation window.
    #[serde(alias = "start", alias = "start-date", alias = "startDate")]
    pub start_date: NaiveDate,

    /// Optional last day of the window; defaults to today at generation time.
    #[serde(default, alias = "end", alias = "end-date", alias = "endDate")]
    pub end_date: Option<NaiveDate,>,

    /// Output artifact format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Optional destination path override for the rendered artifact.
    #[serde(default)]
    pub output: Option<String,>,

    /// Optional glyph count override for the Markdown progress bar.
    #[serde(default, alias = "bar-length", alias = "barLength")]
    pub bar_length: Option<usize,>,

    /// Optional flag enabling same-day partial progress.
    #[serde(default, alias = "intraday", alias = "intraday-progress", alias = "intradayProgress")]
    pub intraday_progress: Option<bool,>,

    /// Optional failure policy override.
    #[serde(default, alias = "on-error", alias = "onError")]
    pub on_error: Option<ErrorPolicy,>,

    /// Optional tier table override replacing the built-in ladder.
    #[serde(default)]
    pub tiers: Option<Vec<TierSpec,>,>,
}

impl MeterEntry
{
    /// Returns the artifact path that should be used for this meter.
    ///
    /// Custom overrides win; otherwise the default path for the format is
    /// selected.
    pub fn resolved_output(&self,) -> PathBuf
    {
        match self.output.as_deref().map(str::trim,).filter(|value| !value.is_empty(),) {
            Some(custom,) => PathBuf::from(custom,),
            None => PathBuf::from(self.format.default_output(),),
        }
    }
}

/// Rendered artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum,)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat
{
    /// SVG badge with a proportional progress bar.
    #[default]
    Svg,
    /// Markdown status block with a Unicode progress bar.
    Markdown,
}

impl OutputFormat
{
    /// Default artifact path for the format.
    pub fn default_output(self,) -> &'static str
    {
        match self {
            Self::Svg => DEFAULT_SVG_OUTPUT,
            Self::Markdown => DEFAULT_MARKDOWN_OUTPUT,
        }
    }
}

/// Policy applied when a run fails after configuration has been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum,)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy
{
    /// Propagate the failure and exit non-zero without touching the artifact.
    #[default]
    Abort,
    /// Replace the artifact with an error-labeled file and exit zero.
    Artifact,
}

/// Normalized meter description with all defaults resolved.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct MeterSpec
{
    /// GitHub login whose contribution activity is measured.
    pub login:             String,
    /// First day of the observation window.
    pub start_date:        NaiveDate,
    /// Optional fixed last day of the window.
    pub end_date:          Option<NaiveDate,>,
    /// Rendered artifact format.
    pub format:            OutputFormat,
    /// Destination path of the rendered artifact.
    pub output:            PathBuf,
    /// Glyph count of the Markdown progress bar.
    pub bar_length:        usize,
    /// Whether the current day contributes elapsed-time progress.
    pub intraday_progress: bool,
    /// Failure policy for this meter.
    pub on_error:          ErrorPolicy,
    /// Tier table the percentage is classified against.
    pub tiers:             TierTable,
}

/// Loads and normalizes meters from a YAML configuration file.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read, [`Error::Parse`] when
/// the document is not valid YAML, and [`Error::Validation`] when an entry
/// violates invariants.
pub fn load_meters(path: &Path,) -> Result<Vec<MeterSpec,>, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| io_error(path, source,),)?;
    parse_meters(&contents,)
}

/// Parses and normalizes meters from a YAML document.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed YAML and [`Error::Validation`] when
/// the document declares no meters, a login is empty, a window is inverted, a
/// bar length is zero, a tier table is invalid, or two meters share an output
/// path.
pub fn parse_meters(contents: &str,) -> Result<Vec<MeterSpec,>, Error,>
{
    let config: MeterConfig = serde_yaml::from_str(contents,)?;

    if config.meters.is_empty() {
        return Err(Error::validation("configuration declares no meters",),);
    }

    let mut specs = Vec::with_capacity(config.meters.len(),);

    for entry in &config.meters {
        specs.push(normalize_entry(entry,)?,);
    }

    for (index, spec,) in specs.iter().enumerate() {
        if specs[..index].iter().any(|earlier| earlier.output == spec.output,) {
            return Err(Error::validation(format!(
                "duplicate output path {:?} shared by multiple meters",
                spec.output
            ),),);
        }
    }

    Ok(specs,)
}

fn normalize_entry(entry: &MeterEntry,) -> Result<MeterSpec, Error,>
{
    let login = entry.login.trim();
    if login.is_empty() {
        return Err(Error::validation("meter login must not be empty",),);
    }

    if let Some(end,) = entry.end_date
        && end < entry.start_date
    {
        return Err(Error::validation(format!(
            "meter for '{login}' ends {end} before it starts {}",
            entry.start_date
        ),),);
    }

    let bar_length = entry.bar_length.unwrap_or(DEFAULT_BAR_LENGTH,);
    if bar_length == 0 {
        return Err(Error::validation(format!("meter for '{login}' has a zero bar length"),),);
    }

    let tiers = match &entry.tiers {
        Some(custom,) => TierTable::new(custom.clone(),)?,
        None => TierTable::default(),
    };

    Ok(MeterSpec {
        login:             login.to_owned(),
        start_date:        entry.start_date,
        end_date:          entry.end_date,
        format:            entry.format,
        output:            entry.resolved_output(),
        bar_length,
        intraday_progress: entry.intraday_progress.unwrap_or(false,),
        on_error:          entry.on_error.unwrap_or_default(),
        tiers,
    },)
}

#[cfg(test)]
mod tests
{
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use super::{ErrorPolicy, OutputFormat, load_meters, parse_meters};
    use crate::error::Error;

    #[test]
    fn parse_meters_applies_defaults()
    {
        let yaml = r"
meters:
  - login: captain
    start_date: 2025-07-05
";
        let specs = parse_meters(yaml,).expect("valid configuration",);

        assert_eq!(specs.len(), 1);
        let spec = &specs[0];
        assert_eq!(spec.login, "captain");
        assert_eq!(spec.format, OutputFormat::Svg);
        assert_eq!(spec.output, PathBuf::from("generated/devotion.svg"));
        assert_eq!(spec.bar_length, 20);
        assert!(!spec.intraday_progress);
        assert_eq!(spec.on_error, ErrorPolicy::Abort);
        assert_eq!(spec.tiers.entries().len(), 6);
    }

    #[test]
    fn parse_meters_honors_overrides()
    {
        let yaml = r#"
meters:
  - user: captain
    start: 2025-07-05
    end: 2025-07-14
    format: markdown
    output: status/meter.md
    bar_length: 30
    intraday_progress: true
    on_error: artifact
    tiers:
      - threshold: 0
        label: "cold"
      - threshold: 50
        label: "warm"
"#;
        let specs = parse_meters(yaml,).expect("valid configuration",);

        let spec = &specs[0];
        assert_eq!(spec.format, OutputFormat::Markdown);
        assert_eq!(spec.output, PathBuf::from("status/meter.md"));
        assert_eq!(spec.bar_length, 30);
        assert!(spec.intraday_progress);
        assert_eq!(spec.on_error, ErrorPolicy::Artifact);
        assert_eq!(spec.tiers.classify(60.0,).label, "warm");
    }

    #[test]
    fn markdown_format_gets_markdown_default_output()
    {
        let yaml = r"
meters:
  - login: captain
    start_date: 2025-07-05
    format: markdown
";
        let specs = parse_meters(yaml,).expect("valid configuration",);

        assert_eq!(specs[0].output, PathBuf::from("generated/devotion.md"));
    }

    #[test]
    fn empty_document_is_rejected()
    {
        let error = parse_meters("meters: []",).expect_err("expected validation error",);

        match error {
            Error::Validation {
                message,
            } => assert!(message.contains("no meters")),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn blank_login_is_rejected()
    {
        let yaml = r"
meters:
  - login: '  '
    start_date: 2025-07-05
";
        let error = parse_meters(yaml,).expect_err("expected validation error",);
        assert!(error.to_display_string().contains("login"),);
    }

    #[test]
    fn inverted_window_is_rejected()
    {
        let yaml = r"
meters:
  - login: captain
    start_date: 2025-07-14
    end_date: 2025-07-05
";
        let error = parse_meters(yaml,).expect_err("expected validation error",);
        assert!(error.to_display_string().contains("before it starts"),);
    }

    #[test]
    fn zero_bar_length_is_rejected()
    {
        let yaml = r"
meters:
  - login: captain
    start_date: 2025-07-05
    bar_length: 0
";
        let error = parse_meters(yaml,).expect_err("expected validation error",);
        assert!(error.to_display_string().contains("bar length"),);
    }

    #[test]
    fn duplicate_outputs_are_rejected()
    {
        let yaml = r"
meters:
  - login: captain
    start_date: 2025-07-05
    output: generated/devotion.svg
  - login: quartermaster
    start_date: 2025-07-05
    output: generated/devotion.svg
";
        let error = parse_meters(yaml,).expect_err("expected validation error",);
        assert!(error.to_display_string().contains("duplicate output"),);
    }

    #[test]
    fn invalid_tier_override_is_rejected()
    {
        let yaml = r"
meters:
  - login: captain
    start_date: 2025-07-05
    tiers:
      - threshold: 10
        label: late
";
        let error = parse_meters(yaml,).expect_err("expected validation error",);
        assert!(error.to_display_string().contains("threshold 0"),);
    }

    #[test]
    fn load_meters_reads_from_disk()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let config_path = temp.path().join("meters.yaml",);
        let yaml = r"
meters:
  - login: captain
    start_date: 2025-07-05
";
        std::fs::write(&config_path, yaml,).expect("failed to write config",);

        let specs = load_meters(&config_path,).expect("load succeeds",);
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn load_meters_reports_missing_file()
    {
        let error =
            load_meters(Path::new("/nonexistent/meters.yaml",),).expect_err("expected io error",);

        assert!(matches!(error, Error::Io { .. }));
    }
}
