//! Command-line interface for the devmeter binary.
//!
//! The CLI exposes subcommands for generating devotion meter artifacts from a
//! configuration file or ad-hoc flags, classifying a percentage offline, and
//! inspecting the active tier table.

use std::{
    io,
    path::PathBuf,
    process,
};

use chrono::{NaiveDate, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use devmeter::{
    DEFAULT_BAR_LENGTH, DevotionReport, Error, ErrorPolicy, MeterSpec, ObservationWindow,
    OutputFormat, TierTable, fetch_contributions, load_meters, measure_devotion,
    measure_devotion_intraday, retry::RetryConfig, write_error_markdown, write_error_svg,
    write_markdown_block, write_svg_badge,
};
use indicatif::{ProgressBar, ProgressStyle};
use octocrab::Octocrab;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Command line interface for rendering devotion meter artifacts.
#[derive(Debug, Parser,)]
#[command(name = "devmeter", version, about = "Render devotion meter badges")]
/// Top-level CLI options parsed from user input.
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Fetch contributions and render artifacts for the configured meters.
    Generate(GenerateArgs,),
    /// Classify a percentage against the default tier table offline.
    Classify(ClassifyArgs,),
    /// Print the built-in tier table as JSON.
    Tiers(TiersArgs,),
}

#[derive(Debug, Args, Default,)]
/// Arguments accepted by the `generate` subcommand.
struct GenerateArgs
{
    /// Path to the YAML configuration file describing meters.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,

    /// GitHub login to meter when no configuration file is supplied.
    #[arg(long = "login", value_name = "LOGIN", conflicts_with = "config")]
    login: Option<String,>,

    /// First day of the observation window (YYYY-MM-DD).
    #[arg(long = "start", value_name = "DATE", conflicts_with = "config")]
    start: Option<NaiveDate,>,

    /// Last day of the observation window; defaults to today.
    #[arg(long = "end", value_name = "DATE", conflicts_with = "config")]
    end: Option<NaiveDate,>,

    /// Output artifact format.
    #[arg(long = "format", value_enum, conflicts_with = "config")]
    format: Option<OutputFormat,>,

    /// Destination path of the rendered artifact.
    #[arg(long = "output", value_name = "PATH", conflicts_with = "config")]
    output: Option<PathBuf,>,

    /// Glyph count of the Markdown progress bar.
    #[arg(long = "bar-length", value_name = "COUNT", conflicts_with = "config")]
    bar_length: Option<usize,>,

    /// Let the current day contribute elapsed-time progress.
    #[arg(long = "intraday", action = ArgAction::SetTrue, conflicts_with = "config")]
    intraday: bool,

    /// Failure policy applied when the fetch fails.
    #[arg(long = "on-error", value_enum, conflicts_with = "config")]
    on_error: Option<ErrorPolicy,>,

    /// Bearer credential for the contributions API.
    #[arg(long = "token", value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `classify` subcommand.
struct ClassifyArgs
{
    /// Devotion percentage to classify.
    #[arg(long = "percentage", value_name = "VALUE")]
    percentage: f64,
}

#[derive(Debug, Args,)]
struct TiersArgs
{
    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),),)
        .with(tracing_subscriber::fmt::layer(),)
        .init();

    if let Err(error,) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors originating from configuration loading, fetching and
/// rendering.
async fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args,) => run_generate(args,).await,
        Command::Classify(args,) => run_classify(&args,),
        Command::Tiers(args,) => run_tiers(&args,),
    }
}

async fn run_generate(args: GenerateArgs,) -> Result<(), Error,>
{
    let meters = resolve_meters(&args,)?;

    let token = args
        .token
        .as_deref()
        .map(str::trim,)
        .filter(|value| !value.is_empty(),)
        .ok_or_else(|| Error::missing_credential("GITHUB_TOKEN",),)?;

    let octocrab = Octocrab::builder()
        .personal_token(token.to_owned(),)
        .build()
        .map_err(|e| Error::fetch(format!("failed to build GitHub client: {e}"),),)?;

    let retry_config = RetryConfig::default();

    for meter in &meters {
        generate_meter(&octocrab, meter, &retry_config,).await?;
    }

    Ok((),)
}

/// Resolves the meters to generate from the configuration file or flags.
fn resolve_meters(args: &GenerateArgs,) -> Result<Vec<MeterSpec,>, Error,>
{
    if let Some(config,) = args.config.as_deref() {
        return load_meters(config,);
    }

    let login = args
        .login
        .as_deref()
        .map(str::trim,)
        .filter(|value| !value.is_empty(),)
        .ok_or_else(|| {
            Error::validation("missing required --config <PATH> or --login <LOGIN> argument",)
        },)?;

    let start_date = args
        .start
        .ok_or_else(|| Error::validation("missing required --start <DATE> argument",),)?;

    if let Some(end,) = args.end
        && end < start_date
    {
        return Err(Error::validation(format!(
            "window ends {end} before it starts {start_date}"
        ),),);
    }

    let format = args.format.unwrap_or_default();
    let bar_length = args.bar_length.unwrap_or(DEFAULT_BAR_LENGTH,);
    if bar_length == 0 {
        return Err(Error::validation("bar length must be at least 1",),);
    }

    let output = match args.output.clone() {
        Some(path,) => path,
        None => PathBuf::from(format.default_output(),),
    };

    Ok(vec![MeterSpec {
        login: login.to_owned(),
        start_date,
        end_date: args.end,
        format,
        output,
        bar_length,
        intraday_progress: args.intraday,
        on_error: args.on_error.unwrap_or_default(),
        tiers: TierTable::default(),
    }],)
}

/// Runs the fetch -> compute -> classify -> render pipeline for one meter.
async fn generate_meter(
    octocrab: &Octocrab,
    meter: &MeterSpec,
    retry_config: &RetryConfig,
) -> Result<(), Error,>
{
    let now = Utc::now();
    let window = ObservationWindow::resolve(meter.start_date, meter.end_date, now.date_naive(),)?;

    let pb = fetch_spinner(&meter.login,);
    let fetched = fetch_contributions(octocrab, &meter.login, &window, retry_config,).await;
    pb.finish_and_clear();

    let map = match fetched {
        Ok(map,) => map,
        Err(error,) => return handle_fetch_failure(meter, error,),
    };

    let stats = if meter.intraday_progress {
        measure_devotion_intraday(&map, &window, now,)
    } else {
        measure_devotion(&map, &window,)
    };

    let report = DevotionReport::new(meter.login.clone(), window, stats, &meter.tiers, now,);

    info!("{}: {} -> {}", report.login, report.stats, report.tier.label);

    match meter.format {
        OutputFormat::Svg => write_svg_badge(&report, &meter.output,)?,
        OutputFormat::Markdown => write_markdown_block(&report, meter.bar_length, &meter.output,)?,
    }

    info!("Wrote {} artifact to {}", report.login, meter.output.display());

    Ok((),)
}

/// Applies the meter's failure policy to a failed fetch.
///
/// Under `abort` the error propagates and the artifact is left untouched;
/// under `artifact` the error is consumed and an error-labeled artifact
/// replaces the meter output.
fn handle_fetch_failure(meter: &MeterSpec, error: Error,) -> Result<(), Error,>
{
    match meter.on_error {
        ErrorPolicy::Abort => Err(error,),
        ErrorPolicy::Artifact => {
            warn!(
                "Fetch failed for {}; writing error artifact to {}: {}",
                meter.login,
                meter.output.display(),
                error
            );
            write_error_artifact(meter, &error.to_display_string(),)
        }
    }
}

fn write_error_artifact(meter: &MeterSpec, message: &str,) -> Result<(), Error,>
{
    match meter.format {
        OutputFormat::Svg => write_error_svg(message, &meter.output,),
        OutputFormat::Markdown => write_error_markdown(message, &meter.output,),
    }
}

fn fetch_spinner(login: &str,) -> ProgressBar
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
            .expect("valid template",),
    );
    pb.set_message(format!("Fetching contribution calendar for {login}..."),);
    pb
}

fn run_classify(args: &ClassifyArgs,) -> Result<(), Error,>
{
    let table = TierTable::default();
    println!("{}", table.classify(args.percentage,).label);

    Ok((),)
}

fn run_tiers(args: &TiersArgs,) -> Result<(), Error,>
{
    let table = TierTable::default();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    write_tier_table(&mut handle, &table, args.pretty,)
}

fn write_tier_table<W: io::Write,>(
    writer: &mut W,
    table: &TierTable,
    pretty: bool,
) -> Result<(), Error,>
{
    if pretty {
        serde_json::to_writer_pretty(writer, table,)?;
    } else {
        serde_json::to_writer(writer, table,)?;
    }

    Ok((),)
}

#[cfg(test)]
mod tests
{
    use std::{fs, io::Cursor, path::PathBuf};

    use chrono::NaiveDate;
    use clap::Parser;
    use devmeter::{Error, ErrorPolicy, MeterSpec, OutputFormat, TierTable};
    use tempfile::tempdir;

    use super::{
        Cli, Command, GenerateArgs, handle_fetch_failure, resolve_meters, run_generate,
        write_tier_table,
    };

    fn date(year: i32, month: u32, day: u32,) -> NaiveDate
    {
        NaiveDate::from_ymd_opt(year, month, day,).expect("valid date",)
    }

    #[test]
    fn cli_parses_generate_with_config()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "generate",
            "--config",
            "meters.yaml",
        ],)
        .expect("failed to parse CLI",);

        let args = match cli.command {
            Command::Generate(args,) => args,
            other => panic!("unexpected command variant: {other:?}"),
        };
        assert_eq!(args.config.as_deref(), Some(std::path::Path::new("meters.yaml")));
    }

    #[test]
    fn cli_rejects_login_alongside_config()
    {
        let result = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "generate",
            "--config",
            "meters.yaml",
            "--login",
            "captain",
        ],);

        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_ad_hoc_meter_flags()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "generate",
            "--login",
            "captain",
            "--start",
            "2025-07-05",
            "--format",
            "markdown",
            "--intraday",
            "--on-error",
            "artifact",
        ],)
        .expect("failed to parse CLI",);

        let args = match cli.command {
            Command::Generate(args,) => args,
            other => panic!("unexpected command variant: {other:?}"),
        };

        assert_eq!(args.login.as_deref(), Some("captain"));
        assert_eq!(args.start, Some(date(2025, 7, 5)));
        assert_eq!(args.format, Some(OutputFormat::Markdown));
        assert!(args.intraday);
        assert_eq!(args.on_error, Some(ErrorPolicy::Artifact));
    }

    #[test]
    fn resolve_meters_builds_spec_from_flags()
    {
        let args = GenerateArgs {
            login: Some("captain".to_owned(),),
            start: Some(date(2025, 7, 5,),),
            ..GenerateArgs::default()
        };

        let meters = resolve_meters(&args,).expect("meters resolve",);

        assert_eq!(meters.len(), 1);
        let meter = &meters[0];
        assert_eq!(meter.login, "captain");
        assert_eq!(meter.format, OutputFormat::Svg);
        assert_eq!(meter.output, PathBuf::from("generated/devotion.svg"));
        assert_eq!(meter.bar_length, 20);
        assert_eq!(meter.on_error, ErrorPolicy::Abort);
        assert_eq!(meter.tiers, TierTable::default());
    }

    #[test]
    fn resolve_meters_requires_login_or_config()
    {
        let error = resolve_meters(&GenerateArgs::default(),).expect_err("expected error",);

        match error {
            Error::Validation {
                message,
            } => assert!(message.contains("--config") && message.contains("--login")),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn resolve_meters_requires_start_date()
    {
        let args = GenerateArgs {
            login: Some("captain".to_owned(),),
            ..GenerateArgs::default()
        };

        let error = resolve_meters(&args,).expect_err("expected error",);
        assert!(error.to_display_string().contains("--start"),);
    }

    #[test]
    fn resolve_meters_rejects_inverted_window()
    {
        let args = GenerateArgs {
            login: Some("captain".to_owned(),),
            start: Some(date(2025, 7, 14,),),
            end: Some(date(2025, 7, 5,),),
            ..GenerateArgs::default()
        };

        let error = resolve_meters(&args,).expect_err("expected error",);
        assert!(error.to_display_string().contains("before it starts"),);
    }

    #[test]
    fn resolve_meters_reads_configuration_file()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let config_path = temp.path().join("meters.yaml",);
        let yaml = r"
meters:
  - login: captain
    start_date: 2025-07-05
    format: markdown
";
        fs::write(&config_path, yaml,).expect("failed to write config",);

        let args = GenerateArgs {
            config: Some(config_path,),
            ..GenerateArgs::default()
        };

        let meters = resolve_meters(&args,).expect("meters resolve",);
        assert_eq!(meters[0].format, OutputFormat::Markdown);
    }

    #[tokio::test]
    async fn generate_without_token_is_a_preflight_error()
    {
        let args = GenerateArgs {
            login: Some("captain".to_owned(),),
            start: Some(date(2025, 7, 5,),),
            token: None,
            ..GenerateArgs::default()
        };

        let error = run_generate(args,).await.expect_err("expected credential error",);

        match error {
            Error::MissingCredential {
                variable,
            } => assert_eq!(variable, "GITHUB_TOKEN"),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    fn sample_meter(format: OutputFormat, on_error: ErrorPolicy, output: PathBuf,) -> MeterSpec
    {
        MeterSpec {
            login: "captain".to_owned(),
            start_date: date(2025, 7, 5,),
            end_date: None,
            format,
            output,
            bar_length: 20,
            intraday_progress: false,
            on_error,
            tiers: TierTable::default(),
        }
    }

    #[test]
    fn artifact_policy_consumes_fetch_failure_and_writes_error_artifact()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let output = temp.path().join("generated/devotion.svg",);
        let meter = sample_meter(OutputFormat::Svg, ErrorPolicy::Artifact, output.clone(),);

        handle_fetch_failure(&meter, Error::fetch("HTTP 500",),)
            .expect("artifact policy swallows the error",);

        let contents = fs::read_to_string(&output,).expect("error artifact readable",);
        assert!(contents.contains("Devotion meter unavailable"));
        assert!(contents.contains("HTTP 500"));
    }

    #[test]
    fn artifact_policy_writes_markdown_when_configured()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let output = temp.path().join("devotion.md",);
        let meter = sample_meter(OutputFormat::Markdown, ErrorPolicy::Artifact, output.clone(),);

        handle_fetch_failure(&meter, Error::fetch("HTTP 500",),)
            .expect("artifact policy swallows the error",);

        let contents = fs::read_to_string(&output,).expect("error artifact readable",);
        assert!(contents.contains("**Status:** unavailable"));
    }

    #[test]
    fn abort_policy_propagates_fetch_failure_without_touching_the_artifact()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let output = temp.path().join("devotion.svg",);
        let meter = sample_meter(OutputFormat::Svg, ErrorPolicy::Abort, output.clone(),);

        let error = handle_fetch_failure(&meter, Error::fetch("HTTP 500",),)
            .expect_err("abort policy propagates the error",);

        assert!(error.to_display_string().contains("HTTP 500"));
        assert!(!output.exists());
    }

    #[test]
    fn tiers_pretty_flag_uses_pretty_writer()
    {
        let table = TierTable::default();
        let mut buffer = Cursor::new(Vec::new(),);
        write_tier_table(&mut buffer, &table, true,).expect("failed to serialize tiers",);

        let output = String::from_utf8(buffer.into_inner(),).expect("invalid UTF-8",);
        assert!(output.starts_with("[\n"));
        assert!(output.contains("Devotion Eternal"));
    }

    #[test]
    fn tiers_compact_writer_emits_single_line()
    {
        let table = TierTable::default();
        let mut buffer = Cursor::new(Vec::new(),);
        write_tier_table(&mut buffer, &table, false,).expect("failed to serialize tiers",);

        let output = String::from_utf8(buffer.into_inner(),).expect("invalid UTF-8",);
        assert!(!output.contains('\n'));
        assert!(output.contains("\"threshold\":0"));
    }
}
