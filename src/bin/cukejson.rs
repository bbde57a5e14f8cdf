//! cukejson: convert cucumber message streams into cucumber JSON reports.
//!
//! ```bash
//! cukejson convert messages.ndjson cucumber.json --pretty
//! cukejson validate cucumber.json
//! cukejson summary cucumber.json --json
//! ```

use clap::{ArgAction, Args, Parser, Subcommand};
use cukejson::io::{load_schema, read_report, read_report_value};
use cukejson::report::SchemaValidator;
use cukejson::{FormatError, Formatter, FormatterConfig, ReportSummary};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(
    name = "cukejson",
    version,
    about = "Convert cucumber message streams into cucumber JSON reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an NDJSON message stream into a JSON report
    Convert(ConvertArgs),

    /// Validate an existing JSON report against the report schema
    Validate(ValidateArgs),

    /// Print step status counts of an existing JSON report
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// NDJSON message stream
    input: PathBuf,

    /// Report file to write
    output: PathBuf,

    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail on structurally inconsistent documents instead of skipping scenarios
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Pretty-print the report
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Skip schema validation of the report
    #[arg(long, action = ArgAction::SetTrue)]
    no_validate: bool,

    /// Expand every examples table of an outline, not only the first
    #[arg(long, action = ArgAction::SetTrue)]
    all_examples: bool,

    /// Schema file to validate against instead of the built-in one
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// JSON report file
    report: PathBuf,

    /// Schema file to validate against instead of the built-in one
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// JSON report file
    report: PathBuf,

    /// Output as JSON instead of human-readable text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn convert_config(args: &ConvertArgs) -> Result<FormatterConfig, FormatError> {
    let mut config = match &args.config {
        Some(path) => FormatterConfig::from_file(path)?,
        None => FormatterConfig::default(),
    };
    config.strict |= args.strict;
    config.pretty |= args.pretty;
    config.expand_all_examples |= args.all_examples;
    if args.no_validate {
        config.validate_schema = false;
    }
    if let Some(schema) = &args.schema {
        config.schema_path = Some(schema.clone());
    }
    Ok(config)
}

fn cmd_convert(args: &ConvertArgs) -> Result<(), FormatError> {
    let formatter = Formatter::new(convert_config(args)?);
    let report = formatter.convert_file(&args.input, &args.output)?;
    let summary = ReportSummary::from_features(&report);
    println!(
        "Wrote {} feature(s), {} scenario(s), {} step(s) to {}",
        summary.features,
        summary.scenarios,
        summary.steps,
        args.output.display()
    );
    Ok(())
}

fn cmd_validate(args: &ValidateArgs) -> Result<(), FormatError> {
    let mut config = FormatterConfig::default();
    config.schema_path.clone_from(&args.schema);
    let validator = SchemaValidator::new(&load_schema(&config)?)?;
    validator.validate_value(&read_report_value(&args.report)?)?;
    println!("{}: valid", args.report.display());
    Ok(())
}

fn cmd_summary(args: &SummaryArgs) -> Result<(), FormatError> {
    let summary = ReportSummary::from_features(&read_report(&args.report)?);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.human_format());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Convert(args) => cmd_convert(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Summary(args) => cmd_summary(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(FormatError::SchemaValidation(err)) => {
            eprintln!("Error: report does not match schema:");
            for violation in err.violations() {
                eprintln!("  - {violation}");
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
