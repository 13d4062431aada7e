//! b64map CLI - run an external filter over base64-encoded records.

use clap::{Parser, ValueEnum};
use std::process::ExitCode;

use b64map::{FilterCommand, LineEnding, Pipeline, PipelineError, RunConfig};
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "b64map")]
#[command(about = "Run an external program as a filter over base64-encoded records")]
#[command(version)]
#[command(after_help = "\
Runs the given program as a filter on the input. Standard input and output
are expected to be base64 encoded, one document or record per line. The
program is run once per line, and its output is then re-encoded.

Example:

    $ < test b64map cat > test.cat
    $ diff test test.cat
")]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,

    /// Log a progress line every N documents (0 disables)
    #[arg(short = 'p', long = "progress", value_name = "N", default_value_t = 100)]
    progress: u64,

    /// Line-terminator convention for input framing
    #[arg(long, value_enum, default_value_t = LineEndingArg::Auto)]
    line_ending: LineEndingArg,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Print the final run summary as one JSON line on standard error
    #[arg(long)]
    summary_json: bool,

    /// External filter program, run once per document
    #[arg(value_name = "PROGRAM", required = true)]
    program: String,

    /// Arguments passed to the filter program
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    args: Vec<String>,
}

/// Line-terminator convention (clap surface for [`LineEnding`]).
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LineEndingArg {
    /// Accept LF and CRLF
    Auto,
    /// LF only
    Lf,
}

impl From<LineEndingArg> for LineEnding {
    fn from(value: LineEndingArg) -> Self {
        match value {
            LineEndingArg::Auto => LineEnding::Auto,
            LineEndingArg::Lf => LineEnding::Lf,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), PipelineError> {
    let cli = Cli::parse();

    setup_logging(cli.debug, &cli.log_format);

    let config = RunConfig::default()
        .with_progress_every(cli.progress)
        .with_line_ending(cli.line_ending.into());
    let filter = FilterCommand::new(cli.program, cli.args);
    debug!("running filter '{}'", filter.program());

    let pipeline = Pipeline::new(config, filter);
    let summary = pipeline
        .run(tokio::io::stdin(), tokio::io::stdout())
        .await?;

    if cli.summary_json {
        eprintln!("{}", summary.to_json()?);
    }

    Ok(())
}

/// Diagnostics go to stderr; stdout carries the record stream.
fn setup_logging(debug: bool, format: &str) {
    let level = if debug { Level::DEBUG } else { Level::INFO };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
