mod commands;
mod output;
mod telemetry;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kmcheck",
    version,
    about = "Mileage summaries from Spanish DGT vehicle-history reports"
)]
struct Cli {
    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a DGT report PDF into structured facts (without resolving it)
    Parse {
        /// Path to the report PDF
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed facts to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Resolve reports (PDF, facts JSON, or directories of them) into output records
    Process {
        /// Report files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Authorized client; vehicles not held by it are flagged
        #[arg(short, long, env = "KMCHECK_CLIENT")]
        client: Option<String>,

        /// Reference date for open tenures when a report has none (DD/MM/YYYY or YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        as_of: Option<String>,

        /// Also note ownership and renting changes since 2023
        #[arg(long)]
        report_changes: bool,

        /// Output format: table (default), csv or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write records to a CSV file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
        } => commands::parse::run(input_file, &output, out),
        Commands::Process {
            inputs,
            client,
            as_of,
            report_changes,
            output,
            out,
        } => commands::process::run(commands::process::ProcessArgs {
            inputs,
            client,
            as_of,
            report_changes,
            output_format: output,
            output_file: out,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
