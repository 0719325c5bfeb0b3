//! # ucfg CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// ucfg — configuration resources for arcade control devices.
///
/// Validates JSON and YAML configuration resources against versioned
/// device schemas and authors new resources.
#[derive(Parser, Debug)]
#[command(name = "ucfg", version, about)]
struct Cli {
    /// Log output format (filter with RUST_LOG).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum LogFormat {
    Text,
    Json,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate resource files against their declared schemas.
    Validate(ucfg_cli::validate::ValidateArgs),
    /// List registered schemas.
    Schemas(ucfg_cli::schemas::SchemasArgs),
    /// Build a usb-button colour resource.
    Color(ucfg_cli::color::ColorArgs),
}

fn init_tracing(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let mut stdout = std::io::stdout().lock();
    let ok = match &cli.command {
        Commands::Validate(args) => ucfg_cli::validate::run_validate(args, &mut stdout)?,
        Commands::Schemas(args) => {
            ucfg_cli::schemas::run_schemas(args, &mut stdout)?;
            true
        }
        Commands::Color(args) => ucfg_cli::color::run_color(args, &mut stdout)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
