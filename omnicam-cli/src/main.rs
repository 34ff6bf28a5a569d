//! Omnicam CLI - spherical camera control tool.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;

#[derive(Parser)]
#[command(name = "omnicam")]
#[command(author, version, about = "Spherical camera control", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Device connection options shared by every subcommand.
#[derive(Args, Clone)]
struct ConnectionArgs {
    /// Base URL of the device's web API
    #[arg(long, global = true, default_value = omnicam_core::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Digest username for client-mode devices (the serial number)
    #[arg(long, global = true)]
    username: Option<String>,

    /// Digest password (derived from the serial number when omitted)
    #[arg(long, global = true, requires = "username")]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a capture, report progress, and print the resulting file URL
    Capture {
        /// Delay between status polls, in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Capture video instead of a still image
        #[arg(long)]
        video: bool,
    },

    /// Print the device identity (model, serial, firmware)
    Info,

    /// Execute an arbitrary device command
    Command {
        /// Command name, e.g. camera.getOptions
        #[arg(value_name = "NAME")]
        name: String,

        /// JSON parameters for the command
        #[arg(long, default_value = "{}")]
        parameters: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Capture { interval_ms, video } => {
            commands::capture::execute(&cli.connection, interval_ms, video).await
        }
        Commands::Info => commands::info::execute(&cli.connection).await,
        Commands::Command { name, parameters } => {
            commands::command::execute(&cli.connection, &name, &parameters).await
        }
    };

    if let Err(err) = result {
        eprintln!("{} {err:#}", "Error:".red().bold());
        std::process::exit(exit_codes::ExitCode::from_anyhow(&err).code);
    }
}
