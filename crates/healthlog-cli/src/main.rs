//! HealthLog CLI
//!
//! `healthlog serve` answers inbound text messages, `healthlog remind` is the
//! scheduled reminder trigger, `healthlog parse` previews how a message is read.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod gateway;

#[derive(Debug, Parser)]
#[command(name = "healthlog")]
#[command(about = "HealthLog - daily health metrics over SMS", long_about = None)]
struct Cli {
    /// Config file (default: ./healthlog.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the inbound message webhook
    Serve(commands::serve::ServeArgs),
    /// Evaluate the reminder policy once and send if due
    Remind(commands::remind::RemindArgs),
    /// Parse a message offline and print the result as JSON
    Parse(commands::parse::ParseArgs),
}

fn main() {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(cli.config.as_deref(), args),
        Commands::Remind(args) => commands::remind::execute(cli.config.as_deref(), args),
        Commands::Parse(args) => commands::parse::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
