pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "churnguard",
    about = "Churnguard operator CLI",
    long_about = "Inspect configuration, verify model artifacts, and score customer records offline.",
    after_help = "Examples:\n  churnguard doctor --json\n  churnguard config\n  churnguard predict --input customer.json\n  churnguard encode --input customer.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, load both artifacts, and score a reference customer")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Score one JSON customer record and print the /predict response body")]
    Predict {
        #[arg(long, help = "Path to a JSON file holding one customer record")]
        input: PathBuf,
    },
    #[command(about = "Print the raw and scaled 26-column feature vector for one record")]
    Encode {
        #[arg(long, help = "Path to a JSON file holding one customer record")]
        input: PathBuf,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Predict { input } => commands::predict::run(&input),
        Command::Encode { input } => commands::encode::run(&input),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
