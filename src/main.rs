mod aligner;
mod classifier;
mod cli;
mod engine;
mod error;
mod fmt;
mod models;
mod normalizer;
mod report;
mod settings;
mod store;
mod styles;
mod summary;
mod workbook;

use clap::Parser;
use tracing::Level;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let result = match cli.command {
        Commands::Compare {
            template,
            output,
            policy,
            report,
            no_report,
            json,
            wrong_only,
        } => cli::compare::run(cli::compare::CompareArgs {
            template,
            output,
            policy,
            report,
            no_report,
            json,
            wrong_only,
        }),
        Commands::Classify { formats } => cli::classify::run(&formats),
        Commands::Inspect { file } => cli::inspect::run(&file),
        Commands::Init { policy, report_dir } => cli::init::run(&policy, report_dir),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
