//! adaptest CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod presenter;

#[derive(Parser)]
#[command(name = "adaptest", version, about = "Adaptive multiple-choice quiz engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an adaptive test in the terminal
    Run {
        /// Question bank (.json or .toml); defaults to the configured bank
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Test-taker name (prompted for if omitted)
        #[arg(long)]
        name: Option<String>,

        /// Pre-trained model to load instead of training
        #[arg(long)]
        model: Option<PathBuf>,

        /// Directory for session logs and training history
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Seed for question and choice shuffling
        #[arg(long)]
        seed: Option<u64>,

        /// Answer choices shown per question
        #[arg(long, default_value = "4")]
        choices: usize,

        /// Save the session log even if the ability was not determined
        #[arg(long)]
        save_always: bool,

        /// Also write an HTML results page
        #[arg(long)]
        html: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Train a decision tree from history and save it
    Train {
        /// Output model file
        #[arg(long, default_value = "model.json")]
        output: PathBuf,

        /// Directory of historical session logs
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Where to write the classification report
        #[arg(long)]
        report: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a question bank
    Validate {
        /// Question bank file
        #[arg(long)]
        bank: PathBuf,
    },

    /// Summarize a saved session log
    Summary {
        /// Session log JSON
        #[arg(long)]
        log: PathBuf,

        /// Test-taker name (defaults to the log file name)
        #[arg(long)]
        name: Option<String>,

        /// Write an HTML results page
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("adaptest=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            bank,
            name,
            model,
            data_dir,
            seed,
            choices,
            save_always,
            html,
            config,
        } => {
            commands::run::execute(commands::run::RunArgs {
                bank,
                name,
                model,
                data_dir,
                seed,
                choices,
                save_always,
                html,
                config,
            })
            .await
        }
        Commands::Train {
            output,
            data_dir,
            report,
            config,
        } => commands::train::execute(output, data_dir, report, config),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Summary { log, name, html } => commands::summary::execute(log, name, html),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
