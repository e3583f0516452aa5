mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pyarena-cli")]
#[command(about = "Pyarena CLI - Manage challenges and grade submissions locally", long_about = None)]
struct Cli {
    /// Path to the challenge config file
    #[arg(long, default_value = "config/challenges.json", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured challenges
    List,

    /// Grade a submission file against a challenge
    Grade {
        /// Challenge id (see `list`)
        challenge: String,

        /// Path to the learner's Python source file
        file: String,

        /// Interpreter override (tried before the defaults)
        #[arg(long)]
        python: Option<String>,

        /// Wall-clock timeout in milliseconds
        #[arg(long, default_value = "5000")]
        timeout_ms: u64,

        /// Print the raw verdict JSON instead of the report
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Add a challenge suite to the config file
    AddChallenge {
        /// Challenge id (stable lookup key)
        #[arg(short, long)]
        id: String,

        /// Human-readable title
        #[arg(short, long)]
        title: String,

        /// Function name the learner must define
        #[arg(short, long)]
        entrypoint: String,

        /// Path to a JSON file holding the test case array
        #[arg(long)]
        tests_file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            commands::list_challenges(&cli.config)?;
        }
        Commands::Grade {
            challenge,
            file,
            python,
            timeout_ms,
            json,
        } => {
            commands::grade(
                &cli.config,
                &challenge,
                &file,
                python.as_deref(),
                timeout_ms,
                json,
            )
            .await?;
        }
        Commands::AddChallenge {
            id,
            title,
            entrypoint,
            tests_file,
        } => {
            commands::add_challenge(&cli.config, &id, &title, &entrypoint, &tests_file)?;
        }
    }

    Ok(())
}
