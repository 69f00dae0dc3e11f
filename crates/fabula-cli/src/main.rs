//! CLI frontend for the Fabula story engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fabula",
    about = "Fabula — an engine for branching interactive fiction",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new story file with a starter template
    Init {
        /// Name of the story to create
        name: String,
    },

    /// Validate a story file: graph integrity and script health
    Check {
        /// Story JSON file
        file: PathBuf,
    },

    /// Show story metadata and a section overview
    Show {
        /// Story JSON file
        file: PathBuf,
    },

    /// Play a story interactively in the terminal
    Play {
        /// Story JSON file
        file: PathBuf,
    },

    /// Export a single linear path through the story as Markdown
    Export {
        /// Story JSON file
        file: PathBuf,

        /// Section id to end at
        #[arg(long)]
        to: String,

        /// Section id to start from (default: the first section)
        #[arg(long)]
        from: Option<String>,

        /// Section ids the path must pass through (repeatable)
        #[arg(long = "via")]
        via: Vec<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate an AI extension response and merge it on acceptance
    Extend {
        /// Story JSON file
        file: PathBuf,

        /// File holding the raw model response
        #[arg(short, long)]
        response: PathBuf,

        /// Section id the model was asked to extend
        #[arg(short, long)]
        section: String,

        /// Where to write the merged story (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { name } => commands::init::run(&name),
        Commands::Check { file } => commands::check::run(&file),
        Commands::Show { file } => commands::show::run(&file),
        Commands::Play { file } => commands::play::run(&file),
        Commands::Export {
            file,
            to,
            from,
            via,
            output,
        } => commands::export::run(&file, from.as_deref(), &to, &via, output.as_deref()),
        Commands::Extend {
            file,
            response,
            section,
            output,
        } => commands::extend::run(&file, &response, &section, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
