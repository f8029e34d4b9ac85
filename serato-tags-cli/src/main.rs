use anyhow::Result;
use clap::{Parser, Subcommand};
use serato_tags_cli::commands;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "serato-tags")]
#[command(about = "Serato Tags - Inspect and edit Serato GEOB tag payloads", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump a database V2 or crate file
    Database {
        /// Input file (e.g. "_Serato_/database V2")
        #[arg(short, long)]
        input: String,

        /// Write the field tree as JSON instead of printing it
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Dump the cue/loop markers of an audio file or raw payload
    Markers {
        /// Audio file with a "Serato Markers_" GEOB, or a raw payload
        #[arg(short, long)]
        input: String,

        /// Write the marker records as JSON instead of printing them
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write marker records from JSON back into a file
    MarkersImport {
        /// JSON file with marker records (as written by `markers --output`)
        #[arg(short, long)]
        input: String,

        /// Audio file or raw payload to update
        #[arg(short, long)]
        target: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Database { input, output } => {
            commands::database::execute(&input, output.as_deref())
        }

        Commands::Markers { input, output } => {
            commands::markers::execute(&input, output.as_deref())
        }

        Commands::MarkersImport { input, target } => {
            commands::markers::import(&input, &target).map(|_| ())
        }
    }
}
