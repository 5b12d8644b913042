//! CLI frontend for the Lollypop paired-questions tool.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lolly",
    about = "Lollypop — random responder/questioner pairing for the classroom",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive pairing session
    Play {
        /// RNG seed for reproducible picks
        #[arg(short, long)]
        seed: Option<u64>,

        /// Roster file to import (names separated by newlines or commas)
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Saved class list to load at start
        #[arg(short, long)]
        class: Option<String>,

        /// Class-list store file
        #[arg(long, default_value = "classlists.json")]
        store: PathBuf,
    },

    /// Manage saved class lists
    Classes {
        #[command(subcommand)]
        action: ClassAction,

        /// Class-list store file
        #[arg(long, default_value = "classlists.json", global = true)]
        store: PathBuf,
    },
}

#[derive(Subcommand)]
enum ClassAction {
    /// List saved class lists
    List,

    /// Show the students in a class list
    Show {
        /// Class name or id
        name: String,
    },

    /// Create a class list from names and/or a roster file
    Create {
        /// Class name
        name: String,

        /// Student names
        students: Vec<String>,

        /// Roster file to read names from
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a class list
    Delete {
        /// Class name or id
        name: String,
    },

    /// Remove every saved class list
    Reset,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            seed,
            roster,
            class,
            store,
        } => commands::play::run(seed, roster.as_deref(), class.as_deref(), store),
        Commands::Classes { action, store } => match action {
            ClassAction::List => commands::classes::list(&store),
            ClassAction::Show { name } => commands::classes::show(&store, &name),
            ClassAction::Create {
                name,
                students,
                file,
            } => commands::classes::create(&store, &name, students, file.as_deref()),
            ClassAction::Delete { name } => commands::classes::delete(&store, &name),
            ClassAction::Reset => commands::classes::reset(&store),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
