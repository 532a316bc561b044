use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for the `ecovoyage` binary.
#[derive(Debug, Parser)]
#[command(
    name = "ecovoyage",
    version,
    about = "EcoVoyage - sustainable travel search with carbon comparisons"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (defaults to <config dir>/ecovoyage/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search destinations and print the assistant's answer
    Search {
        /// Free-text query, e.g. "eco-lodges in Italy"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Print the assistant turn as JSON
        #[arg(long)]
        json: bool,
        /// Include transport comparison, features and accommodations
        #[arg(short, long)]
        expanded: bool,
    },
    /// Type successive inputs through the autocomplete debouncer
    Suggest {
        /// Input snapshots in typing order, e.g. `it ita ital`
        #[arg(required = true, num_args = 1..)]
        input: Vec<String>,
        /// Pause between snapshots
        #[arg(long, default_value_t = 50)]
        interval_ms: u64,
    },
    /// Interactive chat on stdin
    Chat {
        #[arg(short, long)]
        expanded: bool,
    },
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}
