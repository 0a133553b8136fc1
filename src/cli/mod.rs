//! CLI for the sage-server binary.
//!
//! Uses clap for argument parsing and owo-colors for colored terminal
//! output.

pub mod output;

use clap::{Parser, Subcommand};

/// S.A.G.E - Sourced Answer Generation Engine
#[derive(Parser, Debug)]
#[command(
    name = "sage-server",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "S.A.G.E - Sourced Answer Generation Engine",
    long_about = "A retrieval-augmented support chatbot: ingest documents into a local\n\
                  vector store, then serve a streaming chat UI that answers from the\n\
                  retrieved context with cited sources.",
    after_help = "EXAMPLES:\n    \
                  sage-server ingest   # Index the documents under ./data\n    \
                  sage-server serve    # Start the chat server (default)\n    \
                  sage-server eval     # Score the engine against the built-in question set"
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the chat server and UI
    Serve,

    /// Ingest documents from the input directory into the vector store
    Ingest,

    /// Run the offline evaluation harness and write the JSON report
    Eval,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
