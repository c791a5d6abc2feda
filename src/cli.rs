use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "govlint", version, about = "Governance manifest linter and dependency analyzer")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        help = "Schema file overriding the built-in schema definitions"
    )]
    pub schema: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a manifest file or a directory tree.
    Validate { path: PathBuf },
    /// Print the dependency graph for a directory tree and run graph checks.
    Graph { path: PathBuf },
}
