//! TileVault CLI - Command-line interface
//!
//! This binary provides management commands for the TileVault tile
//! database: statistics, clearing, explicit purge passes, and path
//! resolution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod error;

use commands::PurgeArgs;

#[derive(Parser)]
#[command(name = "tilevault")]
#[command(version = tilevault::VERSION)]
#[command(about = "Manage the TileVault tile database", long_about = None)]
struct Cli {
    /// Path to the tile database (overrides the resolved location)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Use the system-purgeable cache area instead of durable app data
    #[arg(long, global = true)]
    use_cache_dir: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show tile database statistics
    Stats,
    /// Clear the tile database, removing all cached tiles
    Clear,
    /// Run one purge pass with explicit thresholds
    Purge(PurgeArgs),
    /// Print the resolved database path
    Path,
}

fn main() {
    tilevault::logging::init();

    let cli = Cli::parse();

    let db_path = match commands::resolve_database(cli.database, cli.use_cache_dir) {
        Ok(path) => path,
        Err(e) => e.exit(),
    };

    let result = match cli.command {
        Command::Stats => commands::run_stats(&db_path),
        Command::Clear => commands::run_clear(&db_path),
        Command::Purge(args) => commands::run_purge(&db_path, args),
        Command::Path => commands::run_path(&db_path),
    };

    if let Err(e) = result {
        e.exit();
    }
}
