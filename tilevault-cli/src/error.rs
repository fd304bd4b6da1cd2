//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use tilevault::cache::{InitError, StorageError};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// The tile database could not be opened
    Init(InitError),
    /// A database operation failed
    Storage(StorageError),
    /// The database file could not be inspected
    Inspect { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Init(InitError::NoBaseDirectory { .. }) = self {
            eprintln!();
            eprintln!("No platform base directory could be resolved.");
            eprintln!("Pass an explicit location with --database <path>.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Init(e) => write!(f, "Failed to open tile database: {}", e),
            CliError::Storage(e) => write!(f, "Tile database operation failed: {}", e),
            CliError::Inspect { path, error } => {
                write!(f, "Failed to inspect '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Init(e) => Some(e),
            CliError::Storage(e) => Some(e),
            CliError::Inspect { error, .. } => Some(error),
        }
    }
}

impl From<InitError> for CliError {
    fn from(e: InitError) -> Self {
        CliError::Init(e)
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        CliError::Storage(e)
    }
}
