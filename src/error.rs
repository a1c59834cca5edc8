//! Unified error type for model building and scanning.
//!
//! Classification itself never fails; only building a model from files and
//! writing reports can.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoqError {
    /// I/O error (file read, directory walk)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Scan root does not exist
    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    /// The C# grammar could not be loaded into the parser
    #[error("Failed to load C# grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    /// tree-sitter produced no tree for a file
    #[error("Failed to parse {path}")]
    ParseFailed { path: String },

    /// JSON report serialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Argument validation error
    #[error("{0}")]
    InvalidArgs(String),
}
