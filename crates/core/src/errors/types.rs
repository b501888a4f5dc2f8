//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for verifier operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for verifier operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field could not be extracted from an RTS line
    MalformedInput {
        line_number: Option<u64>,
        line: String,
        pattern: String,
        message: String,
    },

    /// An RTS line carried a tag that names no known event kind
    UnknownTag {
        line_number: Option<u64>,
        tag: String,
        line: String,
    },

    /// An operation followed the END of the run
    SealedRun { line_number: u64, kind: String },

    /// Reading the log or writing the report failed
    Io {
        path: Option<PathBuf>,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization errors
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}
