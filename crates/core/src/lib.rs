//! Core domain types, errors, and constants for the rollback-to-stable verifier.
//!
//! Everything the other crates agree on lives here: the error type shared by
//! the parser, the rule engine and the CLI, and the value types that appear in
//! parsed operations and in findings.
//!
//! ## Key Components
//!
//! - **`errors`**: The `Error` enum and `Result` alias. Every fatal condition
//!   (malformed input, I/O) is one of its variants and maps to a process exit
//!   code.
//! - **`types`**: `Timestamp`, `PrepareState`, `UpdateType`, and the finding
//!   vocabulary (`Severity`, `FindingCode`, `Finding`).
//! - **`constants`**: Log markers, environment variable names and exit codes.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    types::*,
};
