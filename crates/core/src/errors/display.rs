//! Display implementations for error types

use super::types::Error;
use std::fmt;

fn line_prefix(line_number: Option<u64>) -> String {
    match line_number {
        Some(n) => format!("line {n}: "),
        None => String::new(),
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedInput {
                line_number,
                line,
                pattern,
                message,
            } => {
                write!(
                    f,
                    "{}malformed RTS line: {message} (pattern '{pattern}')\n  {line}",
                    line_prefix(*line_number)
                )
            }
            Error::UnknownTag {
                line_number,
                tag,
                line,
            } => {
                write!(
                    f,
                    "{}unknown RTS event tag '{tag}'\n  {line}",
                    line_prefix(*line_number)
                )
            }
            Error::SealedRun { line_number, kind } => {
                write!(
                    f,
                    "line {line_number}: {kind} operation after the run was sealed by END"
                )
            }
            Error::Io {
                path,
                operation,
                source,
            } => match path {
                Some(path) => write!(
                    f,
                    "I/O {} operation failed for '{}': {}",
                    operation,
                    path.display(),
                    source
                ),
                None => write!(f, "I/O {operation} operation failed: {source}"),
            },
            Error::Json { message, .. } => {
                write!(f, "JSON error: {message}")
            }
        }
    }
}
