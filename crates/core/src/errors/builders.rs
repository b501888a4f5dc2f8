//! Builder methods for creating errors with context

use super::types::Error;
use crate::constants::{EXIT_IO, EXIT_MALFORMED_INPUT};
use std::path::PathBuf;

impl Error {
    /// Create a malformed input error for a pattern that failed to match
    #[must_use]
    pub fn malformed(
        line: impl Into<String>,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::MalformedInput {
            line_number: None,
            line: line.into(),
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create an unknown tag error
    #[must_use]
    pub fn unknown_tag(tag: impl Into<String>, line: impl Into<String>) -> Self {
        Error::UnknownTag {
            line_number: None,
            tag: tag.into(),
            line: line.into(),
        }
    }

    /// Create an error for an operation that arrived after END
    #[must_use]
    pub fn sealed_run(line_number: u64, kind: impl Into<String>) -> Self {
        Error::SealedRun {
            line_number,
            kind: kind.into(),
        }
    }

    /// Create an I/O error for a file path
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            path: Some(path.into()),
            operation: operation.into(),
            source,
        }
    }

    /// Create an I/O error on a stream without a path (stdout, stdin)
    #[must_use]
    pub fn stream_io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            path: None,
            operation: operation.into(),
            source,
        }
    }

    /// Attach the physical line number to an input error.
    ///
    /// Extractors are pure and never know where their line came from; the
    /// reader stamps the position on the way out. Errors that already carry a
    /// line number, and non-input errors, are returned unchanged.
    #[must_use]
    pub fn at_line(self, number: u64) -> Self {
        match self {
            Error::MalformedInput {
                line_number: None,
                line,
                pattern,
                message,
            } => Error::MalformedInput {
                line_number: Some(number),
                line,
                pattern,
                message,
            },
            Error::UnknownTag {
                line_number: None,
                tag,
                line,
            } => Error::UnknownTag {
                line_number: Some(number),
                tag,
                line,
            },
            other => other,
        }
    }

    /// Whether the error describes bad input rather than a failing environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedInput { .. } | Error::UnknownTag { .. } | Error::SealedRun { .. }
        )
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_input_error() {
            EXIT_MALFORMED_INPUT
        } else {
            EXIT_IO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_line_stamps_only_unnumbered_input_errors() {
        let err = Error::malformed("[INIT]", "stable_timestamp", "missing field").at_line(7);
        match &err {
            Error::MalformedInput { line_number, .. } => assert_eq!(*line_number, Some(7)),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = err.at_line(9);
        match err {
            Error::MalformedInput { line_number, .. } => assert_eq!(line_number, Some(7)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_exit_codes_separate_input_from_io() {
        assert_eq!(Error::unknown_tag("bogus", "line").exit_code(), 2);
        assert_eq!(Error::sealed_run(3, "TREE").exit_code(), 2);
        let io = Error::io(
            "/nonexistent",
            "open",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(io.exit_code(), 3);
    }

    #[test]
    fn test_display_includes_line_and_pattern() {
        let err = Error::malformed("[INIT] oops", "stable_timestamp=(S, T)", "missing field")
            .at_line(4);
        let rendered = err.to_string();
        assert!(rendered.starts_with("line 4: "));
        assert!(rendered.contains("stable_timestamp=(S, T)"));
        assert!(rendered.contains("[INIT] oops"));
    }
}
