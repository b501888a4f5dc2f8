//! Conversion implementations for error types

use super::types::Error;

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_failure_is_not_an_input_error() {
        let source = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let err = Error::from(source);
        assert!(matches!(err, Error::Json { .. }));
        assert!(err.to_string().starts_with("JSON error: "));
        assert!(!err.is_input_error());
        assert_eq!(err.exit_code(), 3);
    }
}
