/// Constants used throughout the verifier
// Log markers
pub const RTS_VERBOSE_CATEGORY: &str = "WT_VERB_RTS";

// Environment variable names
pub const RTS_VERIFIER_LOG_VAR: &str = "RTS_VERIFIER_LOG";

// Default log filter when neither the environment nor the CLI asks for more
pub const DEFAULT_LOG_FILTER: &str = "warn";

// Process exit codes
pub const EXIT_OK: i32 = 0;
pub const EXIT_VIOLATION: i32 = 1;
pub const EXIT_MALFORMED_INPUT: i32 = 2;
pub const EXIT_IO: i32 = 3;
