//! Domain value types shared by the parser, the rule engine and the reporter.
//!
//! - **`timestamp`**: the `(start, stop)` timestamp pair and its ordering
//! - **`txn`**: prepare states and stored-update kinds
//! - **`finding`**: severities, finding codes and the `Finding` record

pub mod finding;
pub mod timestamp;
pub mod txn;

pub use finding::*;
pub use timestamp::*;
pub use txn::*;
