//! Reconstruction and checking of a rollback-to-stable run
//!
//! The verifier folds the operation stream of one run into a hierarchical
//! model (run, trees, pages, keys) and evaluates consistency rules on every
//! step. Rule outcomes are findings; the model itself is never corrected.
//!
//! - **`state`**: the run/tree/page model
//! - **`rules`**: the pure `evaluate(state, entry)` rule engine
//! - **`verifier`**: the driver that folds a whole stream into an `Outcome`

pub mod rules;
pub mod state;
pub mod verifier;

pub use rules::{apply, evaluate};
pub use state::{AbortCheck, PageState, RecoveryCheckpoint, RunState, SkipReason, TreeState};
pub use verifier::{Outcome, Verifier};
