//! Parsing of rollback-to-stable diagnostic logs
//!
//! The crate turns raw log text into typed operations in three layers:
//!
//! - **`frame`**: recognises RTS-tagged lines and splits off the event tag
//! - **`extract`**: pure field extractors for files, pointers, timestamps,
//!   integers, booleans and time windows
//! - **`operation`**: the `Operation` variant per event kind, its parser and
//!   its canonical renderer
//! - **`reader`**: a lazy line-by-line reader yielding numbered operations

pub mod extract;
pub mod frame;
pub mod operation;
pub mod reader;

pub use frame::{classify, Frame, Level};
pub use operation::*;
pub use reader::{Entry, LogReader};
