//! Rendering of verification findings
//!
//! Findings are grouped by tree (in the order trees were first opened) and by
//! page, filtered by [`ReportConfig`], then written as text lines or as
//! newline-delimited JSON. The exit status is derived from the full outcome,
//! never from what was printed.

mod config;
mod group;
mod render;

pub use config::{OutputFormat, ReportConfig};
pub use group::order_findings;
pub use render::{exit_status, Report};
