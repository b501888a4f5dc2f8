//! Process-level plumbing shared by the verifier binaries

pub mod tracing;
