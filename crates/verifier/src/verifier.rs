//! Drives the rule engine over a whole operation stream

use crate::rules::apply;
use crate::state::RunState;
use rts_core::{Finding, Result, Severity};
use rts_parser::Entry;
use tracing::{debug, info, warn};

/// Result of verifying one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub state: RunState,
    /// Findings in emission order
    pub findings: Vec<Finding>,
}

impl Outcome {
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }

    /// Whether the run is clean: no ERROR finding and no reported RTS failure
    pub fn passed(&self) -> bool {
        !self.has_errors() && !self.state.rts_error
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }
}

/// Incremental verifier; feed it entries in log order
#[derive(Debug, Default)]
pub struct Verifier {
    state: RunState,
    findings: Vec<Finding>,
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one entry and return the findings it produced
    pub fn observe(&mut self, entry: &Entry) -> Result<&[Finding]> {
        let kind = entry.operation.kind();
        debug!(
            line_number = entry.line_number,
            kind = %kind,
            file = entry.operation.file().unwrap_or("-"),
            "evaluating operation"
        );

        let new = apply(&mut self.state, entry)?;
        for finding in new.iter().filter(|f| f.is_error()) {
            warn!(
                code = %finding.code,
                line_number = finding.line_number,
                "{}",
                finding.message
            );
        }

        let start = self.findings.len();
        self.findings.extend(new);
        Ok(&self.findings[start..])
    }

    /// Consume a stream of entries, stopping at the first input error
    pub fn run<I>(mut self, entries: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = Result<Entry>>,
    {
        for entry in entries {
            self.observe(&entry?)?;
        }
        Ok(self.finish())
    }

    pub fn finish(self) -> Outcome {
        let outcome = Outcome {
            state: self.state,
            findings: self.findings,
        };
        info!(
            operations = outcome.state.operations,
            trees = outcome.state.trees.len(),
            pages = outcome.state.page_count(),
            findings = outcome.findings.len(),
            rts_error = outcome.state.rts_error,
            "verification finished"
        );
        outcome
    }
}
