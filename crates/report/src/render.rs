use crate::config::{OutputFormat, ReportConfig};
use crate::group::order_findings;
use rts_core::{Error, Finding, Result, Severity, EXIT_OK, EXIT_VIOLATION};
use rts_verifier::Outcome;
use std::io::Write;
use tracing::debug;

/// Exit status of a verification: 1 on any ERROR finding or a reported
/// RTS failure, 0 otherwise
pub fn exit_status(outcome: &Outcome) -> i32 {
    if outcome.passed() {
        EXIT_OK
    } else {
        EXIT_VIOLATION
    }
}

/// The findings selected for printing, in report order
pub struct Report<'a> {
    outcome: &'a Outcome,
    format: OutputFormat,
    selected: Vec<&'a Finding>,
    withheld: usize,
}

impl<'a> Report<'a> {
    pub fn new(outcome: &'a Outcome, config: &ReportConfig) -> Self {
        let visible: Vec<&Finding> = order_findings(outcome)
            .into_iter()
            .filter(|f| !config.quiet() || f.severity == Severity::Error)
            .collect();

        let selected = match config.max_findings() {
            Some(max) => truncate_at_highest(&visible, max),
            None => visible.clone(),
        };
        let withheld = visible.len() - selected.len();
        if withheld > 0 {
            debug!(withheld, "findings withheld by --max-findings");
        }

        Self {
            outcome,
            format: config.format(),
            selected,
            withheld,
        }
    }

    pub fn findings(&self) -> &[&'a Finding] {
        &self.selected
    }

    /// Findings cut by the max-findings limit
    pub fn withheld(&self) -> usize {
        self.withheld
    }

    pub fn exit_status(&self) -> i32 {
        exit_status(self.outcome)
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        match self.format {
            OutputFormat::Text => self
                .write_text(out)
                .map_err(|e| Error::stream_io("write report", e))?,
            OutputFormat::Json => self.write_json(out)?,
        }
        out.flush()
            .map_err(|e| Error::stream_io("flush report", e))
    }

    fn write_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for finding in &self.selected {
            writeln!(out, "{finding}")?;
        }
        writeln!(out, "{}", self.summary())?;
        if self.outcome.state.rts_error {
            writeln!(out, "shutdown rollback to stable reported failure")?;
        }
        Ok(())
    }

    fn write_json<W: Write>(&self, out: &mut W) -> Result<()> {
        for finding in &self.selected {
            let line = serde_json::to_string(finding)?;
            writeln!(out, "{line}").map_err(|e| Error::stream_io("write report", e))?;
        }
        Ok(())
    }

    /// `summary: <ops> operations, <trees> trees, <e> errors, <w> warnings, <i> info`
    pub fn summary(&self) -> String {
        let outcome = self.outcome;
        format!(
            "summary: {} operations, {} trees, {} errors, {} warnings, {} info",
            outcome.state.operations,
            outcome.state.trees.len(),
            outcome.count(Severity::Error),
            outcome.count(Severity::Warn),
            outcome.count(Severity::Info),
        )
    }
}

/// Keep findings up to and including the `max`-th one whose severity is the
/// highest among `findings`
fn truncate_at_highest<'a>(findings: &[&'a Finding], max: usize) -> Vec<&'a Finding> {
    let Some(highest) = findings.iter().map(|f| f.severity).max() else {
        return Vec::new();
    };
    if max == 0 {
        return Vec::new();
    }

    let mut seen = 0;
    let mut selected = Vec::new();
    for finding in findings {
        selected.push(*finding);
        if finding.severity == highest {
            seen += 1;
            if seen == max {
                break;
            }
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use rts_core::FindingCode;

    fn outcome(findings: Vec<Finding>) -> Outcome {
        let mut outcome = Outcome {
            findings,
            ..Outcome::default()
        };
        outcome.state.operations = 7;
        outcome
    }

    fn render(outcome: &Outcome, config: &ReportConfig) -> String {
        let mut buf = Vec::new();
        Report::new(outcome, config).write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample() -> Vec<Finding> {
        vec![
            Finding::new(FindingCode::HsTruncated, 1, "truncated"),
            Finding::new(FindingCode::StableRegression, 2, "first"),
            Finding::new(FindingCode::UpdateWithoutPage, 3, "no page").with_tree("file:a.wt"),
            Finding::new(FindingCode::StableRegression, 4, "second"),
            Finding::new(FindingCode::StableRegression, 5, "third"),
        ]
    }

    #[test]
    fn test_text_report_ends_with_summary() {
        let text = render(&outcome(sample()), &ReportConfig::new());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "INFO hs_truncated (line 1): truncated");
        assert_eq!(
            lines[4],
            "WARN update_without_page (line 3): no page [tree=file:a.wt]"
        );
        assert_eq!(
            lines[5],
            "summary: 7 operations, 0 trees, 3 errors, 1 warnings, 1 info"
        );
    }

    #[test]
    fn test_rts_error_line() {
        let mut outcome = outcome(Vec::new());
        outcome.state.rts_error = true;
        let text = render(&outcome, &ReportConfig::new());
        assert!(text.ends_with("shutdown rollback to stable reported failure\n"));
        assert_eq!(exit_status(&outcome), EXIT_VIOLATION);
    }

    #[test]
    fn test_quiet_keeps_errors_only() {
        let outcome = outcome(sample());
        let report = Report::new(&outcome, &ReportConfig::new().with_quiet(true));
        assert_eq!(report.findings().len(), 3);
        assert!(report.findings().iter().all(|f| f.is_error()));
        assert_eq!(report.withheld(), 0);
    }

    #[test]
    fn test_max_findings_counts_highest_severity() {
        let outcome = outcome(sample());
        let report = Report::new(&outcome, &ReportConfig::new().with_max_findings(Some(2)));
        let lines: Vec<u64> = report.findings().iter().map(|f| f.line_number).collect();

        assert_eq!(lines, vec![1, 2, 4]);
        assert_eq!(report.withheld(), 2);
        assert_eq!(report.exit_status(), EXIT_VIOLATION);
    }

    #[test]
    fn test_max_findings_with_only_warnings() {
        let findings = vec![
            Finding::new(FindingCode::TreeReentry, 1, "a"),
            Finding::new(FindingCode::HsTruncated, 2, "b"),
            Finding::new(FindingCode::TreeReentry, 3, "c"),
        ];
        let outcome = outcome(findings);
        let report = Report::new(&outcome, &ReportConfig::new().with_max_findings(Some(1)));
        assert_eq!(report.findings().len(), 1);
        assert_eq!(report.withheld(), 2);
        assert_eq!(report.exit_status(), EXIT_OK);
    }

    #[test]
    fn test_json_lines_omit_absent_fields() {
        let outcome = outcome(vec![
            Finding::new(FindingCode::SpuriousAbort, 9, "abort")
                .with_tree("file:a.wt")
                .with_page(0x1f),
        ]);
        let json = render(&outcome, &ReportConfig::new().with_format(OutputFormat::Json));
        let lines: Vec<&str> = json.lines().collect();
        assert_eq!(lines.len(), 1);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["severity"], "WARN");
        assert_eq!(value["code"], "spurious_abort");
        assert_eq!(value["line_number"], 9);
        assert_eq!(value["tree"], "file:a.wt");
        assert_eq!(value["page"], "0x1f");
        assert!(value.get("key").is_none());
    }

    #[test]
    fn test_json_has_no_summary() {
        let json = render(&outcome(Vec::new()), &ReportConfig::new().with_format(OutputFormat::Json));
        assert!(json.is_empty());
    }

    #[test]
    fn test_write_failure_is_an_io_error() {
        let outcome = outcome(sample());
        for config in [
            ReportConfig::new(),
            ReportConfig::new().with_format(OutputFormat::Json),
        ] {
            let err = Report::new(&outcome, &config)
                .write_to(&mut ClosedPipe)
                .unwrap_err();
            assert!(matches!(err, Error::Io { .. }), "{err:?}");
            assert_eq!(err.exit_code(), 3);
        }
    }
}
