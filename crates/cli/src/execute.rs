use rts_core::Result;
use rts_parser::LogReader;
use rts_report::{Report, ReportConfig};
use rts_verifier::Verifier;
use std::io;
use std::path::Path;
use tracing::info;

/// Verify one log file, print the report and return the exit status
pub fn verify_file(path: &Path, config: &ReportConfig) -> Result<i32> {
    let reader = LogReader::open(path)?;
    let outcome = Verifier::new().run(reader)?;

    let report = Report::new(&outcome, config);
    report.write_to(&mut io::stdout().lock())?;

    if report.withheld() > 0 {
        eprintln!(
            "{} more findings withheld by --max-findings",
            report.withheld()
        );
    }

    let status = report.exit_status();
    info!(path = %path.display(), status, "report written");
    Ok(status)
}
