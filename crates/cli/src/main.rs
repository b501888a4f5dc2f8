use clap::{ArgAction, Parser};
use rts_report::{OutputFormat, ReportConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod execute;

#[derive(Parser)]
#[command(name = "rts-verifier")]
#[command(about = "Verify the decisions recorded in a rollback-to-stable log", long_about = None)]
#[command(version)]
struct Cli {
    /// Log file containing WT_VERB_RTS diagnostic lines
    path: PathBuf,

    /// Suppress INFO and WARN findings
    #[arg(long)]
    quiet: bool,

    /// Emit findings as newline-delimited JSON
    #[arg(long)]
    json: bool,

    /// Stop reporting after the first N findings of the highest severity seen
    #[arg(long, value_name = "N")]
    max_findings: Option<usize>,

    /// Increase diagnostic logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn report_config(&self) -> ReportConfig {
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };
        ReportConfig::new()
            .with_quiet(self.quiet)
            .with_format(format)
            .with_max_findings(self.max_findings)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = rts_utils::tracing::init(cli.verbose) {
        eprintln!("warning: failed to initialise logging: {e}");
    }

    let status = match execute::verify_file(&cli.path, &cli.report_config()) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    };
    ExitCode::from(u8::try_from(status).unwrap_or(u8::MAX))
}
