/// How findings are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One human-readable line per finding, followed by a summary
    #[default]
    Text,
    /// One JSON object per line, nothing else
    Json,
}

/// Report options, built up from command line flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportConfig {
    quiet: bool,
    format: OutputFormat,
    max_findings: Option<usize>,
}

impl ReportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress INFO and WARN findings
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Stop after the N-th finding of the highest reported severity
    pub fn with_max_findings(mut self, max: Option<usize>) -> Self {
        self.max_findings = max;
        self
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn max_findings(&self) -> Option<usize> {
        self.max_findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::new();
        assert!(!config.quiet());
        assert_eq!(config.format(), OutputFormat::Text);
        assert_eq!(config.max_findings(), None);
    }

    #[test]
    fn test_builder_chain() {
        let config = ReportConfig::new()
            .with_quiet(true)
            .with_format(OutputFormat::Json)
            .with_max_findings(Some(3));
        assert!(config.quiet());
        assert_eq!(config.format(), OutputFormat::Json);
        assert_eq!(config.max_findings(), Some(3));
    }
}
