//! Findings produced by the rule engine

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// How serious a finding is. Only `Error` affects the exit status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of the rule that produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCode {
    StableRegression,
    CkptRangeInverted,
    TreeReentry,
    TreeLoggingInconsistent,
    PageModifiedDowngrade,
    SpuriousAbort,
    UpdateWithoutPage,
    RestoredAheadOfStable,
    TwAbortWithoutReason,
    HsTwInvalid,
    HsRollbackUnnecessary,
    HsSkipSuspicious,
    MissingTree,
    EventAfterSkip,
    PredicateMismatch,
    UpdateAbortWithoutReason,
    AbortCheckInconsistent,
    StableMismatch,
    OldestAheadOfStable,
    TreeSkipAheadOfStable,
    TreeDamaged,
    HsTruncated,
}

impl FindingCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCode::StableRegression => "stable_regression",
            FindingCode::CkptRangeInverted => "ckpt_range_inverted",
            FindingCode::TreeReentry => "tree_reentry",
            FindingCode::TreeLoggingInconsistent => "tree_logging_inconsistent",
            FindingCode::PageModifiedDowngrade => "page_modified_downgrade",
            FindingCode::SpuriousAbort => "spurious_abort",
            FindingCode::UpdateWithoutPage => "update_without_page",
            FindingCode::RestoredAheadOfStable => "restored_ahead_of_stable",
            FindingCode::TwAbortWithoutReason => "tw_abort_without_reason",
            FindingCode::HsTwInvalid => "hs_tw_invalid",
            FindingCode::HsRollbackUnnecessary => "hs_rollback_unnecessary",
            FindingCode::HsSkipSuspicious => "hs_skip_suspicious",
            FindingCode::MissingTree => "missing_tree",
            FindingCode::EventAfterSkip => "event_after_skip",
            FindingCode::PredicateMismatch => "predicate_mismatch",
            FindingCode::UpdateAbortWithoutReason => "update_abort_without_reason",
            FindingCode::AbortCheckInconsistent => "abort_check_inconsistent",
            FindingCode::StableMismatch => "stable_mismatch",
            FindingCode::OldestAheadOfStable => "oldest_ahead_of_stable",
            FindingCode::TreeSkipAheadOfStable => "tree_skip_ahead_of_stable",
            FindingCode::TreeDamaged => "tree_damaged",
            FindingCode::HsTruncated => "hs_truncated",
        }
    }

    /// The severity every finding with this code carries
    pub fn severity(&self) -> Severity {
        match self {
            FindingCode::StableRegression
            | FindingCode::CkptRangeInverted
            | FindingCode::TreeLoggingInconsistent
            | FindingCode::RestoredAheadOfStable
            | FindingCode::TwAbortWithoutReason
            | FindingCode::HsTwInvalid
            | FindingCode::MissingTree
            | FindingCode::EventAfterSkip
            | FindingCode::PredicateMismatch
            | FindingCode::UpdateAbortWithoutReason
            | FindingCode::AbortCheckInconsistent => Severity::Error,
            FindingCode::TreeReentry
            | FindingCode::PageModifiedDowngrade
            | FindingCode::SpuriousAbort
            | FindingCode::UpdateWithoutPage
            | FindingCode::HsRollbackUnnecessary
            | FindingCode::HsSkipSuspicious
            | FindingCode::StableMismatch
            | FindingCode::OldestAheadOfStable
            | FindingCode::TreeSkipAheadOfStable
            | FindingCode::TreeDamaged => Severity::Warn,
            FindingCode::HsTruncated => Severity::Info,
        }
    }
}

impl Display for FindingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured observation about one operation of the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub code: FindingCode,
    pub line_number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub message: String,
}

impl Finding {
    /// Create a finding; the severity follows from the code
    pub fn new(code: FindingCode, line_number: u64, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            line_number,
            tree: None,
            page: None,
            key: None,
            message: message.into(),
        }
    }

    pub fn with_tree(mut self, tree: impl Into<String>) -> Self {
        self.tree = Some(tree.into());
        self
    }

    /// Attach a page, rendered the way the engine prints pointers
    pub fn with_page(mut self, addr: u64) -> Self {
        self.page = Some(format_pointer(addr));
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (line {}): {}",
            self.severity, self.code, self.line_number, self.message
        )?;

        let location: Vec<String> = [
            self.tree.as_ref().map(|t| format!("tree={t}")),
            self.page.as_ref().map(|p| format!("page={p}")),
            self.key.as_ref().map(|k| format!("key={k}")),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !location.is_empty() {
            write!(f, " [{}]", location.join(" "))?;
        }
        Ok(())
    }
}

/// Render a page pointer as `0x<hex>`
pub fn format_pointer(addr: u64) -> String {
    format!("{addr:#x}")
}
