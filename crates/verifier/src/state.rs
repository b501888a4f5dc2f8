//! The reconstructed model of a rollback-to-stable run

use indexmap::{IndexMap, IndexSet};
use rts_core::Timestamp;
use rts_parser::TreeRecord;
use std::fmt::{self, Display};

/// Snapshot bounds of the checkpoint recovery started from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryCheckpoint {
    pub min: u64,
    pub max: u64,
    pub count: u64,
}

/// Why a tree was closed without being rolled back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TreeSkip,
    FileSkip,
    Damage { corrupted: bool },
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TreeSkip => f.write_str("TREE_SKIP"),
            SkipReason::FileSkip => f.write_str("FILE_SKIP"),
            SkipReason::Damage { .. } => f.write_str("SKIP_DAMAGE"),
        }
    }
}

/// The engine's verdict on whether a page needs its updates aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortCheck {
    pub durable: Timestamp,
    pub newest_txn: u64,
    pub has_prepared: bool,
    pub needs_abort: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub addr: u64,
    pub modified: bool,
    pub abort_check: Option<AbortCheck>,
    pub aborted_updates: u64,
    /// Aborted updates whose transaction was in a prepare state
    pub prepared_aborts: u64,
    pub keys_cleared: u64,
}

impl PageState {
    pub fn new(addr: u64, modified: bool) -> Self {
        Self {
            addr,
            modified,
            abort_check: None,
            aborted_updates: 0,
            prepared_aborts: 0,
            keys_cleared: 0,
        }
    }
}

/// The most recent abort check on a tree, kept until the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingAbortCheck {
    pub page: u64,
    pub needs_abort: bool,
    pub reported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeState {
    pub file: String,
    pub durable: Timestamp,
    pub stable_at_tree_open: Timestamp,
    pub modified: bool,
    pub has_prepared: bool,
    pub logging_enabled: Option<bool>,
    /// Pages in first-seen order
    pub pages: IndexMap<u64, PageState>,
    /// Keys in first-seen order
    pub keys_touched: IndexSet<String>,
    pub hs_rolled_back: bool,
    /// History store restores (updates and tombstones); the log names no key
    pub hs_restores: u64,
    /// Pages the engine walked past without rolling back
    pub skipped_pages: u64,
    pub skipped: Option<SkipReason>,
    pub(crate) last_page: Option<u64>,
    pub(crate) pending_abort_check: Option<PendingAbortCheck>,
}

impl TreeState {
    fn empty(file: String) -> Self {
        Self {
            file,
            durable: Timestamp::NONE,
            stable_at_tree_open: Timestamp::NONE,
            modified: false,
            has_prepared: false,
            logging_enabled: None,
            pages: IndexMap::new(),
            keys_touched: IndexSet::new(),
            hs_rolled_back: false,
            hs_restores: 0,
            skipped_pages: 0,
            skipped: None,
            last_page: None,
            pending_abort_check: None,
        }
    }

    /// A tree first seen through a skip event, never opened by TREE
    pub fn closed(file: impl Into<String>, reason: SkipReason) -> Self {
        let mut tree = Self::empty(file.into());
        tree.skipped = Some(reason);
        tree
    }

    pub fn opened(record: &TreeRecord) -> Self {
        let mut tree = Self::empty(record.file.clone());
        tree.reopen(record);
        tree
    }

    /// Overwrite the tree-level fields from a (repeated) TREE event
    pub fn reopen(&mut self, record: &TreeRecord) {
        self.durable = record.durable;
        self.stable_at_tree_open = record.stable;
        self.modified = record.modified;
        self.has_prepared = record.has_prepared_updates;
        self.skipped = None;
    }

    /// Address of the page update-level events currently attach to
    pub fn enclosing_page(&self) -> Option<u64> {
        self.last_page
    }
}

/// Everything known about one run after folding its operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    /// Zero until the first INIT / RECOVERY_RTS / SHUTDOWN_INIT
    pub stable_timestamp: Timestamp,
    pub oldest_timestamp: Option<Timestamp>,
    pub recovery_ckpt: Option<RecoveryCheckpoint>,
    /// Trees in first-opened order
    pub trees: IndexMap<String, TreeState>,
    pub current_tree: Option<String>,
    pub shutdown_seen: bool,
    pub rts_error: bool,
    /// Btree ids whose history store content was truncated
    pub hs_truncated: Vec<u64>,
    /// Set by END; any further operation is an input error
    pub sealed: bool,
    pub operations: u64,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self, file: &str) -> Option<&TreeState> {
        self.trees.get(file)
    }

    pub fn page_count(&self) -> usize {
        self.trees.values().map(|t| t.pages.len()).sum()
    }
}
