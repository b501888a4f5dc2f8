//! The operation model: one variant per RTS event kind
//!
//! `Operation::parse` classifies a line, looks the lowercase tag symbol up in
//! the kind table and hands the body to that kind's parser. `Operation::render`
//! is the canonical inverse used by tests and fixtures.

mod parse;
mod records;
mod render;

pub use records::*;

use crate::frame::{classify, Frame};
use rts_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Every event kind the verifier understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Init,
    ShutdownInit,
    ShutdownRts,
    RecoveryRts,
    RecoverCkpt,
    Tree,
    TreeLogging,
    TreeSkip,
    FileSkip,
    SkipDamage,
    PageRollback,
    PageAbortCheck,
    StablePgWalkSkip,
    SkipUnmodified,
    SkipDelNull,
    UpdateAbort,
    KeyClearRemove,
    OndiskKvRemove,
    OndiskAbortTw,
    OndiskKeyRollback,
    HsUpdateAbort,
    HsUpdateValid,
    HsUpdateRestored,
    HsGtOndisk,
    HsStopObsolete,
    HsTreeRollback,
    HsTreeSkip,
    HsAbortStop,
    HsRestoreTombstone,
    HsTruncated,
    KeyRemoved,
    End,
}

/// Tag symbol table, in the order the kinds appear in a typical run
const KIND_TABLE: [(&str, OperationKind); 32] = [
    ("init", OperationKind::Init),
    ("shutdown_init", OperationKind::ShutdownInit),
    ("shutdown_rts", OperationKind::ShutdownRts),
    ("recovery_rts", OperationKind::RecoveryRts),
    ("recover_ckpt", OperationKind::RecoverCkpt),
    ("tree", OperationKind::Tree),
    ("tree_logging", OperationKind::TreeLogging),
    ("tree_skip", OperationKind::TreeSkip),
    ("file_skip", OperationKind::FileSkip),
    ("skip_damage", OperationKind::SkipDamage),
    ("page_rollback", OperationKind::PageRollback),
    ("page_abort_check", OperationKind::PageAbortCheck),
    ("stable_pg_walk_skip", OperationKind::StablePgWalkSkip),
    ("skip_unmodified", OperationKind::SkipUnmodified),
    ("skip_del_null", OperationKind::SkipDelNull),
    ("update_abort", OperationKind::UpdateAbort),
    ("key_clear_remove", OperationKind::KeyClearRemove),
    ("ondisk_kv_remove", OperationKind::OndiskKvRemove),
    ("ondisk_abort_tw", OperationKind::OndiskAbortTw),
    ("ondisk_key_rollback", OperationKind::OndiskKeyRollback),
    ("hs_update_abort", OperationKind::HsUpdateAbort),
    ("hs_update_valid", OperationKind::HsUpdateValid),
    ("hs_update_restored", OperationKind::HsUpdateRestored),
    ("hs_gt_ondisk", OperationKind::HsGtOndisk),
    ("hs_stop_obsolete", OperationKind::HsStopObsolete),
    ("hs_tree_rollback", OperationKind::HsTreeRollback),
    ("hs_tree_skip", OperationKind::HsTreeSkip),
    ("hs_abort_stop", OperationKind::HsAbortStop),
    ("hs_restore_tombstone", OperationKind::HsRestoreTombstone),
    ("hs_truncated", OperationKind::HsTruncated),
    ("key_removed", OperationKind::KeyRemoved),
    ("end", OperationKind::End),
];

impl OperationKind {
    /// All kinds, in table order
    pub fn all() -> impl Iterator<Item = OperationKind> {
        KIND_TABLE.iter().map(|(_, kind)| *kind)
    }

    /// Look a lowercase tag symbol up in the kind table
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        KIND_TABLE
            .iter()
            .find(|(name, _)| *name == symbol)
            .map(|(_, kind)| *kind)
    }

    /// The lowercase tag symbol, e.g. `hs_update_abort`
    pub fn symbol(&self) -> &'static str {
        KIND_TABLE
            .iter()
            .find(|(_, kind)| kind == self)
            .map_or("unknown", |(name, _)| name)
    }

    /// The tag as it appears in the log, e.g. `HS_UPDATE_ABORT`
    pub fn tag(&self) -> String {
        self.symbol().to_ascii_uppercase()
    }

    /// Whether the kind must be preceded by an open TREE for its file
    pub fn requires_tree(&self) -> bool {
        matches!(
            self,
            OperationKind::PageRollback
                | OperationKind::PageAbortCheck
                | OperationKind::UpdateAbort
                | OperationKind::OndiskKvRemove
                | OperationKind::OndiskAbortTw
                | OperationKind::OndiskKeyRollback
                | OperationKind::HsUpdateAbort
                | OperationKind::HsUpdateValid
                | OperationKind::HsUpdateRestored
                | OperationKind::HsGtOndisk
                | OperationKind::HsStopObsolete
                | OperationKind::HsTreeRollback
                | OperationKind::HsTreeSkip
                | OperationKind::HsAbortStop
                | OperationKind::HsRestoreTombstone
        )
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// One parsed RTS event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Init(StableRecord),
    ShutdownInit(StableRecord),
    ShutdownRts(ShutdownRtsRecord),
    RecoveryRts(RecoveryRtsRecord),
    RecoverCkpt(RecoverCkptRecord),
    Tree(TreeRecord),
    TreeLogging(TreeLoggingRecord),
    TreeSkip(TreeSkipRecord),
    FileSkip(FileRecord),
    SkipDamage(SkipDamageRecord),
    PageRollback(PageRollbackRecord),
    PageAbortCheck(PageAbortCheckRecord),
    StablePgWalkSkip(PageAddrRecord),
    SkipUnmodified(PageAddrRecord),
    SkipDelNull(SkipDelNullRecord),
    UpdateAbort(UpdateAbortRecord),
    KeyClearRemove(KeyClearRemoveRecord),
    OndiskKvRemove(OndiskKvRemoveRecord),
    OndiskAbortTw(OndiskAbortTwRecord),
    OndiskKeyRollback(OndiskKeyRollbackRecord),
    HsUpdateAbort(HsUpdateRecord),
    HsUpdateValid(HsUpdateRecord),
    HsUpdateRestored(HsRestoreRecord),
    HsGtOndisk(HsGtOndiskRecord),
    HsStopObsolete(HsStopObsoleteRecord),
    HsTreeRollback(HsTreeRollbackRecord),
    HsTreeSkip(HsTreeSkipRecord),
    HsAbortStop(HsAbortStopRecord),
    HsRestoreTombstone(HsRestoreRecord),
    HsTruncated(HsTruncatedRecord),
    KeyRemoved(FileRecord),
    End,
}

impl Operation {
    /// Parse one RTS-tagged line.
    ///
    /// Lines that are not RTS-tagged are an input error here; use
    /// [`Operation::parse_frame`] on the output of [`classify`] to filter.
    pub fn parse(line: &str) -> Result<Self> {
        match classify(line)? {
            Some(frame) => Self::parse_frame(&frame),
            None => Err(Error::malformed(
                line,
                "[WT_VERB_RTS][DEBUG_<d>]: [<TAG>]",
                "not an RTS-tagged line",
            )),
        }
    }

    /// Parse the body of an already classified line
    pub fn parse_frame(frame: &Frame<'_>) -> Result<Self> {
        let kind = OperationKind::from_symbol(&frame.tag)
            .ok_or_else(|| Error::unknown_tag(frame.tag.to_ascii_uppercase(), frame.line))?;
        parse::parse_body(kind, frame.body).map_err(|err| match err {
            Error::MalformedInput {
                line_number,
                pattern,
                message,
                ..
            } => Error::MalformedInput {
                line_number,
                line: frame.line.to_string(),
                pattern,
                message,
            },
            other => other,
        })
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Init(_) => OperationKind::Init,
            Operation::ShutdownInit(_) => OperationKind::ShutdownInit,
            Operation::ShutdownRts(_) => OperationKind::ShutdownRts,
            Operation::RecoveryRts(_) => OperationKind::RecoveryRts,
            Operation::RecoverCkpt(_) => OperationKind::RecoverCkpt,
            Operation::Tree(_) => OperationKind::Tree,
            Operation::TreeLogging(_) => OperationKind::TreeLogging,
            Operation::TreeSkip(_) => OperationKind::TreeSkip,
            Operation::FileSkip(_) => OperationKind::FileSkip,
            Operation::SkipDamage(_) => OperationKind::SkipDamage,
            Operation::PageRollback(_) => OperationKind::PageRollback,
            Operation::PageAbortCheck(_) => OperationKind::PageAbortCheck,
            Operation::StablePgWalkSkip(_) => OperationKind::StablePgWalkSkip,
            Operation::SkipUnmodified(_) => OperationKind::SkipUnmodified,
            Operation::SkipDelNull(_) => OperationKind::SkipDelNull,
            Operation::UpdateAbort(_) => OperationKind::UpdateAbort,
            Operation::KeyClearRemove(_) => OperationKind::KeyClearRemove,
            Operation::OndiskKvRemove(_) => OperationKind::OndiskKvRemove,
            Operation::OndiskAbortTw(_) => OperationKind::OndiskAbortTw,
            Operation::OndiskKeyRollback(_) => OperationKind::OndiskKeyRollback,
            Operation::HsUpdateAbort(_) => OperationKind::HsUpdateAbort,
            Operation::HsUpdateValid(_) => OperationKind::HsUpdateValid,
            Operation::HsUpdateRestored(_) => OperationKind::HsUpdateRestored,
            Operation::HsGtOndisk(_) => OperationKind::HsGtOndisk,
            Operation::HsStopObsolete(_) => OperationKind::HsStopObsolete,
            Operation::HsTreeRollback(_) => OperationKind::HsTreeRollback,
            Operation::HsTreeSkip(_) => OperationKind::HsTreeSkip,
            Operation::HsAbortStop(_) => OperationKind::HsAbortStop,
            Operation::HsRestoreTombstone(_) => OperationKind::HsRestoreTombstone,
            Operation::HsTruncated(_) => OperationKind::HsTruncated,
            Operation::KeyRemoved(_) => OperationKind::KeyRemoved,
            Operation::End => OperationKind::End,
        }
    }

    /// The file URI the operation concerns, if its kind names one
    pub fn file(&self) -> Option<&str> {
        let file = match self {
            Operation::Tree(r) => &r.file,
            Operation::TreeLogging(r) => &r.file,
            Operation::TreeSkip(r) => &r.file,
            Operation::FileSkip(r) | Operation::KeyRemoved(r) => &r.file,
            Operation::SkipDamage(r) => &r.file,
            Operation::PageRollback(r) => &r.file,
            Operation::PageAbortCheck(r) => &r.file,
            Operation::StablePgWalkSkip(r) | Operation::SkipUnmodified(r) => &r.file,
            Operation::SkipDelNull(r) => &r.file,
            Operation::UpdateAbort(r) => &r.file,
            Operation::KeyClearRemove(r) => &r.file,
            Operation::OndiskKvRemove(r) => &r.file,
            Operation::OndiskAbortTw(r) => &r.file,
            Operation::OndiskKeyRollback(r) => &r.file,
            Operation::HsUpdateAbort(r) | Operation::HsUpdateValid(r) => &r.file,
            Operation::HsUpdateRestored(r) | Operation::HsRestoreTombstone(r) => &r.file,
            Operation::HsGtOndisk(r) => &r.file,
            Operation::HsStopObsolete(r) => &r.file,
            Operation::HsTreeRollback(r) => &r.file,
            Operation::HsTreeSkip(r) => &r.file,
            Operation::HsAbortStop(r) => &r.file,
            Operation::Init(_)
            | Operation::ShutdownInit(_)
            | Operation::ShutdownRts(_)
            | Operation::RecoveryRts(_)
            | Operation::RecoverCkpt(_)
            | Operation::HsTruncated(_)
            | Operation::End => return None,
        };
        Some(file)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
