//! Per-kind body parsers

use super::records::*;
use super::{Operation, OperationKind};
use crate::extract::{
    extract_bool, extract_file, extract_flag, extract_int, extract_number, extract_parsed,
    extract_pointer, extract_simple_timestamp, extract_start_window, extract_time_window,
    extract_word,
};
use lazy_static::lazy_static;
use regex::Regex;
use rts_core::Result;

lazy_static! {
    static ref TXNID_REGEX: Regex = Regex::new(r"\btxnid=(\d+)\b").unwrap();
    static ref SNAP_MIN_REGEX: Regex =
        Regex::new(r"\brecovery_checkpoint_snap_min=(\d+)\b").unwrap();
    /// `durable_timestamp=(S, T) > stable_timestamp=(S, T): <bool>`
    static ref TREE_DURABLE_GT_STABLE_REGEX: Regex = Regex::new(
        r"durable_timestamp=\(\d+,\s*\d+\)\s*>\s*stable_timestamp=\(\d+,\s*\d+\):\s*(\w+)"
    )
    .unwrap();
    /// `txnid=N > recovery_checkpoint_snap_min=N: <bool>`
    static ref TXNID_GT_SNAP_MIN_REGEX: Regex =
        Regex::new(r"recovery_checkpoint_snap_min=\d+:\s*(\w+)").unwrap();
    /// `stable_timestamp=(S, T) < durable_timestamp=(S, T): <bool>`
    static ref STABLE_LT_DURABLE_REGEX: Regex = Regex::new(
        r"stable_timestamp=\(\d+,\s*\d+\)\s*<\s*durable_timestamp=\(\d+,\s*\d+\):\s*(\w+)"
    )
    .unwrap();
    /// `durable_timestamp > stable_timestamp: <bool>` with no operands
    static ref ONDISK_DURABLE_GT_STABLE_REGEX: Regex =
        Regex::new(r"durable_timestamp\s*>\s*stable_timestamp:\s*(\w+)").unwrap();
    static ref SHUTDOWN_FAILED_REGEX: Regex = Regex::new(r"(?i)\bfail").unwrap();
}

/// Dispatch a body to the parser of `kind`
pub(super) fn parse_body(kind: OperationKind, body: &str) -> Result<Operation> {
    let op = match kind {
        OperationKind::Init => Operation::Init(stable(body)?),
        OperationKind::ShutdownInit => Operation::ShutdownInit(stable(body)?),
        OperationKind::ShutdownRts => Operation::ShutdownRts(ShutdownRtsRecord {
            shutdown_rts_error: SHUTDOWN_FAILED_REGEX.is_match(body),
        }),
        OperationKind::RecoveryRts => Operation::RecoveryRts(RecoveryRtsRecord {
            stable: extract_simple_timestamp(body, "stable_timestamp")?,
            oldest: extract_simple_timestamp(body, "oldest_timestamp")?,
        }),
        OperationKind::RecoverCkpt => Operation::RecoverCkpt(RecoverCkptRecord {
            snapshot_min: extract_number(body, "snapshot_min")?,
            snapshot_max: extract_number(body, "snapshot_max")?,
            snapshot_count: extract_number(body, "snapshot_count")?,
        }),
        OperationKind::Tree => Operation::Tree(tree(body)?),
        OperationKind::TreeLogging => Operation::TreeLogging(TreeLoggingRecord {
            file: extract_file(body)?,
            conn_logging_enabled: extract_flag(body, "connection_logging_enabled")?,
            btree_logging_enabled: extract_flag(body, "btree_logging_enabled")?,
        }),
        OperationKind::TreeSkip => Operation::TreeSkip(TreeSkipRecord {
            file: extract_file(body)?,
            durable: extract_simple_timestamp(body, "durable_timestamp")?,
            stable: extract_simple_timestamp(body, "stable_timestamp")?,
            txnid: extract_int(body, &TXNID_REGEX)?,
        }),
        OperationKind::FileSkip => Operation::FileSkip(file_only(body)?),
        OperationKind::SkipDamage => Operation::SkipDamage(SkipDamageRecord {
            file: extract_file(body)?,
            corrupted: extract_flag(body, "corrupted")?,
        }),
        OperationKind::PageRollback => Operation::PageRollback(PageRollbackRecord {
            file: extract_file(body)?,
            addr: extract_pointer(body, "addr")?,
            modified: extract_flag(body, "modified")?,
        }),
        OperationKind::PageAbortCheck => Operation::PageAbortCheck(PageAbortCheckRecord {
            file: extract_file(body)?,
            page_ref: extract_pointer(body, "ref")?,
            durable: extract_simple_timestamp(body, "durable_timestamp")?,
            newest_txn: extract_number(body, "newest_txn")?,
            has_prepared: extract_flag(body, "has_prepared")?,
            needs_abort: extract_flag(body, "needs_abort")?,
        }),
        OperationKind::StablePgWalkSkip => Operation::StablePgWalkSkip(page_addr(body)?),
        OperationKind::SkipUnmodified => Operation::SkipUnmodified(page_addr(body)?),
        OperationKind::SkipDelNull => Operation::SkipDelNull(SkipDelNullRecord {
            file: extract_file(body)?,
            page_ref: extract_pointer(body, "ref")?,
        }),
        OperationKind::UpdateAbort => Operation::UpdateAbort(UpdateAbortRecord {
            file: extract_file(body)?,
            txnid: extract_int(body, &TXNID_REGEX)?,
            txnid_not_visible: extract_flag(body, "txnid_not_visible")?,
            stable: extract_simple_timestamp(body, "stable_timestamp")?,
            durable: extract_simple_timestamp(body, "durable_timestamp")?,
            stable_lt_durable: extract_bool(body, &STABLE_LT_DURABLE_REGEX)?,
            prepare_state: extract_parsed(body, "prepare_state")?,
        }),
        OperationKind::KeyClearRemove => Operation::KeyClearRemove(KeyClearRemoveRecord {
            file: extract_file(body)?,
            restored_commit: extract_simple_timestamp(body, "restored_commit_timestamp")?,
            restored_durable: extract_simple_timestamp(body, "restored_durable_timestamp")?,
            restored_stable: extract_simple_timestamp(body, "restored_stable_timestamp")?,
            restored_txnid: extract_number(body, "restored_txnid")?,
            removed_commit: extract_simple_timestamp(body, "removed_commit_timestamp")?,
            removed_durable: extract_simple_timestamp(body, "removed_durable_timestamp")?,
            removed_txnid: extract_number(body, "removed_txnid")?,
            removed_prepared: extract_flag(body, "removed_prepared")?,
        }),
        OperationKind::OndiskKvRemove => Operation::OndiskKvRemove(OndiskKvRemoveRecord {
            file: extract_file(body)?,
            tombstone: extract_flag(body, "tombstone")?,
            key: extract_word(body, "key")?.to_string(),
        }),
        OperationKind::OndiskAbortTw => {
            let (durable_start, start, start_txn) = extract_start_window(body)?;
            Operation::OndiskAbortTw(OndiskAbortTwRecord {
                file: extract_file(body)?,
                start,
                durable_start,
                start_txn,
                durable_gt_stable: extract_bool(body, &ONDISK_DURABLE_GT_STABLE_REGEX)?,
                txnid_not_visible: extract_flag(body, "txnid_not_visible")?,
                tw_has_no_stop_and_is_prepared: extract_flag(
                    body,
                    "tw_has_no_stop_and_is_prepared",
                )?,
            })
        }
        OperationKind::OndiskKeyRollback => {
            Operation::OndiskKeyRollback(OndiskKeyRollbackRecord {
                file: extract_file(body)?,
                key: extract_word(body, "key")?.to_string(),
            })
        }
        OperationKind::HsUpdateAbort => Operation::HsUpdateAbort(hs_update(body)?),
        OperationKind::HsUpdateValid => Operation::HsUpdateValid(hs_update(body)?),
        OperationKind::HsUpdateRestored => Operation::HsUpdateRestored(hs_restore(body)?),
        OperationKind::HsGtOndisk => Operation::HsGtOndisk(HsGtOndiskRecord {
            file: extract_file(body)?,
            time_window: extract_time_window(body)?,
            update_type: extract_parsed(body, "type")?,
        }),
        OperationKind::HsStopObsolete => Operation::HsStopObsolete(HsStopObsoleteRecord {
            file: extract_file(body)?,
            time_window: extract_time_window(body)?,
            pinned: extract_simple_timestamp(body, "pinned_timestamp")?,
        }),
        OperationKind::HsTreeRollback => Operation::HsTreeRollback(HsTreeRollbackRecord {
            file: extract_file(body)?,
            durable: extract_simple_timestamp(body, "durable_timestamp")?,
        }),
        OperationKind::HsTreeSkip => Operation::HsTreeSkip(HsTreeSkipRecord {
            file: extract_file(body)?,
            durable: extract_simple_timestamp(body, "durable_timestamp")?,
            stable: extract_simple_timestamp(body, "stable_timestamp")?,
        }),
        OperationKind::HsAbortStop => Operation::HsAbortStop(HsAbortStopRecord {
            file: extract_file(body)?,
            durable_start: extract_simple_timestamp(body, "start_durable_timestamp")?,
            commit_start: extract_simple_timestamp(body, "start_commit_timestamp")?,
            durable_stop: extract_simple_timestamp(body, "stop_durable_timestamp")?,
            commit_stop: extract_simple_timestamp(body, "stop_commit_timestamp")?,
            stable: extract_simple_timestamp(body, "stable_timestamp")?,
        }),
        OperationKind::HsRestoreTombstone => Operation::HsRestoreTombstone(hs_restore(body)?),
        OperationKind::HsTruncated => Operation::HsTruncated(HsTruncatedRecord {
            btree_id: extract_number(body, "btree_id")?,
        }),
        OperationKind::KeyRemoved => Operation::KeyRemoved(file_only(body)?),
        OperationKind::End => Operation::End,
    };
    Ok(op)
}

fn stable(body: &str) -> Result<StableRecord> {
    Ok(StableRecord {
        stable: extract_simple_timestamp(body, "stable_timestamp")?,
    })
}

fn file_only(body: &str) -> Result<FileRecord> {
    Ok(FileRecord {
        file: extract_file(body)?,
    })
}

fn page_addr(body: &str) -> Result<PageAddrRecord> {
    Ok(PageAddrRecord {
        file: extract_file(body)?,
        addr: extract_pointer(body, "addr")?,
    })
}

fn tree(body: &str) -> Result<TreeRecord> {
    Ok(TreeRecord {
        file: extract_file(body)?,
        modified: extract_flag(body, "modified")?,
        durable: extract_simple_timestamp(body, "durable_timestamp")?,
        stable: extract_simple_timestamp(body, "stable_timestamp")?,
        durable_gt_stable: extract_bool(body, &TREE_DURABLE_GT_STABLE_REGEX)?,
        has_prepared_updates: extract_flag(body, "has_prepared_updates")?,
        durable_ts_not_found: extract_flag(body, "durable_timestamp_not_found")?,
        txnid: extract_int(body, &TXNID_REGEX)?,
        recovery_ckpt_snap_min: extract_int(body, &SNAP_MIN_REGEX)?,
        txnid_gt_recov_ckpt_snap_min: extract_bool(body, &TXNID_GT_SNAP_MIN_REGEX)?,
    })
}

fn hs_update(body: &str) -> Result<HsUpdateRecord> {
    Ok(HsUpdateRecord {
        file: extract_file(body)?,
        time_window: extract_time_window(body)?,
        update_type: extract_parsed(body, "type")?,
        stable: extract_simple_timestamp(body, "stable_timestamp")?,
    })
}

fn hs_restore(body: &str) -> Result<HsRestoreRecord> {
    Ok(HsRestoreRecord {
        file: extract_file(body)?,
        txnid: extract_int(body, &TXNID_REGEX)?,
        start: extract_simple_timestamp(body, "start_timestamp")?,
        durable: extract_simple_timestamp(body, "durable_timestamp")?,
    })
}
