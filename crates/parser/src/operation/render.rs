//! Canonical rendering of operations back into log lines

use super::Operation;
use rts_core::{format_pointer, RTS_VERBOSE_CATEGORY};

impl Operation {
    /// Render the full log line, marker included
    pub fn render(&self) -> String {
        let body = self.render_body();
        let tag = self.kind().tag();
        if body.is_empty() {
            format!("[{RTS_VERBOSE_CATEGORY}][DEBUG_1]: [{tag}]")
        } else {
            format!("[{RTS_VERBOSE_CATEGORY}][DEBUG_1]: [{tag}] {body}")
        }
    }

    /// Render only the text following the bracketed tag
    pub fn render_body(&self) -> String {
        match self {
            Operation::Init(r) => format!("stable_timestamp={}", r.stable),
            Operation::ShutdownInit(r) => format!(
                "performing shutdown rollback to stable, stable_timestamp={}",
                r.stable
            ),
            Operation::ShutdownRts(r) => {
                let outcome = if r.shutdown_rts_error {
                    "failed"
                } else {
                    "succeeded"
                };
                format!("performing shutdown rollback to stable {outcome}")
            }
            Operation::RecoveryRts(r) => format!(
                "performing recovery rollback to stable with stable_timestamp={} and oldest_timestamp={}",
                r.stable, r.oldest
            ),
            Operation::RecoverCkpt(r) => format!(
                "recovery checkpoint snapshot_min={}, snapshot_max={}, snapshot_count={}",
                r.snapshot_min, r.snapshot_max, r.snapshot_count
            ),
            Operation::Tree(r) => format!(
                "{} modified={} durable_timestamp={} > stable_timestamp={}: {} has_prepared_updates={} durable_timestamp_not_found={} txnid={} > recovery_checkpoint_snap_min={}: {}",
                r.file,
                r.modified,
                r.durable,
                r.stable,
                r.durable_gt_stable,
                r.has_prepared_updates,
                r.durable_ts_not_found,
                r.txnid,
                r.recovery_ckpt_snap_min,
                r.txnid_gt_recov_ckpt_snap_min
            ),
            Operation::TreeLogging(r) => format!(
                "{} connection_logging_enabled={} btree_logging_enabled={}",
                r.file, r.conn_logging_enabled, r.btree_logging_enabled
            ),
            Operation::TreeSkip(r) => format!(
                "{} skipped: durable_timestamp={} <= stable_timestamp={} txnid={}",
                r.file, r.durable, r.stable, r.txnid
            ),
            Operation::FileSkip(r) => format!("{} skipped", r.file),
            Operation::SkipDamage(r) => format!("{} skipped: corrupted={}", r.file, r.corrupted),
            Operation::PageRollback(r) => format!(
                "{} roll back page addr={} modified={}",
                r.file,
                format_pointer(r.addr),
                r.modified
            ),
            Operation::PageAbortCheck(r) => format!(
                "{} ref={} durable_timestamp={} newest_txn={} has_prepared={} needs_abort={}",
                r.file,
                format_pointer(r.page_ref),
                r.durable,
                r.newest_txn,
                r.has_prepared,
                r.needs_abort
            ),
            Operation::StablePgWalkSkip(r) => format!(
                "{} stable page walk skipping page addr={}",
                r.file,
                format_pointer(r.addr)
            ),
            Operation::SkipUnmodified(r) => format!(
                "{} skipping unmodified page addr={}",
                r.file,
                format_pointer(r.addr)
            ),
            Operation::SkipDelNull(r) => format!(
                "{} skipping deleted page with null page_del ref={}",
                r.file,
                format_pointer(r.page_ref)
            ),
            Operation::UpdateAbort(r) => format!(
                "{} txnid={} txnid_not_visible={} stable_timestamp={} < durable_timestamp={}: {} prepare_state={}",
                r.file,
                r.txnid,
                r.txnid_not_visible,
                r.stable,
                r.durable,
                r.stable_lt_durable,
                r.prepare_state
            ),
            Operation::KeyClearRemove(r) => format!(
                "{} restored_commit_timestamp={} restored_durable_timestamp={} restored_stable_timestamp={} restored_txnid={} removed_commit_timestamp={} removed_durable_timestamp={} removed_txnid={} removed_prepared={}",
                r.file,
                r.restored_commit,
                r.restored_durable,
                r.restored_stable,
                r.restored_txnid,
                r.removed_commit,
                r.removed_durable,
                r.removed_txnid,
                r.removed_prepared
            ),
            Operation::OndiskKvRemove(r) => format!(
                "{} removing key tombstone={} key={}",
                r.file, r.tombstone, r.key
            ),
            Operation::OndiskAbortTw(r) => format!(
                "{} time_window={}/{}/{} durable_timestamp > stable_timestamp: {} txnid_not_visible={} tw_has_no_stop_and_is_prepared={}",
                r.file,
                r.durable_start,
                r.start,
                r.start_txn,
                r.durable_gt_stable,
                r.txnid_not_visible,
                r.tw_has_no_stop_and_is_prepared
            ),
            Operation::OndiskKeyRollback(r) => {
                format!("{} rolling back on-disk key={}", r.file, r.key)
            }
            Operation::HsUpdateAbort(r) | Operation::HsUpdateValid(r) => format!(
                "{} time_window={} type={} stable_timestamp={}",
                r.file, r.time_window, r.update_type, r.stable
            ),
            Operation::HsUpdateRestored(r) | Operation::HsRestoreTombstone(r) => format!(
                "{} txnid={} start_timestamp={} durable_timestamp={}",
                r.file, r.txnid, r.start, r.durable
            ),
            Operation::HsGtOndisk(r) => format!(
                "{} time_window={} type={}",
                r.file, r.time_window, r.update_type
            ),
            Operation::HsStopObsolete(r) => format!(
                "{} time_window={} pinned_timestamp={}",
                r.file, r.time_window, r.pinned
            ),
            Operation::HsTreeRollback(r) => {
                format!("{} durable_timestamp={}", r.file, r.durable)
            }
            Operation::HsTreeSkip(r) => format!(
                "{} durable_timestamp={} stable_timestamp={}",
                r.file, r.durable, r.stable
            ),
            Operation::HsAbortStop(r) => format!(
                "{} start_durable_timestamp={} start_commit_timestamp={} stop_durable_timestamp={} stop_commit_timestamp={} stable_timestamp={}",
                r.file, r.durable_start, r.commit_start, r.durable_stop, r.commit_stop, r.stable
            ),
            Operation::HsTruncated(r) => format!("btree_id={}", r.btree_id),
            Operation::KeyRemoved(r) => r.file.clone(),
            Operation::End => String::new(),
        }
    }
}
