//! Field records carried by each operation kind

use rts_core::{PrepareState, TimeWindow, Timestamp, UpdateType};
use serde::{Deserialize, Serialize};

/// INIT and SHUTDOWN_INIT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableRecord {
    pub stable: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownRtsRecord {
    pub shutdown_rts_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRtsRecord {
    pub stable: Timestamp,
    pub oldest: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverCkptRecord {
    pub snapshot_min: u64,
    pub snapshot_max: u64,
    pub snapshot_count: u64,
}

/// A tree considered for rollback, with every reason the engine weighed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub file: String,
    pub modified: bool,
    pub durable: Timestamp,
    pub stable: Timestamp,
    pub durable_gt_stable: bool,
    pub has_prepared_updates: bool,
    pub durable_ts_not_found: bool,
    pub txnid: u64,
    pub recovery_ckpt_snap_min: u64,
    pub txnid_gt_recov_ckpt_snap_min: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLoggingRecord {
    pub file: String,
    pub conn_logging_enabled: bool,
    pub btree_logging_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSkipRecord {
    pub file: String,
    pub durable: Timestamp,
    pub stable: Timestamp,
    pub txnid: u64,
}

/// FILE_SKIP and KEY_REMOVED
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipDamageRecord {
    pub file: String,
    pub corrupted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRollbackRecord {
    pub file: String,
    pub addr: u64,
    pub modified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAbortCheckRecord {
    pub file: String,
    #[serde(rename = "ref")]
    pub page_ref: u64,
    pub durable: Timestamp,
    pub newest_txn: u64,
    pub has_prepared: bool,
    pub needs_abort: bool,
}

/// STABLE_PG_WALK_SKIP and SKIP_UNMODIFIED
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAddrRecord {
    pub file: String,
    pub addr: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipDelNullRecord {
    pub file: String,
    #[serde(rename = "ref")]
    pub page_ref: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAbortRecord {
    pub file: String,
    pub txnid: u64,
    pub txnid_not_visible: bool,
    pub stable: Timestamp,
    pub durable: Timestamp,
    pub stable_lt_durable: bool,
    pub prepare_state: PrepareState,
}

/// An aborted update replaced by an older one restored from the key's chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyClearRemoveRecord {
    pub file: String,
    pub restored_commit: Timestamp,
    pub restored_durable: Timestamp,
    pub restored_stable: Timestamp,
    pub restored_txnid: u64,
    pub removed_commit: Timestamp,
    pub removed_durable: Timestamp,
    pub removed_txnid: u64,
    pub removed_prepared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OndiskKvRemoveRecord {
    pub file: String,
    pub tombstone: bool,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OndiskAbortTwRecord {
    pub file: String,
    pub start: Timestamp,
    pub durable_start: Timestamp,
    pub start_txn: u64,
    pub durable_gt_stable: bool,
    pub txnid_not_visible: bool,
    pub tw_has_no_stop_and_is_prepared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OndiskKeyRollbackRecord {
    pub file: String,
    pub key: String,
}

/// HS_UPDATE_ABORT and HS_UPDATE_VALID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsUpdateRecord {
    pub file: String,
    pub time_window: TimeWindow,
    pub update_type: UpdateType,
    pub stable: Timestamp,
}

/// HS_UPDATE_RESTORED and HS_RESTORE_TOMBSTONE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsRestoreRecord {
    pub file: String,
    pub txnid: u64,
    pub start: Timestamp,
    pub durable: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsGtOndiskRecord {
    pub file: String,
    pub time_window: TimeWindow,
    pub update_type: UpdateType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsStopObsoleteRecord {
    pub file: String,
    pub time_window: TimeWindow,
    pub pinned: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsTreeRollbackRecord {
    pub file: String,
    pub durable: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsTreeSkipRecord {
    pub file: String,
    pub durable: Timestamp,
    pub stable: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsAbortStopRecord {
    pub file: String,
    pub durable_start: Timestamp,
    pub commit_start: Timestamp,
    pub durable_stop: Timestamp,
    pub commit_stop: Timestamp,
    pub stable: Timestamp,
}

impl HsAbortStopRecord {
    /// The record's timestamps arranged as a time window
    pub fn time_window(&self) -> TimeWindow {
        TimeWindow {
            durable_start: self.durable_start,
            start: self.commit_start,
            start_txn: 0,
            durable_stop: self.durable_stop,
            stop: self.commit_stop,
            stop_txn: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsTruncatedRecord {
    pub btree_id: u64,
}
