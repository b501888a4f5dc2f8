//! Consistency rules, evaluated one operation at a time
//!
//! [`evaluate`] is the pure shape `(state, entry) -> (state, findings)`;
//! [`apply`] is the same fold done in place. Findings are append-only and the
//! model is updated even when a rule fires, except where a rule says the
//! offending value must not be taken (a regressing stable timestamp).

use crate::state::{
    AbortCheck, PageState, PendingAbortCheck, RecoveryCheckpoint, RunState, SkipReason, TreeState,
};
use indexmap::IndexMap;
use rts_core::{Error, Finding, FindingCode, PrepareState, Result, TimeWindow, Timestamp};
use rts_parser::{
    Entry, HsTreeRollbackRecord, HsTreeSkipRecord, KeyClearRemoveRecord, OndiskAbortTwRecord,
    Operation, OperationKind, PageAbortCheckRecord, PageRollbackRecord, RecoverCkptRecord,
    RecoveryRtsRecord, TreeLoggingRecord, TreeRecord, UpdateAbortRecord,
};

/// Evaluate one entry against a pre-state, returning the post-state and the
/// findings the entry produced.
pub fn evaluate(mut state: RunState, entry: &Entry) -> Result<(RunState, Vec<Finding>)> {
    let findings = apply(&mut state, entry)?;
    Ok((state, findings))
}

/// Fold one entry into `state` and return the findings it produced.
///
/// The only error is an operation arriving after END.
pub fn apply(state: &mut RunState, entry: &Entry) -> Result<Vec<Finding>> {
    if state.sealed {
        return Err(Error::sealed_run(
            entry.line_number,
            entry.operation.kind().tag(),
        ));
    }
    state.operations += 1;

    let mut evaluation = Evaluation {
        state,
        line: entry.line_number,
        findings: Vec::new(),
    };
    evaluation.dispatch(&entry.operation);
    Ok(evaluation.findings)
}

struct Evaluation<'a> {
    state: &'a mut RunState,
    line: u64,
    findings: Vec<Finding>,
}

impl Evaluation<'_> {
    fn dispatch(&mut self, operation: &Operation) {
        let kind = operation.kind();
        match operation {
            Operation::Init(r) => self.advance_stable(kind, r.stable),
            Operation::ShutdownInit(r) => {
                self.state.shutdown_seen = true;
                self.advance_stable(kind, r.stable);
            }
            Operation::RecoveryRts(r) => self.recovery_rts(r),
            Operation::RecoverCkpt(r) => self.recover_ckpt(r),
            Operation::ShutdownRts(r) => {
                self.state.rts_error |= r.shutdown_rts_error;
            }
            Operation::Tree(r) => self.open_tree(r),
            Operation::TreeLogging(r) => self.tree_logging(r),
            Operation::TreeSkip(r) => {
                if r.durable > r.stable {
                    self.findings.push(
                        Finding::new(
                            FindingCode::TreeSkipAheadOfStable,
                            self.line,
                            format!(
                                "tree skipped although durable timestamp {} is ahead of stable {}",
                                r.durable, r.stable
                            ),
                        )
                        .with_tree(&r.file),
                    );
                }
                self.close_tree(&r.file, SkipReason::TreeSkip);
            }
            Operation::FileSkip(r) => self.close_tree(&r.file, SkipReason::FileSkip),
            Operation::SkipDamage(r) => {
                if r.corrupted {
                    self.findings.push(
                        Finding::new(
                            FindingCode::TreeDamaged,
                            self.line,
                            "tree skipped because it is corrupted",
                        )
                        .with_tree(&r.file),
                    );
                }
                self.close_tree(
                    &r.file,
                    SkipReason::Damage {
                        corrupted: r.corrupted,
                    },
                );
            }
            Operation::PageRollback(r) => self.page_rollback(r),
            Operation::PageAbortCheck(r) => self.page_abort_check(r),
            Operation::StablePgWalkSkip(r) | Operation::SkipUnmodified(r) => {
                if let Some(tree) = self.resolve(kind, &r.file) {
                    tree.skipped_pages += 1;
                }
            }
            Operation::SkipDelNull(r) => {
                if let Some(tree) = self.resolve(kind, &r.file) {
                    tree.skipped_pages += 1;
                }
            }
            Operation::UpdateAbort(r) => self.update_abort(r),
            Operation::KeyClearRemove(r) => self.key_clear_remove(r),
            Operation::OndiskKvRemove(r) => self.touch_key(kind, &r.file, &r.key),
            Operation::OndiskKeyRollback(r) => self.touch_key(kind, &r.file, &r.key),
            Operation::OndiskAbortTw(r) => self.ondisk_abort_tw(r),
            Operation::HsUpdateAbort(r) | Operation::HsUpdateValid(r) => {
                self.check_time_window(kind, &r.file, &r.time_window);
                self.check_stable(kind, &r.file, r.stable);
                self.resolve(kind, &r.file);
            }
            Operation::HsGtOndisk(r) => {
                self.check_time_window(kind, &r.file, &r.time_window);
                self.resolve(kind, &r.file);
            }
            Operation::HsStopObsolete(r) => {
                self.check_time_window(kind, &r.file, &r.time_window);
                self.resolve(kind, &r.file);
            }
            Operation::HsAbortStop(r) => {
                self.check_time_window(kind, &r.file, &r.time_window());
                self.resolve(kind, &r.file);
            }
            Operation::HsUpdateRestored(r) | Operation::HsRestoreTombstone(r) => {
                if let Some(tree) = self.resolve(kind, &r.file) {
                    tree.hs_restores += 1;
                }
            }
            Operation::HsTreeRollback(r) => self.hs_tree_rollback(r),
            Operation::HsTreeSkip(r) => self.hs_tree_skip(r),
            Operation::HsTruncated(r) => {
                self.state.hs_truncated.push(r.btree_id);
                self.findings.push(Finding::new(
                    FindingCode::HsTruncated,
                    self.line,
                    format!(
                        "history store truncated for btree id {}; the log does not name its file",
                        r.btree_id
                    ),
                ));
            }
            Operation::KeyRemoved(r) => {
                self.resolve(kind, &r.file);
            }
            Operation::End => self.state.sealed = true,
        }
    }

    /// Look up the tree a tree-scoped event names.
    ///
    /// Returns the tree only while it is open. A closed tree yields
    /// `event_after_skip`; an unknown tree yields `missing_tree` for kinds
    /// that require one.
    fn resolve(&mut self, kind: OperationKind, file: &str) -> Option<&mut TreeState> {
        resolve_tree(
            &mut self.state.trees,
            &mut self.findings,
            self.line,
            kind,
            file,
        )
    }

    fn advance_stable(&mut self, kind: OperationKind, stable: Timestamp) {
        let previous = self.state.stable_timestamp;
        if previous.is_set() && stable < previous {
            self.findings.push(Finding::new(
                FindingCode::StableRegression,
                self.line,
                format!("{kind} stable timestamp {stable} is behind the previous stable {previous}"),
            ));
            return;
        }
        self.state.stable_timestamp = stable;
    }

    fn recovery_rts(&mut self, r: &RecoveryRtsRecord) {
        self.advance_stable(OperationKind::RecoveryRts, r.stable);
        self.state.oldest_timestamp = Some(r.oldest);
        if r.oldest > r.stable {
            self.findings.push(Finding::new(
                FindingCode::OldestAheadOfStable,
                self.line,
                format!(
                    "oldest timestamp {} is ahead of stable {}",
                    r.oldest, r.stable
                ),
            ));
        }
    }

    fn recover_ckpt(&mut self, r: &RecoverCkptRecord) {
        self.state.recovery_ckpt = Some(RecoveryCheckpoint {
            min: r.snapshot_min,
            max: r.snapshot_max,
            count: r.snapshot_count,
        });
        if r.snapshot_min > r.snapshot_max {
            self.findings.push(Finding::new(
                FindingCode::CkptRangeInverted,
                self.line,
                format!(
                    "recovery checkpoint snapshot_min {} is greater than snapshot_max {}",
                    r.snapshot_min, r.snapshot_max
                ),
            ));
        }
    }

    fn open_tree(&mut self, r: &TreeRecord) {
        self.check_stable(OperationKind::Tree, &r.file, r.stable);

        if (r.durable > r.stable) != r.durable_gt_stable {
            self.findings.push(
                Finding::new(
                    FindingCode::PredicateMismatch,
                    self.line,
                    format!(
                        "logged durable {} > stable {} as {} but it is {}",
                        r.durable,
                        r.stable,
                        r.durable_gt_stable,
                        r.durable > r.stable
                    ),
                )
                .with_tree(&r.file),
            );
        }
        if (r.txnid > r.recovery_ckpt_snap_min) != r.txnid_gt_recov_ckpt_snap_min {
            self.findings.push(
                Finding::new(
                    FindingCode::PredicateMismatch,
                    self.line,
                    format!(
                        "logged txnid {} > recovery checkpoint snap_min {} as {} but it is {}",
                        r.txnid,
                        r.recovery_ckpt_snap_min,
                        r.txnid_gt_recov_ckpt_snap_min,
                        r.txnid > r.recovery_ckpt_snap_min
                    ),
                )
                .with_tree(&r.file),
            );
        }

        match self.state.trees.get_mut(&r.file) {
            Some(tree) => {
                self.findings.push(
                    Finding::new(
                        FindingCode::TreeReentry,
                        self.line,
                        "tree considered for rollback more than once",
                    )
                    .with_tree(&r.file),
                );
                tree.reopen(r);
            }
            None => {
                self.state
                    .trees
                    .insert(r.file.clone(), TreeState::opened(r));
            }
        }
        self.state.current_tree = Some(r.file.clone());
    }

    fn tree_logging(&mut self, r: &TreeLoggingRecord) {
        if !r.conn_logging_enabled && r.btree_logging_enabled {
            self.findings.push(
                Finding::new(
                    FindingCode::TreeLoggingInconsistent,
                    self.line,
                    "btree logging enabled while connection logging is disabled",
                )
                .with_tree(&r.file),
            );
        }
        if let Some(tree) = self.resolve(OperationKind::TreeLogging, &r.file) {
            tree.logging_enabled = Some(r.btree_logging_enabled);
        }
    }

    fn close_tree(&mut self, file: &str, reason: SkipReason) {
        match self.state.trees.get_mut(file) {
            Some(tree) => tree.skipped = Some(reason),
            None => {
                self.state
                    .trees
                    .insert(file.to_string(), TreeState::closed(file, reason));
            }
        }
        if self.state.current_tree.as_deref() == Some(file) {
            self.state.current_tree = None;
        }
    }

    fn page_rollback(&mut self, r: &PageRollbackRecord) {
        let line = self.line;
        let Some(tree) = resolve_tree(
            &mut self.state.trees,
            &mut self.findings,
            line,
            OperationKind::PageRollback,
            &r.file,
        ) else {
            return;
        };

        match tree.pages.get_mut(&r.addr) {
            Some(page) => {
                if page.modified && !r.modified {
                    self.findings.push(
                        Finding::new(
                            FindingCode::PageModifiedDowngrade,
                            line,
                            "page previously rolled back as modified is now unmodified",
                        )
                        .with_tree(&r.file)
                        .with_page(r.addr),
                    );
                }
                page.modified = r.modified;
            }
            None => {
                tree.pages.insert(r.addr, PageState::new(r.addr, r.modified));
            }
        }
        tree.last_page = Some(r.addr);
    }

    fn page_abort_check(&mut self, r: &PageAbortCheckRecord) {
        let stable = self.state.stable_timestamp;
        let line = self.line;

        if !r.needs_abort && (r.has_prepared || (stable.is_set() && r.durable > stable)) {
            let reason = if r.has_prepared {
                "the page has prepared updates".to_string()
            } else {
                format!("durable timestamp {} is ahead of stable {stable}", r.durable)
            };
            self.findings.push(
                Finding::new(
                    FindingCode::AbortCheckInconsistent,
                    line,
                    format!("page does not need abort although {reason}"),
                )
                .with_tree(&r.file)
                .with_page(r.page_ref),
            );
        }

        let Some(tree) = resolve_tree(
            &mut self.state.trees,
            &mut self.findings,
            line,
            OperationKind::PageAbortCheck,
            &r.file,
        ) else {
            return;
        };

        let page = tree
            .pages
            .entry(r.page_ref)
            .or_insert_with(|| PageState::new(r.page_ref, false));
        page.abort_check = Some(AbortCheck {
            durable: r.durable,
            newest_txn: r.newest_txn,
            has_prepared: r.has_prepared,
            needs_abort: r.needs_abort,
        });
        tree.last_page = Some(r.page_ref);
        tree.pending_abort_check = Some(PendingAbortCheck {
            page: r.page_ref,
            needs_abort: r.needs_abort,
            reported: false,
        });
    }

    fn update_abort(&mut self, r: &UpdateAbortRecord) {
        let line = self.line;

        self.check_stable(OperationKind::UpdateAbort, &r.file, r.stable);
        if (r.stable < r.durable) != r.stable_lt_durable {
            self.findings.push(
                Finding::new(
                    FindingCode::PredicateMismatch,
                    line,
                    format!(
                        "logged stable {} < durable {} as {} but it is {}",
                        r.stable,
                        r.durable,
                        r.stable_lt_durable,
                        r.stable < r.durable
                    ),
                )
                .with_tree(&r.file),
            );
        }
        if !r.stable_lt_durable && !r.txnid_not_visible && !r.prepare_state.is_unresolved() {
            self.findings.push(
                Finding::new(
                    FindingCode::UpdateAbortWithoutReason,
                    line,
                    format!(
                        "update of txnid {} aborted although it is visible, durable at or before stable and {}",
                        r.txnid,
                        r.prepare_state.as_str()
                    ),
                )
                .with_tree(&r.file),
            );
        }

        let Some(tree) = resolve_tree(
            &mut self.state.trees,
            &mut self.findings,
            line,
            OperationKind::UpdateAbort,
            &r.file,
        ) else {
            return;
        };

        if let Some(pending) = tree.pending_abort_check.as_mut() {
            if !pending.needs_abort && !pending.reported {
                pending.reported = true;
                self.findings.push(
                    Finding::new(
                        FindingCode::SpuriousAbort,
                        line,
                        format!(
                            "update of txnid {} aborted after the abort check found nothing to abort",
                            r.txnid
                        ),
                    )
                    .with_tree(&r.file)
                    .with_page(pending.page),
                );
            }
        }

        match tree.enclosing_page().and_then(|addr| tree.pages.get_mut(&addr)) {
            Some(page) => {
                page.aborted_updates += 1;
                if r.prepare_state != PrepareState::Init {
                    page.prepared_aborts += 1;
                }
            }
            None => self.findings.push(
                Finding::new(
                    FindingCode::UpdateWithoutPage,
                    line,
                    format!(
                        "update of txnid {} aborted with no enclosing page",
                        r.txnid
                    ),
                )
                .with_tree(&r.file),
            ),
        }
    }

    fn key_clear_remove(&mut self, r: &KeyClearRemoveRecord) {
        let line = self.line;
        let run_stable = self.state.stable_timestamp;
        let bound = if run_stable.is_set() {
            run_stable
        } else {
            r.restored_stable
        };

        let ahead: Vec<String> = [
            ("commit", r.restored_commit),
            ("durable", r.restored_durable),
        ]
        .into_iter()
        .filter(|(_, ts)| *ts > bound)
        .map(|(name, ts)| format!("{name} {ts}"))
        .collect();
        if !ahead.is_empty() {
            self.findings.push(
                Finding::new(
                    FindingCode::RestoredAheadOfStable,
                    line,
                    format!(
                        "restored update has {} ahead of stable {bound}",
                        ahead.join(" and ")
                    ),
                )
                .with_tree(&r.file),
            );
        }

        let Some(tree) = resolve_tree(
            &mut self.state.trees,
            &mut self.findings,
            line,
            OperationKind::KeyClearRemove,
            &r.file,
        ) else {
            return;
        };

        match tree.enclosing_page().and_then(|addr| tree.pages.get_mut(&addr)) {
            Some(page) => page.keys_cleared += 1,
            None => self.findings.push(
                Finding::new(
                    FindingCode::UpdateWithoutPage,
                    line,
                    "key cleared with no enclosing page",
                )
                .with_tree(&r.file),
            ),
        }
    }

    fn touch_key(&mut self, kind: OperationKind, file: &str, key: &str) {
        let before = self.findings.len();
        match self.resolve(kind, file) {
            Some(tree) => {
                if !tree.keys_touched.contains(key) {
                    tree.keys_touched.insert(key.to_string());
                }
            }
            None => {
                let unresolved: Vec<Finding> = self
                    .findings
                    .drain(before..)
                    .map(|f| f.with_key(key))
                    .collect();
                self.findings.extend(unresolved);
            }
        }
    }

    fn ondisk_abort_tw(&mut self, r: &OndiskAbortTwRecord) {
        let line = self.line;
        let stable = self.state.stable_timestamp;

        if !(r.durable_gt_stable || r.txnid_not_visible || r.tw_has_no_stop_and_is_prepared) {
            self.findings.push(
                Finding::new(
                    FindingCode::TwAbortWithoutReason,
                    line,
                    format!(
                        "on-disk time window {}/{}/{} aborted with every justification false",
                        r.durable_start, r.start, r.start_txn
                    ),
                )
                .with_tree(&r.file),
            );
        }
        if stable.is_set() && (r.durable_start > stable) != r.durable_gt_stable {
            self.findings.push(
                Finding::new(
                    FindingCode::PredicateMismatch,
                    line,
                    format!(
                        "logged durable {} > stable {stable} as {} but it is {}",
                        r.durable_start,
                        r.durable_gt_stable,
                        r.durable_start > stable
                    ),
                )
                .with_tree(&r.file),
            );
        }

        self.resolve(OperationKind::OndiskAbortTw, &r.file);
    }

    fn check_time_window(&mut self, kind: OperationKind, file: &str, tw: &TimeWindow) {
        let violations: Vec<String> = [
            (tw.start <= tw.stop, format!("start {} > stop {}", tw.start, tw.stop)),
            (
                tw.durable_start >= tw.start,
                format!("durable start {} < start {}", tw.durable_start, tw.start),
            ),
            (
                tw.durable_stop >= tw.stop,
                format!("durable stop {} < stop {}", tw.durable_stop, tw.stop),
            ),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, violation)| violation)
        .collect();

        if !violations.is_empty() {
            self.findings.push(
                Finding::new(
                    FindingCode::HsTwInvalid,
                    self.line,
                    format!(
                        "{kind} time window {tw} is invalid: {}",
                        violations.join(", ")
                    ),
                )
                .with_tree(file),
            );
        }
    }

    fn check_stable(&mut self, kind: OperationKind, file: &str, logged: Timestamp) {
        let run_stable = self.state.stable_timestamp;
        if run_stable.is_set() && logged != run_stable {
            self.findings.push(
                Finding::new(
                    FindingCode::StableMismatch,
                    self.line,
                    format!("{kind} logs stable timestamp {logged} but the run stable is {run_stable}"),
                )
                .with_tree(file),
            );
        }
    }

    fn hs_tree_rollback(&mut self, r: &HsTreeRollbackRecord) {
        let line = self.line;
        let stable = self.state.stable_timestamp;
        let Some(tree) = resolve_tree(
            &mut self.state.trees,
            &mut self.findings,
            line,
            OperationKind::HsTreeRollback,
            &r.file,
        ) else {
            return;
        };

        tree.hs_rolled_back = true;
        if stable.is_set() && r.durable <= stable {
            self.findings.push(
                Finding::new(
                    FindingCode::HsRollbackUnnecessary,
                    line,
                    format!(
                        "history store rolled back although durable {} is not ahead of stable {stable}",
                        r.durable
                    ),
                )
                .with_tree(&r.file),
            );
        }
    }

    fn hs_tree_skip(&mut self, r: &HsTreeSkipRecord) {
        let line = self.line;
        if self.resolve(OperationKind::HsTreeSkip, &r.file).is_none() {
            return;
        }
        if r.durable > r.stable {
            self.findings.push(
                Finding::new(
                    FindingCode::HsSkipSuspicious,
                    line,
                    format!(
                        "history store skipped although durable {} is ahead of stable {}",
                        r.durable, r.stable
                    ),
                )
                .with_tree(&r.file),
            );
        }
    }
}

fn resolve_tree<'t>(
    trees: &'t mut IndexMap<String, TreeState>,
    findings: &mut Vec<Finding>,
    line: u64,
    kind: OperationKind,
    file: &str,
) -> Option<&'t mut TreeState> {
    match trees.get_mut(file) {
        Some(tree) => match tree.skipped {
            None => Some(tree),
            Some(reason) => {
                findings.push(
                    Finding::new(
                        FindingCode::EventAfterSkip,
                        line,
                        format!("{kind} after the tree was closed by {reason}"),
                    )
                    .with_tree(file),
                );
                None
            }
        },
        None => {
            if kind.requires_tree() {
                findings.push(
                    Finding::new(
                        FindingCode::MissingTree,
                        line,
                        format!("{kind} names a file that no TREE event opened"),
                    )
                    .with_tree(file),
                );
            }
            None
        }
    }
}
