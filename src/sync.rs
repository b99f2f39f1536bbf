//! The sync orchestrator.
//!
//! One cycle is connect → fetch → push → deletion-detection → pull, run to
//! completion before the next trigger. The local store is authoritative for
//! content; the remote side is authoritative only for completion and for
//! existence (a deletion there propagates back as a soft-delete here).

use std::collections::HashMap;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use farmhouse_core::{
    LocalRecord, ObjectKind, RemoteIndex, RemoteObject, SyncResult, encode_record, local_task_id,
    remote_uid,
};

use crate::caldav::CalDavRemote;
use crate::config::SyncConfig;
use crate::remote::RemoteCalendar;
use crate::store::TaskStore;

/// Summary of one sync cycle, returned to the caller for observability.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SyncReport {
    /// Objects created remotely plus records created locally by the pull phase.
    pub created: usize,
    /// Remote objects rewritten, and completions reconciled from remote.
    pub updated: usize,
    /// Records soft-deleted because their remote counterpart disappeared.
    pub deleted: usize,
    /// Items examined and left untouched.
    pub skipped: usize,
    /// Per-item failures absorbed during the cycle.
    pub errors: usize,
}

impl SyncReport {
    /// True when the cycle changed nothing on either side.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deleted == 0 && self.errors == 0
    }
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "created {}, updated {}, deleted {}, skipped {}, errors {}",
            self.created, self.updated, self.deleted, self.skipped, self.errors
        )
    }
}

/// The sync engine for one configured account.
///
/// Construct once and call [`run_cycle`](Self::run_cycle) from the external
/// scheduler. Cycles are serialized by an internal lock in case the scheduler
/// cannot guarantee non-overlap.
pub struct SyncEngine {
    config: SyncConfig,
    cycle_lock: Mutex<()>,
}

impl SyncEngine {
    pub fn new(config: SyncConfig) -> Self {
        SyncEngine {
            config,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Run one full cycle against the configured CalDAV server.
    ///
    /// Fails fast, with zero side effects, when the remote is unreachable or
    /// no collection can be resolved. Everything after that point is absorbed
    /// into the report's error count.
    pub async fn run_cycle<S: TaskStore>(&self, store: &mut S) -> SyncResult<SyncReport> {
        let _guard = self.cycle_lock.lock().await;
        let remote = CalDavRemote::connect(&self.config).await?;
        Ok(self.run_phases(store, &remote).await)
    }

    /// The phases after connect, against any [`RemoteCalendar`].
    pub async fn run_phases<S: TaskStore, R: RemoteCalendar>(
        &self,
        store: &mut S,
        remote: &R,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        let codec = match self.config.codec() {
            Ok(codec) => codec,
            Err(e) => {
                error!(error = %e, "cannot build codec, aborting cycle");
                report.errors += 1;
                return report;
            }
        };

        // Fetch. Without the complete listing, deletion detection would
        // misfire, so a failed fetch ends the cycle here.
        let mut listing = Vec::new();
        for kind in [ObjectKind::ScheduledEvent, ObjectKind::ActionItem] {
            match remote.list_objects(kind, None).await {
                Ok(objects) => listing.extend(objects),
                Err(e) => {
                    error!(?kind, error = %e, "failed to fetch remote listing, aborting cycle");
                    report.errors += 1;
                    return report;
                }
            }
        }
        let index = RemoteIndex::new(listing, &self.config.namespace);

        let records = match store.active_records(self.config.sync_window_days) {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "failed to read local records, aborting cycle");
                report.errors += 1;
                return report;
            }
        };

        // Push phase: local content wins for everything it owns.
        for record in &records {
            if let Some(uid) = &record.remote_id {
                if !index.contains(uid) {
                    // Gone from the remote side; deletion detection handles it.
                    continue;
                }
                if local_task_id(uid, &self.config.namespace).is_none() {
                    // Pulled from an externally-owned object: never push a
                    // duplicate on top of it.
                    report.skipped += 1;
                    continue;
                }
            }

            let uid = record
                .remote_id
                .clone()
                .unwrap_or_else(|| remote_uid(record.id, &self.config.namespace));
            let existing = index.get(&uid);

            if let Some(object) = existing {
                if object.matches_record(record) {
                    report.skipped += 1;
                    continue;
                }
            }
            let sequence = existing.map(|o| o.sequence + 1).unwrap_or(0);

            let ics = match encode_record(record, &codec, sequence) {
                Ok(ics) => ics,
                Err(e) => {
                    warn!(record_id = record.id, error = %e, "failed to encode record");
                    report.errors += 1;
                    continue;
                }
            };
            match remote.upsert(&uid, &ics).await {
                Ok(()) => {
                    if record.remote_id.is_none() {
                        if let Err(e) = store.set_remote_id(record.id, &uid) {
                            warn!(record_id = record.id, error = %e, "failed to persist remote id");
                            report.errors += 1;
                            continue;
                        }
                        report.created += 1;
                    } else {
                        report.updated += 1;
                    }
                }
                Err(e) => {
                    warn!(record_id = record.id, uid, error = %e, "failed to push record");
                    report.errors += 1;
                }
            }
        }

        // Deletion detection: a linked record whose identifier vanished from
        // the listing was deleted on the remote side. Records first pushed in
        // this cycle are not candidates; their remote_id was unset in the
        // snapshot taken above.
        for record in &records {
            if let Some(uid) = &record.remote_id {
                if !index.contains(uid) {
                    match store.mark_inactive(record.id) {
                        Ok(()) => {
                            info!(record_id = record.id, uid, "remote object gone, deactivating record");
                            report.deleted += 1;
                        }
                        Err(e) => {
                            warn!(record_id = record.id, error = %e, "failed to deactivate record");
                            report.errors += 1;
                        }
                    }
                }
            }
        }

        // Pull phase: adopt externally-created objects, and reconcile
        // completion (the one field the remote side is trusted for).
        //
        // The link maps only cover the windowed snapshot, so an object dated
        // out of the window must never be adopted: its record may exist
        // outside the snapshot, and re-creating it would duplicate a record
        // on every cycle.
        let window_cutoff = (Utc::now() - Duration::days(self.config.sync_window_days)).date_naive();
        let by_task_id: HashMap<i64, &LocalRecord> =
            records.iter().map(|r| (r.id, r)).collect();
        let by_remote_id: HashMap<&str, &LocalRecord> = records
            .iter()
            .filter_map(|r| r.remote_id.as_deref().map(|uid| (uid, r)))
            .collect();

        for object in index.external() {
            let linked = object
                .source_task_id
                .and_then(|id| by_task_id.get(&id))
                .or_else(|| by_remote_id.get(object.uid.as_str()));

            match linked {
                Some(record) => {
                    if object.completed && !record.completed {
                        self.reconcile_completion(store, remote, record, object, &mut report)
                            .await;
                    } else {
                        report.skipped += 1;
                    }
                }
                None => {
                    if object.due_date.is_some_and(|d| d < window_cutoff) {
                        report.skipped += 1;
                        continue;
                    }
                    match store.create_record(object.to_new_record()) {
                        Ok(created) => {
                            info!(record_id = created.id, uid = %object.uid, "pulled external object");
                            report.created += 1;
                        }
                        Err(e) => {
                            warn!(uid = %object.uid, error = %e, "failed to create record from pull");
                            report.errors += 1;
                        }
                    }
                }
            }
        }

        info!(%report, "sync cycle finished");
        report
    }

    /// The remote side marked a linked object completed: complete the record,
    /// then remove the object so the next cycle does not re-process it.
    async fn reconcile_completion<S: TaskStore, R: RemoteCalendar>(
        &self,
        store: &mut S,
        remote: &R,
        record: &LocalRecord,
        object: &RemoteObject,
        report: &mut SyncReport,
    ) {
        if let Err(e) = store.mark_completed(record.id, Utc::now()) {
            warn!(record_id = record.id, error = %e, "failed to mark record completed");
            report.errors += 1;
            return;
        }
        if let Err(e) = remote.delete(&object.uid).await {
            warn!(uid = %object.uid, error = %e, "failed to delete completed remote object");
            report.errors += 1;
            return;
        }
        info!(record_id = record.id, uid = %object.uid, "completion reconciled from remote");
        report.updated += 1;
    }
}
