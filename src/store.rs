//! The local task store seam.
//!
//! The store itself (persistence, CRUD API, the domain routers that feed it)
//! lives outside this crate. The engine consumes this narrow interface and
//! writes back only sync state: remote identifiers, the active flag, and
//! completion. Every write is committed per item so a mid-cycle failure
//! loses at most one record's worth of work.

use chrono::{DateTime, Utc};

use farmhouse_core::{LocalRecord, NewRecord, SyncResult};

/// Interface to the external task store.
pub trait TaskStore {
    /// All active records dated within the trailing window of `window_days`,
    /// plus all undated ones.
    fn active_records(&self, window_days: i64) -> SyncResult<Vec<LocalRecord>>;

    /// Persist the remote identifier assigned on first successful push.
    fn set_remote_id(&mut self, record_id: i64, uid: &str) -> SyncResult<()>;

    /// Soft-delete: the record's remote counterpart disappeared.
    fn mark_inactive(&mut self, record_id: i64) -> SyncResult<()>;

    /// Completion reconciled from the remote side.
    fn mark_completed(&mut self, record_id: i64, at: DateTime<Utc>) -> SyncResult<()>;

    /// Create a record for a pulled, externally-originated object.
    fn create_record(&mut self, record: NewRecord) -> SyncResult<LocalRecord>;
}
