//! The remote calendar seam.
//!
//! The orchestrator only talks to this trait, so tests can drive whole cycles
//! against an in-memory remote and the CalDAV adapter stays swappable.

use farmhouse_core::{DateRange, ObjectKind, RemoteObject, SyncResult};

/// Result of a fetch-by-identifier.
///
/// Absence is a normal branch for update-or-create logic, not an error, so it
/// is a variant rather than an `Err`.
#[derive(Debug)]
pub enum Lookup {
    Found(RemoteObject),
    Absent,
}

/// Operations the sync cycle needs from a remote calendar collection.
pub trait RemoteCalendar {
    /// Fetch and decode all objects of one kind, optionally limited to a
    /// date range. Malformed entries are skipped, not fatal.
    async fn list_objects(
        &self,
        kind: ObjectKind,
        range: Option<&DateRange>,
    ) -> SyncResult<Vec<RemoteObject>>;

    /// Fetch one object by identifier. `Absent` signals "create new".
    async fn find_by_id(&self, uid: &str) -> SyncResult<Lookup>;

    /// Create or overwrite the object stored under `uid`.
    async fn upsert(&self, uid: &str, ics: &str) -> SyncResult<()>;

    /// Delete the object stored under `uid`. An already-absent object is
    /// success: the end state is achieved either way.
    async fn delete(&self, uid: &str) -> SyncResult<()>;
}
