//! Identity resolution between local records and remote objects.
//!
//! Every object this engine creates carries a deterministic identifier of the
//! form `origin-task-<id>@<namespace>`. Anything else in the collection was
//! created elsewhere (a phone client, another app) and is a pull candidate.

use std::collections::HashMap;

use crate::remote_object::RemoteObject;

const UID_PREFIX: &str = "origin-task-";

/// The deterministic remote identifier for a local record.
pub fn remote_uid(task_id: i64, namespace: &str) -> String {
    format!("{UID_PREFIX}{task_id}@{namespace}")
}

/// Strict inverse of [`remote_uid`]: the originating task id, if this
/// identifier was assigned by the engine under the given namespace.
pub fn local_task_id(uid: &str, namespace: &str) -> Option<i64> {
    let rest = uid.strip_prefix(UID_PREFIX)?;
    let (id, ns) = rest.split_once('@')?;
    if ns != namespace {
        return None;
    }
    id.parse().ok()
}

/// A classified snapshot of the remote listing.
///
/// Pure function of the fetched objects; never mutates state. The orchestrator
/// uses `contains` for deletion detection and `external` for the pull phase.
pub struct RemoteIndex {
    by_uid: HashMap<String, RemoteObject>,
    namespace: String,
}

impl RemoteIndex {
    pub fn new(listing: Vec<RemoteObject>, namespace: &str) -> Self {
        RemoteIndex {
            by_uid: listing.into_iter().map(|o| (o.uid.clone(), o)).collect(),
            namespace: namespace.to_string(),
        }
    }

    /// Whether the identifier is currently present on the remote side.
    pub fn contains(&self, uid: &str) -> bool {
        self.by_uid.contains_key(uid)
    }

    pub fn get(&self, uid: &str) -> Option<&RemoteObject> {
        self.by_uid.get(uid)
    }

    /// Objects whose identifier was assigned by this engine.
    pub fn locally_originated(&self) -> impl Iterator<Item = &RemoteObject> {
        self.by_uid
            .values()
            .filter(|o| local_task_id(&o.uid, &self.namespace).is_some())
    }

    /// Objects created by another client. Pull candidates.
    pub fn external(&self) -> impl Iterator<Item = &RemoteObject> {
        self.by_uid
            .values()
            .filter(|o| local_task_id(&o.uid, &self.namespace).is_none())
    }

    pub fn len(&self) -> usize {
        self.by_uid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uid.is_empty()
    }
}
