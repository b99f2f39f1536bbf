//! Local task/event records.
//!
//! These mirror the shape owned by the external task store. The sync engine
//! consumes them and writes back only the sync-related fields (remote id,
//! active flag, completion).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Whether a record is a timed calendar event or an (optionally dated) to-do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Event,
    Reminder,
}

/// A task or event record from the local store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalRecord {
    /// Stable identifier assigned by the store.
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: RecordKind,
    pub date: Option<NaiveDate>,
    /// Only meaningful for `Event` kind; `Reminder` uses it as an optional
    /// due time-of-day.
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub category: Category,
    /// 1 = highest, `priority_levels` = lowest.
    pub priority: u8,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Soft-delete flag. Inactive records are never pushed.
    pub active: bool,
    /// Remote object identifier, persisted after the first successful push
    /// or assigned during a pull.
    pub remote_id: Option<String>,
    /// Minutes before the due moment to fire a reminder. `Reminder` only.
    pub reminder_offsets: Vec<i64>,
}

/// The shape used to create a record during the pull phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub title: String,
    pub description: Option<String>,
    pub kind: RecordKind,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub category: Category,
    pub priority: u8,
    pub completed: bool,
    /// The remote identifier the new record is linked to.
    pub remote_id: String,
    pub reminder_offsets: Vec<i64>,
}
