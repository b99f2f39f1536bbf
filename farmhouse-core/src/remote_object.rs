//! Decoded remote scheduling objects.
//!
//! A `RemoteObject` is the local-shaped view of one wire object: dates split
//! into calendar date and time-of-day, priority already mapped onto the local
//! scale, category resolved to a known tag.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::record::{LocalRecord, NewRecord, RecordKind};

/// The two wire object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// VEVENT: has a start and an end moment.
    ScheduledEvent,
    /// VTODO: optional due moment, no mandatory end.
    ActionItem,
}

/// One scheduling object as fetched and decoded from the remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteObject {
    pub uid: String,
    pub kind: ObjectKind,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Calendar date of the start/due moment. None for undated items.
    pub due_date: Option<NaiveDate>,
    /// Time-of-day of the start/due moment. None for all-day objects.
    pub due_time: Option<NaiveTime>,
    /// End time-of-day. Events only.
    pub end_time: Option<NaiveTime>,
    pub category: Category,
    /// Already mapped onto the local 1..levels scale.
    pub priority: u8,
    pub completed: bool,
    pub sequence: i64,
    /// The `X-FARMHOUSE-TASK-ID` back-reference, when the object originated
    /// from a local record.
    pub source_task_id: Option<i64>,
    pub reminder_offsets: Vec<i64>,
}

impl RemoteObject {
    /// Whether this object already reflects the record's pushed content.
    ///
    /// Compares every field the push phase owns. Used by the orchestrator to
    /// skip no-op upserts so that a quiet cycle reports zero updates.
    pub fn matches_record(&self, record: &LocalRecord) -> bool {
        let kind_matches = matches!(
            (self.kind, record.kind),
            (ObjectKind::ScheduledEvent, RecordKind::Event)
                | (ObjectKind::ActionItem, RecordKind::Reminder)
        );

        kind_matches
            && self.summary == record.title
            && self.description == record.description
            && self.location == record.location
            && self.due_date == record.date
            && self.due_time == record.start_time
            && self.end_time == self.expected_end_time(record)
            && self.category == record.category
            && self.priority == record.priority
            && self.completed == record.completed
            && self.reminder_offsets == record.reminder_offsets
    }

    /// The end time the encoder would have written for this record.
    ///
    /// Timed events default to start+1h when the record carries no explicit
    /// end; all-day events and action items carry no end time at all.
    fn expected_end_time(&self, record: &LocalRecord) -> Option<NaiveTime> {
        if record.kind != RecordKind::Event {
            return None;
        }
        match (record.start_time, record.end_time) {
            (_, Some(end)) => Some(end),
            (Some(start), None) => Some(
                record
                    .date
                    .map(|d| (d.and_time(start) + Duration::hours(1)).time())
                    .unwrap_or(start),
            ),
            (None, None) => None,
        }
    }

    /// The pull-phase creation shape, linked by this object's identifier.
    pub fn to_new_record(&self) -> NewRecord {
        NewRecord {
            title: self.summary.clone(),
            description: self.description.clone(),
            kind: match self.kind {
                ObjectKind::ScheduledEvent => RecordKind::Event,
                ObjectKind::ActionItem => RecordKind::Reminder,
            },
            date: self.due_date,
            start_time: self.due_time,
            end_time: self.end_time,
            location: self.location.clone(),
            category: self.category,
            priority: self.priority,
            completed: self.completed,
            remote_id: self.uid.clone(),
            reminder_offsets: self.reminder_offsets.clone(),
        }
    }
}
