//! Wire text generation for local records.

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use icalendar::{Alarm, Calendar, Component, EventLike, Property, Trigger, ValueType};

use crate::error::{SyncError, SyncResult};
use crate::ics::{CodecConfig, priority_to_wire};
use crate::identity::remote_uid;
use crate::record::{LocalRecord, RecordKind};

/// Generate the wire text for a record.
///
/// `Event` records become a VEVENT, `Reminder` records a VTODO. The UID is
/// reused from `record.remote_id` when already assigned, else derived
/// deterministically from the record id.
pub fn encode_record(
    record: &LocalRecord,
    cfg: &CodecConfig,
    sequence: i64,
) -> SyncResult<String> {
    let uid = record
        .remote_id
        .clone()
        .unwrap_or_else(|| remote_uid(record.id, &cfg.namespace));
    let now = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

    let mut cal = Calendar::new();
    match record.kind {
        RecordKind::Event => cal.push(build_event(record, cfg, &uid, &now, sequence)?),
        RecordKind::Reminder => cal.push(build_todo(record, cfg, &uid, &now, sequence)),
    };
    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string()))
}

fn build_event(
    record: &LocalRecord,
    cfg: &CodecConfig,
    uid: &str,
    now: &str,
    sequence: i64,
) -> SyncResult<icalendar::Event> {
    let mut ev = icalendar::Event::new();
    add_common(&mut ev, record, cfg, uid, now, sequence);

    let date = record.date.ok_or_else(|| {
        SyncError::IcsGenerate(format!("event record {} has no date", record.id))
    })?;

    match record.start_time {
        Some(start) => {
            let start_dt = date.and_time(start);
            let mut end_dt = match record.end_time {
                Some(end) => date.and_time(end),
                None => start_dt + Duration::hours(1),
            };
            // End at or before start means the span crosses midnight.
            if end_dt <= start_dt {
                end_dt += Duration::days(1);
            }
            add_zoned_property(&mut ev, "DTSTART", start_dt, cfg);
            add_zoned_property(&mut ev, "DTEND", end_dt, cfg);
        }
        None => {
            // No time-of-day: an all-day span of exactly one calendar day.
            add_date_property(&mut ev, "DTSTART", date);
            add_date_property(&mut ev, "DTEND", date + Duration::days(1));
        }
    }

    // VEVENT has no COMPLETED status; a finished event is written as
    // cancelled so other clients stop surfacing it.
    if record.completed {
        ev.add_property("STATUS", "CANCELLED");
    } else {
        ev.add_property("STATUS", "CONFIRMED");
    }

    Ok(ev.done())
}

fn build_todo(
    record: &LocalRecord,
    cfg: &CodecConfig,
    uid: &str,
    now: &str,
    sequence: i64,
) -> icalendar::Todo {
    let mut todo = icalendar::Todo::new();
    add_common(&mut todo, record, cfg, uid, now, sequence);

    // Due moment is optional; omit the time-of-day entirely when unset.
    if let Some(date) = record.date {
        match record.start_time {
            Some(time) => add_zoned_property(&mut todo, "DUE", date.and_time(time), cfg),
            None => add_date_property(&mut todo, "DUE", date),
        }
    }

    if record.completed {
        todo.add_property("STATUS", "COMPLETED");
        todo.add_property("PERCENT-COMPLETE", "100");
        let completed_at = record.completed_at.unwrap_or_else(Utc::now);
        todo.add_property(
            "COMPLETED",
            completed_at.format("%Y%m%dT%H%M%SZ").to_string(),
        );
    } else {
        todo.add_property("STATUS", "NEEDS-ACTION");
    }

    for &minutes in &record.reminder_offsets {
        let mut alarm = Alarm::display(
            "Reminder",
            Trigger::before_start(Duration::minutes(minutes.max(0))),
        );
        // Rewrite the trigger so the granularity matches the offset: whole
        // days as -PnD, whole hours as -PTnH, otherwise minutes.
        alarm.add_property("TRIGGER", format_trigger(minutes));
        todo.alarm(alarm);
    }

    todo.done()
}

fn add_common<C: Component + EventLike>(
    comp: &mut C,
    record: &LocalRecord,
    cfg: &CodecConfig,
    uid: &str,
    now: &str,
    sequence: i64,
) {
    comp.uid(uid);
    comp.summary(&record.title);
    comp.add_property("DTSTAMP", now);
    comp.add_property("CREATED", now);
    comp.add_property("LAST-MODIFIED", now);
    comp.add_property("SEQUENCE", sequence.to_string());
    comp.add_property("CATEGORIES", record.category.as_tag());
    comp.add_property(
        "PRIORITY",
        priority_to_wire(record.priority, cfg.priority_levels).to_string(),
    );
    comp.add_property("X-FARMHOUSE-TASK-ID", record.id.to_string());

    if let Some(ref desc) = record.description {
        comp.description(desc);
    }
    if let Some(ref loc) = record.location {
        comp.location(loc);
    }
}

/// Add a wall-clock datetime property with the configured TZID.
fn add_zoned_property<C: Component>(comp: &mut C, name: &str, dt: NaiveDateTime, cfg: &CodecConfig) {
    let mut prop = Property::new(name, dt.format("%Y%m%dT%H%M%S").to_string());
    prop.add_parameter("TZID", cfg.timezone.name());
    comp.append_property(prop);
}

/// Add a pure-date property (`VALUE=DATE`).
fn add_date_property<C: Component>(comp: &mut C, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    comp.append_property(prop);
}

/// Render a relative alarm trigger with offset-appropriate granularity.
fn format_trigger(minutes: i64) -> String {
    if minutes <= 0 {
        "PT0S".to_string()
    } else if minutes % 1440 == 0 {
        format!("-P{}D", minutes / 1440)
    } else if minutes % 60 == 0 {
        format!("-PT{}H", minutes / 60)
    } else {
        format!("-PT{}M", minutes)
    }
}

/// Clean up the icalendar crate's output:
/// - declare our own PRODID
/// - drop CALSCALE:GREGORIAN (the default)
/// - drop DTSTAMP and UID inside VALARM sections (not required by RFC 5545)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut in_valarm = false;

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:-//FARMHOUSE//sync//EN\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        if line == "BEGIN:VALARM" {
            in_valarm = true;
        } else if line == "END:VALARM" {
            in_valarm = false;
        }

        if in_valarm && (line.starts_with("DTSTAMP:") || line.starts_with("UID:")) {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
