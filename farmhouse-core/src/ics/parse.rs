//! Wire text parsing using the icalendar crate's parser.

use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component as ParsedComponent, read_calendar, unfold},
};

use crate::category::Category;
use crate::error::{SyncError, SyncResult};
use crate::ics::{CodecConfig, priority_from_wire};
use crate::remote_object::{ObjectKind, RemoteObject};

/// Parse wire text into a [`RemoteObject`].
///
/// Reads the first VEVENT or VTODO in the container. Fields outside the
/// understood set are dropped; unparsable text is a [`SyncError::MalformedObject`].
pub fn parse_object(content: &str, cfg: &CodecConfig) -> SyncResult<RemoteObject> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded)
        .map_err(|e| SyncError::MalformedObject(e.to_string()))?;

    let component = calendar
        .components
        .iter()
        .find(|c| c.name == "VEVENT" || c.name == "VTODO")
        .ok_or_else(|| SyncError::MalformedObject("no VEVENT or VTODO component".to_string()))?;

    let kind = if component.name == "VEVENT" {
        ObjectKind::ScheduledEvent
    } else {
        ObjectKind::ActionItem
    };

    let uid = component
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .ok_or_else(|| SyncError::MalformedObject("missing UID".to_string()))?;

    let summary = component
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_else(|| "(No title)".to_string());
    let description = component.find_prop("DESCRIPTION").map(|p| p.val.to_string());
    let location = component.find_prop("LOCATION").map(|p| p.val.to_string());

    // Start for events, due for action items. A pure date means an all-day
    // object: no time-of-day is populated.
    let start_prop = match kind {
        ObjectKind::ScheduledEvent => component.find_prop("DTSTART"),
        ObjectKind::ActionItem => component.find_prop("DUE"),
    };
    let (due_date, due_time) = start_prop
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(|dpt| split_local(dpt, cfg.timezone))
        .unwrap_or((None, None));

    // End moment only exists for events.
    let end_time = match kind {
        ObjectKind::ScheduledEvent => component
            .find_prop("DTEND")
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
            .and_then(|dpt| split_local(dpt, cfg.timezone).1),
        ObjectKind::ActionItem => None,
    };

    let status = component
        .find_prop("STATUS")
        .map(|p| p.val.to_string())
        .unwrap_or_default();
    let completed = match kind {
        ObjectKind::ScheduledEvent => status == "CANCELLED",
        ObjectKind::ActionItem => status == "COMPLETED",
    };

    let category = component
        .find_prop("CATEGORIES")
        .map(|p| {
            let val = p.val.to_string();
            Category::from_tag(val.split(',').next().unwrap_or(""))
        })
        .unwrap_or(Category::Other);

    let priority = component
        .find_prop("PRIORITY")
        .and_then(|p| p.val.as_ref().parse::<u8>().ok())
        .map(|wire| priority_from_wire(wire, cfg.priority_levels))
        .unwrap_or_else(|| priority_from_wire(5, cfg.priority_levels));

    let sequence = component
        .find_prop("SEQUENCE")
        .and_then(|p| p.val.as_ref().parse().ok())
        .unwrap_or(0);

    let source_task_id = component
        .find_prop("X-FARMHOUSE-TASK-ID")
        .and_then(|p| p.val.as_ref().parse().ok());

    let reminder_offsets = parse_reminders(component);

    Ok(RemoteObject {
        uid,
        kind,
        summary,
        description,
        location,
        due_date,
        due_time,
        end_time,
        category,
        priority,
        completed,
        sequence,
        source_task_id,
        reminder_offsets,
    })
}

/// Split a parsed date-or-datetime into calendar date and time-of-day in the
/// configured local zone. A pure date yields no time component.
fn split_local(dpt: DatePerhapsTime, tz: Tz) -> (Option<NaiveDate>, Option<NaiveTime>) {
    match dpt {
        DatePerhapsTime::Date(d) => (Some(d), None),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => {
            let local = dt.with_timezone(&tz).naive_local();
            (Some(local.date()), Some(local.time()))
        }
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            (Some(naive.date()), Some(naive.time()))
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            match tzid.parse::<Tz>() {
                Ok(source) if source != tz => source
                    .from_local_datetime(&date_time)
                    .single()
                    .map(|dt| {
                        let local = dt.with_timezone(&tz).naive_local();
                        (Some(local.date()), Some(local.time()))
                    })
                    .unwrap_or((Some(date_time.date()), Some(date_time.time()))),
                // Same zone, or one we can't resolve: take the wall time as-is.
                _ => (Some(date_time.date()), Some(date_time.time())),
            }
        }
    }
}

/// Collect relative-trigger alarm offsets (minutes before the due moment).
fn parse_reminders(component: &ParsedComponent) -> Vec<i64> {
    component
        .components
        .iter()
        .filter(|c| c.name == "VALARM")
        .filter_map(|alarm| {
            let trigger = alarm.find_prop("TRIGGER")?.val.as_ref().to_string();
            parse_trigger_minutes(&trigger)
        })
        .collect()
}

/// Parse a TRIGGER value to minutes before the due moment (-PT30M, -P1D, ...).
fn parse_trigger_minutes(value: &str) -> Option<i64> {
    let is_before = value.starts_with('-');
    let duration_str = value.trim_start_matches('-');

    let duration = iso8601::duration(duration_str).ok()?;
    let std_duration: std::time::Duration = duration.into();
    let minutes = (std_duration.as_secs() / 60) as i64;

    Some(if is_before { minutes } else { -minutes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::encode_record;
    use crate::record::{LocalRecord, RecordKind};
    use chrono::NaiveDate;

    fn make_reminder() -> LocalRecord {
        LocalRecord {
            id: 42,
            title: "Trim Hooves".to_string(),
            description: None,
            kind: RecordKind::Reminder,
            date: NaiveDate::from_ymd_opt(2026, 3, 1),
            start_time: None,
            end_time: None,
            location: None,
            category: Category::Livestock,
            priority: 3,
            completed: false,
            completed_at: None,
            active: true,
            remote_id: None,
            reminder_offsets: vec![],
        }
    }

    #[test]
    fn test_dated_reminder_roundtrip_without_time() {
        let cfg = CodecConfig::default();
        let ics = encode_record(&make_reminder(), &cfg, 0).unwrap();
        let parsed = parse_object(&ics, &cfg).unwrap();

        assert_eq!(parsed.uid, "origin-task-42@farmhouse");
        assert_eq!(parsed.kind, ObjectKind::ActionItem);
        assert_eq!(parsed.summary, "Trim Hooves");
        assert_eq!(parsed.due_date, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(parsed.due_time, None);
        assert_eq!(parsed.source_task_id, Some(42));
        assert!(!parsed.completed);
    }

    #[test]
    fn test_timed_reminder_roundtrip_with_offsets() {
        let cfg = CodecConfig {
            timezone: chrono_tz::Europe::Stockholm,
            ..CodecConfig::default()
        };
        let mut record = make_reminder();
        record.start_time = chrono::NaiveTime::from_hms_opt(7, 30, 0);
        record.end_time = chrono::NaiveTime::from_hms_opt(8, 0, 0);
        record.priority = 1;
        record.reminder_offsets = vec![0, 1440];

        let ics = encode_record(&record, &cfg, 0).unwrap();
        let parsed = parse_object(&ics, &cfg).unwrap();

        assert_eq!(parsed.due_date, record.date);
        assert_eq!(parsed.due_time, record.start_time);
        assert_eq!(parsed.category, Category::Livestock);
        assert_eq!(parsed.priority, 1);
        assert_eq!(parsed.completed, record.completed);
        assert_eq!(parsed.reminder_offsets, vec![0, 1440]);
    }

    #[test]
    fn test_encode_decode_encode_is_stable() {
        let cfg = CodecConfig::default();
        let mut record = make_reminder();
        record.description = Some("Front paddock first".to_string());
        record.location = Some("Barn".to_string());

        let first = encode_record(&record, &cfg, 0).unwrap();
        let parsed = parse_object(&first, &cfg).unwrap();
        assert!(parsed.matches_record(&record));
    }

    #[test]
    fn test_event_roundtrip_preserves_times() {
        let cfg = CodecConfig::default();
        let record = LocalRecord {
            id: 9,
            title: "Vet visit".to_string(),
            description: Some("Annual checkup".to_string()),
            kind: RecordKind::Event,
            date: NaiveDate::from_ymd_opt(2026, 5, 2),
            start_time: chrono::NaiveTime::from_hms_opt(14, 0, 0),
            end_time: chrono::NaiveTime::from_hms_opt(15, 30, 0),
            location: Some("North barn".to_string()),
            category: Category::Health,
            priority: 2,
            completed: false,
            completed_at: None,
            active: true,
            remote_id: None,
            reminder_offsets: vec![],
        };

        let ics = encode_record(&record, &cfg, 0).unwrap();
        let parsed = parse_object(&ics, &cfg).unwrap();

        assert_eq!(parsed.kind, ObjectKind::ScheduledEvent);
        assert_eq!(parsed.due_date, record.date);
        assert_eq!(parsed.due_time, record.start_time);
        assert_eq!(parsed.end_time, record.end_time);
        assert_eq!(parsed.description, record.description);
        assert_eq!(parsed.location, record.location);
        assert!(parsed.matches_record(&record));
    }

    #[test]
    fn test_cancelled_event_decodes_as_completed() {
        let cfg = CodecConfig::default();
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:ext-1@phone\r\n\
SUMMARY:Pay feed invoice\r\n\
DTSTART:20260301T100000Z\r\n\
DTEND:20260301T110000Z\r\n\
STATUS:CANCELLED\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
        let parsed = parse_object(ics, &cfg).unwrap();
        assert!(parsed.completed);
        assert_eq!(parsed.kind, ObjectKind::ScheduledEvent);
    }

    #[test]
    fn test_utc_datetime_converts_to_configured_zone() {
        let cfg = CodecConfig {
            timezone: chrono_tz::Europe::Stockholm,
            ..CodecConfig::default()
        };
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VTODO\r\n\
UID:ext-2@phone\r\n\
SUMMARY:Check beehives\r\n\
DUE:20260701T100000Z\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";
        let parsed = parse_object(ics, &cfg).unwrap();
        // July: Stockholm is UTC+2.
        assert_eq!(parsed.due_date, NaiveDate::from_ymd_opt(2026, 7, 1));
        assert_eq!(parsed.due_time, chrono::NaiveTime::from_hms_opt(12, 0, 0));
    }

    #[test]
    fn test_unknown_category_maps_to_other() {
        let cfg = CodecConfig::default();
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VTODO\r\n\
UID:ext-3@phone\r\n\
SUMMARY:Sharpen scythe\r\n\
CATEGORIES:Blacksmithing\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";
        let parsed = parse_object(ics, &cfg).unwrap();
        assert_eq!(parsed.category, Category::Other);
        assert_eq!(parsed.due_date, None);
        assert_eq!(parsed.due_time, None);
    }

    #[test]
    fn test_garbage_is_a_malformed_object() {
        let cfg = CodecConfig::default();
        assert!(matches!(
            parse_object("not a calendar", &cfg),
            Err(SyncError::MalformedObject(_))
        ));
        let no_component = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
        assert!(matches!(
            parse_object(no_component, &cfg),
            Err(SyncError::MalformedObject(_))
        ));
    }

    #[test]
    fn test_missing_uid_is_malformed() {
        let cfg = CodecConfig::default();
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VTODO\r\n\
SUMMARY:No uid here\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";
        assert!(matches!(
            parse_object(ics, &cfg),
            Err(SyncError::MalformedObject(_))
        ));
    }
}
