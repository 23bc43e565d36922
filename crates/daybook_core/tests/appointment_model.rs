use chrono::{NaiveDate, NaiveDateTime};
use daybook_core::{Appointment, AppointmentValidationError};
use uuid::Uuid;

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[test]
fn new_trims_title_and_assigns_id() {
    let appointment = Appointment::new("  Dentist  ", at(1, 9, 0), at(1, 10, 0)).unwrap();

    assert!(!appointment.id.is_nil());
    assert_eq!(appointment.title, "Dentist");
    assert_eq!(appointment.day(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
}

#[test]
fn whitespace_title_is_rejected() {
    let err = Appointment::new(" \t ", at(1, 9, 0), at(1, 10, 0)).unwrap_err();
    assert_eq!(err, AppointmentValidationError::EmptyTitle);
}

#[test]
fn inverted_range_is_rejected() {
    let err = Appointment::new("x", at(1, 10, 0), at(1, 9, 0)).unwrap_err();
    assert_eq!(
        err,
        AppointmentValidationError::InvalidRange {
            start: at(1, 10, 0),
            end: at(1, 9, 0),
        }
    );
}

#[test]
fn time_range_label_uses_hours_and_minutes() {
    let appointment = Appointment::new("Standup", at(1, 9, 5), at(1, 9, 20)).unwrap();
    assert_eq!(appointment.time_range_label(), "09:05 - 09:20");
}

#[test]
fn overlap_follows_half_open_semantics() {
    let base = Appointment::new("base", at(1, 9, 0), at(1, 10, 0)).unwrap();
    let partial = Appointment::new("partial", at(1, 9, 30), at(1, 10, 30)).unwrap();
    let before = Appointment::new("before", at(1, 8, 0), at(1, 9, 0)).unwrap();
    let other_day = Appointment::new("other", at(2, 9, 0), at(2, 10, 0)).unwrap();

    assert!(base.overlaps(&partial));
    assert!(!base.overlaps(&before));
    assert!(!base.overlaps(&other_day));
}

#[test]
fn same_fields_ignores_identity() {
    let a = Appointment::new("Review", at(1, 9, 0), at(1, 10, 0)).unwrap();
    let b = Appointment::with_id(Uuid::new_v4(), "Review", at(1, 9, 0), at(1, 10, 0)).unwrap();

    assert_ne!(a, b);
    assert!(a.same_fields(&b));
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let appointment = Appointment::with_id(id, "Lunch", at(1, 12, 0), at(1, 13, 0)).unwrap();

    let json = serde_json::to_value(&appointment).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["title"], "Lunch");
    assert_eq!(json["start"], "2024-01-01T12:00:00");
    assert_eq!(json["end"], "2024-01-01T13:00:00");

    let decoded: Appointment = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, appointment);
}
