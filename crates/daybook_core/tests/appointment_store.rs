use chrono::{NaiveDate, NaiveDateTime};
use daybook_core::{Appointment, AppointmentRepository, AppointmentStore};
use std::collections::HashSet;
use uuid::Uuid;

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn appointment(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> Appointment {
    Appointment::new(title, start, end).unwrap()
}

fn ids(store: &AppointmentStore) -> HashSet<Uuid> {
    store.all().into_iter().map(|item| item.id).collect()
}

#[test]
fn touching_appointments_can_both_be_added() {
    let mut store = AppointmentStore::new();

    assert!(store.add(appointment("T", at(1, 9, 0), at(1, 10, 0))));
    assert!(store.add(appointment("T", at(1, 10, 0), at(1, 11, 0))));
    assert_eq!(store.len(), 2);
}

#[test]
fn rejected_add_leaves_store_unchanged() {
    let mut store = AppointmentStore::new();
    let first = appointment("A", at(1, 9, 0), at(1, 10, 0));
    store.add(first.clone());
    let before = ids(&store);

    assert!(!store.add(appointment("B", at(1, 9, 30), at(1, 10, 30))));
    assert_eq!(ids(&store), before);
    assert_eq!(store.all(), vec![first]);
}

#[test]
fn enclosing_appointment_is_rejected() {
    let mut store = AppointmentStore::new();
    store.add(appointment("inner", at(1, 10, 0), at(1, 10, 30)));

    assert!(!store.add(appointment("outer", at(1, 9, 0), at(1, 12, 0))));
}

#[test]
fn delete_removes_by_id_and_ignores_unknown_ids() {
    let mut store = AppointmentStore::new();
    let target = appointment("A", at(1, 9, 0), at(1, 10, 0));
    let target_id = target.id;
    store.add(target);

    assert!(store.delete(Uuid::new_v4()).is_none());
    assert_eq!(store.len(), 1);

    let removed = store.delete(target_id).unwrap();
    assert_eq!(removed.id, target_id);
    assert!(store.is_empty());
    assert!(store.delete(target_id).is_none());
}

#[test]
fn delete_distinguishes_identical_field_values() {
    let mut store = AppointmentStore::new();
    let first = appointment("Gym", at(1, 7, 0), at(1, 8, 0));
    let twin = appointment("Gym", at(2, 7, 0), at(2, 8, 0));
    let twin_id = twin.id;
    store.add(first.clone());
    store.add(twin);

    store.delete(first.id);
    assert_eq!(ids(&store), HashSet::from([twin_id]));
}

#[test]
fn update_replaces_old_appointment() {
    let mut store = AppointmentStore::new();
    let old = appointment("Old", at(1, 9, 0), at(1, 10, 0));
    let old_id = old.id;
    store.add(old);

    let replacement = appointment("New", at(1, 9, 30), at(1, 10, 30));
    let new_id = replacement.id;
    assert!(store.update(old_id, replacement));

    assert!(store.get(old_id).is_none());
    assert_eq!(store.get(new_id).unwrap().title, "New");
    assert_eq!(store.len(), 1);
}

#[test]
fn update_into_third_appointment_is_rejected_and_keeps_old() {
    let mut store = AppointmentStore::new();
    let old = appointment("Old", at(1, 9, 0), at(1, 10, 0));
    let old_id = old.id;
    store.add(old);
    store.add(appointment("Third", at(1, 11, 0), at(1, 12, 0)));

    assert!(!store.update(old_id, appointment("New", at(1, 11, 30), at(1, 12, 30))));
    assert_eq!(store.get(old_id).unwrap().title, "Old");
    assert_eq!(store.len(), 2);
}

#[test]
fn update_with_unknown_old_id_behaves_like_add() {
    let mut store = AppointmentStore::new();
    store.add(appointment("A", at(1, 9, 0), at(1, 10, 0)));

    assert!(store.update(Uuid::new_v4(), appointment("B", at(1, 10, 0), at(1, 11, 0))));
    assert!(!store.update(Uuid::new_v4(), appointment("C", at(1, 9, 0), at(1, 9, 30))));
    assert_eq!(store.len(), 2);
}

#[test]
fn for_day_filters_by_date_and_orders_by_start() {
    let mut store = AppointmentStore::new();
    store.add(appointment("late", at(1, 15, 0), at(1, 16, 0)));
    store.add(appointment("next day", at(2, 9, 0), at(2, 10, 0)));
    store.add(appointment("early", at(1, 8, 0), at(1, 9, 0)));

    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let titles = store
        .for_day(day)
        .into_iter()
        .map(|item| item.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["early", "late"]);
    assert_eq!(store.for_day(day).len(), 2);
}

#[test]
fn all_returns_a_detached_snapshot() {
    let mut store = AppointmentStore::new();
    store.add(appointment("A", at(1, 9, 0), at(1, 10, 0)));

    let mut snapshot = store.all();
    snapshot[0].title = "mutated".to_string();
    snapshot.clear();

    assert_eq!(store.all()[0].title, "A");
}

#[test]
fn no_two_held_appointments_overlap_after_mixed_writes() {
    let mut store = AppointmentStore::new();
    for hour in 8..18 {
        store.add(appointment("slot", at(1, hour, 0), at(1, hour + 1, 0)));
        store.add(appointment("half", at(1, hour, 30), at(1, hour + 1, 30)));
    }

    let held = store.all();
    for (index, a) in held.iter().enumerate() {
        for b in held.iter().skip(index + 1) {
            assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
        }
    }
    assert_eq!(held.len(), 10);
}
