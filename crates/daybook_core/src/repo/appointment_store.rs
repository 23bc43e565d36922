//! Appointment store contract and in-memory implementation.
//!
//! # Responsibility
//! - Hold the canonical appointment collection for one session.
//! - Reject insertions that overlap an existing appointment.
//! - Answer day queries ordered by start time.
//!
//! # Invariants
//! - For any two held appointments `a`, `b`: `!a.overlaps(b)`.
//! - Internal order is unspecified; ordering is applied at query time.
//! - `delete` of an unknown id is a silent no-op.

use crate::model::appointment::{Appointment, AppointmentId};
use chrono::NaiveDate;
use log::debug;

/// Storage contract used by the scheduling service.
///
/// Boolean results signal overlap rejection; none of these operations
/// fail observably for absent ids.
pub trait AppointmentRepository {
    /// Inserts `appointment` unless it overlaps a held appointment.
    fn add(&mut self, appointment: Appointment) -> bool;
    /// Removes the appointment with `id`, returning it when present.
    fn delete(&mut self, id: AppointmentId) -> Option<Appointment>;
    /// Replaces `old_id` with `replacement` if that introduces no overlap.
    ///
    /// On rejection the old appointment stays in place.
    fn update(&mut self, old_id: AppointmentId, replacement: Appointment) -> bool;
    /// Appointments starting on `date`, ascending by start.
    fn for_day(&self, date: NaiveDate) -> Vec<Appointment>;
    /// Snapshot of every held appointment.
    fn all(&self) -> Vec<Appointment>;
    /// Looks up one appointment by id.
    fn get(&self, id: AppointmentId) -> Option<&Appointment>;
    /// First held appointment overlapping `candidate`, skipping `ignore`.
    fn first_conflict(
        &self,
        candidate: &Appointment,
        ignore: Option<AppointmentId>,
    ) -> Option<&Appointment>;
}

/// Vector-backed appointment store.
#[derive(Debug, Default, Clone)]
pub struct AppointmentStore {
    appointments: Vec<Appointment>,
}

impl AppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    fn position(&self, id: AppointmentId) -> Option<usize> {
        self.appointments
            .iter()
            .position(|appointment| appointment.id == id)
    }
}

impl AppointmentRepository for AppointmentStore {
    fn add(&mut self, appointment: Appointment) -> bool {
        if let Some(conflict) = self.first_conflict(&appointment, None) {
            debug!(
                "event=store_add module=repo status=rejected id={} conflict_id={}",
                appointment.id, conflict.id
            );
            return false;
        }

        debug!(
            "event=store_add module=repo status=ok id={} size={}",
            appointment.id,
            self.appointments.len() + 1
        );
        self.appointments.push(appointment);
        true
    }

    fn delete(&mut self, id: AppointmentId) -> Option<Appointment> {
        let removed = self
            .position(id)
            .map(|index| self.appointments.remove(index));
        debug!(
            "event=store_delete module=repo status=ok id={} removed={}",
            id,
            removed.is_some()
        );
        removed
    }

    fn update(&mut self, old_id: AppointmentId, replacement: Appointment) -> bool {
        if let Some(conflict) = self.first_conflict(&replacement, Some(old_id)) {
            debug!(
                "event=store_update module=repo status=rejected old_id={} conflict_id={}",
                old_id, conflict.id
            );
            return false;
        }

        match self.position(old_id) {
            Some(index) => {
                self.appointments[index] = replacement;
            }
            None => {
                self.appointments.push(replacement);
            }
        }
        debug!(
            "event=store_update module=repo status=ok old_id={} size={}",
            old_id,
            self.appointments.len()
        );
        true
    }

    fn for_day(&self, date: NaiveDate) -> Vec<Appointment> {
        let mut day = self
            .appointments
            .iter()
            .filter(|appointment| appointment.day() == date)
            .cloned()
            .collect::<Vec<_>>();
        day.sort_by_key(|appointment| appointment.start);
        day
    }

    fn all(&self) -> Vec<Appointment> {
        self.appointments.clone()
    }

    fn get(&self, id: AppointmentId) -> Option<&Appointment> {
        self.appointments
            .iter()
            .find(|appointment| appointment.id == id)
    }

    fn first_conflict(
        &self,
        candidate: &Appointment,
        ignore: Option<AppointmentId>,
    ) -> Option<&Appointment> {
        self.appointments
            .iter()
            .find(|held| Some(held.id) != ignore && held.overlaps(candidate))
    }
}
