//! Scheduling use-case service.
//!
//! # Responsibility
//! - Validate raw `(title, start, end)` input into appointments.
//! - Mediate every store mutation and report typed failure reasons.
//! - Bridge the store and the persistence codec for load/persist.
//!
//! # Invariants
//! - Failed operations leave the store in its prior state.
//! - Updates are validated exactly like creates, including the overlap
//!   check against every appointment other than the one being replaced.
//! - Load inserts through the overlap-checked path; conflicting persisted
//!   records are dropped and counted.

use crate::codec::{self, CodecResult, DecodeReport, SkippedLine};
use crate::model::appointment::{Appointment, AppointmentId, AppointmentValidationError};
use crate::repo::appointment_store::{AppointmentRepository, AppointmentStore};
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};
use std::path::Path;

/// Failure taxonomy without payload, for callers that only branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleErrorKind {
    EmptyTitle,
    InvalidRange,
    Overlap,
}

impl ScheduleErrorKind {
    /// Stable machine-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty_title",
            Self::InvalidRange => "invalid_range",
            Self::Overlap => "overlap",
        }
    }
}

/// Recoverable validation failure for create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
    /// End is not after start.
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Conflicts with an appointment already in the store.
    Overlap { conflicting_title: Option<String> },
}

impl ScheduleError {
    pub fn kind(&self) -> ScheduleErrorKind {
        match self {
            Self::EmptyTitle => ScheduleErrorKind::EmptyTitle,
            Self::InvalidRange { .. } => ScheduleErrorKind::InvalidRange,
            Self::Overlap { .. } => ScheduleErrorKind::Overlap,
        }
    }
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "The title must not be empty."),
            Self::InvalidRange { .. } => write!(f, "The end time must be after the start time."),
            Self::Overlap {
                conflicting_title: Some(title),
            } => write!(
                f,
                "The appointment overlaps with `{title}` and was not saved."
            ),
            Self::Overlap {
                conflicting_title: None,
            } => write!(
                f,
                "The appointment overlaps with an existing appointment and was not saved."
            ),
        }
    }
}

impl Error for ScheduleError {}

impl From<AppointmentValidationError> for ScheduleError {
    fn from(value: AppointmentValidationError) -> Self {
        match value {
            AppointmentValidationError::EmptyTitle => Self::EmptyTitle,
            AppointmentValidationError::InvalidRange { start, end } => {
                Self::InvalidRange { start, end }
            }
        }
    }
}

/// Outcome of loading a persisted file into the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records inserted into the store.
    pub loaded: usize,
    /// Lines the codec could not decode.
    pub skipped: Vec<SkippedLine>,
    /// Decoded records dropped because they overlap an earlier record.
    pub rejected_overlaps: usize,
}

/// Facade over an appointment repository.
pub struct SchedulingService<R: AppointmentRepository = AppointmentStore> {
    repo: R,
}

impl SchedulingService<AppointmentStore> {
    /// Creates a service over an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(AppointmentStore::new())
    }
}

impl<R: AppointmentRepository> SchedulingService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Read access to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Validates input and inserts a new appointment.
    ///
    /// # Errors
    /// - `EmptyTitle`, `InvalidRange` from validation.
    /// - `Overlap` when the store rejects the insertion.
    pub fn create_appointment(
        &mut self,
        title: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<AppointmentId, ScheduleError> {
        let appointment = Appointment::new(title, start, end)?;
        let id = appointment.id;
        let probe = appointment.clone();

        if !self.repo.add(appointment) {
            warn!("event=appointment_create module=service status=rejected id={id}");
            return Err(self.overlap_error(&probe, None));
        }

        info!("event=appointment_create module=service status=ok id={id}");
        Ok(id)
    }

    /// Replaces `old_id` with a freshly validated appointment.
    ///
    /// The replacement gets a new id. On any error the old appointment
    /// stays in place.
    pub fn update_appointment(
        &mut self,
        old_id: AppointmentId,
        title: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<AppointmentId, ScheduleError> {
        let replacement = Appointment::new(title, start, end)?;
        let new_id = replacement.id;
        let probe = replacement.clone();

        if !self.repo.update(old_id, replacement) {
            warn!("event=appointment_update module=service status=rejected old_id={old_id}");
            return Err(self.overlap_error(&probe, Some(old_id)));
        }

        info!("event=appointment_update module=service status=ok old_id={old_id} new_id={new_id}");
        Ok(new_id)
    }

    /// Removes an appointment; absent ids are tolerated.
    ///
    /// Returns whether an appointment was removed.
    pub fn delete_appointment(&mut self, id: AppointmentId) -> bool {
        let removed = self.repo.delete(id).is_some();
        info!("event=appointment_delete module=service status=ok id={id} removed={removed}");
        removed
    }

    /// Appointments starting on `date`, ascending by start.
    pub fn appointments_for_day(&self, date: NaiveDate) -> Vec<Appointment> {
        self.repo.for_day(date)
    }

    /// Snapshot of all appointments in unspecified order.
    pub fn all_appointments(&self) -> Vec<Appointment> {
        self.repo.all()
    }

    pub fn appointment(&self, id: AppointmentId) -> Option<&Appointment> {
        self.repo.get(id)
    }

    /// Loads the persisted file at `path` into the store.
    pub fn load_all(&mut self, path: impl AsRef<Path>) -> CodecResult<LoadReport> {
        let decoded = codec::read_file(path)?;
        Ok(self.absorb(decoded))
    }

    /// Loads persisted lines from `reader` into the store.
    pub fn load_from(&mut self, reader: impl BufRead) -> CodecResult<LoadReport> {
        let decoded = codec::read_from(reader)?;
        Ok(self.absorb(decoded))
    }

    /// Overwrites `path` with every held appointment.
    pub fn persist_all(&self, path: impl AsRef<Path>) -> CodecResult<usize> {
        let snapshot = self.persist_order();
        codec::write_file(path, &snapshot)
    }

    /// Writes every held appointment to `writer`.
    pub fn persist_to(&self, writer: impl Write) -> CodecResult<usize> {
        let snapshot = self.persist_order();
        codec::write_to(writer, &snapshot)
    }

    fn persist_order(&self) -> Vec<Appointment> {
        let mut snapshot = self.repo.all();
        snapshot.sort_by_key(|appointment| appointment.start);
        snapshot
    }

    fn absorb(&mut self, decoded: DecodeReport) -> LoadReport {
        let mut report = LoadReport {
            skipped: decoded.skipped,
            ..LoadReport::default()
        };

        for appointment in decoded.appointments {
            if self.repo.add(appointment) {
                report.loaded += 1;
            } else {
                report.rejected_overlaps += 1;
            }
        }

        info!(
            "event=appointments_load module=service status=ok loaded={} skipped={} rejected_overlaps={}",
            report.loaded,
            report.skipped.len(),
            report.rejected_overlaps
        );
        report
    }

    fn overlap_error(
        &self,
        candidate: &Appointment,
        ignore: Option<AppointmentId>,
    ) -> ScheduleError {
        ScheduleError::Overlap {
            conflicting_title: self
                .repo
                .first_conflict(candidate, ignore)
                .map(|conflict| conflict.title.clone()),
        }
    }
}
