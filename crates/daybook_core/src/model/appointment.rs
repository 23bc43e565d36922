//! Appointment domain model.
//!
//! # Responsibility
//! - Define the titled half-open interval `[start, end)` handled by core.
//! - Provide the overlap predicate used by the store invariant.
//!
//! # Invariants
//! - `title` is trimmed and never empty.
//! - `end` is strictly greater than `start`.
//! - Touching intervals (`a.end == b.start`) do not overlap.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque identifier assigned when an appointment is constructed.
///
/// Identity is session-scoped: the flat persistence format does not carry
/// it, so records loaded from disk receive fresh ids.
pub type AppointmentId = Uuid;

const TIME_LABEL_FORMAT: &str = "%H:%M";

/// Validation failure raised while constructing an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
    /// `end` is not strictly after `start`.
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl Display for AppointmentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "appointment title must not be empty"),
            Self::InvalidRange { start, end } => write!(
                f,
                "appointment end `{end}` must be after start `{start}`"
            ),
        }
    }
}

impl Error for AppointmentValidationError {}

/// A titled time interval held by the appointment store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Session-stable identity used by update/delete.
    pub id: AppointmentId,
    /// Trimmed, non-empty display title.
    pub title: String,
    /// Inclusive start of the interval.
    pub start: NaiveDateTime,
    /// Exclusive end of the interval.
    pub end: NaiveDateTime,
}

impl Appointment {
    /// Validates raw input and builds an appointment with a fresh id.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is empty after trimming.
    /// - `InvalidRange` when `end <= start`.
    pub fn new(
        title: impl AsRef<str>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, AppointmentValidationError> {
        Self::with_id(Uuid::new_v4(), title, start, end)
    }

    /// Same as [`Appointment::new`] but keeps a caller-provided id.
    pub fn with_id(
        id: AppointmentId,
        title: impl AsRef<str>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, AppointmentValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(AppointmentValidationError::EmptyTitle);
        }
        if end <= start {
            return Err(AppointmentValidationError::InvalidRange { start, end });
        }

        Ok(Self {
            id,
            title: title.to_string(),
            start,
            end,
        })
    }

    /// Half-open interval overlap test.
    pub fn overlaps(&self, other: &Appointment) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Calendar day the appointment starts on.
    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    /// Display range such as `09:00 - 10:30`.
    pub fn time_range_label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format(TIME_LABEL_FORMAT),
            self.end.format(TIME_LABEL_FORMAT)
        )
    }

    /// Compares title and interval, ignoring identity.
    pub fn same_fields(&self, other: &Appointment) -> bool {
        self.title == other.title && self.start == other.start && self.end == other.end
    }
}

#[cfg(test)]
mod tests {
    use super::{Appointment, AppointmentValidationError};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let first = Appointment::new("first", at(9, 0), at(10, 0)).unwrap();
        let second = Appointment::new("second", at(10, 0), at(11, 0)).unwrap();
        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
    }

    #[test]
    fn contained_interval_overlaps() {
        let outer = Appointment::new("outer", at(9, 0), at(12, 0)).unwrap();
        let inner = Appointment::new("inner", at(10, 0), at(10, 30)).unwrap();
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn zero_length_range_is_rejected() {
        let err = Appointment::new("x", at(9, 0), at(9, 0)).unwrap_err();
        assert!(matches!(err, AppointmentValidationError::InvalidRange { .. }));
    }
}
