//! Domain model for time-bound appointments.
//!
//! # Responsibility
//! - Define the canonical appointment record shared by store, codec and
//!   service layers.
//! - Own construction-time validation so invalid ranges never reach storage.
//!
//! # Invariants
//! - Every appointment carries a session-stable `AppointmentId`.
//! - `end > start` holds for every constructed appointment.

pub mod appointment;
