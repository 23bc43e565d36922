//! Core appointment scheduling logic for daybook.
//! This crate is the single source of truth for the no-overlap invariant.

pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use codec::{CodecError, CodecResult, DecodeReport, SkipReason, SkippedLine};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::appointment::{Appointment, AppointmentId, AppointmentValidationError};
pub use repo::appointment_store::{AppointmentRepository, AppointmentStore};
pub use service::scheduling_service::{
    LoadReport, ScheduleError, ScheduleErrorKind, SchedulingService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
