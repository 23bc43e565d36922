//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the scheduling contract to Dart via FRB sync functions.
//! - Own the single process-wide session (store + data file path).
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every store access happens under the session mutex, so the overlap
//!   check and the insertion it guards run as one critical section.
//! - Timestamps cross the boundary as epoch milliseconds of naive
//!   wall-clock time.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use daybook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, Appointment,
    AppointmentId, CoreConfig, ScheduleError, SchedulingService,
};
use log::warn;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

static SESSION: Lazy<Mutex<Session>> = Lazy::new(|| Mutex::new(Session::default()));

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One appointment row for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentItem {
    /// Session-scoped appointment ID in string form.
    pub appointment_id: String,
    pub title: String,
    pub start_epoch_ms: i64,
    pub end_epoch_ms: i64,
    /// Display range such as `09:00 - 10:00`.
    pub time_range: String,
}

/// Action response envelope for create/update/delete/save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created or replacement appointment ID.
    pub appointment_id: Option<String>,
    /// `empty_title|invalid_range|overlap|invalid_input|io` on failure.
    pub error_kind: Option<String>,
    /// Human-readable message for the UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, appointment_id: Option<AppointmentId>) -> Self {
        Self {
            ok: true,
            appointment_id: appointment_id.map(|id| id.to_string()),
            error_kind: None,
            message: message.into(),
        }
    }

    fn failure(kind: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            appointment_id: None,
            error_kind: Some(kind.to_string()),
            message: message.into(),
        }
    }

    fn schedule_failure(err: &ScheduleError) -> Self {
        Self::failure(err.kind().as_str(), err.to_string())
    }
}

/// Load response envelope for session startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResponse {
    pub ok: bool,
    pub loaded: u32,
    pub rejected_overlaps: u32,
    /// One diagnostic per skipped line, `line N: reason`.
    pub skipped_lines: Vec<String>,
    pub message: String,
}

/// Day listing envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayResponse {
    /// Items ordered by start time.
    pub items: Vec<AppointmentItem>,
    pub message: String,
}

/// Opens the session: clears the store and loads the data file.
///
/// `data_file = None` falls back to `DAYBOOK_DATA_FILE` or the default.
#[flutter_rust_bridge::frb(sync)]
pub fn session_open(data_file: Option<String>) -> LoadResponse {
    let path = data_file
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| CoreConfig::from_env().data_file);
    lock_session().open(path)
}

/// Persists the session store to its data file.
#[flutter_rust_bridge::frb(sync)]
pub fn session_save() -> ActionResponse {
    lock_session().save()
}

/// Creates one appointment.
#[flutter_rust_bridge::frb(sync)]
pub fn appointment_create(
    title: String,
    start_epoch_ms: i64,
    end_epoch_ms: i64,
) -> ActionResponse {
    lock_session().create(&title, start_epoch_ms, end_epoch_ms)
}

/// Replaces an appointment; on failure the old one stays in place.
#[flutter_rust_bridge::frb(sync)]
pub fn appointment_update(
    appointment_id: String,
    title: String,
    start_epoch_ms: i64,
    end_epoch_ms: i64,
) -> ActionResponse {
    lock_session().update(&appointment_id, &title, start_epoch_ms, end_epoch_ms)
}

/// Deletes an appointment; unknown IDs still succeed.
#[flutter_rust_bridge::frb(sync)]
pub fn appointment_delete(appointment_id: String) -> ActionResponse {
    lock_session().delete(&appointment_id)
}

/// Lists appointments starting on the given calendar day.
#[flutter_rust_bridge::frb(sync)]
pub fn appointments_for_day(year: i32, month: u32, day: u32) -> DayResponse {
    lock_session().for_day(year, month, day)
}

fn lock_session() -> MutexGuard<'static, Session> {
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Session {
    service: SchedulingService,
    data_file: Option<PathBuf>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            service: SchedulingService::in_memory(),
            data_file: None,
        }
    }
}

impl Session {
    fn open(&mut self, path: PathBuf) -> LoadResponse {
        let mut service = SchedulingService::in_memory();
        match service.load_all(&path) {
            Ok(report) => {
                let skipped_lines = report
                    .skipped
                    .iter()
                    .map(|line| format!("line {}: {}", line.line_number, line.reason))
                    .collect::<Vec<_>>();
                self.service = service;
                self.data_file = Some(path);
                LoadResponse {
                    ok: true,
                    loaded: saturating_u32(report.loaded),
                    rejected_overlaps: saturating_u32(report.rejected_overlaps),
                    message: format!("Loaded {} appointment(s).", report.loaded),
                    skipped_lines,
                }
            }
            Err(err) => LoadResponse {
                ok: false,
                loaded: 0,
                rejected_overlaps: 0,
                skipped_lines: Vec::new(),
                message: format!("session_open failed: {err}"),
            },
        }
    }

    fn save(&self) -> ActionResponse {
        let Some(path) = self.data_file.as_ref() else {
            return ActionResponse::failure("io", "session_save failed: no session open");
        };
        match self.service.persist_all(path) {
            Ok(written) => {
                ActionResponse::success(format!("Saved {written} appointment(s)."), None)
            }
            Err(err) => ActionResponse::failure("io", format!("session_save failed: {err}")),
        }
    }

    fn create(&mut self, title: &str, start_epoch_ms: i64, end_epoch_ms: i64) -> ActionResponse {
        let (start, end) = match parse_range(start_epoch_ms, end_epoch_ms) {
            Ok(range) => range,
            Err(response) => return response,
        };
        match self.service.create_appointment(title, start, end) {
            Ok(id) => ActionResponse::success("Appointment created.", Some(id)),
            Err(err) => ActionResponse::schedule_failure(&err),
        }
    }

    fn update(
        &mut self,
        appointment_id: &str,
        title: &str,
        start_epoch_ms: i64,
        end_epoch_ms: i64,
    ) -> ActionResponse {
        let old_id = match parse_id(appointment_id) {
            Ok(id) => id,
            Err(response) => return response,
        };
        let (start, end) = match parse_range(start_epoch_ms, end_epoch_ms) {
            Ok(range) => range,
            Err(response) => return response,
        };
        match self.service.update_appointment(old_id, title, start, end) {
            Ok(id) => ActionResponse::success("Appointment updated.", Some(id)),
            Err(err) => ActionResponse::schedule_failure(&err),
        }
    }

    fn delete(&mut self, appointment_id: &str) -> ActionResponse {
        let id = match parse_id(appointment_id) {
            Ok(id) => id,
            Err(response) => return response,
        };
        if !self.service.delete_appointment(id) {
            warn!("event=ffi_delete module=ffi status=ok removed=false id={id}");
        }
        ActionResponse::success("Appointment deleted.", None)
    }

    fn for_day(&self, year: i32, month: u32, day: u32) -> DayResponse {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            return DayResponse {
                items: Vec::new(),
                message: format!("invalid date {year:04}-{month:02}-{day:02}"),
            };
        };
        let items = self
            .service
            .appointments_for_day(date)
            .iter()
            .map(to_item)
            .collect::<Vec<_>>();
        let message = if items.is_empty() {
            "No appointments.".to_string()
        } else {
            format!("{} appointment(s).", items.len())
        };
        DayResponse { items, message }
    }
}

fn parse_id(raw: &str) -> Result<AppointmentId, ActionResponse> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        ActionResponse::failure("invalid_input", format!("invalid appointment id `{raw}`"))
    })
}

fn parse_range(
    start_ms: i64,
    end_ms: i64,
) -> Result<(NaiveDateTime, NaiveDateTime), ActionResponse> {
    let start = from_epoch_ms(start_ms).ok_or_else(|| {
        ActionResponse::failure("invalid_input", format!("start out of range: {start_ms}"))
    })?;
    let end = from_epoch_ms(end_ms).ok_or_else(|| {
        ActionResponse::failure("invalid_input", format!("end out of range: {end_ms}"))
    })?;
    Ok((start, end))
}

fn from_epoch_ms(value: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(value).map(|dt| dt.naive_utc())
}

fn to_epoch_ms(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_millis()
}

fn to_item(appointment: &Appointment) -> AppointmentItem {
    AppointmentItem {
        appointment_id: appointment.id.to_string(),
        title: appointment.title.clone(),
        start_epoch_ms: to_epoch_ms(appointment.start),
        end_epoch_ms: to_epoch_ms(appointment.end),
        time_range: appointment.time_range_label(),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
