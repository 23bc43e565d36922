//! Line codec: one `title,start,end` record per line.
//!
//! Titles are backslash-escaped so embedded delimiters survive a round
//! trip. A title without `\`, `,`, CR or LF encodes to exactly the plain
//! comma-joined form.

use super::{CodecError, CodecResult};
use crate::model::appointment::{Appointment, AppointmentValidationError};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

/// Canonical timestamp format; the fraction is only printed when non-zero.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const TIMESTAMP_FORMAT_SPACED: &str = "%Y-%m-%d %H:%M:%S%.f";
const FIELD_DELIMITER: char = ',';
const ESCAPE: char = '\\';
const FIELD_COUNT: usize = 3;
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Why one persisted line was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Line did not split into exactly three fields.
    FieldCount(usize),
    InvalidStart(String),
    InvalidEnd(String),
    /// Line bytes are not valid UTF-8.
    InvalidUtf8,
    /// Fields parsed but failed appointment validation.
    Invalid(AppointmentValidationError),
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldCount(count) => {
                write!(f, "expected {FIELD_COUNT} fields, found {count}")
            }
            Self::InvalidStart(value) => write!(f, "unparsable start timestamp `{value}`"),
            Self::InvalidEnd(value) => write!(f, "unparsable end timestamp `{value}`"),
            Self::InvalidUtf8 => write!(f, "line is not valid UTF-8"),
            Self::Invalid(err) => write!(f, "{err}"),
        }
    }
}

/// Diagnostic for a dropped line (1-based `line_number`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub reason: SkipReason,
}

/// Decode result carrying both accepted records and skip diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub appointments: Vec<Appointment>,
    pub skipped: Vec<SkippedLine>,
}

/// Encodes one appointment as a persisted line (without line terminator).
pub fn encode_line(appointment: &Appointment) -> String {
    format!(
        "{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
        escape_field(&appointment.title),
        appointment.start.format(TIMESTAMP_FORMAT),
        appointment.end.format(TIMESTAMP_FORMAT)
    )
}

/// Encodes appointments in the given order, one line each.
pub fn encode<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Vec<String> {
    appointments.into_iter().map(encode_line).collect()
}

/// Decodes lines, silently dropping malformed ones.
pub fn decode<I, S>(lines: I) -> Vec<Appointment>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    decode_with_report(lines).appointments
}

/// Decodes lines and reports every dropped line.
///
/// Blank lines are ignored without a diagnostic.
pub fn decode_with_report<I, S>(lines: I) -> DecodeReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = DecodeReport::default();
    for (index, line) in lines.into_iter().enumerate() {
        push_line(&mut report, index + 1, line.as_ref());
    }
    report
}

/// Reads and decodes every line from `reader`.
///
/// Lines that are not valid UTF-8 are skipped like any other malformed
/// line; only I/O failures abort the read.
pub fn read_from(reader: impl BufRead) -> CodecResult<DecodeReport> {
    let mut report = DecodeReport::default();

    for (index, raw) in reader.split(b'\n').enumerate() {
        let raw = raw.map_err(|err| CodecError::read(None, err))?;
        let line_number = index + 1;
        match String::from_utf8(raw) {
            Ok(line) => push_line(&mut report, line_number, &line),
            Err(_) => report.skipped.push(SkippedLine {
                line_number,
                reason: SkipReason::InvalidUtf8,
            }),
        }
    }

    Ok(report)
}

fn push_line(report: &mut DecodeReport, line_number: usize, line: &str) {
    let mut line = line.trim_end_matches('\r');
    if line_number == 1 {
        line = line.trim_start_matches(BYTE_ORDER_MARK);
    }
    if line.trim().is_empty() {
        return;
    }
    match decode_line(line) {
        Ok(appointment) => report.appointments.push(appointment),
        Err(reason) => report.skipped.push(SkippedLine {
            line_number,
            reason,
        }),
    }
}

/// Reads the persisted file at `path`.
///
/// A missing file yields an empty report.
pub fn read_file(path: impl AsRef<Path>) -> CodecResult<DecodeReport> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!("event=codec_read module=codec status=ok missing_file=true");
            return Ok(DecodeReport::default());
        }
        Err(err) => return Err(CodecError::read(Some(path.to_path_buf()), err)),
    };

    let report = read_from(BufReader::new(file)).map_err(|err| match err {
        CodecError::Read { source, .. } => CodecError::read(Some(path.to_path_buf()), source),
        other => other,
    })?;

    for skipped in &report.skipped {
        warn!(
            "event=codec_skip module=codec status=skipped line={} reason={}",
            skipped.line_number, skipped.reason
        );
    }
    info!(
        "event=codec_read module=codec status=ok accepted={} skipped={}",
        report.appointments.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Writes one line per appointment to `writer`.
pub fn write_to<'a>(
    mut writer: impl Write,
    appointments: impl IntoIterator<Item = &'a Appointment>,
) -> CodecResult<usize> {
    let mut written = 0;
    for line in encode(appointments) {
        writeln!(writer, "{line}").map_err(|err| CodecError::write(None, err))?;
        written += 1;
    }
    writer.flush().map_err(|err| CodecError::write(None, err))?;
    Ok(written)
}

/// Overwrites `path` with the encoded appointments.
///
/// Content goes to a sibling temp file first and is renamed into place,
/// so readers never observe a half-written file.
pub fn write_file<'a>(
    path: impl AsRef<Path>,
    appointments: impl IntoIterator<Item = &'a Appointment>,
) -> CodecResult<usize> {
    let path = path.as_ref();
    let to_error = |err| CodecError::write(Some(path.to_path_buf()), err);

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_error)?;
    }

    let temp_path = temp_sibling(path);
    let file = File::create(&temp_path).map_err(to_error)?;
    let written = match write_to(BufWriter::new(file), appointments) {
        Ok(written) => written,
        Err(err) => {
            let _ = fs::remove_file(&temp_path);
            return Err(match err {
                CodecError::Write { source, .. } => to_error(source),
                other => other,
            });
        }
    };
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(to_error(err));
    }

    info!("event=codec_write module=codec status=ok written={written}");
    Ok(written)
}

fn temp_sibling(path: &Path) -> std::path::PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "appointments".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

fn decode_line(line: &str) -> Result<Appointment, SkipReason> {
    let fields = split_fields(line);
    if fields.len() != FIELD_COUNT {
        return Err(SkipReason::FieldCount(fields.len()));
    }

    let start = parse_timestamp(&fields[1])
        .ok_or_else(|| SkipReason::InvalidStart(fields[1].clone()))?;
    let end =
        parse_timestamp(&fields[2]).ok_or_else(|| SkipReason::InvalidEnd(fields[2].clone()))?;

    Appointment::new(&fields[0], start, end).map_err(SkipReason::Invalid)
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT_SPACED))
        .ok()
}

fn escape_field(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            ESCAPE => escaped.push_str("\\\\"),
            FIELD_DELIMITER => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Splits on unescaped delimiters and unescapes each field.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            ESCAPE => match chars.next() {
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                Some(escaped) => current.push(escaped),
                None => current.push(ESCAPE),
            },
            FIELD_DELIMITER => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::{escape_field, split_fields};

    #[test]
    fn split_respects_escaped_delimiters() {
        let fields = split_fields(r"a\,b,2024-01-01T09:00:00,2024-01-01T10:00:00");
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], "a,b");
    }

    #[test]
    fn escape_leaves_plain_titles_untouched() {
        assert_eq!(escape_field("Dentist"), "Dentist");
        assert_eq!(escape_field("a\\b\nc"), "a\\\\b\\nc");
    }

    #[test]
    fn trailing_escape_is_kept_literally() {
        let fields = split_fields("title\\");
        assert_eq!(fields, vec!["title\\".to_string()]);
    }
}
