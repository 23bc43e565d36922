//! Command-line front end for daybook.
//!
//! # Responsibility
//! - Load the data file once, run one command through the scheduling
//!   service, and persist once when the command changed the store.
//! - Address appointments by their position in a day listing, since
//!   appointment ids do not survive a process restart.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use daybook_core::{init_from_config, Appointment, CoreConfig, SchedulingService};
use log::info;
use std::path::PathBuf;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Manage non-overlapping appointments stored in a flat file")]
struct Cli {
    /// Appointment file (defaults to DAYBOOK_DATA_FILE or appointments.csv)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Absolute directory for log files (defaults to DAYBOOK_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (defaults to DAYBOOK_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new appointment
    Add {
        /// Appointment title
        title: String,

        /// Start (e.g. "2024-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// End (e.g. "2024-03-20T16:00")
        #[arg(short, long)]
        end: String,
    },
    /// List appointments for one day
    List {
        /// Day to list (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Replace an appointment; omitted fields keep their current value
    Update {
        /// Day the appointment starts on (YYYY-MM-DD)
        date: String,

        /// 1-based position in that day's listing
        position: usize,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,
    },
    /// Delete an appointment
    Delete {
        /// Day the appointment starts on (YYYY-MM-DD)
        date: String,

        /// 1-based position in that day's listing
        position: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CoreConfig::from_env();
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }
    if let Some(log_dir) = cli.log_dir {
        config.log_dir = Some(log_dir);
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }
    init_from_config(&config).map_err(anyhow::Error::msg)?;

    let mut service = SchedulingService::in_memory();
    let report = service
        .load_all(&config.data_file)
        .with_context(|| format!("Failed to load {}", config.data_file.display()))?;
    for skipped in &report.skipped {
        eprintln!("warning: skipped line {}: {}", skipped.line_number, skipped.reason);
    }
    if report.rejected_overlaps > 0 {
        eprintln!(
            "warning: dropped {} overlapping appointment(s) from {}",
            report.rejected_overlaps,
            config.data_file.display()
        );
    }

    let changed = run(&mut service, cli.command)?;

    if changed {
        let written = service
            .persist_all(&config.data_file)
            .with_context(|| format!("Failed to save {}", config.data_file.display()))?;
        info!("event=cli_persist module=cli status=ok written={written}");
    }
    Ok(())
}

/// Runs one command; returns whether the store changed.
fn run(service: &mut SchedulingService, command: Commands) -> Result<bool> {
    match command {
        Commands::Add { title, start, end } => {
            let start = parse_timestamp(&start)?;
            let end = parse_timestamp(&end)?;
            service.create_appointment(&title, start, end)?;
            println!("Appointment created.");
            Ok(true)
        }
        Commands::List { date } => {
            let date = match date {
                Some(raw) => parse_date(&raw)?,
                None => Local::now().date_naive(),
            };
            print_day(service, date);
            Ok(false)
        }
        Commands::Update {
            date,
            position,
            title,
            start,
            end,
        } => {
            let current = select(service, &parse_date(&date)?, position)?;
            let title = title.unwrap_or_else(|| current.title.clone());
            let start = start
                .as_deref()
                .map(parse_timestamp)
                .transpose()?
                .unwrap_or(current.start);
            let end = end
                .as_deref()
                .map(parse_timestamp)
                .transpose()?
                .unwrap_or(current.end);
            service.update_appointment(current.id, &title, start, end)?;
            println!("Appointment updated.");
            Ok(true)
        }
        Commands::Delete { date, position } => {
            let current = select(service, &parse_date(&date)?, position)?;
            service.delete_appointment(current.id);
            println!("Deleted: {} {}", current.time_range_label(), current.title);
            Ok(true)
        }
    }
}

fn select(service: &SchedulingService, date: &NaiveDate, position: usize) -> Result<Appointment> {
    let day = service.appointments_for_day(*date);
    if position == 0 || position > day.len() {
        bail!(
            "No appointment at position {} on {} ({} listed)",
            position,
            date.format(DATE_FORMAT),
            day.len()
        );
    }
    Ok(day[position - 1].clone())
}

fn print_day(service: &SchedulingService, date: NaiveDate) {
    let day = service.appointments_for_day(date);
    if day.is_empty() {
        println!("No appointments on {}.", date.format(DATE_FORMAT));
        return;
    }
    println!("{}", date.format("%A, %Y-%m-%d"));
    for (index, appointment) in day.iter().enumerate() {
        println!(
            "  {}. {}  {}",
            index + 1,
            appointment.time_range_label(),
            appointment.title
        );
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date '{raw}'. Expected YYYY-MM-DD"))
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .with_context(|| format!("Invalid date/time '{raw}'. Expected YYYY-MM-DDTHH:MM"))
}
