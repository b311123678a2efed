//! CSV loading of forecast staffing and declared timesheets.
//!
//! Expected columns: `Kind,Consultant,Mission,Date,Charge`. `Kind` is
//! `staffing` or `timesheet`; rows of any other kind are skipped.

mod parser;

use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::workflows::staffing::calendar::WorkingDays;
use crate::workflows::staffing::domain::Timesheet;
use crate::workflows::staffing::repository::RecordStore;
use crate::workflows::staffing::service::{StaffingEntry, StaffingError, StaffingService};

use parser::{ChargeRecord, RecordKind};

#[derive(Debug)]
pub enum StaffingImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Staffing { line: u64, source: StaffingError },
}

impl std::fmt::Display for StaffingImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaffingImportError::Io(err) => write!(f, "failed to read staffing export: {}", err),
            StaffingImportError::Csv(err) => write!(f, "invalid staffing CSV data: {}", err),
            StaffingImportError::Staffing { line, source } => {
                write!(f, "could not record line {}: {}", line, source)
            }
        }
    }
}

impl std::error::Error for StaffingImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StaffingImportError::Io(err) => Some(err),
            StaffingImportError::Csv(err) => Some(err),
            StaffingImportError::Staffing { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for StaffingImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for StaffingImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Counts of what an import recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub staffing: usize,
    pub timesheets: usize,
    pub skipped: usize,
}

pub struct StaffingCsvImporter;

impl StaffingCsvImporter {
    pub fn from_path<P, R, C>(
        path: P,
        service: &StaffingService<R, C>,
        author: &str,
        now: NaiveDateTime,
    ) -> Result<ImportSummary, StaffingImportError>
    where
        P: AsRef<Path>,
        R: RecordStore + 'static,
        C: WorkingDays + 'static,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, service, author, now)
    }

    /// Record every row through `service`. Rows are applied in order and the
    /// first failing row stops the import; earlier rows stay recorded.
    pub fn from_reader<Rd, R, C>(
        reader: Rd,
        service: &StaffingService<R, C>,
        author: &str,
        now: NaiveDateTime,
    ) -> Result<ImportSummary, StaffingImportError>
    where
        Rd: Read,
        R: RecordStore + 'static,
        C: WorkingDays + 'static,
    {
        let mut summary = ImportSummary::default();

        for record in parser::parse_records(reader)? {
            let line = record.line;
            apply_record(record, service, author, now, &mut summary)
                .map_err(|source| StaffingImportError::Staffing { line, source })?;
        }

        info!(
            staffing = summary.staffing,
            timesheets = summary.timesheets,
            skipped = summary.skipped,
            "staffing import finished"
        );
        Ok(summary)
    }
}

fn apply_record<R, C>(
    record: ChargeRecord,
    service: &StaffingService<R, C>,
    author: &str,
    now: NaiveDateTime,
    summary: &mut ImportSummary,
) -> Result<(), StaffingError>
where
    R: RecordStore + 'static,
    C: WorkingDays + 'static,
{
    match record.kind {
        Some(RecordKind::Staffing) => {
            service.record_staffing(
                StaffingEntry {
                    consultant: record.consultant,
                    mission: record.mission,
                    month: record.date,
                    charge: record.charge,
                },
                author,
                now,
            )?;
            summary.staffing += 1;
        }
        Some(RecordKind::Timesheet) => {
            service.record_timesheet(Timesheet {
                consultant: record.consultant,
                mission: record.mission,
                working_date: record.date,
                charge: record.charge,
            })?;
            summary.timesheets += 1;
        }
        None => {
            warn!(line = record.line, "skipping row of unknown kind");
            summary.skipped += 1;
        }
    }

    Ok(())
}
