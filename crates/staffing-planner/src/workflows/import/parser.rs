use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::staffing::domain::{ConsultantId, MissionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordKind {
    Staffing,
    Timesheet,
}

#[derive(Debug)]
pub(crate) struct ChargeRecord {
    pub(crate) line: u64,
    /// `None` for kinds the importer does not know about.
    pub(crate) kind: Option<RecordKind>,
    pub(crate) consultant: ConsultantId,
    pub(crate) mission: MissionId,
    pub(crate) date: NaiveDate,
    pub(crate) charge: f64,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<ChargeRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());
        let row: ChargeRow = record.deserialize(Some(&headers))?;
        records.push(ChargeRecord {
            line,
            kind: parse_kind(&row.kind),
            consultant: ConsultantId(row.consultant),
            mission: MissionId(row.mission),
            date: row.date,
            charge: row.charge.unwrap_or(0.0),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ChargeRow {
    #[serde(rename = "Kind")]
    kind: String,
    #[serde(rename = "Consultant")]
    consultant: u64,
    #[serde(rename = "Mission")]
    mission: u64,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Charge", default, deserialize_with = "empty_string_as_none")]
    charge: Option<f64>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn parse_kind(value: &str) -> Option<RecordKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "staffing" | "forecast" => Some(RecordKind::Staffing),
        "timesheet" => Some(RecordKind::Timesheet),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn parse_kind_for_tests(value: &str) -> Option<RecordKind> {
    parse_kind(value)
}
