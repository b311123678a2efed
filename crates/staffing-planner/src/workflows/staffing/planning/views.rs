use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{ConsultantId, MissionId, MissionNature};
use super::query::GroupBy;

/// Day totals of one consultant (or of the whole team) for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StaffingCell {
    pub prod: i64,
    pub unprod: i64,
    pub holidays: i64,
    /// May go negative when the consultant is overcommitted.
    pub available: i64,
}

impl StaffingCell {
    pub fn staffed(&self) -> i64 {
        self.prod
            .saturating_add(self.unprod)
            .saturating_add(self.holidays)
    }

    pub(crate) fn accumulate(&mut self, other: &StaffingCell) {
        self.prod = self.prod.saturating_add(other.prod);
        self.unprod = self.unprod.saturating_add(other.unprod);
        self.holidays = self.holidays.saturating_add(other.holidays);
        self.available = self.available.saturating_add(other.available);
    }
}

/// Utilization percentages of one month, rounded to integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthRates {
    pub prod: i64,
    pub unprod: i64,
    pub holidays: i64,
    pub available: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissionLink {
    pub mission: MissionId,
    pub short_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultantPlanningRow {
    pub consultant: ConsultantId,
    pub name: String,
    pub trigramme: String,
    pub manager: Option<String>,
    pub profile_level: Option<u32>,
    /// One cell per reviewed month.
    pub months: Vec<StaffingCell>,
    /// Distinct productive missions, in the order they were encountered.
    pub prod_missions: Vec<MissionLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningReview {
    pub months: Vec<NaiveDate>,
    pub available_days: Vec<u32>,
    pub rows: Vec<ConsultantPlanningRow>,
    pub totals: Vec<StaffingCell>,
    pub rates: Vec<MonthRates>,
    pub projected: bool,
    pub group_by: GroupBy,
}

impl PlanningReview {
    pub fn people(&self) -> usize {
        self.rows.len()
    }
}

/// Review plus the paging anchors of the previous and next slices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningReviewPage {
    pub start_date: NaiveDate,
    pub previous_slice: NaiveDate,
    pub next_slice: NaiveDate,
    pub review: PlanningReview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanningReviewOutcome {
    NoProductiveConsultants,
    Ready(PlanningReviewPage),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimesheetMissionLine {
    pub mission: MissionId,
    pub name: String,
    pub nature: Option<MissionNature>,
    pub forecast: f64,
    pub actual: f64,
    /// Declared charge per day of the month; `None` when nothing was declared.
    pub daily: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultantTimesheet {
    pub consultant: ConsultantId,
    pub month: NaiveDate,
    pub days: Vec<NaiveDate>,
    pub missions: Vec<TimesheetMissionLine>,
    pub working_days: u32,
    pub declared: f64,
    /// Positive when under-declared, negative when overtime was declared.
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionTimesheetRow {
    pub consultant: ConsultantId,
    pub name: String,
    /// One value per month, followed by the consultant total.
    pub charges: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionTimesheet {
    pub mission: MissionId,
    pub name: String,
    pub months: Vec<NaiveDate>,
    pub rows: Vec<MissionTimesheetRow>,
    /// Column sums of `rows`, including the grand total in last position.
    pub totals: Vec<f64>,
}
