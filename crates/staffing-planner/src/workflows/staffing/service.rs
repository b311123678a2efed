use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::calendar::{days_of_month, month_start, WeekdayCalendar, WorkingDays};
use super::domain::{Consultant, ConsultantId, Mission, MissionId, Staffing, Timesheet};
use super::planning::{
    compute_consultant_timesheet, compute_mission_timesheet, compute_planning_review,
    ConsultantTimesheet, MissionTimesheet, PlanningDataset, PlanningError, PlanningQuery,
    PlanningReviewOutcome, PlanningReviewPage, ReviewOptions, TimesheetDataset,
};
use super::repository::{
    ConsultantFilter, MissionFilter, RecordStore, RepositoryError, StaffingFilter,
    TimesheetFilter,
};

/// Forecast entry as submitted by a manager or a consultant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingEntry {
    pub consultant: ConsultantId,
    pub mission: MissionId,
    /// Any day of the month; stored as the month start.
    pub month: NaiveDate,
    pub charge: f64,
}

/// Service composing the record store and the calendar for planning views and
/// staffing/timesheet entry.
pub struct StaffingService<R, C = WeekdayCalendar> {
    store: Arc<R>,
    calendar: Arc<C>,
}

impl<R> StaffingService<R, WeekdayCalendar>
where
    R: RecordStore + 'static,
{
    pub fn with_weekday_calendar(store: Arc<R>) -> Self {
        Self::new(store, Arc::new(WeekdayCalendar))
    }
}

impl<R, C> StaffingService<R, C>
where
    R: RecordStore + 'static,
    C: WorkingDays + 'static,
{
    pub fn new(store: Arc<R>, calendar: Arc<C>) -> Self {
        Self { store, calendar }
    }

    pub fn store(&self) -> &Arc<R> {
        &self.store
    }

    fn holiday_days(&self) -> Result<Vec<NaiveDate>, RepositoryError> {
        Ok(self
            .store
            .holidays()?
            .into_iter()
            .map(|holiday| holiday.day)
            .collect())
    }

    /// Staffing review of active productive consultants over the query window.
    pub fn planning_review(
        &self,
        query: &PlanningQuery,
    ) -> Result<PlanningReviewOutcome, PlanningError> {
        let consultants = self.store.consultants(ConsultantFilter::planning())?;
        if consultants.is_empty() {
            return Ok(PlanningReviewOutcome::NoProductiveConsultants);
        }

        let months = query.months();
        let staffing = self.store.staffing(&StaffingFilter {
            consultants: Some(consultants.iter().map(|consultant| consultant.id).collect()),
            mission: None,
            from: months.first().copied(),
            until: months.last().copied(),
        })?;
        let missions = self.store.missions(MissionFilter::default())?;
        let holidays = self.holiday_days()?;

        debug!(
            consultants = consultants.len(),
            staffing = staffing.len(),
            months = months.len(),
            "computing planning review"
        );

        let dataset = PlanningDataset {
            consultants: &consultants,
            staffing: &staffing,
            missions: &missions,
            holidays: &holidays,
        };
        let review = compute_planning_review(
            &dataset,
            &months,
            ReviewOptions {
                projected: query.projected,
                group_by: query.group_by,
            },
            self.calendar.as_ref(),
        );

        Ok(PlanningReviewOutcome::Ready(PlanningReviewPage {
            start_date: query.start,
            previous_slice: query.previous_slice(),
            next_slice: query.next_slice(),
            review,
        }))
    }

    pub fn consultant_timesheet(
        &self,
        consultant: ConsultantId,
        month: NaiveDate,
    ) -> Result<ConsultantTimesheet, PlanningError> {
        let consultant = self.require_consultant(consultant)?;
        let month = month_start(month);
        let last_day = days_of_month(month).last().copied().unwrap_or(month);

        let staffing = self.store.staffing(&StaffingFilter {
            consultants: Some(vec![consultant.id]),
            mission: None,
            from: Some(month),
            until: Some(last_day),
        })?;
        let timesheets = self.store.timesheets(&TimesheetFilter {
            consultant: Some(consultant.id),
            mission: None,
            from: Some(month),
            until: Some(last_day),
        })?;
        let missions = self.store.missions(MissionFilter::default())?;
        let holidays = self.holiday_days()?;

        let dataset = TimesheetDataset {
            timesheets: &timesheets,
            staffing: &staffing,
            missions: &missions,
            holidays: &holidays,
        };
        Ok(compute_consultant_timesheet(
            &consultant,
            month,
            &dataset,
            self.calendar.as_ref(),
        ))
    }

    /// Timesheet totals of a mission for every consultant staffed on it or
    /// having declared time on it.
    pub fn mission_timesheet(&self, mission: MissionId) -> Result<MissionTimesheet, PlanningError> {
        let mission = self
            .store
            .mission(mission)?
            .ok_or(RepositoryError::NotFound)?;

        let staffing = self.store.staffing(&StaffingFilter {
            mission: Some(mission.id),
            ..StaffingFilter::default()
        })?;
        let timesheets = self.store.timesheets(&TimesheetFilter {
            mission: Some(mission.id),
            ..TimesheetFilter::default()
        })?;

        let mut seen = HashSet::new();
        let mut consultants = Vec::new();
        let ids = staffing
            .iter()
            .map(|row| row.consultant)
            .chain(timesheets.iter().map(|row| row.consultant));
        for id in ids {
            if seen.insert(id) {
                if let Some(consultant) = self.store.consultant(id)? {
                    consultants.push(consultant);
                }
            }
        }

        Ok(compute_mission_timesheet(&mission, &consultants, &timesheets))
    }

    pub fn missions(&self, only_active: bool) -> Result<Vec<Mission>, StaffingError> {
        Ok(self.store.missions(MissionFilter { only_active })?)
    }

    pub fn deactivate_mission(
        &self,
        mission: MissionId,
        now: NaiveDateTime,
    ) -> Result<Mission, StaffingError> {
        let mut mission = self
            .store
            .mission(mission)?
            .ok_or(RepositoryError::NotFound)?;
        mission.active = false;
        mission.update_date = Some(now);
        self.store.save_mission(&mission)?;
        info!(mission = %mission.id, "mission deactivated");
        Ok(mission)
    }

    /// Active missions a consultant is staffed on, ordered by lead name.
    /// Missions without a lead come last.
    pub fn consultant_missions(
        &self,
        consultant: ConsultantId,
    ) -> Result<Vec<Mission>, StaffingError> {
        let staffing = self.store.staffing(&StaffingFilter {
            consultants: Some(vec![consultant]),
            ..StaffingFilter::default()
        })?;

        let mut seen = HashSet::new();
        let mut missions = Vec::new();
        for id in staffing.iter().map(|row| row.mission) {
            if !seen.insert(id) {
                continue;
            }
            if let Some(mission) = self.store.mission(id)? {
                if mission.active {
                    missions.push(mission);
                }
            }
        }

        missions.sort_by(|a, b| {
            let left = (a.lead_name.is_none(), &a.lead_name, a.id);
            left.cmp(&(b.lead_name.is_none(), &b.lead_name, b.id))
        });
        Ok(missions)
    }

    pub fn record_staffing(
        &self,
        entry: StaffingEntry,
        author: &str,
        now: NaiveDateTime,
    ) -> Result<Staffing, StaffingError> {
        let month_days = days_of_month(entry.month).len() as f64;
        validate_charge(entry.charge, month_days)?;
        let staffing = Staffing {
            consultant: entry.consultant,
            mission: entry.mission,
            staffing_date: month_start(entry.month),
            charge: entry.charge,
            last_user: author.to_string(),
            update_date: now,
        };
        let (consultant, mission, date) = staffing.key();
        let stored = self
            .store
            .insert_staffing(staffing)
            .map_err(|err| conflict_or(err, consultant, mission, date))?;
        debug!(%consultant, %mission, %date, charge = stored.charge, "staffing recorded");
        Ok(stored)
    }

    pub fn record_timesheet(&self, timesheet: Timesheet) -> Result<Timesheet, StaffingError> {
        validate_charge(timesheet.charge, MAX_TIMESHEET_CHARGE)?;
        let (consultant, mission, date) = timesheet.key();
        let stored = self
            .store
            .insert_timesheet(timesheet)
            .map_err(|err| conflict_or(err, consultant, mission, date))?;
        debug!(%consultant, %mission, %date, charge = stored.charge, "timesheet recorded");
        Ok(stored)
    }

    fn require_consultant(&self, id: ConsultantId) -> Result<Consultant, RepositoryError> {
        self.store.consultant(id)?.ok_or(RepositoryError::NotFound)
    }
}

/// A timesheet entry covers a single day.
const MAX_TIMESHEET_CHARGE: f64 = 1.0;

/// Staffing is capped by the calendar days of its month, timesheets by one day.
fn validate_charge(charge: f64, max: f64) -> Result<(), StaffingError> {
    if charge.is_finite() && (0.0..=max).contains(&charge) {
        Ok(())
    } else {
        Err(StaffingError::Validation(format!(
            "charge must be between 0 and {max} days, got {charge}"
        )))
    }
}

fn conflict_or(
    err: RepositoryError,
    consultant: ConsultantId,
    mission: MissionId,
    date: NaiveDate,
) -> StaffingError {
    match err {
        RepositoryError::Conflict => StaffingError::Conflict {
            consultant,
            mission,
            date,
        },
        other => StaffingError::Repository(other),
    }
}

/// Error raised by staffing and mission operations.
#[derive(Debug, thiserror::Error)]
pub enum StaffingError {
    #[error("invalid entry: {0}")]
    Validation(String),
    #[error("an entry already exists for {consultant} on {mission} at {date}")]
    Conflict {
        consultant: ConsultantId,
        mission: MissionId,
        date: NaiveDate,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
