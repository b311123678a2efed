use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    Consultant, ConsultantId, Holiday, Lead, LeadId, Mission, MissionId, Staffing, Timesheet,
};

/// Filter applied when listing missions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissionFilter {
    pub only_active: bool,
}

/// Filter applied when listing consultants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsultantFilter {
    pub only_active: bool,
    pub only_productive: bool,
}

impl ConsultantFilter {
    pub const fn planning() -> Self {
        Self {
            only_active: true,
            only_productive: true,
        }
    }

    pub fn matches(&self, consultant: &Consultant) -> bool {
        (!self.only_active || consultant.active) && (!self.only_productive || consultant.productive)
    }
}

/// Staffing query; date bounds are inclusive and compared on `staffing_date`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffingFilter {
    pub consultants: Option<Vec<ConsultantId>>,
    pub mission: Option<MissionId>,
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl StaffingFilter {
    pub fn matches(&self, staffing: &Staffing) -> bool {
        self.consultants
            .as_ref()
            .map_or(true, |ids| ids.contains(&staffing.consultant))
            && self.mission.map_or(true, |id| id == staffing.mission)
            && self.from.map_or(true, |from| staffing.staffing_date >= from)
            && self.until.map_or(true, |until| staffing.staffing_date <= until)
    }
}

/// Timesheet query; date bounds are inclusive and compared on `working_date`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimesheetFilter {
    pub consultant: Option<ConsultantId>,
    pub mission: Option<MissionId>,
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl TimesheetFilter {
    pub fn matches(&self, timesheet: &Timesheet) -> bool {
        self.consultant.map_or(true, |id| id == timesheet.consultant)
            && self.mission.map_or(true, |id| id == timesheet.mission)
            && self.from.map_or(true, |from| timesheet.working_date >= from)
            && self.until.map_or(true, |until| timesheet.working_date <= until)
    }
}

/// Storage abstraction for leads, missions, consultants, staffing and timesheets.
///
/// Listing operations return records in insertion order. Staffing and timesheet
/// inserts must reject duplicates on (consultant, mission, date) with
/// [`RepositoryError::Conflict`] instead of overwriting.
pub trait RecordStore: Send + Sync {
    fn lead(&self, id: LeadId) -> Result<Option<Lead>, RepositoryError>;
    fn save_lead(&self, lead: &Lead) -> Result<(), RepositoryError>;

    fn mission(&self, id: MissionId) -> Result<Option<Mission>, RepositoryError>;
    fn mission_for_lead(&self, lead: LeadId) -> Result<Option<Mission>, RepositoryError>;
    /// Atomically fetch the mission linked to `lead`, or create it together with
    /// the `seed` staffing rows. The seed is ignored when the mission already
    /// exists. Returns the mission and whether it was created by this call.
    fn materialize_mission(
        &self,
        lead: &Lead,
        seed: &[MissionSeed],
    ) -> Result<(Mission, bool), RepositoryError>;
    fn save_mission(&self, mission: &Mission) -> Result<(), RepositoryError>;
    fn missions(&self, filter: MissionFilter) -> Result<Vec<Mission>, RepositoryError>;

    fn consultant(&self, id: ConsultantId) -> Result<Option<Consultant>, RepositoryError>;
    fn consultants(&self, filter: ConsultantFilter) -> Result<Vec<Consultant>, RepositoryError>;

    fn holidays(&self) -> Result<Vec<Holiday>, RepositoryError>;

    fn staffing(&self, filter: &StaffingFilter) -> Result<Vec<Staffing>, RepositoryError>;
    fn insert_staffing(&self, staffing: Staffing) -> Result<Staffing, RepositoryError>;

    fn timesheets(&self, filter: &TimesheetFilter) -> Result<Vec<Timesheet>, RepositoryError>;
    fn insert_timesheet(&self, timesheet: Timesheet) -> Result<Timesheet, RepositoryError>;
}

/// Staffing row to create alongside a freshly materialized mission. The store
/// fills in the mission identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionSeed {
    pub consultant: ConsultantId,
    pub staffing_date: NaiveDate,
    pub charge: f64,
    pub last_user: String,
    pub update_date: chrono::NaiveDateTime,
}

impl MissionSeed {
    pub fn into_staffing(self, mission: MissionId) -> Staffing {
        Staffing {
            consultant: self.consultant,
            mission,
            staffing_date: self.staffing_date,
            charge: self.charge,
            last_user: self.last_user,
            update_date: self.update_date,
        }
    }
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook used when a lead is flagged for mailing.
pub trait LeadMailer: Send + Sync {
    fn send(&self, lead: &Lead, sender: &MailSender) -> Result<(), MailError>;
}

/// Envelope sender of a lead notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailSender {
    pub address: String,
    pub name: String,
}

/// Mail dispatch error. Never fatal to a lead save.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("mail rejected: {0}")]
    Rejected(String),
}
