//! Staffing forecast and timesheet aggregation.
//!
//! Everything in here is a pure function of the records it is handed; loading
//! them from a [`RecordStore`](super::repository::RecordStore) is the job of
//! [`StaffingService`](super::service::StaffingService).

pub mod query;
pub mod review;
pub mod timesheet;
pub mod views;

use super::repository::RepositoryError;

pub use query::{GroupBy, PlanningParams, PlanningQuery, MAX_REVIEW_MONTHS};
pub use review::{compute_planning_review, round_days, PlanningDataset, ReviewOptions};
pub use timesheet::{compute_consultant_timesheet, compute_mission_timesheet, TimesheetDataset};
pub use views::{
    ConsultantPlanningRow, ConsultantTimesheet, MissionLink, MissionTimesheet,
    MissionTimesheetRow, MonthRates, PlanningReview, PlanningReviewOutcome, PlanningReviewPage,
    StaffingCell, TimesheetMissionLine,
};

/// Error raised while preparing planning views.
#[derive(Debug, thiserror::Error)]
pub enum PlanningError {
    #[error("invalid planning request: {0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
