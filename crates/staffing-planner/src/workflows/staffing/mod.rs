//! Lead lifecycle and staffing plan aggregation.
//!
//! [`LeadLifecycleController`] keeps the mission attached to a lead in step with
//! the lead's sales state. The [`planning`] module turns forecast staffing and
//! declared timesheets into review grids, and [`StaffingService`] wires both to
//! a [`RecordStore`].

pub mod calendar;
pub mod domain;
pub mod lifecycle;
pub mod memory;
pub mod planning;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use calendar::{
    days_of_month, month_sequence, month_start, next_month, WeekdayCalendar, WorkingDays,
};
pub use domain::{
    Author, Consultant, ConsultantId, ConsultantProfile, Holiday, Lead, LeadId, LeadState,
    ManagerRef, Mission, MissionId, MissionNature, Staffing, Timesheet,
    DEFAULT_MISSION_PROBABILITY,
};
pub use lifecycle::{
    LeadLifecycleController, LeadNotice, LeadSaveOutcome, LifecycleError, LifecycleSettings,
    SaveContext,
};
pub use memory::InMemoryRecordStore;
pub use planning::{
    ConsultantTimesheet, GroupBy, MissionTimesheet, PlanningError, PlanningParams, PlanningQuery,
    PlanningReview, PlanningReviewOutcome, PlanningReviewPage,
};
pub use repository::{
    ConsultantFilter, LeadMailer, MailError, MailSender, MissionFilter, MissionSeed, RecordStore,
    RepositoryError, StaffingFilter, TimesheetFilter,
};
pub use router::{staffing_router, LeadSaveRequest, StaffingApi};
pub use service::{StaffingEntry, StaffingError, StaffingService};
