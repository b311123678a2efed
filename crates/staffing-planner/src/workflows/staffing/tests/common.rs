use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::workflows::staffing::domain::{
    Author, Consultant, ConsultantId, Holiday, Lead, LeadId, LeadState, ManagerRef, Mission,
    MissionId, MissionNature, Staffing, Timesheet,
};
use crate::workflows::staffing::lifecycle::{
    LeadLifecycleController, LifecycleSettings, SaveContext,
};
use crate::workflows::staffing::memory::InMemoryRecordStore;
use crate::workflows::staffing::repository::{
    ConsultantFilter, LeadMailer, MailError, MailSender, MissionFilter, MissionSeed, RecordStore,
    RepositoryError, StaffingFilter, TimesheetFilter,
};
use crate::workflows::staffing::router::{staffing_router, StaffingApi};
use crate::workflows::staffing::service::StaffingService;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn timestamp() -> NaiveDateTime {
    date(2025, 1, 15).and_hms_opt(9, 30, 0).expect("valid time")
}

pub(super) fn author() -> Author {
    Author {
        username: "jdoe".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
    }
}

pub(super) fn save_context() -> SaveContext {
    SaveContext {
        current_month: date(2025, 1, 15),
        now: timestamp(),
        author: author(),
    }
}

pub(super) fn consultant(id: u64, name: &str, manager: Option<&str>) -> Consultant {
    let mut consultant = Consultant::new(ConsultantId(id), name, &name[..3].to_uppercase());
    consultant.manager = manager.map(|manager| ManagerRef {
        id: ConsultantId(100 + id),
        name: manager.to_string(),
    });
    consultant
}

pub(super) fn acme_lead(state: LeadState) -> Lead {
    let mut lead = Lead::new(LeadId(1), "Acme Corp Q1", "Acme");
    lead.state = state;
    lead.staffing = vec![ConsultantId(1), ConsultantId(2)];
    lead
}

pub(super) fn seeded_store() -> Arc<InMemoryRecordStore> {
    let store = Arc::new(InMemoryRecordStore::new());
    store
        .upsert_consultant(consultant(1, "Ada Lovelace", Some("Grace")))
        .expect("consultant");
    store
        .upsert_consultant(consultant(2, "Linus Torvalds", Some("Alan")))
        .expect("consultant");
    store
}

pub(super) fn staffing_row(
    consultant: u64,
    mission: MissionId,
    month: NaiveDate,
    charge: f64,
) -> Staffing {
    Staffing {
        consultant: ConsultantId(consultant),
        mission,
        staffing_date: month,
        charge,
        last_user: "jdoe".to_string(),
        update_date: timestamp(),
    }
}

pub(super) fn timesheet_row(
    consultant: u64,
    mission: MissionId,
    day: NaiveDate,
    charge: f64,
) -> Timesheet {
    Timesheet {
        consultant: ConsultantId(consultant),
        mission,
        working_date: day,
        charge,
    }
}

/// February 2025 has 20 weekdays. Ada is staffed 15 prod, 2 unprod and 1
/// holiday day on committed missions.
pub(super) fn february_store() -> (Arc<InMemoryRecordStore>, Mission, Mission, Mission) {
    let store = Arc::new(InMemoryRecordStore::new());
    store
        .upsert_consultant(consultant(1, "Ada Lovelace", Some("Grace")))
        .expect("consultant");
    let prod = store
        .create_mission(MissionNature::Prod, "Platform", 100)
        .expect("mission");
    let unprod = store
        .create_mission(MissionNature::NonProd, "Training", 100)
        .expect("mission");
    let holidays = store
        .create_mission(MissionNature::Holidays, "Leave", 100)
        .expect("mission");
    let month = date(2025, 2, 1);
    for (mission, charge) in [(&prod, 15.0), (&unprod, 2.0), (&holidays, 1.0)] {
        store
            .insert_staffing(staffing_row(1, mission.id, month, charge))
            .expect("staffing");
    }
    (store, prod, unprod, holidays)
}

pub(super) fn holiday(day: NaiveDate) -> Holiday {
    Holiday {
        day,
        description: "Public holiday".to_string(),
    }
}

#[derive(Default)]
pub(super) struct RecordingMailer {
    sent: Mutex<Vec<(LeadId, MailSender)>>,
}

impl RecordingMailer {
    pub(super) fn sent(&self) -> Vec<(LeadId, MailSender)> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl LeadMailer for RecordingMailer {
    fn send(&self, lead: &Lead, sender: &MailSender) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push((lead.id, sender.clone()));
        Ok(())
    }
}

pub(super) struct FailingMailer;

impl LeadMailer for FailingMailer {
    fn send(&self, _lead: &Lead, _sender: &MailSender) -> Result<(), MailError> {
        Err(MailError::Transport("smtp relay down".to_string()))
    }
}

pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl RecordStore for UnavailableStore {
    fn lead(&self, _id: LeadId) -> Result<Option<Lead>, RepositoryError> {
        offline()
    }

    fn save_lead(&self, _lead: &Lead) -> Result<(), RepositoryError> {
        offline()
    }

    fn mission(&self, _id: MissionId) -> Result<Option<Mission>, RepositoryError> {
        offline()
    }

    fn mission_for_lead(&self, _lead: LeadId) -> Result<Option<Mission>, RepositoryError> {
        offline()
    }

    fn materialize_mission(
        &self,
        _lead: &Lead,
        _seed: &[MissionSeed],
    ) -> Result<(Mission, bool), RepositoryError> {
        offline()
    }

    fn save_mission(&self, _mission: &Mission) -> Result<(), RepositoryError> {
        offline()
    }

    fn missions(&self, _filter: MissionFilter) -> Result<Vec<Mission>, RepositoryError> {
        offline()
    }

    fn consultant(&self, _id: ConsultantId) -> Result<Option<Consultant>, RepositoryError> {
        offline()
    }

    fn consultants(&self, _filter: ConsultantFilter) -> Result<Vec<Consultant>, RepositoryError> {
        offline()
    }

    fn holidays(&self) -> Result<Vec<Holiday>, RepositoryError> {
        offline()
    }

    fn staffing(&self, _filter: &StaffingFilter) -> Result<Vec<Staffing>, RepositoryError> {
        offline()
    }

    fn insert_staffing(&self, _staffing: Staffing) -> Result<Staffing, RepositoryError> {
        offline()
    }

    fn timesheets(&self, _filter: &TimesheetFilter) -> Result<Vec<Timesheet>, RepositoryError> {
        offline()
    }

    fn insert_timesheet(&self, _timesheet: Timesheet) -> Result<Timesheet, RepositoryError> {
        offline()
    }
}

pub(super) fn controller<R, M>(store: Arc<R>, mailer: Arc<M>) -> LeadLifecycleController<R, M>
where
    R: RecordStore + 'static,
    M: LeadMailer + 'static,
{
    LeadLifecycleController::new(store, mailer, LifecycleSettings::default())
}

pub(super) fn build_api(
    store: Arc<InMemoryRecordStore>,
) -> (Arc<StaffingApi<InMemoryRecordStore, RecordingMailer>>, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let api = Arc::new(StaffingApi {
        staffing: Arc::new(StaffingService::with_weekday_calendar(store.clone())),
        lifecycle: Arc::new(controller(store, mailer.clone())),
        default_months: 3,
    });
    (api, mailer)
}

pub(super) fn router_for(store: Arc<InMemoryRecordStore>) -> axum::Router {
    let (api, _) = build_api(store);
    staffing_router(api)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
