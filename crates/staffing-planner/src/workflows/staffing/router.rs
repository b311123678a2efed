use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;

use super::calendar::month_start;
use super::domain::{Author, ConsultantId, Lead, LeadId, MissionId};
use super::lifecycle::{LeadLifecycleController, SaveContext};
use super::planning::{PlanningError, PlanningParams, PlanningQuery};
use super::repository::{LeadMailer, RecordStore};
use super::service::{StaffingError, StaffingService};

/// Shared handler state: the planning facade and the lead lifecycle controller
/// over the same record store.
pub struct StaffingApi<R, M> {
    pub staffing: Arc<StaffingService<R>>,
    pub lifecycle: Arc<LeadLifecycleController<R, M>>,
    /// Months covered by a review when the request does not say.
    pub default_months: u32,
}

/// Router builder exposing planning views, mission management and lead saves.
pub fn staffing_router<R, M>(api: Arc<StaffingApi<R, M>>) -> Router
where
    R: RecordStore + 'static,
    M: LeadMailer + 'static,
{
    Router::new()
        .route("/api/v1/planning/review", get(review_handler::<R, M>))
        .route(
            "/api/v1/consultants/:consultant_id/timesheet",
            get(consultant_timesheet_handler::<R, M>),
        )
        .route(
            "/api/v1/consultants/:consultant_id/missions",
            get(consultant_missions_handler::<R, M>),
        )
        .route("/api/v1/missions", get(missions_handler::<R, M>))
        .route(
            "/api/v1/missions/:mission_id/deactivate",
            post(deactivate_handler::<R, M>),
        )
        .route(
            "/api/v1/missions/:mission_id/timesheet",
            get(mission_timesheet_handler::<R, M>),
        )
        .route("/api/v1/leads/:lead_id/save", post(lead_save_handler::<R, M>))
        .with_state(api)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MonthParams {
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    month: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MissionListParams {
    #[serde(default)]
    all: bool,
}

/// Body of a lead save: the lead as just edited plus the acting user.
#[derive(Debug, Deserialize)]
pub struct LeadSaveRequest {
    pub lead: Lead,
    pub author: Author,
    /// Month seeded staffing is booked on; the current month when absent.
    #[serde(default)]
    pub current_month: Option<NaiveDate>,
}

pub(crate) async fn review_handler<R, M>(
    State(api): State<Arc<StaffingApi<R, M>>>,
    Query(params): Query<PlanningParams>,
) -> Response
where
    R: RecordStore + 'static,
    M: LeadMailer + 'static,
{
    let today = Local::now().date_naive();
    let result = PlanningQuery::from_params(&params, today, api.default_months)
        .and_then(|query| api.staffing.planning_review(&query));
    match result {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn consultant_timesheet_handler<R, M>(
    State(api): State<Arc<StaffingApi<R, M>>>,
    Path(consultant_id): Path<u64>,
    Query(params): Query<MonthParams>,
) -> Response
where
    R: RecordStore + 'static,
    M: LeadMailer + 'static,
{
    let month = match resolve_month(&params) {
        Ok(month) => month,
        Err(err) => return failure(err),
    };
    match api
        .staffing
        .consultant_timesheet(ConsultantId(consultant_id), month)
    {
        Ok(sheet) => (StatusCode::OK, axum::Json(sheet)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn consultant_missions_handler<R, M>(
    State(api): State<Arc<StaffingApi<R, M>>>,
    Path(consultant_id): Path<u64>,
) -> Response
where
    R: RecordStore + 'static,
    M: LeadMailer + 'static,
{
    match api.staffing.consultant_missions(ConsultantId(consultant_id)) {
        Ok(missions) => (StatusCode::OK, axum::Json(missions)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn missions_handler<R, M>(
    State(api): State<Arc<StaffingApi<R, M>>>,
    Query(params): Query<MissionListParams>,
) -> Response
where
    R: RecordStore + 'static,
    M: LeadMailer + 'static,
{
    match api.staffing.missions(!params.all) {
        Ok(missions) => (StatusCode::OK, axum::Json(missions)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn deactivate_handler<R, M>(
    State(api): State<Arc<StaffingApi<R, M>>>,
    Path(mission_id): Path<u64>,
) -> Response
where
    R: RecordStore + 'static,
    M: LeadMailer + 'static,
{
    let now = Local::now().naive_local();
    match api.staffing.deactivate_mission(MissionId(mission_id), now) {
        Ok(mission) => (StatusCode::OK, axum::Json(mission)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn mission_timesheet_handler<R, M>(
    State(api): State<Arc<StaffingApi<R, M>>>,
    Path(mission_id): Path<u64>,
) -> Response
where
    R: RecordStore + 'static,
    M: LeadMailer + 'static,
{
    match api.staffing.mission_timesheet(MissionId(mission_id)) {
        Ok(sheet) => (StatusCode::OK, axum::Json(sheet)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn lead_save_handler<R, M>(
    State(api): State<Arc<StaffingApi<R, M>>>,
    Path(lead_id): Path<u64>,
    axum::Json(request): axum::Json<LeadSaveRequest>,
) -> Response
where
    R: RecordStore + 'static,
    M: LeadMailer + 'static,
{
    if request.lead.id != LeadId(lead_id) {
        return failure(StaffingError::Validation(format!(
            "lead id {} does not match the path",
            request.lead.id
        )));
    }

    let now = Local::now().naive_local();
    let context = SaveContext {
        current_month: month_start(request.current_month.unwrap_or_else(|| now.date())),
        now,
        author: request.author,
    };
    match api.lifecycle.save(request.lead, &context) {
        Ok((lead, outcome)) => {
            let messages: Vec<String> = outcome
                .notices
                .iter()
                .map(|notice| notice.message())
                .collect();
            let payload = json!({
                "lead": lead,
                "outcome": outcome,
                "messages": messages,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => failure(err),
    }
}

fn resolve_month(params: &MonthParams) -> Result<NaiveDate, PlanningError> {
    match (params.year, params.month) {
        (None, None) => Ok(month_start(Local::now().date_naive())),
        (Some(year), Some(month)) => NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            PlanningError::Validation(format!("{year}-{month:02} is not a valid month"))
        }),
        _ => Err(PlanningError::Validation(
            "year and month must be given together".to_string(),
        )),
    }
}

pub(crate) fn failure(err: impl Into<AppError>) -> Response {
    let err: AppError = err.into();
    err.into_response()
}
