use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::error::AppError;
use crate::workflows::staffing::domain::{ConsultantId, LeadState, MissionId};
use crate::workflows::staffing::lifecycle::{
    LeadLifecycleController, LifecycleError, LifecycleSettings,
};
use crate::workflows::staffing::repository::{RecordStore, RepositoryError};
use crate::workflows::staffing::router::{self, StaffingApi};
use crate::workflows::staffing::service::{StaffingError, StaffingService};

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn review_route_returns_the_grid() {
    let (store, _, _, _) = february_store();
    let response = router_for(store)
        .oneshot(get("/api/v1/planning/review?year=2025&month=2&n_month=1"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("ready"));
    assert_eq!(payload["start_date"], json!("2025-02-01"));
    assert_eq!(payload["review"]["rates"][0]["prod"], json!(79));
    assert_eq!(payload["review"]["rows"][0]["months"][0]["available"], json!(2));
}

#[tokio::test]
async fn review_route_rejects_impossible_months() {
    let response = router_for(seeded_store())
        .oneshot(get("/api/v1/planning/review?year=2025&month=14"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("planning error:"));
}

#[tokio::test]
async fn review_route_reports_missing_productive_consultants() {
    let response = router_for(Arc::new(Default::default()))
        .oneshot(get("/api/v1/planning/review?year=2025&month=2&n_month=abc"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("no_productive_consultants"));
}

#[tokio::test]
async fn consultant_timesheet_route_maps_not_found() {
    let response = router_for(seeded_store())
        .oneshot(get("/api/v1/consultants/404/timesheet?year=2025&month=2"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn consultant_timesheet_route_returns_balance() {
    let (store, prod, _, _) = february_store();
    store
        .insert_timesheet(timesheet_row(1, prod.id, date(2025, 2, 3), 2.0))
        .expect("timesheet");
    let response = router_for(store)
        .oneshot(get("/api/v1/consultants/1/timesheet?year=2025&month=2"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["balance"], json!(18.0));
    assert_eq!(payload["working_days"], json!(20));
}

#[tokio::test]
async fn mission_routes_list_and_deactivate() {
    let (store, prod, _, _) = february_store();
    let router = router_for(store);

    let response = router
        .clone()
        .oneshot(
            Request::post(format!("/api/v1/missions/{}/deactivate", prod.id.0))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["active"], json!(false));

    let active = read_json_body(
        router
            .clone()
            .oneshot(get("/api/v1/missions"))
            .await
            .expect("route executes"),
    )
    .await;
    assert_eq!(active.as_array().map(Vec::len), Some(2));

    let all = read_json_body(
        router
            .clone()
            .oneshot(get("/api/v1/missions?all=true"))
            .await
            .expect("route executes"),
    )
    .await;
    assert_eq!(all.as_array().map(Vec::len), Some(3));

    let missing = router
        .oneshot(
            Request::post("/api/v1/missions/999/deactivate")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mission_timesheet_and_consultant_missions_routes() {
    let (store, prod, _, _) = february_store();
    store
        .insert_timesheet(timesheet_row(1, prod.id, date(2025, 2, 3), 1.0))
        .expect("timesheet");
    let router = router_for(store);

    let sheet = read_json_body(
        router
            .clone()
            .oneshot(get(&format!("/api/v1/missions/{}/timesheet", prod.id.0)))
            .await
            .expect("route executes"),
    )
    .await;
    assert_eq!(sheet["totals"], json!([1.0, 1.0]));

    let missions = read_json_body(
        router
            .oneshot(get("/api/v1/consultants/1/missions"))
            .await
            .expect("route executes"),
    )
    .await;
    assert_eq!(missions.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn lead_save_route_runs_the_lifecycle() {
    let store = seeded_store();
    let (api, mailer) = build_api(store);
    let mut lead = acme_lead(LeadState::OfferSent);
    lead.send_email = true;
    let body = json!({
        "lead": lead,
        "author": author(),
        "current_month": "2025-01-01",
    });

    let response = router::staffing_router(api.clone())
        .oneshot(
            Request::post("/api/v1/leads/1/save")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("json")))
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["lead"]["send_email"], json!(false));
    assert_eq!(payload["outcome"]["mission_created"], json!(true));
    assert_eq!(payload["outcome"]["seeded_staffing"], json!(2));
    assert_eq!(payload["outcome"]["mission"]["probability"], json!(50));
    assert_eq!(
        payload["messages"].as_array().map(Vec::len),
        Some(2),
        "mail and mission notices"
    );
    assert_eq!(mailer.sent().len(), 1);
}

#[tokio::test]
async fn lead_save_route_rejects_mismatched_ids() {
    let body = json!({
        "lead": acme_lead(LeadState::Qualif),
        "author": author(),
    });
    let response = router_for(seeded_store())
        .oneshot(
            Request::post("/api/v1/leads/2/save")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("json")))
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["error"],
        json!("staffing error: invalid entry: lead id lead-1 does not match the path")
    );
}

#[tokio::test]
async fn handler_errors_share_the_application_status_mapping() {
    let conflict = StaffingError::Conflict {
        consultant: ConsultantId(1),
        mission: MissionId(2),
        date: date(2025, 2, 1),
    };
    let expected = AppError::from(StaffingError::Conflict {
        consultant: ConsultantId(1),
        mission: MissionId(2),
        date: date(2025, 2, 1),
    });

    let response = router::failure(conflict);
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(response.status(), expected.status());
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!(expected.to_string()));

    let missing = router::failure(LifecycleError::Repository(RepositoryError::NotFound));
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missions_handler_returns_internal_error_when_store_is_down() {
    let store = Arc::new(UnavailableStore);
    let api = Arc::new(StaffingApi {
        staffing: Arc::new(StaffingService::with_weekday_calendar(store.clone())),
        lifecycle: Arc::new(LeadLifecycleController::new(
            store,
            Arc::new(RecordingMailer::default()),
            LifecycleSettings::default(),
        )),
        default_months: 3,
    });

    let response = router::consultant_missions_handler::<UnavailableStore, RecordingMailer>(
        State(api),
        Path(1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload: Value = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("database offline"));
}
