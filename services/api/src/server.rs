use crate::cli::ServeArgs;
use crate::demo::demo_store;
use crate::infra::{AppState, LoggingMailer};
use crate::routes::with_staffing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use staffing_planner::config::AppConfig;
use staffing_planner::error::AppError;
use staffing_planner::staffing::{
    month_start, InMemoryRecordStore, LeadLifecycleController, StaffingApi, StaffingService,
};
use staffing_planner::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = if args.demo_data {
        demo_store(month_start(Local::now().date_naive()))?
    } else {
        Arc::new(InMemoryRecordStore::new())
    };
    let mailer = Arc::new(LoggingMailer);
    let api = Arc::new(StaffingApi {
        staffing: Arc::new(StaffingService::with_weekday_calendar(store.clone())),
        lifecycle: Arc::new(LeadLifecycleController::new(
            store,
            mailer,
            config.planning.lifecycle_settings(),
        )),
        default_months: config.planning.default_months,
    });

    let app = with_staffing_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        demo_data = args.demo_data,
        "staffing planner ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
