use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::import::StaffingImportError;
use crate::workflows::staffing::lifecycle::LifecycleError;
use crate::workflows::staffing::planning::PlanningError;
use crate::workflows::staffing::repository::RepositoryError;
use crate::workflows::staffing::service::StaffingError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Planning(PlanningError),
    Staffing(StaffingError),
    Lifecycle(LifecycleError),
    Import(StaffingImportError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Planning(PlanningError::Validation(_))
            | AppError::Staffing(StaffingError::Validation(_))
            | AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Staffing(StaffingError::Conflict { .. }) => StatusCode::CONFLICT,
            AppError::Planning(PlanningError::Repository(err))
            | AppError::Staffing(StaffingError::Repository(err))
            | AppError::Lifecycle(LifecycleError::Repository(err)) => repository_status(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Planning(err) => write!(f, "planning error: {}", err),
            AppError::Staffing(err) => write!(f, "staffing error: {}", err),
            AppError::Lifecycle(err) => write!(f, "lead lifecycle error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Planning(err) => Some(err),
            AppError::Staffing(err) => Some(err),
            AppError::Lifecycle(err) => Some(err),
            AppError::Import(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<PlanningError> for AppError {
    fn from(value: PlanningError) -> Self {
        Self::Planning(value)
    }
}

impl From<StaffingError> for AppError {
    fn from(value: StaffingError) -> Self {
        Self::Staffing(value)
    }
}

impl From<LifecycleError> for AppError {
    fn from(value: LifecycleError) -> Self {
        Self::Lifecycle(value)
    }
}

impl From<StaffingImportError> for AppError {
    fn from(value: StaffingImportError) -> Self {
        Self::Import(value)
    }
}
