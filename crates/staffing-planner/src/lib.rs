//! Staffing plan and lead lifecycle core of a consulting company back office.
//!
//! The crate keeps missions in step with the sales leads they come from and
//! aggregates forecast staffing and declared timesheets into review grids.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

pub use config::{AppConfig, AppEnvironment, ConfigError, PlanningConfig};
pub use error::AppError;
pub use workflows::import::{ImportSummary, StaffingCsvImporter, StaffingImportError};
pub use workflows::staffing;
