use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::super::calendar::{month_sequence, month_start};
use super::PlanningError;

/// Upper bound on the number of months covered by one review.
pub const MAX_REVIEW_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    Manager,
    Position,
}

impl GroupBy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manager" => Some(Self::Manager),
            "position" => Some(Self::Position),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Position => "position",
        }
    }
}

/// Raw review parameters as they arrive from a query string or the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlanningParams {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub n_month: Option<String>,
    #[serde(default)]
    pub projected: Option<String>,
    #[serde(default)]
    pub groupby: Option<String>,
}

impl PlanningParams {
    // Presence of the flag is enough, except for explicit negatives.
    fn is_projected(&self) -> bool {
        match self.projected.as_deref().map(str::trim) {
            None => false,
            Some(value) => !matches!(value.to_ascii_lowercase().as_str(), "false" | "0" | "no"),
        }
    }
}

/// Resolved review window and options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanningQuery {
    pub start: NaiveDate,
    pub month_count: u32,
    pub projected: bool,
    pub group_by: GroupBy,
}

impl PlanningQuery {
    pub fn new(start: NaiveDate, month_count: u32, projected: bool, group_by: GroupBy) -> Self {
        Self {
            start: month_start(start),
            month_count: month_count.clamp(1, MAX_REVIEW_MONTHS),
            projected,
            group_by,
        }
    }

    /// Resolve raw parameters. Malformed month counts and group keys are
    /// ignored; only an impossible start date is rejected.
    pub fn from_params(
        params: &PlanningParams,
        today: NaiveDate,
        default_months: u32,
    ) -> Result<Self, PlanningError> {
        let start = match (params.year, params.month) {
            (Some(year), Some(month)) => NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                PlanningError::Validation(format!("{year}-{month:02} is not a valid month"))
            })?,
            (None, None) => month_start(today),
            _ => {
                return Err(PlanningError::Validation(
                    "year and month must be given together".to_string(),
                ))
            }
        };

        let month_count = match params.n_month.as_deref().map(str::trim) {
            None => default_months,
            Some(raw) => match raw.parse::<i64>() {
                Ok(value) => value.clamp(1, i64::from(MAX_REVIEW_MONTHS)) as u32,
                Err(_) => {
                    warn!(n_month = raw, "ignoring non-numeric month count");
                    default_months
                }
            },
        };

        let group_by = match params.groupby.as_deref() {
            None => GroupBy::default(),
            Some(raw) => GroupBy::parse(raw).unwrap_or_else(|| {
                warn!(groupby = raw, "unknown grouping, falling back to manager");
                GroupBy::default()
            }),
        };

        Ok(Self::new(start, month_count, params.is_projected(), group_by))
    }

    pub fn months(&self) -> Vec<NaiveDate> {
        month_sequence(self.start, self.month_count)
    }

    pub fn previous_slice(&self) -> NaiveDate {
        month_start(self.start - Duration::days(28 * i64::from(self.month_count)))
    }

    pub fn next_slice(&self) -> NaiveDate {
        month_start(self.start + Duration::days(31 * i64::from(self.month_count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 18).expect("valid date")
    }

    fn params(n_month: Option<&str>, groupby: Option<&str>) -> PlanningParams {
        PlanningParams {
            n_month: n_month.map(str::to_string),
            groupby: groupby.map(str::to_string),
            ..PlanningParams::default()
        }
    }

    #[test]
    fn defaults_to_current_month() {
        let query = PlanningQuery::from_params(&PlanningParams::default(), today(), 3)
            .expect("query resolves");
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(query.month_count, 3);
        assert!(!query.projected);
        assert_eq!(query.group_by, GroupBy::Manager);
    }

    #[test]
    fn month_count_is_clamped_or_ignored() {
        let clamped = PlanningQuery::from_params(&params(Some("40"), None), today(), 3)
            .expect("query resolves");
        assert_eq!(clamped.month_count, 12);
        assert_eq!(clamped.months().len(), 12);

        let ignored = PlanningQuery::from_params(&params(Some("three"), None), today(), 3)
            .expect("non-numeric count does not fail");
        assert_eq!(ignored.month_count, 3);

        let floor = PlanningQuery::from_params(&params(Some("-2"), None), today(), 3)
            .expect("query resolves");
        assert_eq!(floor.month_count, 1);
    }

    #[test]
    fn unknown_grouping_falls_back_to_manager() {
        let position = PlanningQuery::from_params(&params(None, Some("position")), today(), 3)
            .expect("query resolves");
        assert_eq!(position.group_by, GroupBy::Position);

        let unknown = PlanningQuery::from_params(&params(None, Some("salary")), today(), 3)
            .expect("query resolves");
        assert_eq!(unknown.group_by, GroupBy::Manager);
    }

    #[test]
    fn invalid_start_month_is_a_validation_error() {
        let params = PlanningParams {
            year: Some(2025),
            month: Some(13),
            ..PlanningParams::default()
        };
        assert!(matches!(
            PlanningQuery::from_params(&params, today(), 3),
            Err(PlanningError::Validation(_))
        ));
    }

    #[test]
    fn projected_flag_accepts_presence() {
        let mut raw = PlanningParams {
            projected: Some(String::new()),
            ..PlanningParams::default()
        };
        assert!(PlanningQuery::from_params(&raw, today(), 3).unwrap().projected);
        raw.projected = Some("false".to_string());
        assert!(!PlanningQuery::from_params(&raw, today(), 3).unwrap().projected);
    }

    #[test]
    fn slices_page_by_month_count() {
        let query = PlanningQuery::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            3,
            false,
            GroupBy::Manager,
        );
        assert_eq!(query.previous_slice(), NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(query.next_slice(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }
}
