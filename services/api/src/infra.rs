use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use staffing_planner::staffing::{Lead, LeadMailer, MailError, MailSender};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Mailer that writes lead notifications to the service log instead of
/// relaying them to an SMTP server.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingMailer;

impl LeadMailer for LoggingMailer {
    fn send(&self, lead: &Lead, sender: &MailSender) -> Result<(), MailError> {
        info!(
            lead = %lead.id,
            client = %lead.client,
            from = %sender.address,
            from_name = %sender.name,
            subject = %lead.name,
            "lead notification queued"
        );
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Accepts `YYYY-MM` as well as a full date; the result is always a month start.
pub(crate) fn parse_month(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date(trimmed).map(staffing_planner::staffing::month_start)
}
