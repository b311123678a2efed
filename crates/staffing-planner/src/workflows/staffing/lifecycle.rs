use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::calendar::month_start;
use super::domain::{Author, Lead, LeadState, Mission};
use super::repository::{LeadMailer, MailSender, MissionSeed, RecordStore, RepositoryError};

/// Settings shared by every lead save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSettings {
    /// Domain appended to the acting username to build the sender address.
    pub mail_domain: String,
    /// Author recorded on staffing rows seeded by the system.
    pub system_user: String,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            mail_domain: "example.com".to_string(),
            system_user: "-".to_string(),
        }
    }
}

/// Explicit inputs of a save that would otherwise come from the clock or the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveContext {
    /// Month seeded staffing rows are booked on. Normalized to its first day.
    pub current_month: NaiveDate,
    pub now: NaiveDateTime,
    pub author: Author,
}

/// User-facing notice produced while processing a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LeadNotice {
    MailSent,
    MailFailed(String),
    MissionInitialized,
    MissionWon,
    MissionArchived,
}

impl LeadNotice {
    pub fn message(&self) -> String {
        match self {
            Self::MailSent => "lead sent by mail to the staffing board".to_string(),
            Self::MailFailed(reason) => format!("failed to send lead mail: {reason}"),
            Self::MissionInitialized => {
                "a mission has been initialized in the staffing plan for this lead".to_string()
            }
            Self::MissionWon => "mission probability set to 100% in the staffing plan".to_string(),
            Self::MissionArchived => "the matching mission has been archived".to_string(),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::MailFailed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadSaveOutcome {
    pub mission: Option<Mission>,
    pub mission_created: bool,
    pub seeded_staffing: usize,
    pub state_changed: bool,
    pub notices: Vec<LeadNotice>,
}

/// Keeps the mission of a lead in step with the lead's sales state.
pub struct LeadLifecycleController<R, M> {
    store: Arc<R>,
    mailer: Arc<M>,
    settings: LifecycleSettings,
}

impl<R, M> LeadLifecycleController<R, M>
where
    R: RecordStore + 'static,
    M: LeadMailer + 'static,
{
    pub fn new(store: Arc<R>, mailer: Arc<M>, settings: LifecycleSettings) -> Self {
        Self {
            store,
            mailer,
            settings,
        }
    }

    /// Persist `lead` and run the save cascade against its previously stored state.
    pub fn save(
        &self,
        mut lead: Lead,
        context: &SaveContext,
    ) -> Result<(Lead, LeadSaveOutcome), LifecycleError> {
        let previous_state = self.store.lead(lead.id)?.map(|stored| stored.state);
        self.store.save_lead(&lead)?;
        let outcome = self.on_lead_saved(&mut lead, previous_state, context)?;
        Ok((lead, outcome))
    }

    /// Run the post-save cascade of a lead whose fields were just persisted.
    ///
    /// Mail delivery problems are reported as notices. Store failures abort the
    /// cascade and are returned to the caller.
    pub fn on_lead_saved(
        &self,
        lead: &mut Lead,
        previous_state: Option<LeadState>,
        context: &SaveContext,
    ) -> Result<LeadSaveOutcome, LifecycleError> {
        let state_changed = previous_state != Some(lead.state);
        debug!(
            lead = %lead.id,
            from = previous_state.map(LeadState::code),
            to = lead.state.code(),
            "processing lead save"
        );

        let mut notices = Vec::new();
        if lead.send_email {
            lead.send_email = false;
            self.store.save_lead(lead)?;
            notices.push(self.notify(lead, &context.author));
        }

        let mut mission_created = false;
        let mut seeded_staffing = 0;
        let mut mission = if lead.state.is_sales_advanced() {
            let seed = self.seed_for(lead, context);
            let (mission, created) = self.store.materialize_mission(lead, &seed)?;
            if created {
                mission_created = true;
                seeded_staffing = seed.len();
                info!(
                    lead = %lead.id,
                    mission = %mission.id,
                    seeded = seeded_staffing,
                    "mission initialized"
                );
                notices.push(LeadNotice::MissionInitialized);
            }
            Some(mission)
        } else {
            self.store.mission_for_lead(lead.id)?
        };

        if let Some(mission) = mission.as_mut() {
            if lead.state == LeadState::Win {
                apply_probability(mission, 100, true, context.now);
                self.store.save_mission(mission)?;
                notices.push(LeadNotice::MissionWon);
            } else if lead.state.is_closed() {
                apply_probability(mission, 0, false, context.now);
                self.store.save_mission(mission)?;
                notices.push(LeadNotice::MissionArchived);
            }
        }

        Ok(LeadSaveOutcome {
            mission,
            mission_created,
            seeded_staffing,
            state_changed,
            notices,
        })
    }

    fn notify(&self, lead: &Lead, author: &Author) -> LeadNotice {
        let sender = MailSender {
            address: format!("{}@{}", author.username, self.settings.mail_domain),
            name: author.display_name(),
        };
        match self.mailer.send(lead, &sender) {
            Ok(()) => LeadNotice::MailSent,
            Err(err) => {
                warn!(lead = %lead.id, error = %err, "lead notification failed");
                LeadNotice::MailFailed(err.to_string())
            }
        }
    }

    fn seed_for(&self, lead: &Lead, context: &SaveContext) -> Vec<MissionSeed> {
        let month = month_start(context.current_month);
        let mut seen = HashSet::new();
        lead.staffing
            .iter()
            .copied()
            .filter(|consultant| seen.insert(*consultant))
            .map(|consultant| MissionSeed {
                consultant,
                staffing_date: month,
                charge: 0.0,
                last_user: self.settings.system_user.clone(),
                update_date: context.now,
            })
            .collect()
    }
}

// Won and closed leads settle the probability even when it was set by hand.
fn apply_probability(mission: &mut Mission, probability: u8, active: bool, now: NaiveDateTime) {
    mission.probability = probability;
    mission.active = active;
    mission.update_date = Some(now);
}

/// Error raised by the lifecycle controller.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
