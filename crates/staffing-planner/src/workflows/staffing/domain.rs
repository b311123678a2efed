use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for sales leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeadId(pub u64);

/// Identifier wrapper for missions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MissionId(pub u64);

/// Identifier wrapper for consultants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConsultantId(pub u64);

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lead-{}", self.0)
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mission-{}", self.0)
    }
}

impl fmt::Display for ConsultantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "consultant-{}", self.0)
    }
}

/// Sales pipeline state of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadState {
    Qualif,
    OfferSent,
    Negociation,
    Win,
    Lost,
    Forgiven,
    Sleeping,
}

impl LeadState {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Qualif,
            Self::OfferSent,
            Self::Negociation,
            Self::Win,
            Self::Lost,
            Self::Forgiven,
            Self::Sleeping,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Qualif => "QUALIF",
            Self::OfferSent => "OFFER_SENT",
            Self::Negociation => "NEGOCIATION",
            Self::Win => "WIN",
            Self::Lost => "LOST",
            Self::Forgiven => "FORGIVEN",
            Self::Sleeping => "SLEEPING",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Qualif => "Qualifying",
            Self::OfferSent => "Offer sent",
            Self::Negociation => "Negotiation",
            Self::Win => "Won",
            Self::Lost => "Lost",
            Self::Forgiven => "Forgiven",
            Self::Sleeping => "Sleeping",
        }
    }

    /// States in which a mission is materialized for the lead.
    pub const fn is_sales_advanced(self) -> bool {
        matches!(self, Self::OfferSent | Self::Negociation | Self::Win)
    }

    /// States that archive the linked mission.
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Lost | Self::Forgiven | Self::Sleeping)
    }

    pub fn from_code(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ordered()
            .into_iter()
            .find(|state| state.code() == normalized)
    }
}

/// Sales opportunity preceding a signed engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub client: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sales_id: Option<String>,
    #[serde(default)]
    pub responsible: Option<ConsultantId>,
    #[serde(default)]
    pub salesman: Option<String>,
    pub state: LeadState,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Consultants pencilled in on the opportunity.
    #[serde(default)]
    pub staffing: Vec<ConsultantId>,
    /// Transient trigger; cleared once the notification went out.
    #[serde(default)]
    pub send_email: bool,
}

impl Lead {
    pub fn new(id: LeadId, name: impl Into<String>, client: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            client: client.into(),
            description: String::new(),
            sales_id: None,
            responsible: None,
            salesman: None,
            state: LeadState::Qualif,
            due_date: None,
            start_date: None,
            staffing: Vec::new(),
            send_email: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionNature {
    #[serde(rename = "PROD")]
    Prod,
    #[serde(rename = "NONPROD")]
    NonProd,
    #[serde(rename = "HOLIDAYS")]
    Holidays,
}

impl MissionNature {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Prod => "PROD",
            Self::NonProd => "NONPROD",
            Self::Holidays => "HOLIDAYS",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Prod => "Productive",
            Self::NonProd => "Non productive",
            Self::Holidays => "Holidays",
        }
    }
}

pub const DEFAULT_MISSION_PROBABILITY: u8 = 50;

/// Billable or internal engagement that staffing and timesheets are charged to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    #[serde(default)]
    pub lead: Option<LeadId>,
    /// Display name of the originating lead, if any.
    #[serde(default)]
    pub lead_name: Option<String>,
    #[serde(default)]
    pub description: String,
    pub nature: MissionNature,
    /// Likelihood percentage, 0 to 100.
    pub probability: u8,
    pub probability_auto: bool,
    pub active: bool,
    #[serde(default)]
    pub update_date: Option<NaiveDateTime>,
}

impl Mission {
    pub fn new(id: MissionId, nature: MissionNature, description: impl Into<String>) -> Self {
        Self {
            id,
            lead: None,
            lead_name: None,
            description: description.into(),
            nature,
            probability: DEFAULT_MISSION_PROBABILITY,
            probability_auto: true,
            active: true,
            update_date: None,
        }
    }

    pub fn short_name(&self) -> String {
        match (&self.lead_name, self.description.is_empty()) {
            (Some(lead), true) => lead.clone(),
            (Some(lead), false) => format!("{lead} ({})", self.description),
            (None, _) => self.description.clone(),
        }
    }

    pub fn is_committed(&self) -> bool {
        self.probability == 100
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerRef {
    pub id: ConsultantId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultantProfile {
    pub name: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consultant {
    pub id: ConsultantId,
    pub name: String,
    /// Short code matched against usernames by the authorization layer.
    pub trigramme: String,
    pub productive: bool,
    pub active: bool,
    #[serde(default)]
    pub manager: Option<ManagerRef>,
    #[serde(default)]
    pub profile: Option<ConsultantProfile>,
}

impl Consultant {
    pub fn new(id: ConsultantId, name: impl Into<String>, trigramme: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            trigramme: trigramme.into(),
            productive: true,
            active: true,
            manager: None,
            profile: None,
        }
    }

    pub fn manager_name(&self) -> &str {
        self.manager
            .as_ref()
            .map(|manager| manager.name.as_str())
            .unwrap_or("")
    }

    pub fn profile_level(&self) -> Option<u32> {
        self.profile.as_ref().map(|profile| profile.level)
    }
}

/// Forecast allocation of a consultant to a mission for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staffing {
    pub consultant: ConsultantId,
    pub mission: MissionId,
    /// Always the first day of the month.
    pub staffing_date: NaiveDate,
    /// Days, never negative.
    pub charge: f64,
    pub last_user: String,
    pub update_date: NaiveDateTime,
}

impl Staffing {
    pub fn key(&self) -> (ConsultantId, MissionId, NaiveDate) {
        (self.consultant, self.mission, self.staffing_date)
    }
}

/// Actual charge declared by a consultant on a mission for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timesheet {
    pub consultant: ConsultantId,
    pub mission: MissionId,
    pub working_date: NaiveDate,
    pub charge: f64,
}

impl Timesheet {
    pub fn key(&self) -> (ConsultantId, MissionId, NaiveDate) {
        (self.consultant, self.mission, self.working_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub day: NaiveDate,
    #[serde(default)]
    pub description: String,
}

/// Acting user of a save, used for notifications and staffing authorship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Author {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
