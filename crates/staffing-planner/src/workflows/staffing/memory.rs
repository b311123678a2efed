use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use super::domain::{
    Consultant, ConsultantId, Holiday, Lead, LeadId, Mission, MissionId, MissionNature, Staffing,
    Timesheet,
};
use super::repository::{
    ConsultantFilter, MissionFilter, MissionSeed, RecordStore, RepositoryError, StaffingFilter,
    TimesheetFilter,
};

/// Mutex-guarded record store used by the CLI, the demo server and the tests.
///
/// Every operation takes a single lock, which makes `materialize_mission`
/// atomic with respect to concurrent saves of the same lead.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    next_mission_id: u64,
    leads: BTreeMap<LeadId, Lead>,
    missions: BTreeMap<MissionId, Mission>,
    consultants: BTreeMap<ConsultantId, Consultant>,
    holidays: Vec<Holiday>,
    staffing: Vec<Staffing>,
    timesheets: Vec<Timesheet>,
}

impl StoreState {
    fn allocate_mission_id(&mut self) -> MissionId {
        let current = self
            .next_mission_id
            .max(self.missions.keys().last().map_or(0, |id| id.0));
        self.next_mission_id = current + 1;
        MissionId(self.next_mission_id)
    }

    fn staffing_exists(&self, key: (ConsultantId, MissionId, NaiveDate)) -> bool {
        self.staffing.iter().any(|row| row.key() == key)
    }
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record store mutex poisoned".to_string()))
    }

    pub fn upsert_consultant(&self, consultant: Consultant) -> Result<(), RepositoryError> {
        self.lock()?.consultants.insert(consultant.id, consultant);
        Ok(())
    }

    pub fn add_holiday(&self, holiday: Holiday) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if state.holidays.iter().any(|known| known.day == holiday.day) {
            return Err(RepositoryError::Conflict);
        }
        state.holidays.push(holiday);
        Ok(())
    }

    /// Create a mission that is not linked to any lead.
    pub fn create_mission(
        &self,
        nature: MissionNature,
        description: &str,
        probability: u8,
    ) -> Result<Mission, RepositoryError> {
        let mut state = self.lock()?;
        let id = state.allocate_mission_id();
        let mut mission = Mission::new(id, nature, description);
        mission.probability = probability.min(100);
        state.missions.insert(id, mission.clone());
        Ok(mission)
    }
}

impl RecordStore for InMemoryRecordStore {
    fn lead(&self, id: LeadId) -> Result<Option<Lead>, RepositoryError> {
        Ok(self.lock()?.leads.get(&id).cloned())
    }

    fn save_lead(&self, lead: &Lead) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        state.leads.insert(lead.id, lead.clone());
        for mission in state.missions.values_mut() {
            if mission.lead == Some(lead.id) {
                mission.lead_name = Some(lead.name.clone());
            }
        }
        Ok(())
    }

    fn mission(&self, id: MissionId) -> Result<Option<Mission>, RepositoryError> {
        Ok(self.lock()?.missions.get(&id).cloned())
    }

    fn mission_for_lead(&self, lead: LeadId) -> Result<Option<Mission>, RepositoryError> {
        Ok(self
            .lock()?
            .missions
            .values()
            .find(|mission| mission.lead == Some(lead))
            .cloned())
    }

    fn materialize_mission(
        &self,
        lead: &Lead,
        seed: &[MissionSeed],
    ) -> Result<(Mission, bool), RepositoryError> {
        let mut state = self.lock()?;
        if let Some(existing) = state
            .missions
            .values()
            .find(|mission| mission.lead == Some(lead.id))
        {
            return Ok((existing.clone(), false));
        }

        let mut seen = HashSet::new();
        if !seed
            .iter()
            .all(|row| seen.insert((row.consultant, row.staffing_date)))
        {
            return Err(RepositoryError::Conflict);
        }

        let id = state.allocate_mission_id();
        let mut mission = Mission::new(id, MissionNature::Prod, "");
        mission.lead = Some(lead.id);
        mission.lead_name = Some(lead.name.clone());
        mission.update_date = seed.first().map(|row| row.update_date);

        state.missions.insert(id, mission.clone());
        state
            .staffing
            .extend(seed.iter().cloned().map(|row| row.into_staffing(id)));

        Ok((mission, true))
    }

    fn save_mission(&self, mission: &Mission) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        match state.missions.get_mut(&mission.id) {
            Some(stored) => {
                *stored = mission.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn missions(&self, filter: MissionFilter) -> Result<Vec<Mission>, RepositoryError> {
        Ok(self
            .lock()?
            .missions
            .values()
            .filter(|mission| !filter.only_active || mission.active)
            .cloned()
            .collect())
    }

    fn consultant(&self, id: ConsultantId) -> Result<Option<Consultant>, RepositoryError> {
        Ok(self.lock()?.consultants.get(&id).cloned())
    }

    fn consultants(&self, filter: ConsultantFilter) -> Result<Vec<Consultant>, RepositoryError> {
        Ok(self
            .lock()?
            .consultants
            .values()
            .filter(|consultant| filter.matches(consultant))
            .cloned()
            .collect())
    }

    fn holidays(&self) -> Result<Vec<Holiday>, RepositoryError> {
        Ok(self.lock()?.holidays.clone())
    }

    fn staffing(&self, filter: &StaffingFilter) -> Result<Vec<Staffing>, RepositoryError> {
        Ok(self
            .lock()?
            .staffing
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    fn insert_staffing(&self, staffing: Staffing) -> Result<Staffing, RepositoryError> {
        let mut state = self.lock()?;
        if !state.missions.contains_key(&staffing.mission) {
            return Err(RepositoryError::NotFound);
        }
        if state.staffing_exists(staffing.key()) {
            return Err(RepositoryError::Conflict);
        }
        state.staffing.push(staffing.clone());
        Ok(staffing)
    }

    fn timesheets(&self, filter: &TimesheetFilter) -> Result<Vec<Timesheet>, RepositoryError> {
        Ok(self
            .lock()?
            .timesheets
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    fn insert_timesheet(&self, timesheet: Timesheet) -> Result<Timesheet, RepositoryError> {
        let mut state = self.lock()?;
        if !state.missions.contains_key(&timesheet.mission) {
            return Err(RepositoryError::NotFound);
        }
        if state
            .timesheets
            .iter()
            .any(|row| row.key() == timesheet.key())
        {
            return Err(RepositoryError::Conflict);
        }
        state.timesheets.push(timesheet.clone());
        Ok(timesheet)
    }
}
