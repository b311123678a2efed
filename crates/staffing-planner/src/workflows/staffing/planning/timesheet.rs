use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use super::super::calendar::{days_of_month, month_start, WorkingDays};
use super::super::domain::{Consultant, Mission, MissionId, Staffing, Timesheet};
use super::views::{
    ConsultantTimesheet, MissionTimesheet, MissionTimesheetRow, TimesheetMissionLine,
};

/// Records read when building a consultant timesheet.
#[derive(Debug, Clone, Copy)]
pub struct TimesheetDataset<'a> {
    pub timesheets: &'a [Timesheet],
    pub staffing: &'a [Staffing],
    pub missions: &'a [Mission],
    pub holidays: &'a [NaiveDate],
}

/// Forecast versus declared charge of one consultant for one month.
///
/// Declared days are not required to be working days, so weekend or catch-up
/// work simply lowers the balance.
pub fn compute_consultant_timesheet<C>(
    consultant: &Consultant,
    month: NaiveDate,
    dataset: &TimesheetDataset<'_>,
    calendar: &C,
) -> ConsultantTimesheet
where
    C: WorkingDays + ?Sized,
{
    let month = month_start(month);
    let days = days_of_month(month);
    let missions: HashMap<MissionId, &Mission> = dataset
        .missions
        .iter()
        .map(|mission| (mission.id, mission))
        .collect();

    let mut lines: Vec<TimesheetMissionLine> = Vec::new();
    let mut index: HashMap<MissionId, usize> = HashMap::new();
    let mut line_for = |mission_id: MissionId, lines: &mut Vec<TimesheetMissionLine>| -> usize {
        *index.entry(mission_id).or_insert_with(|| {
            let mission = missions.get(&mission_id);
            lines.push(TimesheetMissionLine {
                mission: mission_id,
                name: mission
                    .map(|mission| mission.short_name())
                    .unwrap_or_else(|| mission_id.to_string()),
                nature: mission.map(|mission| mission.nature),
                forecast: 0.0,
                actual: 0.0,
                daily: vec![None; days.len()],
            });
            lines.len() - 1
        })
    };

    for staffing in dataset.staffing.iter().filter(|row| {
        row.consultant == consultant.id && month_start(row.staffing_date) == month
    }) {
        let position = line_for(staffing.mission, &mut lines);
        lines[position].forecast += staffing.charge;
    }

    let mut declared = 0.0;
    for timesheet in dataset.timesheets.iter().filter(|row| {
        row.consultant == consultant.id && month_start(row.working_date) == month
    }) {
        let position = line_for(timesheet.mission, &mut lines);
        let line = &mut lines[position];
        line.actual += timesheet.charge;
        let day_index = (timesheet.working_date - month).num_days() as usize;
        if let Some(slot) = line.daily.get_mut(day_index) {
            *slot = Some(slot.unwrap_or(0.0) + timesheet.charge);
        }
        declared += timesheet.charge;
    }

    let working_days = calendar.working_days(month, dataset.holidays);

    ConsultantTimesheet {
        consultant: consultant.id,
        month,
        days,
        missions: lines,
        working_days,
        declared,
        balance: f64::from(working_days) - declared,
    }
}

/// Monthly timesheet totals of a mission, one row per consultant plus totals.
pub fn compute_mission_timesheet(
    mission: &Mission,
    consultants: &[Consultant],
    timesheets: &[Timesheet],
) -> MissionTimesheet {
    let entries: Vec<&Timesheet> = timesheets
        .iter()
        .filter(|timesheet| timesheet.mission == mission.id)
        .collect();
    let months: Vec<NaiveDate> = entries
        .iter()
        .map(|timesheet| month_start(timesheet.working_date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows: Vec<MissionTimesheetRow> = consultants
        .iter()
        .map(|consultant| {
            let mut charges: Vec<f64> = months
                .iter()
                .map(|month| {
                    entries
                        .iter()
                        .filter(|timesheet| {
                            timesheet.consultant == consultant.id
                                && month_start(timesheet.working_date) == *month
                        })
                        .map(|timesheet| timesheet.charge)
                        .sum::<f64>()
                })
                .collect();
            let total: f64 = charges.iter().sum();
            charges.push(total);
            MissionTimesheetRow {
                consultant: consultant.id,
                name: consultant.name.clone(),
                charges,
            }
        })
        .collect();

    let totals: Vec<f64> = (0..=months.len())
        .map(|column| rows.iter().map(|row| row.charges[column]).sum::<f64>())
        .collect();

    MissionTimesheet {
        mission: mission.id,
        name: mission.short_name(),
        months,
        rows,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::staffing::calendar::WeekdayCalendar;
    use crate::workflows::staffing::domain::{ConsultantId, MissionNature};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn entry(consultant: u64, mission: &Mission, day: NaiveDate, charge: f64) -> Timesheet {
        Timesheet {
            consultant: ConsultantId(consultant),
            mission: mission.id,
            working_date: day,
            charge,
        }
    }

    #[test]
    fn weekend_work_counts_against_balance() {
        let consultant = Consultant::new(ConsultantId(1), "Ada", "ADA");
        let mission = Mission::new(MissionId(1), MissionNature::Prod, "Migration");
        let timesheets = [
            entry(1, &mission, date(2025, 3, 3), 1.0),
            // Saturday catch-up.
            entry(1, &mission, date(2025, 3, 8), 0.5),
        ];
        let missions = [mission];
        let dataset = TimesheetDataset {
            timesheets: &timesheets,
            staffing: &[],
            missions: &missions,
            holidays: &[],
        };

        let sheet =
            compute_consultant_timesheet(
                &consultant,
                date(2025, 3, 14),
                &dataset,
                &WeekdayCalendar,
            );
        assert_eq!(sheet.month, date(2025, 3, 1));
        assert_eq!(sheet.days.len(), 31);
        assert_eq!(sheet.working_days, 21);
        assert_eq!(sheet.declared, 1.5);
        assert_eq!(sheet.balance, 19.5);
        assert_eq!(sheet.missions[0].daily[7], Some(0.5));
        assert_eq!(sheet.missions[0].daily[0], None);
    }

    #[test]
    fn mission_timesheet_sums_per_month_and_total() {
        let mission = Mission::new(MissionId(4), MissionNature::Prod, "Audit");
        let other = Mission::new(MissionId(5), MissionNature::Prod, "Other");
        let consultants = [
            Consultant::new(ConsultantId(1), "Ada", "ADA"),
            Consultant::new(ConsultantId(2), "Linus", "LIN"),
        ];
        let timesheets = [
            entry(1, &mission, date(2025, 2, 3), 1.0),
            entry(1, &mission, date(2025, 2, 4), 0.5),
            entry(2, &mission, date(2025, 3, 3), 1.0),
            // Same month number one year later must not merge.
            entry(2, &mission, date(2026, 2, 2), 1.0),
            entry(1, &other, date(2025, 2, 5), 1.0),
        ];

        let sheet = compute_mission_timesheet(&mission, &consultants, &timesheets);
        assert_eq!(
            sheet.months,
            vec![date(2025, 2, 1), date(2025, 3, 1), date(2026, 2, 1)]
        );
        assert_eq!(sheet.rows[0].charges, vec![1.5, 0.0, 0.0, 1.5]);
        assert_eq!(sheet.rows[1].charges, vec![0.0, 1.0, 1.0, 2.0]);
        assert_eq!(sheet.totals, vec![1.5, 1.0, 1.0, 3.5]);
    }
}
