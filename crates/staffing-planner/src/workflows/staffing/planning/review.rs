use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::super::calendar::{month_start, WorkingDays};
use super::super::domain::{Consultant, Mission, MissionId, MissionNature, Staffing};
use super::query::{GroupBy, MAX_REVIEW_MONTHS};
use super::views::{ConsultantPlanningRow, MissionLink, MonthRates, PlanningReview, StaffingCell};

/// Records the aggregator reads. Staffing rows referencing a mission that is
/// absent from `missions` are skipped.
#[derive(Debug, Clone, Copy)]
pub struct PlanningDataset<'a> {
    pub consultants: &'a [Consultant],
    pub staffing: &'a [Staffing],
    pub missions: &'a [Mission],
    pub holidays: &'a [NaiveDate],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewOptions {
    /// Include every mission, weighted by probability, instead of only the
    /// committed (100%) ones.
    pub projected: bool,
    pub group_by: GroupBy,
}

/// Round to the nearest integer, halves away from zero.
///
/// Used for every bucket total and every rate so displayed figures agree.
pub fn round_days(value: f64) -> i64 {
    value.round() as i64
}

/// Percentage of `numerator` over `denominator`, or 0 when the denominator is
/// not positive.
fn rate(numerator: i64, denominator: i64) -> i64 {
    if denominator <= 0 {
        return 0;
    }
    round_days(100.0 * numerator as f64 / denominator as f64)
}

#[derive(Default)]
struct BucketSums {
    prod: f64,
    unprod: f64,
    holidays: f64,
}

/// Aggregate forecast staffing into per-consultant, per-month day buckets,
/// monthly totals and utilization rates.
pub fn compute_planning_review<C>(
    dataset: &PlanningDataset<'_>,
    months: &[NaiveDate],
    options: ReviewOptions,
    calendar: &C,
) -> PlanningReview
where
    C: WorkingDays + ?Sized,
{
    let months: Vec<NaiveDate> = months
        .iter()
        .take(MAX_REVIEW_MONTHS as usize)
        .map(|month| month_start(*month))
        .collect();
    let available_days: Vec<u32> = months
        .iter()
        .map(|month| calendar.working_days(*month, dataset.holidays))
        .collect();

    let missions: HashMap<MissionId, &Mission> = dataset
        .missions
        .iter()
        .map(|mission| (mission.id, mission))
        .collect();

    let mut totals = vec![StaffingCell::default(); months.len()];
    let mut rows = Vec::with_capacity(dataset.consultants.len());

    for consultant in dataset.consultants {
        let mut cells = Vec::with_capacity(months.len());
        let mut prod_missions = Vec::new();
        let mut seen_missions = HashSet::new();

        for (index, month) in months.iter().enumerate() {
            let mut sums = BucketSums::default();
            for staffing in dataset.staffing.iter().filter(|row| {
                row.consultant == consultant.id && month_start(row.staffing_date) == *month
            }) {
                let Some(mission) = missions.get(&staffing.mission) else {
                    continue;
                };
                if !options.projected && !mission.is_committed() {
                    continue;
                }

                let weighted = staffing.charge * f64::from(mission.probability) / 100.0;
                match mission.nature {
                    MissionNature::Prod => {
                        if seen_missions.insert(mission.id) {
                            prod_missions.push(MissionLink {
                                mission: mission.id,
                                short_name: mission.short_name(),
                            });
                        }
                        sums.prod += weighted;
                    }
                    MissionNature::NonProd => sums.unprod += weighted,
                    MissionNature::Holidays => sums.holidays += weighted,
                }
            }

            let mut cell = StaffingCell {
                prod: round_days(sums.prod),
                unprod: round_days(sums.unprod),
                holidays: round_days(sums.holidays),
                available: 0,
            };
            cell.available = i64::from(available_days[index]).saturating_sub(cell.staffed());
            totals[index].accumulate(&cell);
            cells.push(cell);
        }

        rows.push(ConsultantPlanningRow {
            consultant: consultant.id,
            name: consultant.name.clone(),
            trigramme: consultant.trigramme.clone(),
            manager: consultant.manager.as_ref().map(|manager| manager.name.clone()),
            profile_level: consultant.profile_level(),
            months: cells,
            prod_missions,
        });
    }

    let people = dataset.consultants.len() as i64;
    let rates = totals
        .iter()
        .zip(&available_days)
        .map(|(total, days)| {
            let team_days = people.saturating_mul(i64::from(*days));
            let worked_days = team_days.saturating_sub(total.holidays);
            MonthRates {
                prod: rate(total.prod, worked_days),
                unprod: rate(total.unprod, worked_days),
                holidays: rate(total.holidays, team_days),
                available: rate(total.available, worked_days),
            }
        })
        .collect();

    sort_rows(&mut rows, options.group_by);

    PlanningReview {
        months,
        available_days,
        rows,
        totals,
        rates,
        projected: options.projected,
        group_by: options.group_by,
    }
}

/// Primary key is the grouping, secondary key the consultant name.
fn sort_rows(rows: &mut [ConsultantPlanningRow], group_by: GroupBy) {
    rows.sort_by(|a, b| group_order(a, b, group_by).then_with(|| a.name.cmp(&b.name)));
}

fn group_order(
    a: &ConsultantPlanningRow,
    b: &ConsultantPlanningRow,
    group_by: GroupBy,
) -> Ordering {
    match group_by {
        GroupBy::Manager => a
            .manager
            .as_deref()
            .unwrap_or("")
            .cmp(b.manager.as_deref().unwrap_or("")),
        GroupBy::Position => a.profile_level.cmp(&b.profile_level),
    }
}
