use crate::infra::{parse_date, parse_month, LoggingMailer};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use clap::Args;
use staffing_planner::config::AppConfig;
use staffing_planner::error::AppError;
use staffing_planner::staffing::{
    days_of_month, month_sequence, month_start, next_month, Author, Consultant, ConsultantId,
    ConsultantProfile, ConsultantTimesheet, GroupBy, Holiday, InMemoryRecordStore, Lead, LeadId,
    LeadLifecycleController, LeadState, LifecycleSettings, ManagerRef, MissionId, MissionNature,
    PlanningParams, PlanningQuery, PlanningReviewOutcome, PlanningReviewPage, RecordStore,
    RepositoryError, SaveContext, StaffingEntry, StaffingService,
};
use staffing_planner::StaffingCsvImporter;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Month the demo lead is saved in (YYYY-MM). Defaults to the current month.
    #[arg(long, value_parser = parse_month)]
    pub(crate) month: Option<NaiveDate>,
    /// Also show forecasts weighted by mission probability.
    #[arg(long)]
    pub(crate) projected: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct PlanningReviewArgs {
    /// First reviewed month (YYYY-MM). Defaults to the current month.
    #[arg(long, value_parser = parse_month)]
    pub(crate) start: Option<NaiveDate>,
    /// Number of months to review (1 to 12).
    #[arg(long)]
    pub(crate) months: Option<String>,
    /// Weight every mission by its probability instead of keeping committed ones only.
    #[arg(long)]
    pub(crate) projected: bool,
    /// Row grouping: manager or position.
    #[arg(long)]
    pub(crate) group_by: Option<String>,
    /// Staffing/timesheet CSV export (Kind,Consultant,Mission,Date,Charge).
    #[arg(long)]
    pub(crate) staffing_csv: Option<PathBuf>,
    /// Print the review as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct TimesheetArgs {
    /// Consultant identifier.
    #[arg(long)]
    pub(crate) consultant: u64,
    /// Month to report (YYYY-MM).
    #[arg(long, value_parser = parse_month)]
    pub(crate) month: NaiveDate,
    /// Staffing/timesheet CSV export (Kind,Consultant,Mission,Date,Charge).
    #[arg(long)]
    pub(crate) staffing_csv: Option<PathBuf>,
    /// Print the timesheet as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

const SAMPLE_CHARGES: &str = "Kind,Consultant,Mission,Date,Charge
staffing,1,1,{m0},15
staffing,1,2,{m0},2
staffing,1,3,{m0},1
staffing,2,1,{m0},20
staffing,3,2,{m0},4
staffing,1,1,{m1},18
staffing,2,4,{m1},10
staffing,3,4,{m1},12
staffing,2,3,{m2},5
timesheet,1,1,{d0},1
timesheet,1,1,{d1},1
timesheet,1,2,{d2},0.5
timesheet,2,1,{d0},1
";

/// Consultants, missions and holidays shared by the demo, the CLI reports and
/// the demo server.
pub(crate) fn directory_store(year: i32) -> Result<Arc<InMemoryRecordStore>, AppError> {
    let store = Arc::new(InMemoryRecordStore::new());
    let grace = ManagerRef {
        id: ConsultantId(10),
        name: "Grace Hopper".to_string(),
    };
    let people = [
        (1, "Ada Lovelace", "ADL", 2, Some(&grace)),
        (2, "Linus Torvalds", "LTO", 3, Some(&grace)),
        (3, "Barbara Liskov", "BLI", 1, None),
    ];
    for (id, name, trigramme, level, manager) in people {
        let mut consultant = Consultant::new(ConsultantId(id), name, trigramme);
        consultant.manager = manager.cloned();
        consultant.profile = Some(ConsultantProfile {
            name: format!("Level {level}"),
            level,
        });
        store.upsert_consultant(consultant).map_err(store_error)?;
    }
    let mut manager = Consultant::new(ConsultantId(10), "Grace Hopper", "GHO");
    manager.productive = false;
    store.upsert_consultant(manager).map_err(store_error)?;

    for (nature, description, probability) in [
        (MissionNature::Prod, "Platform migration", 100),
        (MissionNature::NonProd, "Internal training", 100),
        (MissionNature::Holidays, "Paid leave", 100),
        (MissionNature::Prod, "Tender response", 50),
    ] {
        store
            .create_mission(nature, description, probability)
            .map_err(store_error)?;
    }

    let holidays = [
        (1, 1, "New year"),
        (5, 1, "Labour day"),
        (12, 25, "Christmas"),
    ];
    for (month, day, description) in holidays {
        if let Some(day) = NaiveDate::from_ymd_opt(year, month, day) {
            store
                .add_holiday(Holiday {
                    day,
                    description: description.to_string(),
                })
                .map_err(store_error)?;
        }
    }

    Ok(store)
}

/// Directory plus a quarter of sample charges starting at `start`.
pub(crate) fn demo_store(start: NaiveDate) -> Result<Arc<InMemoryRecordStore>, AppError> {
    let start = month_start(start);
    let store = directory_store(start.year())?;
    let service = StaffingService::with_weekday_calendar(store.clone());
    StaffingCsvImporter::from_reader(
        sample_charges(start).as_bytes(),
        &service,
        "demo",
        start_of_day(start),
    )?;
    Ok(store)
}

fn sample_charges(start: NaiveDate) -> String {
    let months = month_sequence(start, 3);
    let working: Vec<NaiveDate> = days_of_month(start)
        .into_iter()
        .filter(|day| day.weekday().number_from_monday() <= 5)
        .skip(1)
        .take(3)
        .collect();
    let mut csv = SAMPLE_CHARGES.to_string();
    for (index, month) in months.iter().enumerate() {
        csv = csv.replace(&format!("{{m{index}}}"), &month.to_string());
    }
    for (index, day) in working.iter().enumerate() {
        csv = csv.replace(&format!("{{d{index}}}"), &day.to_string());
    }
    csv
}

fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(chrono::NaiveTime::MIN)
}

fn store_error(err: RepositoryError) -> AppError {
    AppError::Staffing(err.into())
}

fn load_store(
    staffing_csv: Option<PathBuf>,
    start: NaiveDate,
) -> Result<Arc<InMemoryRecordStore>, AppError> {
    match staffing_csv {
        Some(path) => {
            let store = directory_store(start.year())?;
            let service = StaffingService::with_weekday_calendar(store.clone());
            StaffingCsvImporter::from_path(path, &service, "import", Local::now().naive_local())?;
            Ok(store)
        }
        None => demo_store(start),
    }
}

pub(crate) fn run_planning_review(args: PlanningReviewArgs) -> Result<(), AppError> {
    let today = Local::now().date_naive();
    let start = args.start.unwrap_or_else(|| month_start(today));
    let params = PlanningParams {
        year: Some(start.year()),
        month: Some(start.month()),
        n_month: args.months,
        projected: args.projected.then(|| "true".to_string()),
        groupby: args.group_by,
    };
    let config = AppConfig::load()?;
    let query = PlanningQuery::from_params(&params, today, config.planning.default_months)?;
    let service = StaffingService::with_weekday_calendar(load_store(args.staffing_csv, start)?);

    match service.planning_review(&query)? {
        PlanningReviewOutcome::Ready(page) if args.json => print_json(&page),
        PlanningReviewOutcome::Ready(page) => render_review(&page),
        PlanningReviewOutcome::NoProductiveConsultants => {
            println!("No productive consultants to review.");
        }
    }
    Ok(())
}

pub(crate) fn run_timesheet(args: TimesheetArgs) -> Result<(), AppError> {
    let store = load_store(args.staffing_csv, args.month)?;
    let service = StaffingService::with_weekday_calendar(store);
    let sheet = service.consultant_timesheet(ConsultantId(args.consultant), args.month)?;
    if args.json {
        print_json(&sheet);
    } else {
        render_timesheet(&sheet);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let month = month_start(args.month.unwrap_or_else(|| Local::now().date_naive()));
    let store = demo_store(month)?;
    let controller = LeadLifecycleController::new(
        store.clone(),
        Arc::new(LoggingMailer),
        LifecycleSettings::default(),
    );
    let context = SaveContext {
        current_month: month,
        now: start_of_day(month),
        author: Author {
            username: "gho".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
        },
    };

    println!("Staffing planner demo");
    let mut lead = Lead::new(LeadId(1), "Acme Corp Q1", "Acme");
    lead.staffing = vec![ConsultantId(1), ConsultantId(3)];
    lead.send_email = true;

    for state in [LeadState::Qualif, LeadState::OfferSent, LeadState::Win] {
        lead.state = state;
        let (saved, outcome) = controller.save(lead, &context)?;
        lead = saved;
        println!("\nLead '{}' saved as {}", lead.name, state.label());
        for notice in &outcome.notices {
            let marker = if notice.is_warning() { "!" } else { "-" };
            println!("  {marker} {}", notice.message());
        }
        if let Some(mission) = &outcome.mission {
            println!(
                "  mission {} | probability {}% | active {}",
                mission.id, mission.probability, mission.active
            );
        }
    }

    let service = StaffingService::with_weekday_calendar(store);
    if let Some(mission) = lead_mission(&service, LeadId(1))? {
        service.record_staffing(
            StaffingEntry {
                consultant: ConsultantId(3),
                mission,
                month: next_month(month),
                charge: 8.0,
            },
            "gho",
            start_of_day(month),
        )?;
    }

    let query = PlanningQuery::new(month, 3, args.projected, GroupBy::Manager);
    match service.planning_review(&query)? {
        PlanningReviewOutcome::Ready(page) => render_review(&page),
        PlanningReviewOutcome::NoProductiveConsultants => {
            println!("No productive consultants to review.");
        }
    }

    let sheet = service.consultant_timesheet(ConsultantId(1), month)?;
    render_timesheet(&sheet);
    Ok(())
}

fn lead_mission(
    service: &StaffingService<InMemoryRecordStore>,
    lead: LeadId,
) -> Result<Option<MissionId>, AppError> {
    Ok(service
        .store()
        .mission_for_lead(lead)
        .map_err(store_error)?
        .map(|mission| mission.id))
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(body) => println!("{body}"),
        Err(err) => eprintln!("failed to render JSON: {err}"),
    }
}

pub(crate) fn render_review(page: &PlanningReviewPage) {
    let review = &page.review;
    println!(
        "\nStaffing review from {} ({} month(s), {}, grouped by {})",
        page.start_date,
        review.months.len(),
        if review.projected { "projected" } else { "committed" },
        review.group_by.label()
    );
    println!(
        "Previous slice: {} | next slice: {}",
        page.previous_slice, page.next_slice
    );

    let header: Vec<String> = review
        .months
        .iter()
        .zip(&review.available_days)
        .map(|(month, days)| format!("{} ({}d)", month.format("%Y-%m"), days))
        .collect();
    println!("{:<24} {}", "Consultant", header.join(" | "));
    for row in &review.rows {
        let cells: Vec<String> = row
            .months
            .iter()
            .map(|cell| {
                format!(
                    "P{:>3} U{:>3} H{:>3} A{:>3}",
                    cell.prod, cell.unprod, cell.holidays, cell.available
                )
            })
            .collect();
        println!("{:<24} {}", row.name, cells.join(" | "));
    }
    let totals: Vec<String> = review
        .totals
        .iter()
        .map(|cell| {
            format!(
                "P{:>3} U{:>3} H{:>3} A{:>3}",
                cell.prod, cell.unprod, cell.holidays, cell.available
            )
        })
        .collect();
    println!("{:<24} {}", "Total", totals.join(" | "));
    let rates: Vec<String> = review
        .rates
        .iter()
        .map(|rate| {
            format!(
                "P{:>3}% U{:>3}% H{:>3}% A{:>3}%",
                rate.prod, rate.unprod, rate.holidays, rate.available
            )
        })
        .collect();
    println!("{:<24} {}", "Rates", rates.join(" | "));
}

pub(crate) fn render_timesheet(sheet: &ConsultantTimesheet) {
    println!(
        "\nTimesheet of {} for {}",
        sheet.consultant,
        sheet.month.format("%Y-%m")
    );
    for line in &sheet.missions {
        println!(
            "- {:<32} forecast {:>5.1} | declared {:>5.1}",
            line.name, line.forecast, line.actual
        );
    }
    println!(
        "Working days {} | declared {:.1} | balance {:.1}",
        sheet.working_days, sheet.declared, sheet.balance
    );
}
