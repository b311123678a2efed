use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use staffing_planner::staffing::{
    InMemoryRecordStore, MissionId, MissionNature, RecordStore, StaffingError, StaffingFilter,
    StaffingService,
};
use staffing_planner::{ImportSummary, StaffingCsvImporter, StaffingImportError};

fn service_with_missions(count: usize) -> StaffingService<InMemoryRecordStore> {
    let store = Arc::new(InMemoryRecordStore::new());
    for index in 0..count {
        store
            .create_mission(MissionNature::Prod, &format!("Mission {index}"), 100)
            .expect("mission");
    }
    StaffingService::with_weekday_calendar(store)
}

fn imported_at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|day| day.and_hms_opt(7, 0, 0))
        .expect("valid time")
}

#[test]
fn sample_file_imports_from_path() {
    let service = service_with_missions(4);
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("sample_staffing.csv");

    let summary = StaffingCsvImporter::from_path(path, &service, "import", imported_at())
        .expect("sample imports");
    assert_eq!(
        summary,
        ImportSummary {
            staffing: 7,
            timesheets: 4,
            skipped: 0,
        }
    );

    let tender = service
        .store()
        .staffing(&StaffingFilter {
            mission: Some(MissionId(4)),
            ..StaffingFilter::default()
        })
        .expect("staffing");
    assert_eq!(tender.len(), 1);
    assert_eq!(tender[0].charge, 10.0);
}

#[test]
fn rows_for_unknown_missions_stop_the_import() {
    let service = service_with_missions(1);
    let csv = "Kind,Consultant,Mission,Date,Charge\n\
staffing,1,1,2025-01-01,4\n\
staffing,1,2,2025-01-01,4\n";

    let error = StaffingCsvImporter::from_reader(csv.as_bytes(), &service, "import", imported_at())
        .expect_err("mission 2 does not exist");
    match &error {
        StaffingImportError::Staffing {
            line,
            source: StaffingError::Repository(_),
        } => assert_eq!(*line, 3),
        other => panic!("expected store error, got {other:?}"),
    }
    assert!(error.to_string().contains("line 3"));

    let recorded = service
        .store()
        .staffing(&StaffingFilter::default())
        .expect("staffing");
    assert_eq!(recorded.len(), 1, "earlier rows stay recorded");
}

#[test]
fn negative_charges_are_rejected() {
    let service = service_with_missions(1);
    let csv = "Kind,Consultant,Mission,Date,Charge\ntimesheet,1,1,2025-01-02,-1\n";

    let error = StaffingCsvImporter::from_reader(csv.as_bytes(), &service, "import", imported_at())
        .expect_err("negative charge");
    assert!(matches!(
        error,
        StaffingImportError::Staffing {
            source: StaffingError::Validation(_),
            ..
        }
    ));
}

#[test]
fn charges_beyond_the_period_stop_the_import() {
    let service = service_with_missions(1);
    let csv = "Kind,Consultant,Mission,Date,Charge\n\
staffing,1,1,2025-02-01,28\n\
timesheet,1,1,2025-02-03,2\n";

    let error = StaffingCsvImporter::from_reader(csv.as_bytes(), &service, "import", imported_at())
        .expect_err("a timesheet entry covers one day at most");
    match error {
        StaffingImportError::Staffing {
            line,
            source: StaffingError::Validation(_),
        } => assert_eq!(line, 3),
        other => panic!("expected validation error, got {other:?}"),
    }
}
