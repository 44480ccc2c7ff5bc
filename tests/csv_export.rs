mod common;

use common::ymd;
use forecast_core::{
    export,
    ledger::{Schedule, SimpleSchedule, TransactionDefinition},
    projection::{NoProgress, ProjectionEngine, ProjectionRequest},
};

fn two_day_request() -> ProjectionRequest {
    ProjectionRequest::new(
        vec![
            TransactionDefinition::new("Pay", 123_456, Schedule::Simple(SimpleSchedule::daily())),
            TransactionDefinition::new(
                "Rent, late",
                -50_000,
                Schedule::Simple(SimpleSchedule::daily().starting(ymd(2024, 7, 5))),
            ),
        ],
        ymd(2024, 7, 4),
        ymd(2024, 7, 5),
        0,
    )
}

#[test]
fn records_quote_fields_with_commas() {
    let projection = ProjectionEngine::default()
        .project(&two_day_request(), &mut NoProgress)
        .unwrap();
    let csv = export::to_csv_string(&projection.rows).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(csv.ends_with('\n') && !csv.contains('\r'));

    insta::assert_snapshot!(
        lines[0],
        @r#"07/04/2024,"$1,234.56","$1,234.56",$0.00,$0.00,"$1,234.56","$1,234.56","$1,234.56",Pay"#
    );
    insta::assert_snapshot!(
        lines[1],
        @r#"07/05/2024,"$1,969.12","$2,469.12",-$500.00,-$500.00,"$1,234.56",$734.56,"$1,969.12","Pay;Rent, late""#
    );
}

#[test]
fn writer_output_matches_string_rendering() {
    let projection = ProjectionEngine::default()
        .project(&two_day_request(), &mut NoProgress)
        .unwrap();
    let mut buffer = Vec::new();
    export::write_rows(&projection.rows, &mut buffer).unwrap();
    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        export::to_csv_string(&projection.rows).unwrap()
    );
    assert_eq!(export::to_csv_string(&[]).unwrap(), "");
}
