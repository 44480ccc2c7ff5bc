mod common;

use std::{
    sync::{mpsc, Arc, Mutex},
    thread,
    time::Duration,
};

use chrono::NaiveDate;
use common::ymd;
use forecast_core::{
    errors::RuleError,
    execution::{progress_channel, ExecutionContext},
    ledger::{ProjectionWindow, Schedule, SimpleSchedule, TransactionDefinition},
    projection::{
        NoProgress, ProjectionEngine, ProjectionOptions, ProjectionRequest, ProgressUpdate,
        RuleEvaluator,
    },
};

/// Holds every evaluation until the test lets it through.
struct HeldEvaluator {
    release: Mutex<mpsc::Receiver<()>>,
}

impl RuleEvaluator for HeldEvaluator {
    fn occurrences(
        &self,
        _expression: &str,
        window: &ProjectionWindow,
    ) -> Result<Vec<NaiveDate>, RuleError> {
        self.release
            .lock()
            .map_err(|_| RuleError::Empty)?
            .recv()
            .map_err(|_| RuleError::Empty)?;
        Ok(vec![window.end()])
    }
}

fn payroll(count: usize) -> Vec<TransactionDefinition> {
    (0..count)
        .map(|idx| {
            TransactionDefinition::new(
                format!("Payee {idx}"),
                1_000,
                Schedule::Simple(SimpleSchedule::monthly()),
            )
        })
        .collect()
}

#[test]
fn second_submission_is_ignored_while_busy() {
    let (release_tx, release_rx) = mpsc::channel();
    let context = ExecutionContext::new(ProjectionEngine::new(
        Arc::new(HeldEvaluator {
            release: Mutex::new(release_rx),
        }),
        ProjectionOptions::default(),
    ));
    let held = ProjectionRequest::new(
        vec![TransactionDefinition::new(
            "Held",
            700,
            Schedule::Explicit {
                rule: "FREQ=DAILY".into(),
            },
        )],
        ymd(2024, 1, 1),
        ymd(2024, 1, 10),
        0,
    );

    let handle = context.submit(held.clone(), NoProgress).expect("accepted");
    assert!(context.is_busy());
    for _ in 0..3 {
        assert!(context.submit(held.clone(), NoProgress).is_none());
    }

    release_tx.send(()).unwrap();
    let projection = handle.wait().unwrap();
    assert_eq!(projection.final_balance(), 700);
    assert!(!context.is_busy());
    assert!(context.submit(held, NoProgress).is_some());
    release_tx.send(()).unwrap();
}

#[test]
fn progress_is_delivered_through_the_inbox() {
    let context = ExecutionContext::default();
    let request = ProjectionRequest::new(payroll(2_500), ymd(2024, 1, 1), ymd(2024, 12, 31), 0);
    let (sink, mut inbox) = progress_channel();
    let mut handle = context.submit(request, sink).expect("accepted");

    let mut statuses: Vec<String> = Vec::new();
    let projection = loop {
        inbox.drain(|update: ProgressUpdate| statuses.push(update.to_string()));
        match handle.try_finish() {
            Ok(result) => break result.unwrap(),
            Err(pending) => {
                handle = pending;
                thread::sleep(Duration::from_millis(5));
            }
        }
    };
    inbox.drain(|update: ProgressUpdate| statuses.push(update.to_string()));

    assert_eq!(projection.len(), 366);
    assert_eq!(statuses.first().map(String::as_str), Some("preparing dates…"));
    assert!(statuses.contains(&"recurrences… [0/2500]".to_string()));
    assert!(statuses.contains(&"recurrences… [2000/2500]".to_string()));
    assert!(statuses.contains(&"calculating… [0/366]".to_string()));
    assert_eq!(statuses.last().map(String::as_str), Some("done [366/366]"));
}

#[test]
fn long_windows_report_calculation_progress_in_steps() {
    let context = ExecutionContext::default();
    let request = ProjectionRequest::new(payroll(4), ymd(2024, 1, 1), ymd(2026, 12, 31), 0);
    let mut statuses: Vec<String> = Vec::new();
    let mut sink = |update: ProgressUpdate| statuses.push(update.to_string());
    let projection = context
        .run_blocking(&request, &mut sink)
        .expect("idle context runs")
        .unwrap();

    assert_eq!(projection.len(), 1096);
    let calculating: Vec<_> = statuses
        .iter()
        .filter(|status| status.starts_with("calculating"))
        .map(String::as_str)
        .collect();
    assert_eq!(
        calculating,
        vec!["calculating… [0/1096]", "calculating… [1000/1096]"]
    );
    assert_eq!(statuses.last().map(String::as_str), Some("done [1096/1096]"));
}

#[test]
fn blocking_runs_share_the_guard() {
    let context = ExecutionContext::default();
    let request = ProjectionRequest::new(payroll(3), ymd(2024, 1, 1), ymd(2024, 3, 31), 500);
    let projection = context
        .run_blocking(&request, &mut NoProgress)
        .expect("idle context runs")
        .unwrap();
    assert_eq!(projection.final_balance(), 500 + 3 * 3 * 1_000);
    assert!(!context.is_busy());
}
