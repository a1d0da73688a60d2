//! Measurement registry business rules.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;
use std::sync::Arc;

use metersnap_core::model::{MeasureKind, NewReading};
use metersnap_core::registry::MeasurementRegistry;
use metersnap_core::MeterError;

fn new_reading(customer: &str, kind: &str, ts: &str) -> NewReading {
    NewReading::validate(
        Some(customer.into()),
        Some(kind.into()),
        Some(ts.into()),
        Some("aGVsbG8=".into()),
    )
    .unwrap()
}

fn submit(reg: &MeasurementRegistry, customer: &str, kind: &str, ts: &str) -> Result<uuid::Uuid, MeterError> {
    let new = new_reading(customer, kind, ts);
    reg.ensure_available(&new)?;
    reg.commit(new, "https://example.com/image".into(), 123.0).map(|r| r.id)
}

#[test]
fn distinct_windows_all_succeed_with_unique_ids() {
    let reg = MeasurementRegistry::new();
    let mut ids = HashSet::new();
    for (customer, kind, ts) in [
        ("C1", "WATER", "2024-01-15T10:00:00Z"),
        ("C1", "WATER", "2024-02-15T10:00:00Z"),
        ("C1", "GAS", "2024-01-15T10:00:00Z"),
        ("C2", "WATER", "2024-01-15T10:00:00Z"),
        ("C2", "GAS", "2025-01-01"),
    ] {
        ids.insert(submit(&reg, customer, kind, ts).unwrap());
    }
    assert_eq!(ids.len(), 5);
    assert_eq!(reg.len(), 5);
    assert_eq!(reg.customer_count(), 2);
}

#[test]
fn same_month_is_duplicate_regardless_of_day() {
    let reg = MeasurementRegistry::new();
    submit(&reg, "C1", "WATER", "2024-05-01T10:00:00Z").unwrap();

    let err = submit(&reg, "C1", "WATER", "2024-05-20T09:00:00Z").unwrap_err();
    assert!(matches!(err, MeterError::DuplicateSubmission));

    // different kind in the same month is allowed
    submit(&reg, "C1", "GAS", "2024-05-20T09:00:00Z").unwrap();
}

#[test]
fn commit_rechecks_duplicates() {
    let reg = MeasurementRegistry::new();
    let a = new_reading("C1", "GAS", "2024-05-01");
    let b = new_reading("C1", "GAS", "2024-05-31T23:59:59Z");
    reg.ensure_available(&a).unwrap();
    reg.ensure_available(&b).unwrap();

    reg.commit(a, "ref-a".into(), 1.0).unwrap();
    let err = reg.commit(b, "ref-b".into(), 2.0).unwrap_err();
    assert!(matches!(err, MeterError::DuplicateSubmission));
    assert_eq!(reg.len(), 1);
}

#[test]
fn confirm_lifecycle() {
    let reg = MeasurementRegistry::new();
    let id = submit(&reg, "C1", "WATER", "2024-05-01T10:00:00Z").unwrap();

    let confirmed = reg.confirm(&id.to_string(), 42.5).unwrap();
    assert!(confirmed.confirmed);
    assert_eq!(confirmed.value, 42.5);

    let err = reg.confirm(&id.to_string(), 10.0).unwrap_err();
    assert!(matches!(err, MeterError::AlreadyConfirmed));

    // the first confirmed value is kept
    assert_eq!(reg.get(id).unwrap().value, 42.5);
}

#[test]
fn confirm_unknown_is_not_found() {
    let reg = MeasurementRegistry::new();
    submit(&reg, "C1", "WATER", "2024-05-01").unwrap();

    let err = reg.confirm(&uuid::Uuid::new_v4().to_string(), 1.0).unwrap_err();
    assert!(matches!(err, MeterError::ReadingNotFound));

    let err = reg.confirm("not-a-uuid", 1.0).unwrap_err();
    assert!(matches!(err, MeterError::ReadingNotFound));
}

#[test]
fn list_keeps_submission_order_and_filters() {
    let reg = MeasurementRegistry::new();
    let w1 = submit(&reg, "C1", "WATER", "2024-01-10").unwrap();
    let g1 = submit(&reg, "C1", "GAS", "2024-01-10").unwrap();
    let w2 = submit(&reg, "C1", "WATER", "2024-02-10").unwrap();

    let all: Vec<_> = reg.list("C1", None).unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(all, vec![w1, g1, w2]);

    let water: Vec<_> = reg
        .list("C1", Some(MeasureKind::Water))
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(water, vec![w1, w2]);
}

#[test]
fn customer_codes_are_exact_keys() {
    let reg = MeasurementRegistry::new();
    submit(&reg, "C1", "WATER", "2024-01-10").unwrap();
    // no trimming: a padded code is another customer
    submit(&reg, " C1", "WATER", "2024-01-10").unwrap();
    assert_eq!(reg.customer_count(), 2);
    assert_eq!(reg.list(" C1", None).unwrap().len(), 1);
}

#[test]
fn listed_readings_keep_timestamp_as_sent() {
    let reg = MeasurementRegistry::new();
    submit(&reg, "C1", "WATER", "2024-05-01").unwrap();
    submit(&reg, "C1", "GAS", "2024-05-31T23:00:00-03:00").unwrap();

    let stamps: Vec<_> = reg.list("C1", None).unwrap().into_iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec!["2024-05-01", "2024-05-31T23:00:00-03:00"]);
}

#[test]
fn list_empty_results_are_not_found() {
    let reg = MeasurementRegistry::new();
    assert!(matches!(reg.list("unknown-customer", None), Err(MeterError::NoReadings)));

    submit(&reg, "C1", "WATER", "2024-01-10").unwrap();
    assert!(matches!(
        reg.list("C1", Some(MeasureKind::Gas)),
        Err(MeterError::NoReadings)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_commits_admit_exactly_one() {
    let reg = Arc::new(MeasurementRegistry::new());
    let mut handles = Vec::new();
    for day in 1..=16 {
        let reg = Arc::clone(&reg);
        handles.push(tokio::spawn(async move {
            let new = new_reading("C1", "WATER", &format!("2024-07-{day:02}T12:00:00Z"));
            reg.commit(new, format!("ref-{day}"), day as f64).is_ok()
        }));
    }

    let mut admitted = 0;
    for h in handles {
        if h.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(reg.list("C1", None).unwrap().len(), 1);
}
