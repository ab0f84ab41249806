use chrono::{NaiveDate, NaiveDateTime};
use gops_backlog::aging::AgingBucket;
use gops_backlog::dashboard::{self, DashboardState, View};
use gops_backlog::output::to_csv;
use gops_backlog::query::Filter;
use gops_backlog::record::{Status, Zone};
use gops_backlog::segments::{SegmentSpec, Snapshot};
use gops_backlog::source::{CachedSource, FileSource};
use gops_backlog::table::RawTable;
use std::time::Duration;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/orders.csv");

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 6)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn fixture_snapshot() -> Snapshot {
    let bytes = std::fs::read(FIXTURE).expect("fixture should be readable");
    let table = RawTable::from_csv(&bytes).expect("fixture should be valid CSV");
    Snapshot::build(&table, now())
}

fn orders(segment: &gops_backlog::segments::Segment) -> Vec<String> {
    segment
        .rows()
        .iter()
        .filter_map(|r| r.record.order_number.clone())
        .collect()
}

#[test]
fn test_three_row_aging_scenario() {
    let table = RawTable::new(
        vec!["latest_status".to_string(), "qc_approved_at".to_string()],
        vec![
            vec!["QC_APPROVED".to_string(), "January 1, 2024, 10:00".to_string()],
            vec!["QC_APPROVED".to_string(), "January 5, 2024, 10:00".to_string()],
            vec!["QC_APPROVED".to_string(), String::new()],
        ],
    );
    let segment = Snapshot::build(&table, now()).segment(&SegmentSpec::new(Status::QcApproved));

    let days: Vec<Option<i64>> = segment.rows().iter().map(|r| r.aging_days).collect();
    assert_eq!(days, vec![Some(5), Some(1), None]);
    let buckets: Vec<Option<AgingBucket>> = segment.rows().iter().map(|r| r.bucket).collect();
    assert_eq!(
        buckets,
        vec![Some(AgingBucket::Day5), Some(AgingBucket::Day1), None]
    );

    let counts = segment.aging_counts();
    for entry in &counts.buckets {
        let expected = match entry.bucket {
            AgingBucket::Day1 | AgingBucket::Day5 => 1,
            _ => 0,
        };
        assert_eq!(entry.count, expected, "bucket {}", entry.bucket);
    }
    assert_eq!(segment.len(), 3);
    assert_eq!(counts.bucketed, 2);
}

#[test]
fn test_fixture_summary_and_segments() {
    let snapshot = fixture_snapshot();
    let summary = snapshot.summary();

    assert_eq!(summary.approved, 5);
    assert_eq!(summary.handover, 2);
    assert_eq!(summary.freight, 1);
    assert_eq!(summary.total, 8);

    let handover = snapshot.segment(&SegmentSpec::new(Status::HandedOver));
    assert_eq!(orders(&handover), vec!["PK-2001", "PK-2002"]);
    let counts = handover.aging_counts();
    assert_eq!(counts.count(AgingBucket::Days8To10), 1);
    assert_eq!(counts.count(AgingBucket::Day3), 1);

    let qc_center = snapshot.segment(&SegmentSpec::new(Status::QcApproved).zone(Zone::PkQcCenter));
    assert_eq!(orders(&qc_center), vec!["PK-1004"]);
    assert_eq!(qc_center.rows()[0].bucket, Some(AgingBucket::Over30));
}

#[test]
fn test_fixture_aging_excludes_blank_and_future_dates() {
    let snapshot = fixture_snapshot();
    let approved = snapshot.segment(&SegmentSpec::new(Status::QcApproved));
    let counts = approved.aging_counts();

    assert_eq!(counts.bucketed, 3);
    assert_eq!(counts.unbucketed, 2);
    assert_eq!(counts.total(), approved.len());
    assert_eq!(approved.total_amount(), 1250.0 + 450.0 + 900.0 + 2000.0 + 700.0);
}

#[test]
fn test_fixture_vendor_ranking() {
    let snapshot = fixture_snapshot();
    let vendors = snapshot
        .segment(&SegmentSpec::new(Status::QcApproved))
        .vendor_counts();

    let got: Vec<(&str, usize)> = vendors
        .iter()
        .map(|v| (v.vendor.as_str(), v.count))
        .collect();
    assert_eq!(
        got,
        vec![("Vintage Hub", 2), ("Retro Lane", 2), ("Denim Co", 1)]
    );
}

#[test]
fn test_export_round_trip_of_filtered_view() {
    let snapshot = fixture_snapshot();
    let state = DashboardState::new(
        View::Segment(SegmentSpec::new(Status::QcApproved)),
        Filter::new(Some("o".to_string()), Some("United States".to_string())),
    );
    let rows = state.rows(&snapshot).unwrap();
    assert_eq!(orders(&rows), vec!["PK-1002", "PK-1005"]);

    let bytes = to_csv(&rows).unwrap();
    let parsed = RawTable::from_csv(&bytes).unwrap();

    assert_eq!(parsed.headers().as_ref(), rows.headers());
    assert_eq!(parsed.len(), rows.len());
    for (parsed_row, row) in parsed.rows().iter().zip(rows.rows()) {
        assert_eq!(parsed_row, &row.record.cells);
    }
    assert_eq!(parsed.rows()[0][14], "rush, gift wrap");
}

#[tokio::test]
async fn test_load_from_file_source() {
    let cache = CachedSource::new(FileSource::new(FIXTURE), Duration::from_secs(300));

    let state = dashboard::load(&cache, "Orders", now()).await;
    let snapshot = state.snapshot().expect("fixture should load");
    assert_eq!(snapshot.len(), 10);
}

#[tokio::test]
async fn test_load_missing_file_is_failed_state() {
    let cache = CachedSource::new(
        FileSource::new("tests/fixtures/missing.csv"),
        Duration::from_secs(300),
    );

    let state = dashboard::load(&cache, "Orders", now()).await;
    assert!(!state.is_ready());
}
