//! Tests for group computation through an injected availability source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use nutty_engine::{
    compute_common_free_time, AvailabilityRecord, AvailabilitySource, ClockTime,
    CommonTimeFinder, EngineConfig, FetchError, InMemorySource, NuttyError, UserId,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn rec(user: &str, day: &str, start: &str, end: &str) -> AvailabilityRecord {
    AvailabilityRecord::new(
        user,
        day.parse::<NaiveDate>().unwrap(),
        start.parse::<ClockTime>().unwrap(),
        end.parse::<ClockTime>().unwrap(),
    )
    .unwrap()
}

fn users(ids: &[&str]) -> Vec<UserId> {
    ids.iter().map(|id| UserId::from(*id)).collect()
}

/// Counts calls and delegates to an in-memory store.
struct CountingSource {
    inner: InMemorySource,
    calls: AtomicUsize,
}

impl CountingSource {
    fn new(records: Vec<AvailabilityRecord>) -> Self {
        CountingSource {
            inner: InMemorySource::from_records(records),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AvailabilitySource for CountingSource {
    async fn fetch_availability(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AvailabilityRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_availability(user_id).await
    }
}

/// Never answers within any reasonable budget.
struct StalledSource;

#[async_trait]
impl AvailabilitySource for StalledSource {
    async fn fetch_availability(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<AvailabilityRecord>, FetchError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }
}

/// Hands back records that claim to belong to someone else.
struct MislabelingSource;

#[async_trait]
impl AvailabilitySource for MislabelingSource {
    async fn fetch_availability(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AvailabilityRecord>, FetchError> {
        let window = if user_id.as_str() == "a" {
            ("09:00", "12:00")
        } else {
            ("10:00", "11:00")
        };
        Ok(vec![rec("someone-else", "2025-05-01", window.0, window.1)])
    }
}

/// Returns an inverted window for every user.
struct InvertedSource;

#[async_trait]
impl AvailabilitySource for InvertedSource {
    async fn fetch_availability(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AvailabilityRecord>, FetchError> {
        Ok(vec![AvailabilityRecord {
            user_id: user_id.clone(),
            date: "2025-05-01".parse().unwrap(),
            start_time: "11:00".parse().unwrap(),
            end_time: "10:00".parse().unwrap(),
        }])
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_group_skips_the_fetcher() {
    let source = CountingSource::new(vec![rec("a", "2025-05-01", "09:00", "10:00")]);
    let slots = compute_common_free_time(&source, &[], &EngineConfig::default())
        .await
        .unwrap();

    assert!(slots.is_empty());
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fetches_each_participant_once() {
    let source = CountingSource::new(vec![
        rec("a", "2025-05-01", "09:00", "12:00"),
        rec("b", "2025-05-01", "10:00", "11:00"),
        rec("c", "2025-05-01", "10:30", "11:30"),
    ]);
    let slots = compute_common_free_time(&source, &users(&["a", "b", "c"]), &EngineConfig::default())
        .await
        .unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start_time.to_string(), "10:30");
    assert_eq!(slots[0].end_time.to_string(), "11:00");
    assert_eq!(slots[0].users, users(&["a", "b", "c"]));
}

#[tokio::test]
async fn partial_overlap_through_finder() {
    let source = Arc::new(InMemorySource::from_records(vec![
        rec("a", "2025-05-01", "09:00", "12:00"),
        rec("b", "2025-05-01", "10:00", "11:00"),
    ]));
    let finder = CommonTimeFinder::new(source);
    let slots = finder.find(&users(&["a", "b"])).await.unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].date.to_string(), "2025-05-01");
    assert_eq!(slots[0].start_time.to_string(), "10:00");
    assert_eq!(slots[0].end_time.to_string(), "11:00");
}

#[tokio::test]
async fn user_without_records_means_no_common_time() {
    let source = InMemorySource::from_records(vec![rec("a", "2025-05-01", "09:00", "12:00")]);
    let slots = compute_common_free_time(&source, &users(&["a", "ghost"]), &EngineConfig::default())
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn one_failed_fetch_fails_the_group() {
    let source = InMemorySource::from_records(vec![
        rec("a", "2025-05-01", "09:00", "12:00"),
        rec("b", "2025-05-01", "10:00", "11:00"),
    ]);
    source
        .fail_for(&UserId::from("b"), FetchError::Unavailable("connection refused".into()))
        .unwrap();

    let err = compute_common_free_time(&source, &users(&["a", "b"]), &EngineConfig::default())
        .await
        .unwrap_err();

    match err {
        NuttyError::Fetch { user_id, source } => {
            assert_eq!(user_id.as_str(), "b");
            assert_eq!(source, FetchError::Unavailable("connection refused".into()));
        }
        other => panic!("expected Fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn duplicate_ids_rejected_before_fetching() {
    let source = CountingSource::new(vec![]);
    let err = compute_common_free_time(&source, &users(&["a", "a"]), &EngineConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, NuttyError::DuplicateUser(_)));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn slow_fan_out_times_out() {
    let config = EngineConfig::default().with_fetch_timeout(Duration::from_millis(20));
    let err = compute_common_free_time(&StalledSource, &users(&["a"]), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, NuttyError::Timeout(d) if d == Duration::from_millis(20)));
}

#[tokio::test]
async fn records_are_attributed_to_the_requested_user() {
    let slots = compute_common_free_time(&MislabelingSource, &users(&["a", "b"]), &EngineConfig::default())
        .await
        .unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start_time.to_string(), "10:00");
    assert_eq!(slots[0].end_time.to_string(), "11:00");
}

#[tokio::test]
async fn inverted_fetched_record_is_rejected() {
    let err = compute_common_free_time(&InvertedSource, &users(&["a"]), &EngineConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, NuttyError::InvalidRecord(_)));
}

#[tokio::test]
async fn saved_availability_replaces_previous() {
    let source = Arc::new(InMemorySource::from_records(vec![
        rec("a", "2025-05-01", "09:00", "12:00"),
        rec("b", "2025-05-01", "09:00", "12:00"),
    ]));
    let finder = CommonTimeFinder::new(source.clone());
    assert_eq!(finder.find(&users(&["a", "b"])).await.unwrap().len(), 1);

    let saved = source
        .replace_user_availability(
            &UserId::from("b"),
            vec![rec("b", "2025-05-02", "13:00", "14:00")],
        )
        .unwrap();
    assert_eq!(saved, 1);
    assert!(finder.find(&users(&["a", "b"])).await.unwrap().is_empty());

    source
        .replace_user_availability(&UserId::from("b"), Vec::new())
        .unwrap();
    assert!(source.user_availability(&UserId::from("b")).unwrap().is_empty());
}

#[test]
fn user_availability_is_sorted_by_date_then_start() {
    let source = InMemorySource::from_records(vec![
        rec("a", "2025-05-02", "09:00", "10:00"),
        rec("a", "2025-05-01", "14:00", "15:00"),
        rec("a", "2025-05-01", "08:00", "09:00"),
    ]);
    let ordered: Vec<String> = source
        .user_availability(&UserId::from("a"))
        .unwrap()
        .iter()
        .map(|r| format!("{} {}", r.date, r.start_time))
        .collect();
    assert_eq!(
        ordered,
        vec!["2025-05-01 08:00", "2025-05-01 14:00", "2025-05-02 09:00"]
    );
}

#[test]
fn config_defaults_and_deserializes() {
    assert_eq!(EngineConfig::default().fetch_timeout(), Duration::from_secs(10));

    let config: EngineConfig = serde_json::from_str(r#"{"fetch_timeout_ms": 250}"#).unwrap();
    assert_eq!(config.fetch_timeout(), Duration::from_millis(250));

    let config: EngineConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, EngineConfig::default());
}
