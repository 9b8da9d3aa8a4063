use std::{
    collections::{HashMap, HashSet},
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};

use spoqcli::error::ApiError;
use spoqcli::search::{PipelineConfig, QueryPipeline, SearchBackend, SearchOutcome};
use spoqcli::types::{Page, SearchCategory, SearchResults, Track};

/// Backend double recording every call it receives. Responses can be
/// delayed or failed per query to exercise the latest-wins behavior.
#[derive(Default)]
struct MockBackend {
    calls: Mutex<Vec<(String, SearchCategory)>>,
    delays: Mutex<HashMap<String, Duration>>,
    failures: Mutex<HashSet<String>>,
}

impl MockBackend {
    fn delay(&self, query: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(query.to_string(), delay);
    }

    fn fail(&self, query: &str) {
        self.failures.lock().unwrap().insert(query.to_string());
    }

    fn calls(&self) -> Vec<(String, SearchCategory)> {
        self.calls.lock().unwrap().clone()
    }
}

impl SearchBackend for MockBackend {
    fn search(
        &self,
        query: &str,
        category: SearchCategory,
        _limit: u32,
    ) -> impl Future<Output = Result<SearchResults, ApiError>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), category));
        let delay = self.delays.lock().unwrap().get(query).copied();
        let fails = self.failures.lock().unwrap().contains(query);
        let query = query.to_string();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if fails {
                return Err(ApiError::TransientNetwork("connection reset".to_string()));
            }
            Ok(tracks_named(&query, 12))
        }
    }
}

fn tracks_named(query: &str, count: usize) -> SearchResults {
    let items = (0..count)
        .map(|i| Track {
            id: format!("{query}-{i}"),
            name: format!("{query} {i}"),
            artists: Vec::new(),
            album: None,
            duration_ms: 200_000,
        })
        .collect();
    SearchResults {
        tracks: Some(Page {
            items,
            total: count as u64,
        }),
        ..Default::default()
    }
}

fn test_config() -> PipelineConfig {
    PipelineConfig {
        debounce: Duration::from_millis(300),
        min_query_len: 2,
        page_limit: 20,
    }
}

async fn expect_results(
    outcomes: &mut tokio::sync::mpsc::UnboundedReceiver<SearchOutcome>,
) -> spoqcli::types::SearchResponse {
    match outcomes.recv().await {
        Some(SearchOutcome::Results(response)) => response,
        other => panic!("expected results, got {:?}", other),
    }
}

async fn expect_silence(outcomes: &mut tokio::sync::mpsc::UnboundedReceiver<SearchOutcome>) {
    let wait = tokio::time::timeout(Duration::from_secs(2), outcomes.recv());
    assert!(wait.await.is_err(), "expected no further outcome");
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_collapses_into_one_request() {
    let backend = Arc::new(MockBackend::default());
    let (pipeline, mut outcomes) = QueryPipeline::spawn(Arc::clone(&backend), test_config());

    pipeline.submit("Qu", SearchCategory::All);
    pipeline.submit("Que", SearchCategory::All);
    pipeline.submit("Queen", SearchCategory::All);

    let response = expect_results(&mut outcomes).await;
    assert_eq!(response.tracks[0].name, "Queen 0");

    assert_eq!(backend.calls(), vec![("Queen".to_string(), SearchCategory::All)]);
    expect_silence(&mut outcomes).await;
}

#[tokio::test(start_paused = true)]
async fn test_short_query_short_circuits() {
    let backend = Arc::new(MockBackend::default());
    let (pipeline, mut outcomes) = QueryPipeline::spawn(Arc::clone(&backend), test_config());

    pipeline.submit("a", SearchCategory::All);

    assert!(matches!(outcomes.recv().await, Some(SearchOutcome::Empty)));
    assert!(backend.calls().is_empty());

    // Whitespace padding does not rescue a short query
    pipeline.submit("  b  ", SearchCategory::All);
    assert!(matches!(outcomes.recv().await, Some(SearchOutcome::Empty)));
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_short_query_invalidates_in_flight_request() {
    let backend = Arc::new(MockBackend::default());
    backend.delay("slow", Duration::from_secs(1));
    let (pipeline, mut outcomes) = QueryPipeline::spawn(Arc::clone(&backend), test_config());

    pipeline.submit("slow", SearchCategory::All);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(backend.calls().len(), 1);

    // Clearing the input while the request is still in flight
    pipeline.submit("x", SearchCategory::All);

    assert!(matches!(outcomes.recv().await, Some(SearchOutcome::Empty)));
    // The slow response must never surface after the clear
    expect_silence(&mut outcomes).await;
}

#[tokio::test(start_paused = true)]
async fn test_latest_wins_over_slow_earlier_request() {
    let backend = Arc::new(MockBackend::default());
    backend.delay("first", Duration::from_secs(1));
    backend.delay("second", Duration::from_millis(10));
    let (pipeline, mut outcomes) = QueryPipeline::spawn(Arc::clone(&backend), test_config());

    pipeline.submit("first", SearchCategory::All);
    tokio::time::sleep(Duration::from_millis(400)).await;
    pipeline.submit("second", SearchCategory::All);

    let response = expect_results(&mut outcomes).await;
    assert_eq!(response.tracks[0].name, "second 0");

    // "first" completes later but its sequence is stale by then
    expect_silence(&mut outcomes).await;
    assert_eq!(backend.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_query_is_suppressed() {
    let backend = Arc::new(MockBackend::default());
    let (pipeline, mut outcomes) = QueryPipeline::spawn(Arc::clone(&backend), test_config());

    pipeline.submit("radiohead", SearchCategory::All);
    expect_results(&mut outcomes).await;

    // Same trimmed query again must not hit the backend
    pipeline.submit("  radiohead  ", SearchCategory::All);
    expect_silence(&mut outcomes).await;
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_category_switch_reissues_immediately() {
    let backend = Arc::new(MockBackend::default());
    let (pipeline, mut outcomes) = QueryPipeline::spawn(Arc::clone(&backend), test_config());

    pipeline.submit("miles", SearchCategory::All);
    expect_results(&mut outcomes).await;

    pipeline.submit("miles", SearchCategory::Artist);
    let response = expect_results(&mut outcomes).await;
    assert_eq!(response.category, SearchCategory::Artist);

    assert_eq!(
        backend.calls(),
        vec![
            ("miles".to_string(), SearchCategory::All),
            ("miles".to_string(), SearchCategory::Artist),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_reported_and_pipeline_continues() {
    let backend = Arc::new(MockBackend::default());
    backend.fail("broken");
    let (pipeline, mut outcomes) = QueryPipeline::spawn(Arc::clone(&backend), test_config());

    pipeline.submit("broken", SearchCategory::All);
    match outcomes.recv().await {
        Some(SearchOutcome::Failed { query, error }) => {
            assert_eq!(query, "broken");
            assert!(matches!(error, ApiError::TransientNetwork(_)));
        }
        other => panic!("expected failure, got {:?}", other),
    }

    // The stream stays usable after a failure
    pipeline.submit("working", SearchCategory::All);
    let response = expect_results(&mut outcomes).await;
    assert_eq!(response.tracks[0].name, "working 0");
}

#[tokio::test(start_paused = true)]
async fn test_all_category_caps_tracks_at_eight() {
    let backend = Arc::new(MockBackend::default());
    let (pipeline, mut outcomes) = QueryPipeline::spawn(Arc::clone(&backend), test_config());

    pipeline.submit("longlist", SearchCategory::All);
    let response = expect_results(&mut outcomes).await;

    // Backend returned 12 tracks; the overview keeps 8 and the true total
    assert_eq!(response.tracks.len(), 8);
    assert_eq!(response.total_tracks, 12);

    pipeline.submit("longlist", SearchCategory::Track);
    let response = expect_results(&mut outcomes).await;
    assert_eq!(response.tracks.len(), 12);
}
