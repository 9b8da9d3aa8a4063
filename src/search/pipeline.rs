use std::{future::Future, sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    time::{Instant, sleep},
};

use crate::{
    error::ApiError,
    search::shape::{self, ResultKind},
    types::{Page, SearchCategory, SearchRequest, SearchResponse, SearchResults},
};

/// How long input must stay quiet before a request goes out.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(300);

/// Trimmed queries shorter than this produce an empty outcome without a
/// network call.
pub const MIN_QUERY_LEN: usize = 2;

/// The backend a pipeline issues its requests against. In production this
/// is the authenticated transport; tests substitute their own.
pub trait SearchBackend: Send + Sync + 'static {
    fn search(
        &self,
        query: &str,
        category: SearchCategory,
        limit: u32,
    ) -> impl Future<Output = Result<SearchResults, ApiError>> + Send;
}

/// One delivery on the outcome stream.
///
/// `Failed` carries the error for display but does not terminate the
/// stream; the next input starts over cleanly.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Results(SearchResponse),
    Empty,
    Failed { query: String, error: ApiError },
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub debounce: Duration,
    pub min_query_len: usize,
    pub page_limit: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            debounce: DEBOUNCE_INTERVAL,
            min_query_len: MIN_QUERY_LEN,
            page_limit: crate::spotify::search::SEARCH_PAGE_LIMIT,
        }
    }
}

/// The debounced, latest-wins search pipeline.
///
/// Submissions are cheap and non-blocking; a worker task owns all pipeline
/// state. Each issued request carries a monotonically increasing sequence
/// number, and a response is delivered only while its sequence is still the
/// newest one issued. Whatever arrives for an older sequence is dropped,
/// which is how an in-flight request is "cancelled" when newer input
/// supersedes it.
pub struct QueryPipeline {
    input_tx: mpsc::UnboundedSender<(String, SearchCategory)>,
}

impl QueryPipeline {
    /// Spawns the worker and returns the pipeline handle plus the outcome
    /// stream. The worker stops when the handle is dropped or the outcome
    /// receiver goes away.
    pub fn spawn<B: SearchBackend>(
        backend: Arc<B>,
        config: PipelineConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(backend, config, input_rx, outcome_tx));
        (QueryPipeline { input_tx }, outcome_rx)
    }

    /// Feeds one raw input into the pipeline.
    pub fn submit(&self, query: &str, category: SearchCategory) {
        let _ = self.input_tx.send((query.to_string(), category));
    }
}

async fn run<B: SearchBackend>(
    backend: Arc<B>,
    config: PipelineConfig,
    mut input_rx: mpsc::UnboundedReceiver<(String, SearchCategory)>,
    outcome_tx: mpsc::UnboundedSender<SearchOutcome>,
) {
    let (response_tx, mut response_rx) =
        mpsc::unbounded_channel::<(SearchRequest, Result<SearchResults, ApiError>)>();

    // sequence of the newest issued request; responses for anything older
    // are discarded on arrival
    let mut sequence: u64 = 0;
    let mut last_issued: Option<(String, SearchCategory)> = None;
    let mut pending: Option<(String, SearchCategory)> = None;

    let debounce = sleep(Duration::from_secs(0));
    tokio::pin!(debounce);

    loop {
        tokio::select! {
            input = input_rx.recv() => {
                let Some((raw, category)) = input else { break };
                let query = raw.trim().to_string();

                if query.chars().count() < config.min_query_len {
                    // too short: answer right away and forget anything in flight
                    pending = None;
                    sequence += 1;
                    last_issued = None;
                    if outcome_tx.send(SearchOutcome::Empty).is_err() {
                        break;
                    }
                    continue;
                }

                let category_switch = matches!(
                    &last_issued,
                    Some((q, c)) if *q == query && *c != category
                );
                if category_switch {
                    // same query, new category: no point waiting out the window
                    pending = None;
                    issue(&backend, &config, &response_tx, &mut sequence, &mut last_issued, query, category);
                } else {
                    pending = Some((query, category));
                    debounce.as_mut().reset(Instant::now() + config.debounce);
                }
            }
            _ = debounce.as_mut(), if pending.is_some() => {
                if let Some((query, category)) = pending.take() {
                    let duplicate = matches!(
                        &last_issued,
                        Some((q, c)) if *q == query && *c == category
                    );
                    if duplicate {
                        continue;
                    }
                    issue(&backend, &config, &response_tx, &mut sequence, &mut last_issued, query, category);
                }
            }
            response = response_rx.recv() => {
                let Some((request, result)) = response else { break };
                if request.sequence != sequence {
                    continue; // superseded by newer input
                }
                let outcome = match result {
                    Ok(results) => {
                        SearchOutcome::Results(shape_response(request.sequence, request.category, results))
                    }
                    Err(error) => SearchOutcome::Failed {
                        query: request.query,
                        error,
                    },
                };
                if outcome_tx.send(outcome).is_err() {
                    break;
                }
            }
        }
    }
}

fn issue<B: SearchBackend>(
    backend: &Arc<B>,
    config: &PipelineConfig,
    response_tx: &mpsc::UnboundedSender<(SearchRequest, Result<SearchResults, ApiError>)>,
    sequence: &mut u64,
    last_issued: &mut Option<(String, SearchCategory)>,
    query: String,
    category: SearchCategory,
) {
    *sequence += 1;
    let request = SearchRequest {
        query: query.clone(),
        category,
        sequence: *sequence,
    };
    *last_issued = Some((query, category));

    let backend = Arc::clone(backend);
    let response_tx = response_tx.clone();
    let limit = config.page_limit;
    tokio::spawn(async move {
        let result = backend
            .search(&request.query, request.category, limit)
            .await;
        let _ = response_tx.send((request, result));
    });
}

fn shape_response(
    sequence: u64,
    category: SearchCategory,
    results: SearchResults,
) -> SearchResponse {
    fn capped<T>(page: Option<Page<T>>, cap: usize) -> (Vec<T>, u64) {
        match page {
            Some(mut page) => {
                page.items.truncate(cap);
                (page.items, page.total)
            }
            None => (Vec::new(), 0),
        }
    }

    let (tracks, total_tracks) =
        capped(results.tracks, shape::result_limit(category, ResultKind::Tracks));
    let (artists, total_artists) =
        capped(results.artists, shape::result_limit(category, ResultKind::Artists));
    let (albums, total_albums) =
        capped(results.albums, shape::result_limit(category, ResultKind::Albums));
    let (playlists, total_playlists) = capped(
        results.playlists,
        shape::result_limit(category, ResultKind::Playlists),
    );

    SearchResponse {
        sequence,
        category,
        tracks,
        artists,
        albums,
        playlists,
        total_tracks,
        total_artists,
        total_albums,
        total_playlists,
    }
}
