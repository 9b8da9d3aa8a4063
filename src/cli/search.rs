use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    info,
    search::{PipelineConfig, QueryPipeline, SearchOutcome, pipeline::MIN_QUERY_LEN, shape},
    session::{AuthSession, AuthenticatedTransport, FileTokenStore},
    types::{
        AlbumTableRow, ArtistRef, ArtistTableRow, PlaylistTableRow, SearchCategory,
        SearchResponse, TrackTableRow,
    },
    warning,
};

const ONE_SHOT_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn search(
    session: AuthSession<FileTokenStore>,
    query: Option<String>,
    category: SearchCategory,
) {
    if !session.check_status().await {
        warning!("Not authenticated. Run spoqcli auth.");
        return;
    }

    let transport = Arc::new(AuthenticatedTransport::new(session));
    let (pipeline, mut outcomes) = QueryPipeline::spawn(transport, PipelineConfig::default());

    match query {
        Some(query) => one_shot(&pipeline, &mut outcomes, &query, category).await,
        None => interactive(&pipeline, &mut outcomes, category).await,
    }
}

async fn one_shot(
    pipeline: &QueryPipeline,
    outcomes: &mut tokio::sync::mpsc::UnboundedReceiver<SearchOutcome>,
    query: &str,
    category: SearchCategory,
) {
    pipeline.submit(query, category);

    let pb = ProgressBar::new_spinner();
    pb.set_message("Searching...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let outcome = tokio::time::timeout(ONE_SHOT_TIMEOUT, outcomes.recv()).await;
    pb.finish_and_clear();

    match outcome {
        Ok(Some(outcome)) => render(outcome),
        Ok(None) => warning!("Search stream closed unexpectedly."),
        Err(_) => warning!("Search timed out."),
    }
}

async fn interactive(
    pipeline: &QueryPipeline,
    outcomes: &mut tokio::sync::mpsc::UnboundedReceiver<SearchOutcome>,
    category: SearchCategory,
) {
    info!("Interactive search. Type a query and press Enter; Ctrl-D quits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => pipeline.submit(&line, category),
                    _ => break,
                }
            }
            outcome = outcomes.recv() => {
                match outcome {
                    Some(outcome) => render(outcome),
                    None => break,
                }
            }
        }
    }
}

fn render(outcome: SearchOutcome) {
    match outcome {
        SearchOutcome::Empty => {
            info!("Type at least {} characters to search.", MIN_QUERY_LEN)
        }
        SearchOutcome::Failed { query, error } => {
            warning!("Search for '{}' failed: {}", query, error)
        }
        SearchOutcome::Results(response) => render_response(response),
    }
}

fn render_response(response: SearchResponse) {
    let mut empty = true;

    if !response.tracks.is_empty() {
        empty = false;
        info!("Tracks ({} total)", response.total_tracks);
        let rows: Vec<TrackTableRow> = response
            .tracks
            .iter()
            .map(|t| TrackTableRow {
                title: t.name.clone(),
                artists: artist_names(&t.artists),
                album: t.album.as_ref().map(|a| a.name.clone()).unwrap_or_default(),
                duration: shape::format_duration(t.duration_ms),
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    if !response.artists.is_empty() {
        empty = false;
        info!("Artists ({} total)", response.total_artists);
        let rows: Vec<ArtistTableRow> = response
            .artists
            .iter()
            .map(|a| ArtistTableRow {
                name: a.name.clone(),
                followers: shape::format_followers(
                    a.followers.as_ref().map(|f| f.total).unwrap_or(0),
                ),
                genres: a.genres.join(", "),
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    if !response.albums.is_empty() {
        empty = false;
        info!("Albums ({} total)", response.total_albums);
        let rows: Vec<AlbumTableRow> = response
            .albums
            .iter()
            .map(|a| AlbumTableRow {
                title: a.name.clone(),
                artists: artist_names(&a.artists),
                released: a.release_date.clone(),
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    if !response.playlists.is_empty() {
        empty = false;
        info!("Playlists ({} total)", response.total_playlists);
        let rows: Vec<PlaylistTableRow> = response
            .playlists
            .iter()
            .map(|p| PlaylistTableRow {
                name: p.name.clone(),
                owner: p
                    .owner
                    .as_ref()
                    .map(|o| o.display_name.clone().unwrap_or_else(|| o.id.clone()))
                    .unwrap_or_default(),
                tracks: p.tracks.as_ref().map(|t| t.total).unwrap_or(0),
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    if empty {
        info!("No results found. Try different keywords.");
    }
}

fn artist_names(artists: &[ArtistRef]) -> String {
    if artists.is_empty() {
        return "Unknown Artist".to_string();
    }
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
