use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// An OAuth credential as held by the session and persisted by the token
/// store. `expires_at` is an absolute unix timestamp in seconds; a refresh
/// token, once obtained, is kept even when a later refresh response omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: i64,
}

impl Credential {
    /// Whether the access token is expired, or close enough to expiry that
    /// using it for a new request is not worth the round trip.
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - EXPIRY_MARGIN_SECS
    }
}

/// Tokens within this margin of their expiry are refreshed proactively.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// PKCE material held between issuing the authorization URL and the
/// callback that completes the exchange.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub code_verifier: String,
    pub state: String,
}

/// The session state machine. Exactly one instance exists per session;
/// all transitions happen inside `session::AuthSession`.
#[derive(Debug, Clone)]
pub enum SessionState {
    Unauthenticated,
    Authenticating(PendingLogin),
    Authenticated(Credential),
    Refreshing,
    /// A credential is present but past its expiry; kept so a refresh can
    /// still use its refresh token.
    Expired(Credential),
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Unauthenticated => SessionPhase::Unauthenticated,
            SessionState::Authenticating(_) => SessionPhase::Authenticating,
            SessionState::Authenticated(_) => SessionPhase::Authenticated,
            SessionState::Refreshing => SessionPhase::Refreshing,
            SessionState::Expired(_) => SessionPhase::Expired,
        }
    }
}

/// A copyable view of the session state without the credential payload,
/// broadcast to subscribers on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Refreshing,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub followers: Option<Followers>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Search category selected by the user. `All` fans out to every entity
/// kind in a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SearchCategory {
    All,
    Track,
    Artist,
    Album,
    Playlist,
}

impl SearchCategory {
    /// The `type` query parameter the search endpoint expects.
    pub fn type_param(&self) -> &'static str {
        match self {
            SearchCategory::All => "track,artist,album,playlist",
            SearchCategory::Track => "track",
            SearchCategory::Artist => "artist",
            SearchCategory::Album => "album",
            SearchCategory::Playlist => "playlist",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

/// Raw search response from the API, one optional paging per entity kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub tracks: Option<Page<Track>>,
    pub artists: Option<Page<Artist>>,
    pub albums: Option<Page<Album>>,
    pub playlists: Option<Page<Playlist>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<Album>,
    #[serde(default)]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub followers: Option<Followers>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub release_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub owner: Option<PlaylistOwner>,
    pub tracks: Option<TrackTotals>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackTotals {
    pub total: u64,
}

/// One tick of the search pipeline as sent to the backend. The sequence
/// number is what lets the pipeline discard responses that were overtaken
/// by newer input.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub category: SearchCategory,
    pub sequence: u64,
}

/// A shaped search response correlated to its request by sequence number.
/// Items are already capped per the display limit policy.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub sequence: u64,
    pub category: SearchCategory,
    pub tracks: Vec<Track>,
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
    pub playlists: Vec<Playlist>,
    pub total_tracks: u64,
    pub total_artists: u64,
    pub total_albums: u64,
    pub total_playlists: u64,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub title: String,
    pub artists: String,
    pub album: String,
    pub duration: String,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub name: String,
    pub followers: String,
    pub genres: String,
}

#[derive(Tabled)]
pub struct AlbumTableRow {
    pub title: String,
    pub artists: String,
    pub released: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub owner: String,
    pub tracks: u64,
}
