//! Data types for the streaming dashboard and its client operations.
//!
//! This module contains the core data structures used throughout the crate,
//! including track and playlist metadata, error types, client configuration,
//! and event handling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, watch};

/// Cover reference used when the provider returns no image for an item.
pub const PLACEHOLDER_COVER: &str = "/placeholder.svg";

/// Description used when a playlist has none.
pub const NO_DESCRIPTION: &str = "No description";

// ================================================================================================
// TRACK AND PLAYLIST METADATA
// ================================================================================================

/// A single track of a playlist, in the shape the dashboard renders.
///
/// # Examples
///
/// ```rust
/// use vibesync::Track;
///
/// let track = Track {
///     id: "4uLU6hMCjMI75M1A2tKUQC".to_string(),
///     name: "Never Gonna Give You Up".to_string(),
///     artist: "Rick Astley".to_string(),
///     cover_url: "/placeholder.svg".to_string(),
///     album: Some("Whenever You Need Somebody".to_string()),
///     duration_ms: 213_573,
///     kind: "track".to_string(),
/// };
///
/// assert_eq!(track.formatted_duration(), "3:33");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Provider identifier. Empty when the provider returned no track object.
    pub id: String,
    /// The track title
    pub name: String,
    /// Display names of all credited artists, joined with `", "`
    pub artist: String,
    /// First album image, or [`PLACEHOLDER_COVER`]
    pub cover_url: String,
    /// The album name (if available)
    pub album: Option<String>,
    /// Track length in milliseconds
    pub duration_ms: u64,
    /// Item type tag. Always `"track"` for playlist items.
    pub kind: String,
}

impl Track {
    /// Render the track length as `m:ss`.
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_ms)
    }

    /// Whether this track can be handed to the embedded player.
    pub fn is_playable(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Format a duration in milliseconds as `m:ss`, flooring to whole seconds.
pub fn format_duration(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes}:{seconds:02}")
}

/// One decoded page of a cursor-paginated track listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPage {
    /// The tracks on this page, in provider order
    pub tracks: Vec<Track>,
    /// Position of this page in the cursor chain (1-indexed)
    pub page_number: u32,
    /// Locator of the following page; `None` once the cursor is exhausted
    pub next: Option<String>,
    /// Total number of items across all pages, if the provider reported it
    pub total: Option<u32>,
    /// Page size the provider applied, if reported
    pub limit: Option<u32>,
}

impl TrackPage {
    /// Whether the provider advertised another page.
    pub fn has_next_page(&self) -> bool {
        self.next.is_some()
    }

    /// Total page count derived from `total` and `limit`, when both are known.
    pub fn total_pages(&self) -> Option<u32> {
        match (self.total, self.limit) {
            (Some(total), Some(limit)) if limit > 0 => Some(total.div_ceil(limit)),
            _ => None,
        }
    }
}

/// A playlist as shown on the dashboard grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    /// Provider description, or [`NO_DESCRIPTION`]
    pub description: String,
    /// First playlist image, or [`PLACEHOLDER_COVER`]
    pub cover_url: String,
}

/// A playlist together with its complete, ordered track list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cover_url: String,
    pub tracks: Vec<Track>,
}

impl PlaylistDetail {
    /// Combine a detail fetch with an aggregated track list.
    pub fn from_summary(summary: PlaylistSummary, tracks: Vec<Track>) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            description: summary.description,
            cover_url: summary.cover_url,
            tracks,
        }
    }

    /// Sum of all track durations in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.tracks.iter().map(|t| t.duration_ms).sum()
    }
}

/// The current user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account identifier
    pub id: String,
    /// Display name, if the account has one
    pub display_name: Option<String>,
}

impl UserProfile {
    /// Name to greet the user with: the display name, or the account id.
    pub fn name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }
}

/// Everything the dashboard needs after the initial load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardState {
    pub profile: UserProfile,
    pub playlists: Vec<PlaylistSummary>,
}

/// Opaque bearer credential.
///
/// The token value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Value for the `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessToken")
            .field(&format_args!("<{} chars>", self.0.len()))
            .finish()
    }
}

// ================================================================================================
// ERROR TYPES
// ================================================================================================

/// Error types for dashboard client operations.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use vibesync::{StaticToken, VibeSyncClient, VibeSyncError};
///
/// #[tokio::main]
/// async fn main() {
///     let client = VibeSyncClient::new(
///         Box::new(http_client::native::NativeClient::new()),
///         Box::new(StaticToken::new("token")),
///     );
///
///     match client.load_playlist("37i9dQZF1DXcBWIGoYBM5M").await {
///         Ok(playlist) => println!("{} tracks", playlist.tracks.len()),
///         Err(VibeSyncError::TrackFetchFailed { status, .. }) => {
///             eprintln!("Track page failed with status {status}");
///         }
///         Err(VibeSyncError::MissingCredential(msg)) => eprintln!("No token: {msg}"),
///         Err(e) => eprintln!("Other error: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VibeSyncError {
    /// HTTP/network related errors.
    ///
    /// Connection failures, DNS errors and other transport problems, as well
    /// as failures reading a response body.
    #[error("HTTP error: {0}")]
    Http(String),

    /// No usable bearer credential could be obtained.
    #[error("No access token found: {0}")]
    MissingCredential(String),

    /// The provider answered a profile, playlist or playlist-list request
    /// with a non-success status.
    #[error("Failed to fetch {resource}: status {status} from {url}")]
    UpstreamStatus {
        /// Which resource was being fetched (`profile`, `playlists`, `playlist`)
        resource: &'static str,
        /// The HTTP status code returned
        status: u16,
        /// The requested URL
        url: String,
    },

    /// A page of a track listing returned a non-success status.
    ///
    /// Any tracks gathered from earlier pages are discarded.
    #[error("Failed to fetch tracks: status {status} from {url}")]
    TrackFetchFailed {
        /// The HTTP status code returned
        status: u16,
        /// The page URL that failed
        url: String,
    },

    /// Rate limiting from the provider (HTTP 429).
    ///
    /// Requests are never retried automatically; `retry_after` is the
    /// provider's hint in seconds.
    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimit {
        /// Number of seconds to wait before retrying
        retry_after: u64,
    },

    /// The provider's response could not be decoded.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A track was selected for playback without an identifier.
    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    /// Pagination went past the configured page ceiling.
    #[error("Page limit of {max_pages} exceeded while following pagination cursor")]
    PageLimitExceeded {
        /// The configured ceiling
        max_pages: u32,
    },

    /// The provider handed back a cursor that was already visited.
    #[error("Pagination cursor loops back to {url}")]
    CursorLoop {
        /// The repeated page URL
        url: String,
    },

    /// The operation was cancelled through a [`CancellationState`](crate::CancellationState).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for VibeSyncError {
    fn from(e: serde_json::Error) -> Self {
        VibeSyncError::Parse(e.to_string())
    }
}

// ================================================================================================
// CLIENT CONFIGURATION
// ================================================================================================

/// Default provider API root.
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com";

/// Default local token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "http://localhost:3000/api/token";

/// Default ceiling on pages followed in one track walk.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Default root of the hosted track player.
pub const DEFAULT_EMBED_BASE: &str = "https://open.spotify.com/embed/track";

/// Settings shared by every client operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Provider API root, without trailing slash
    pub api_base: String,
    /// Items requested per track page
    pub page_size: u32,
    /// Number of playlists the dashboard loads
    pub playlist_limit: u32,
    /// Hard ceiling on pages followed in one track walk
    pub max_pages: u32,
    /// Cover reference used when the provider has no image
    pub placeholder_cover: String,
    /// Root of the hosted track player
    pub embed_base: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_size: 50,
            playlist_limit: 5,
            max_pages: DEFAULT_MAX_PAGES,
            placeholder_cover: PLACEHOLDER_COVER.to_string(),
            embed_base: DEFAULT_EMBED_BASE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at a different API root (tests, proxies)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the number of items requested per track page
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the number of playlists loaded for the dashboard
    pub fn with_playlist_limit(mut self, playlist_limit: u32) -> Self {
        self.playlist_limit = playlist_limit;
        self
    }

    /// Set the page ceiling for track walks
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the placeholder cover reference
    pub fn with_placeholder_cover(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder_cover = placeholder.into();
        self
    }

    /// Set the root of the hosted track player
    pub fn with_embed_base(mut self, embed_base: impl Into<String>) -> Self {
        self.embed_base = embed_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn profile_url(&self) -> String {
        format!("{}/v1/me", self.api_base)
    }

    pub fn playlists_url(&self, limit: u32) -> String {
        format!("{}/v1/me/playlists?limit={limit}", self.api_base)
    }

    pub fn playlist_url(&self, playlist_id: &str) -> String {
        format!(
            "{}/v1/playlists/{}",
            self.api_base,
            urlencoding::encode(playlist_id)
        )
    }

    /// First page of a playlist's track listing.
    pub fn playlist_tracks_url(&self, playlist_id: &str) -> String {
        format!(
            "{}/v1/playlists/{}/tracks?limit={}",
            self.api_base,
            urlencoding::encode(playlist_id),
            self.page_size
        )
    }
}

// ================================================================================================
// EVENTS
// ================================================================================================

/// The request an event refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestInfo {
    pub method: String,
    /// URL as requested, query included
    pub url: String,
    /// URL path only
    pub path: String,
    /// Decoded query pairs, in request order
    pub query: Vec<(String, String)>,
}

impl RequestInfo {
    pub fn from_url_and_method(url: &str, method: &str) -> Self {
        let (path, query) = match http_types::Url::parse(url) {
            Ok(parsed) => (
                parsed.path().to_string(),
                parsed
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            ),
            Err(_) => (url.split('?').next().unwrap_or(url).to_string(), Vec::new()),
        };

        Self {
            method: method.to_string(),
            url: url.to_string(),
            path,
            query,
        }
    }

    /// `GET /v1/playlists/x/tracks?offset=50` style summary for log lines.
    ///
    /// Only the pagination-relevant `offset` parameter is kept.
    pub fn short_description(&self) -> String {
        match self.query.iter().find(|(k, _)| k == "offset") {
            Some((_, offset)) => format!("{} {}?offset={offset}", self.method, self.path),
            None => format!("{} {}", self.method, self.path),
        }
    }
}

/// Something the client did, published to subscribers as it happens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    RequestStarted {
        request: RequestInfo,
        timestamp: DateTime<Utc>,
    },
    /// A response arrived, whatever its status
    RequestCompleted {
        request: RequestInfo,
        status_code: u16,
        /// Wall time from send to response headers
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    /// A page of a track walk was decoded
    PageFetched {
        /// Position in the cursor chain (1-indexed)
        page_number: u32,
        item_count: usize,
        /// Whether the provider advertised another page
        has_next: bool,
        timestamp: DateTime<Utc>,
    },
    /// The provider answered with 429
    RateLimited {
        /// Provider's retry hint in seconds
        retry_after: u64,
        request: RequestInfo,
        timestamp: DateTime<Utc>,
    },
}

/// Stream of every event.
pub type ClientEventReceiver = broadcast::Receiver<ClientEvent>;

/// Most recent event only.
pub type ClientEventWatcher = watch::Receiver<Option<ClientEvent>>;

/// Number of events a slow subscriber may fall behind before it lags.
const EVENT_BUFFER: usize = 100;

/// Fan-out point for [`ClientEvent`]s, shared by a client and its clones.
#[derive(Clone)]
pub struct SharedEventBroadcaster {
    stream: broadcast::Sender<ClientEvent>,
    latest: watch::Sender<Option<ClientEvent>>,
}

impl SharedEventBroadcaster {
    pub fn new() -> Self {
        Self {
            stream: broadcast::channel(EVENT_BUFFER).0,
            latest: watch::channel(None).0,
        }
    }

    /// Publish `event`. Having no subscribers is not an error.
    pub fn broadcast_event(&self, event: ClientEvent) {
        if self.stream.receiver_count() > 0 {
            let _ = self.stream.send(event.clone());
        }
        self.latest.send_replace(Some(event));
    }

    pub fn subscribe(&self) -> ClientEventReceiver {
        self.stream.subscribe()
    }

    pub fn watch(&self) -> ClientEventWatcher {
        self.latest.subscribe()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.latest.borrow().clone()
    }
}

impl Default for SharedEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedEventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEventBroadcaster")
            .field("subscribers", &self.stream.receiver_count())
            .field("latest", &*self.latest.borrow())
            .finish()
    }
}

// ================================================================================================
// TESTS
// ================================================================================================
