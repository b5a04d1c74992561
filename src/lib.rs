pub mod api;
pub mod cancel;
pub mod client;
pub mod credentials;
pub mod headers;
pub mod iterator;
pub mod playback;
pub mod playlist;
pub mod session;
pub mod r#trait;
pub mod types;
pub mod view;

pub use cancel::CancellationState;
pub use client::VibeSyncClient;
pub use credentials::{CredentialProvider, StaticToken, TokenEndpoint};
pub use iterator::{fetch_all_tracks, AsyncPaginatedIterator, PlaylistTracksIterator};
pub use playback::{embed_markup, PlaybackController, PlaybackState};
pub use playlist::load_playlist;
pub use r#trait::StreamingClient;
pub use session::load_dashboard;
pub use types::{
    format_duration, AccessToken, ClientConfig, ClientEvent, ClientEventReceiver,
    ClientEventWatcher, DashboardState, PlaylistDetail, PlaylistSummary, RequestInfo,
    SharedEventBroadcaster, Track, TrackPage, UserProfile, VibeSyncError, DEFAULT_API_BASE,
    DEFAULT_EMBED_BASE, DEFAULT_MAX_PAGES, DEFAULT_TOKEN_URL, PLACEHOLDER_COVER,
};
pub use view::{DashboardView, PlaylistView};

#[cfg(feature = "mock")]
pub use credentials::MockCredentialProvider;
#[cfg(feature = "mock")]
pub use r#trait::MockStreamingClient;

pub type Result<T> = std::result::Result<T, VibeSyncError>;
