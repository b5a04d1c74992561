//! View-local state for the dashboard and playlist pages.
//!
//! These types hold what a front end renders and decide how failures
//! degrade. They perform no I/O of their own beyond calling into a
//! [`StreamingClient`].

use crate::cancel::CancellationState;
use crate::playback::PlaybackController;
use crate::playlist::load_playlist;
use crate::r#trait::StreamingClient;
use crate::session::load_dashboard;
use crate::types::{
    DashboardState, PlaylistDetail, PlaylistSummary, Track, DEFAULT_EMBED_BASE,
};
use crate::Result;

/// Name shown before the profile is known, or when it could not be loaded.
pub const FALLBACK_USERNAME: &str = "User";

/// Banner shown when a playlist fails to load.
pub const PLAYLIST_LOAD_ERROR: &str = "Failed to load playlist data";

/// Dashboard page state: greeting and playlist grid.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    username: Option<String>,
    playlists: Vec<PlaylistSummary>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the dashboard through `client` and apply the outcome.
    pub async fn load<C: StreamingClient + ?Sized>(&mut self, client: &C, playlist_limit: u32) {
        let result = load_dashboard(client, playlist_limit).await;
        self.apply(result);
    }

    /// Apply a load result.
    ///
    /// A failure is logged and leaves the view at its initial values.
    pub fn apply(&mut self, result: Result<DashboardState>) {
        match result {
            Ok(state) => {
                self.username = Some(state.profile.name().to_string());
                self.playlists = state.playlists;
            }
            Err(e) => {
                log::error!("Error fetching user data: {e}");
            }
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(FALLBACK_USERNAME)
    }

    pub fn greeting(&self) -> String {
        format!("Welcome back, {}", self.username())
    }

    pub fn playlists(&self) -> &[PlaylistSummary] {
        &self.playlists
    }
}

/// Playlist page state: loading flag, error banner, playlist and player.
#[derive(Debug, Clone)]
pub struct PlaylistView {
    loading: bool,
    error: Option<String>,
    playlist: Option<PlaylistDetail>,
    playback: PlaybackController,
}

impl Default for PlaylistView {
    fn default() -> Self {
        Self::new(DEFAULT_EMBED_BASE)
    }
}

impl PlaylistView {
    /// A fresh view starts out loading.
    pub fn new(embed_base: impl Into<String>) -> Self {
        Self {
            loading: true,
            error: None,
            playlist: None,
            playback: PlaybackController::new(embed_base),
        }
    }

    /// Load `playlist_id` through `client` and apply the outcome.
    ///
    /// `cancel` lets the owner stop the track walk when the view goes away.
    pub async fn load<C: StreamingClient + ?Sized>(
        &mut self,
        client: &C,
        playlist_id: &str,
        max_pages: u32,
        cancel: Option<&CancellationState>,
    ) {
        self.loading = true;
        self.error = None;
        let result = load_playlist(client, playlist_id, max_pages, cancel).await;
        self.apply(result);
    }

    /// Apply a load result. Loading ends either way.
    pub fn apply(&mut self, result: Result<PlaylistDetail>) {
        match result {
            Ok(playlist) => {
                self.playlist = Some(playlist);
                self.error = None;
            }
            Err(e) => {
                log::error!("Error fetching playlist data: {e}");
                self.playlist = None;
                self.error = Some(PLAYLIST_LOAD_ERROR.to_string());
            }
        }
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn playlist(&self) -> Option<&PlaylistDetail> {
        self.playlist.as_ref()
    }

    /// Tracks worth listing: entries with an empty name are skipped.
    pub fn visible_tracks(&self) -> impl Iterator<Item = &Track> {
        self.playlist
            .iter()
            .flat_map(|p| p.tracks.iter())
            .filter(|t| !t.name.is_empty())
    }

    /// Select a track for playback. See [`PlaybackController::select`].
    pub fn select_track(&mut self, track: &Track) -> Result<&str> {
        self.playback.select(track)
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn embed_html(&self) -> Option<&str> {
        self.playback.embed_html()
    }
}
