use crate::types::{AccessToken, PlaylistSummary, TrackPage, UserProfile};
use crate::Result;
use async_trait::async_trait;

/// Trait for streaming-provider operations that can be mocked for testing.
///
/// Every network call takes the bearer credential explicitly; obtaining it is
/// a separate step ([`access_token`](Self::access_token)) so a single token is
/// threaded through all requests of one load.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockStreamingClient`
/// that implements this trait using the `mockall` library.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait StreamingClient {
    /// Obtain a bearer credential from the configured provider.
    async fn access_token(&self) -> Result<AccessToken>;

    /// Fetch the current user's profile (`/v1/me`).
    async fn get_profile(&self, token: &AccessToken) -> Result<UserProfile>;

    /// Fetch the first `limit` playlists of the current user.
    async fn get_playlists(&self, token: &AccessToken, limit: u32)
        -> Result<Vec<PlaylistSummary>>;

    /// Fetch a playlist's metadata, without its tracks.
    async fn get_playlist(&self, token: &AccessToken, playlist_id: &str)
        -> Result<PlaylistSummary>;

    /// Fetch and decode one page of a track listing.
    ///
    /// `page_number` is the page's position in the cursor chain and is only
    /// recorded on the returned [`TrackPage`].
    async fn get_tracks_page(
        &self,
        token: &AccessToken,
        url: &str,
        page_number: u32,
    ) -> Result<TrackPage>;

    /// URL of the first page of a playlist's track listing.
    fn playlist_tracks_url(&self, playlist_id: &str) -> String;
}
