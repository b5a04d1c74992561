//! Dashboard session loading: credential, profile and the first playlists.

use crate::r#trait::StreamingClient;
use crate::types::DashboardState;
use crate::Result;

/// Hydrate the dashboard.
///
/// Obtains one credential from the client's provider and uses it for both
/// the profile request and the playlist request (at most `playlist_limit`
/// items). Every failure is returned to the caller; deciding how the view
/// degrades is left to [`DashboardView`](crate::view::DashboardView).
pub async fn load_dashboard<C: StreamingClient + ?Sized>(
    client: &C,
    playlist_limit: u32,
) -> Result<DashboardState> {
    let token = client.access_token().await?;

    let profile = client.get_profile(&token).await?;
    log::debug!("Loaded profile for {}", profile.name());

    let playlists = client.get_playlists(&token, playlist_limit).await?;
    log::debug!("Loaded {} playlists", playlists.len());

    Ok(DashboardState { profile, playlists })
}
