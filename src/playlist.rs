use crate::cancel::{run_cancellable, CancellationState};
use crate::iterator::fetch_all_tracks;
use crate::r#trait::StreamingClient;
use crate::types::PlaylistDetail;
use crate::Result;

/// Load a playlist's metadata and its complete track list.
///
/// The detail request comes first; its failure aborts the load before any
/// track page is requested. Tracks are then aggregated page by page, at most
/// `max_pages` of them, with the same credential.
///
/// With `cancel` given, every request of the load (credential, detail and
/// each track page) is raced against it.
pub async fn load_playlist<C: StreamingClient + ?Sized>(
    client: &C,
    playlist_id: &str,
    max_pages: u32,
    cancel: Option<&CancellationState>,
) -> Result<PlaylistDetail> {
    let token = run_cancellable(cancel, client.access_token()).await?;

    let summary = run_cancellable(cancel, client.get_playlist(&token, playlist_id)).await?;
    log::debug!("Loaded playlist '{}' ({})", summary.name, summary.id);

    let first_page = client.playlist_tracks_url(playlist_id);
    let tracks = fetch_all_tracks(client, &token, &first_page, max_pages, cancel).await?;

    Ok(PlaylistDetail::from_summary(summary, tracks))
}
