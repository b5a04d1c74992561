//! Wire types for the provider's JSON responses and their mapping onto the
//! crate's own models.

use crate::types::{
    AccessToken, PlaylistSummary, Track, TrackPage, UserProfile, VibeSyncError, NO_DESCRIPTION,
};
use crate::Result;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct ApiTokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Deserialize)]
pub struct ApiImage {
    pub url: String,
}

#[derive(Deserialize)]
pub struct ApiProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ApiPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<ApiImage>>,
}

#[derive(Deserialize)]
pub struct ApiPlaylistsResponse {
    pub items: Vec<ApiPlaylist>,
}

#[derive(Deserialize)]
pub struct ApiArtist {
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
pub struct ApiAlbum {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<ApiImage>>,
}

#[derive(Deserialize)]
pub struct ApiTrack {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<ApiArtist>>,
    #[serde(default)]
    pub album: Option<ApiAlbum>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

#[derive(Deserialize)]
pub struct ApiPlaylistItem {
    #[serde(default)]
    pub track: Option<ApiTrack>,
}

/// One page of `/v1/playlists/{id}/tracks`.
#[derive(Deserialize)]
pub struct ApiTracksPage {
    pub items: Vec<ApiPlaylistItem>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

fn first_image_or(images: Option<&[ApiImage]>, placeholder: &str) -> String {
    images
        .and_then(|images| images.first())
        .map(|image| image.url.clone())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

impl ApiPlaylist {
    pub fn into_summary(self, placeholder: &str) -> PlaylistSummary {
        let cover_url = first_image_or(self.images.as_deref(), placeholder);
        PlaylistSummary {
            id: self.id,
            name: self.name,
            description: self
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            cover_url,
        }
    }
}

impl ApiPlaylistItem {
    /// Map a raw playlist item onto [`Track`].
    ///
    /// A `null` track (removed or unavailable content) still yields an entry,
    /// with empty id and name, so positions line up with the provider.
    pub fn into_track(self, placeholder: &str) -> Track {
        let track = self.track.unwrap_or(ApiTrack {
            id: None,
            name: None,
            artists: None,
            album: None,
            duration_ms: None,
        });

        let artist = track
            .artists
            .unwrap_or_default()
            .into_iter()
            .map(|a| a.name)
            .collect::<Vec<_>>()
            .join(", ");

        let (album, cover_url) = match track.album {
            Some(album) => {
                let cover = first_image_or(album.images.as_deref(), placeholder);
                (album.name, cover)
            }
            None => (None, placeholder.to_string()),
        };

        Track {
            id: track.id.unwrap_or_default(),
            name: track.name.unwrap_or_default(),
            artist,
            cover_url,
            album,
            duration_ms: track.duration_ms.unwrap_or(0),
            kind: "track".to_string(),
        }
    }
}

pub fn parse_token_response(json: &str) -> Result<AccessToken> {
    let response: ApiTokenResponse = serde_json::from_str(json)?;
    match response.access_token {
        Some(token) if !token.trim().is_empty() => Ok(AccessToken::new(token)),
        _ => Err(VibeSyncError::MissingCredential(
            "token endpoint returned no access_token".to_string(),
        )),
    }
}

pub fn parse_profile_response(json: &str) -> Result<UserProfile> {
    let profile: ApiProfile = serde_json::from_str(json)?;
    Ok(UserProfile {
        id: profile.id,
        display_name: profile.display_name,
    })
}

pub fn parse_playlists_response(json: &str, placeholder: &str) -> Result<Vec<PlaylistSummary>> {
    let response: ApiPlaylistsResponse = serde_json::from_str(json)?;
    Ok(response
        .items
        .into_iter()
        .map(|p| p.into_summary(placeholder))
        .collect())
}

pub fn parse_playlist_response(json: &str, placeholder: &str) -> Result<PlaylistSummary> {
    let playlist: ApiPlaylist = serde_json::from_str(json)?;
    Ok(playlist.into_summary(placeholder))
}

pub fn parse_tracks_page_response(
    json: &str,
    page_number: u32,
    placeholder: &str,
) -> Result<TrackPage> {
    let page: ApiTracksPage = serde_json::from_str(json)?;

    let tracks: Vec<Track> = page
        .items
        .into_iter()
        .map(|item| item.into_track(placeholder))
        .collect();

    Ok(TrackPage {
        tracks,
        page_number,
        next: page.next.filter(|next| !next.is_empty()),
        total: page.total,
        limit: page.limit,
    })
}
