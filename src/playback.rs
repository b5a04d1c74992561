//! Turning a selected track into the hosted player's embed fragment.

use crate::types::{Track, VibeSyncError, DEFAULT_EMBED_BASE};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Build the `<iframe>` fragment that plays `track_id` with autoplay on.
pub fn embed_markup(embed_base: &str, track_id: &str) -> String {
    format!(
        r#"<iframe id="spotify-iframe" src="{}/{}?utm_source=generator&autoplay=1" width="100%" height="80" frameBorder="0" allow="autoplay; clipboard-write; encrypted-media; fullscreen; picture-in-picture" style="border-radius: 8px;"></iframe>"#,
        embed_base.trim_end_matches('/'),
        urlencoding::encode(track_id)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    Loading,
    Embedded,
    Errored,
}

/// Playback state of one playlist view.
///
/// idle → loading → (embedded | errored). [`begin`](Self::begin) moves to
/// loading and [`complete`](Self::complete) leaves it; [`select`](Self::select)
/// does both. Selecting another track starts over from idle.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    embed_base: String,
    state: PlaybackState,
    selected: Option<Track>,
    embed_html: Option<String>,
    error: Option<String>,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(DEFAULT_EMBED_BASE)
    }
}

impl PlaybackController {
    pub fn new(embed_base: impl Into<String>) -> Self {
        Self {
            embed_base: embed_base.into(),
            state: PlaybackState::Idle,
            selected: None,
            embed_html: None,
            error: None,
        }
    }

    /// Select `track` for playback and return its embed fragment.
    ///
    /// A track without an identifier leaves no embed behind; the state moves
    /// to [`PlaybackState::Errored`] with a message naming the track.
    pub fn select(&mut self, track: &Track) -> Result<&str> {
        self.begin(track)?;
        self.complete()
    }

    /// Start loading `track`. The controller reports
    /// [`is_loading`](Self::is_loading) until [`complete`](Self::complete).
    pub fn begin(&mut self, track: &Track) -> Result<()> {
        self.reset();

        if !track.is_playable() {
            log::error!("Invalid track selected for playback: {track:?}");
            let message = format!(
                "Could not load player for \"{}\": the track has no identifier.",
                track.name
            );
            self.error = Some(message.clone());
            self.state = PlaybackState::Errored;
            return Err(VibeSyncError::InvalidTrack(message));
        }

        self.selected = Some(track.clone());
        self.state = PlaybackState::Loading;
        Ok(())
    }

    /// Build the embed for the track being loaded and leave the loading state.
    pub fn complete(&mut self) -> Result<&str> {
        let track = match (&self.state, &self.selected) {
            (PlaybackState::Loading, Some(track)) => track,
            _ => {
                return Err(VibeSyncError::InvalidTrack(
                    "no track is being loaded".to_string(),
                ))
            }
        };

        let markup = embed_markup(&self.embed_base, &track.id);
        log::debug!("Embedding player for '{}' ({})", track.name, track.id);

        self.state = PlaybackState::Embedded;
        Ok(self.embed_html.insert(markup).as_str())
    }

    /// Return to idle, dropping any selection, embed and error.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Idle;
        self.selected = None;
        self.embed_html = None;
        self.error = None;
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == PlaybackState::Loading
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.selected.as_ref()
    }

    pub fn embed_html(&self) -> Option<&str> {
        self.embed_html.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, name: &str) -> Track {
        Track {
            id: id.to_string(),
            name: name.to_string(),
            artist: "Artist".to_string(),
            cover_url: "/placeholder.svg".to_string(),
            album: None,
            duration_ms: 180_000,
            kind: "track".to_string(),
        }
    }

    #[test]
    fn test_embed_markup() {
        let html = embed_markup(DEFAULT_EMBED_BASE, "abc123");
        assert!(html.contains(
            "https://open.spotify.com/embed/track/abc123?utm_source=generator&autoplay=1"
        ));
        assert!(html.starts_with("<iframe"));
    }

    #[test]
    fn test_select_playable_track() {
        let mut controller = PlaybackController::default();
        let html = controller.select(&track("abc123", "Song")).unwrap().to_string();

        assert!(html.contains("embed/track/abc123"));
        assert_eq!(controller.state(), PlaybackState::Embedded);
        assert!(!controller.is_loading());
        assert_eq!(controller.selected_track().unwrap().id, "abc123");
        assert_eq!(controller.embed_html(), Some(html.as_str()));
        assert!(controller.error().is_none());
    }

    #[test]
    fn test_select_track_without_id() {
        let mut controller = PlaybackController::default();
        let result = controller.select(&track("", "Ghost Song"));

        assert!(matches!(result, Err(VibeSyncError::InvalidTrack(_))));
        assert_eq!(controller.state(), PlaybackState::Errored);
        assert!(!controller.is_loading());
        assert!(controller.embed_html().is_none());
        assert!(controller.selected_track().is_none());
        assert!(controller.error().unwrap().contains("Ghost Song"));
    }

    #[test]
    fn test_loading_is_observable_between_begin_and_complete() {
        let mut controller = PlaybackController::default();
        controller.begin(&track("abc123", "Song")).unwrap();

        assert!(controller.is_loading());
        assert_eq!(controller.state(), PlaybackState::Loading);
        assert!(controller.embed_html().is_none());

        let html = controller.complete().unwrap().to_string();
        assert!(html.contains("embed/track/abc123"));
        assert!(!controller.is_loading());
        assert_eq!(controller.state(), PlaybackState::Embedded);

        assert!(matches!(
            controller.complete(),
            Err(VibeSyncError::InvalidTrack(_))
        ));
    }

    #[test]
    fn test_begin_without_id_never_loads() {
        let mut controller = PlaybackController::default();
        assert!(controller.begin(&track("", "Ghost Song")).is_err());

        assert!(!controller.is_loading());
        assert!(controller.complete().is_err());
        assert_eq!(controller.state(), PlaybackState::Errored);
    }

    #[test]
    fn test_reselect_restarts_from_idle() {
        let mut controller = PlaybackController::default();
        let _ = controller.select(&track("", "Broken"));
        assert!(controller.error().is_some());

        controller.select(&track("xyz", "Fine")).unwrap();
        assert!(controller.error().is_none());
        assert_eq!(controller.selected_track().unwrap().name, "Fine");

        controller.reset();
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.embed_html().is_none());
    }
}
