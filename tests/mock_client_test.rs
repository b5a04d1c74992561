#[cfg(feature = "mock")]
mod mock_tests {
    use mockall::predicate::*;
    use mockall::Sequence;
    use vibesync::{
        fetch_all_tracks, load_dashboard, load_playlist, AccessToken, MockStreamingClient,
        PlaylistSummary, Result, StreamingClient, Track, TrackPage, UserProfile, VibeSyncError,
    };

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Song {id}"),
            artist: "Artist".to_string(),
            cover_url: "/placeholder.svg".to_string(),
            album: None,
            duration_ms: 1000,
            kind: "track".to_string(),
        }
    }

    fn page(page_number: u32, ids: &[&str], next: Option<&str>) -> TrackPage {
        TrackPage {
            tracks: ids.iter().map(|id| track(id)).collect(),
            page_number,
            next: next.map(str::to_string),
            total: None,
            limit: None,
        }
    }

    fn summary(id: &str) -> PlaylistSummary {
        PlaylistSummary {
            id: id.to_string(),
            name: "Mix".to_string(),
            description: "No description".to_string(),
            cover_url: "/placeholder.svg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_dashboard_threads_one_token() -> Result<()> {
        let mut mock_client = MockStreamingClient::new();

        mock_client
            .expect_access_token()
            .times(1)
            .returning(|| Ok(AccessToken::new("tok1")));

        mock_client
            .expect_get_profile()
            .with(eq(AccessToken::new("tok1")))
            .times(1)
            .returning(|_| {
                Ok(UserProfile {
                    id: "u1".to_string(),
                    display_name: Some("Ana".to_string()),
                })
            });

        mock_client
            .expect_get_playlists()
            .with(eq(AccessToken::new("tok1")), eq(5))
            .times(1)
            .returning(|_, _| Ok(vec![summary("pl1")]));

        let client: &dyn StreamingClient = &mock_client;
        let state = load_dashboard(client, 5).await?;

        assert_eq!(state.profile.name(), "Ana");
        assert_eq!(state.playlists.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_mock_missing_credential_stops_load() {
        let mut mock_client = MockStreamingClient::new();

        mock_client
            .expect_access_token()
            .times(1)
            .returning(|| Err(VibeSyncError::MissingCredential("none".to_string())));
        mock_client.expect_get_profile().never();
        mock_client.expect_get_playlists().never();

        let result = load_dashboard(&mock_client, 5).await;
        assert!(matches!(result, Err(VibeSyncError::MissingCredential(_))));
    }

    #[tokio::test]
    async fn test_mock_pages_follow_cursor_in_order() -> Result<()> {
        let mut mock_client = MockStreamingClient::new();
        let mut seq = Sequence::new();

        mock_client
            .expect_get_tracks_page()
            .with(always(), eq("page-1"), eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, n| Ok(page(n, &["a", "b"], Some("page-2"))));

        mock_client
            .expect_get_tracks_page()
            .with(always(), eq("page-2"), eq(2))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, n| Ok(page(n, &["c"], None)));

        let token = AccessToken::new("tok1");
        let tracks = fetch_all_tracks(&mock_client, &token, "page-1", 10, None).await?;

        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_mock_detail_failure_skips_tracks() {
        let mut mock_client = MockStreamingClient::new();

        mock_client
            .expect_access_token()
            .returning(|| Ok(AccessToken::new("tok1")));
        mock_client
            .expect_get_playlist()
            .with(always(), eq("pl1"))
            .times(1)
            .returning(|_, _| {
                Err(VibeSyncError::UpstreamStatus {
                    resource: "playlist",
                    status: 404,
                    url: "https://api.test/v1/playlists/pl1".to_string(),
                })
            });
        mock_client.expect_get_tracks_page().never();

        let result = load_playlist(&mock_client, "pl1", 10, None).await;
        assert!(matches!(
            result,
            Err(VibeSyncError::UpstreamStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_mock_load_playlist() -> Result<()> {
        let mut mock_client = MockStreamingClient::new();

        mock_client
            .expect_access_token()
            .times(1)
            .returning(|| Ok(AccessToken::new("tok1")));
        mock_client
            .expect_get_playlist()
            .times(1)
            .returning(|_, id| Ok(summary(id)));
        mock_client
            .expect_playlist_tracks_url()
            .with(eq("pl1"))
            .returning(|id| format!("first-{id}"));
        mock_client
            .expect_get_tracks_page()
            .with(eq(AccessToken::new("tok1")), eq("first-pl1"), eq(1))
            .times(1)
            .returning(|_, _, n| Ok(page(n, &["x", "y"], None)));

        let playlist = load_playlist(&mock_client, "pl1", 10, None).await?;

        assert_eq!(playlist.id, "pl1");
        assert_eq!(playlist.tracks.len(), 2);
        assert_eq!(playlist.total_duration_ms(), 2000);

        Ok(())
    }
}
