use crate::api::{
    parse_playlist_response, parse_playlists_response, parse_profile_response,
    parse_tracks_page_response,
};
use crate::cancel::{run_with_cancel, CancellationState};
use crate::credentials::CredentialProvider;
use crate::headers::add_api_headers;
use crate::iterator::PlaylistTracksIterator;
use crate::r#trait::StreamingClient;
use crate::types::{
    AccessToken, ClientConfig, ClientEvent, ClientEventReceiver, ClientEventWatcher,
    DashboardState, PlaylistDetail, PlaylistSummary, RequestInfo, SharedEventBroadcaster, Track,
    TrackPage, UserProfile, VibeSyncError,
};
use crate::{playlist, session, Result};
use async_trait::async_trait;
use chrono::Utc;
use http_client::{HttpClient, Request, Response};
use http_types::{Method, Url};
use std::sync::Arc;

/// Main client for the streaming provider's REST API.
///
/// The client is cheap to clone; clones share the HTTP client, the credential
/// provider and the event broadcaster.
///
/// # Examples
///
/// ```rust,no_run
/// use vibesync::{StaticToken, VibeSyncClient, Result};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let client = VibeSyncClient::new(
///         Box::new(http_client::native::NativeClient::new()),
///         Box::new(StaticToken::new("BQD...")),
///     );
///
///     let dashboard = client.load_dashboard().await?;
///     println!("Welcome back, {}", dashboard.profile.name());
///
///     for summary in &dashboard.playlists {
///         let playlist = client.load_playlist(&summary.id).await?;
///         println!("{}: {} tracks", playlist.name, playlist.tracks.len());
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct VibeSyncClient {
    client: Arc<dyn HttpClient + Send + Sync>,
    credentials: Arc<dyn CredentialProvider>,
    config: ClientConfig,
    broadcaster: Arc<SharedEventBroadcaster>,
}

impl VibeSyncClient {
    /// Create a new [`VibeSyncClient`] with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `client` - Any HTTP client implementation that implements [`HttpClient`]
    /// * `credentials` - Where bearer tokens come from
    pub fn new(
        client: Box<dyn HttpClient + Send + Sync>,
        credentials: Box<dyn CredentialProvider>,
    ) -> Self {
        Self::with_config(client, credentials, ClientConfig::default())
    }

    /// Create a new [`VibeSyncClient`] with a custom configuration.
    pub fn with_config(
        client: Box<dyn HttpClient + Send + Sync>,
        credentials: Box<dyn CredentialProvider>,
        config: ClientConfig,
    ) -> Self {
        Self {
            client: Arc::from(client),
            credentials: Arc::from(credentials),
            config,
            broadcaster: Arc::new(SharedEventBroadcaster::new()),
        }
    }

    /// Create a client that reuses this client's event broadcaster.
    pub fn with_shared_broadcaster(
        &self,
        client: Box<dyn HttpClient + Send + Sync>,
        credentials: Box<dyn CredentialProvider>,
    ) -> Self {
        Self {
            client: Arc::from(client),
            credentials: Arc::from(credentials),
            config: self.config.clone(),
            broadcaster: self.broadcaster.clone(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Subscribe to request and pagination events.
    pub fn subscribe(&self) -> ClientEventReceiver {
        self.broadcaster.subscribe()
    }

    /// Watch the most recent event.
    pub fn watch_events(&self) -> ClientEventWatcher {
        self.broadcaster.watch()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.broadcaster.latest_event()
    }

    /// Load the profile and the first playlists for the dashboard.
    pub async fn load_dashboard(&self) -> Result<DashboardState> {
        session::load_dashboard(self, self.config.playlist_limit).await
    }

    /// Load a playlist's metadata together with all of its tracks.
    pub async fn load_playlist(&self, playlist_id: &str) -> Result<PlaylistDetail> {
        playlist::load_playlist(self, playlist_id, self.config.max_pages, None).await
    }

    /// Like [`load_playlist`](Self::load_playlist), but stops as soon as
    /// `cancel` is triggered.
    ///
    /// ```rust,no_run
    /// # use vibesync::{CancellationState, StaticToken, VibeSyncClient};
    /// # tokio_test::block_on(async {
    /// let client = VibeSyncClient::new(
    ///     Box::new(http_client::native::NativeClient::new()),
    ///     Box::new(StaticToken::new("BQD...")),
    /// );
    /// let cancel = CancellationState::new();
    /// let on_close = cancel.clone();
    /// tokio::spawn(async move {
    ///     tokio::signal::ctrl_c().await.ok();
    ///     on_close.cancel();
    /// });
    /// let playlist = client.load_playlist_with_cancel("37i9dQZF1DXcBWIGoYBM5M", &cancel).await?;
    /// # Ok::<(), vibesync::VibeSyncError>(())
    /// # });
    /// ```
    pub async fn load_playlist_with_cancel(
        &self,
        playlist_id: &str,
        cancel: &CancellationState,
    ) -> Result<PlaylistDetail> {
        playlist::load_playlist(self, playlist_id, self.config.max_pages, Some(cancel)).await
    }

    /// Retrieve every track reachable from `first_page_url` in cursor order.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use vibesync::{StaticToken, VibeSyncClient};
    /// # tokio_test::block_on(async {
    /// let client = VibeSyncClient::new(
    ///     Box::new(http_client::native::NativeClient::new()),
    ///     Box::new(StaticToken::new("BQD...")),
    /// );
    /// let url = client.config().playlist_tracks_url("37i9dQZF1DXcBWIGoYBM5M");
    /// let tracks = client.fetch_all_tracks(&url).await?;
    /// println!("{} tracks", tracks.len());
    /// # Ok::<(), vibesync::VibeSyncError>(())
    /// # });
    /// ```
    pub async fn fetch_all_tracks(&self, first_page_url: &str) -> Result<Vec<Track>> {
        let token = self.access_token().await?;
        crate::iterator::fetch_all_tracks(self, &token, first_page_url, self.config.max_pages, None)
            .await
    }

    /// Cancellable variant of [`fetch_all_tracks`](Self::fetch_all_tracks).
    pub async fn fetch_all_tracks_with_cancel(
        &self,
        first_page_url: &str,
        cancel: &CancellationState,
    ) -> Result<Vec<Track>> {
        let token = run_with_cancel(cancel.subscribe(), self.access_token()).await?;
        crate::iterator::fetch_all_tracks(
            self,
            &token,
            first_page_url,
            self.config.max_pages,
            Some(cancel),
        )
        .await
    }

    /// Create an iterator over a playlist's tracks.
    pub fn playlist_tracks(
        &self,
        token: AccessToken,
        playlist_id: &str,
    ) -> PlaylistTracksIterator<'_, Self> {
        PlaylistTracksIterator::new(self, token, self.config.playlist_tracks_url(playlist_id))
            .with_max_pages(self.config.max_pages)
    }

    /// Make an authenticated GET request.
    ///
    /// The response is returned whatever its status; callers decide which
    /// error a non-success status maps to. A 429 is reported as an event here.
    async fn get(&self, token: &AccessToken, url: &str) -> Result<Response> {
        let parsed = url
            .parse::<Url>()
            .map_err(|e| VibeSyncError::Http(format!("invalid URL {url}: {e}")))?;

        let request_info = RequestInfo::from_url_and_method(url, "GET");
        let request_start = std::time::Instant::now();

        self.broadcaster.broadcast_event(ClientEvent::RequestStarted {
            request: request_info.clone(),
            timestamp: Utc::now(),
        });

        let mut request = Request::new(Method::Get, parsed);
        add_api_headers(&mut request, token);

        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| VibeSyncError::Http(e.to_string()))?;

        let status_code: u16 = response.status().into();
        log::debug!(
            "{} -> {} in {}ms",
            request_info.short_description(),
            status_code,
            request_start.elapsed().as_millis()
        );

        self.broadcaster
            .broadcast_event(ClientEvent::RequestCompleted {
                request: request_info.clone(),
                status_code,
                duration_ms: request_start.elapsed().as_millis() as u64,
                timestamp: Utc::now(),
            });

        if status_code == 429 {
            let retry_after = retry_after_seconds(&response);
            log::warn!("Rate limited on {url}, provider asks to wait {retry_after}s");
            self.broadcaster.broadcast_event(ClientEvent::RateLimited {
                retry_after,
                request: request_info,
                timestamp: Utc::now(),
            });
        }

        Ok(response)
    }

    /// GET a resource and return its body, mapping failures for `resource`.
    async fn get_resource(
        &self,
        token: &AccessToken,
        url: &str,
        resource: &'static str,
    ) -> Result<String> {
        let mut response = self.get(token, url).await?;
        let status_code: u16 = response.status().into();

        if response.status().is_success() {
            return read_body(&mut response).await;
        }

        if resource == "playlists" {
            let payload = read_body(&mut response)
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            log::error!("Provider API error while fetching playlists: {payload}");
        }

        if status_code == 429 {
            return Err(VibeSyncError::RateLimit {
                retry_after: retry_after_seconds(&response),
            });
        }

        Err(VibeSyncError::UpstreamStatus {
            resource,
            status: status_code,
            url: url.to_string(),
        })
    }
}

#[async_trait(?Send)]
impl StreamingClient for VibeSyncClient {
    async fn access_token(&self) -> Result<AccessToken> {
        let token = self.credentials.access_token().await?;
        if token.is_empty() {
            return Err(VibeSyncError::MissingCredential(
                "credential provider returned an empty token".to_string(),
            ));
        }
        Ok(token)
    }

    async fn get_profile(&self, token: &AccessToken) -> Result<UserProfile> {
        let url = self.config.profile_url();
        let body = self.get_resource(token, &url, "profile").await?;
        parse_profile_response(&body)
    }

    async fn get_playlists(
        &self,
        token: &AccessToken,
        limit: u32,
    ) -> Result<Vec<PlaylistSummary>> {
        let url = self.config.playlists_url(limit);
        let body = self.get_resource(token, &url, "playlists").await?;
        parse_playlists_response(&body, &self.config.placeholder_cover)
    }

    async fn get_playlist(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> Result<PlaylistSummary> {
        let url = self.config.playlist_url(playlist_id);
        let body = self.get_resource(token, &url, "playlist").await?;
        parse_playlist_response(&body, &self.config.placeholder_cover)
    }

    async fn get_tracks_page(
        &self,
        token: &AccessToken,
        url: &str,
        page_number: u32,
    ) -> Result<TrackPage> {
        let mut response = self.get(token, url).await?;

        if !response.status().is_success() {
            return Err(VibeSyncError::TrackFetchFailed {
                status: response.status().into(),
                url: url.to_string(),
            });
        }

        let body = read_body(&mut response).await?;
        let page = parse_tracks_page_response(&body, page_number, &self.config.placeholder_cover)?;

        self.broadcaster.broadcast_event(ClientEvent::PageFetched {
            page_number,
            item_count: page.tracks.len(),
            has_next: page.has_next_page(),
            timestamp: Utc::now(),
        });

        Ok(page)
    }

    fn playlist_tracks_url(&self, playlist_id: &str) -> String {
        self.config.playlist_tracks_url(playlist_id)
    }
}

async fn read_body(response: &mut Response) -> Result<String> {
    response
        .body_string()
        .await
        .map_err(|e| VibeSyncError::Http(e.to_string()))
}

fn retry_after_seconds(response: &Response) -> u64 {
    response
        .header("retry-after")
        .and_then(|values| values.last().as_str().trim().parse::<u64>().ok())
        .unwrap_or(60)
}
