pub mod output;

use clap::{Args, Subcommand};
use vibesync::types::{DEFAULT_API_BASE, DEFAULT_MAX_PAGES, DEFAULT_TOKEN_URL};
use vibesync::{
    CancellationState, ClientConfig, CredentialProvider, DashboardView, PlaybackController,
    PlaylistView, StaticToken, TokenEndpoint, VibeSyncClient,
};

#[derive(Args)]
pub struct ConnectionArgs {
    /// Bearer token to use for all requests
    #[arg(long, global = true, env = "VIBESYNC_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Local endpoint answering `{ "access_token": ... }`, used when no token is given
    #[arg(long, global = true, default_value = DEFAULT_TOKEN_URL)]
    token_url: String,

    /// Provider API root
    #[arg(long, global = true, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Stop following pagination cursors after this many pages
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the greeting and the first playlists
    ///
    /// Usage examples:
    /// # Use a token from the environment
    /// VIBESYNC_ACCESS_TOKEN=BQD... vibesync dashboard
    Dashboard {
        /// Number of playlists to load
        #[arg(long, default_value = "5")]
        limit: u32,
    },

    /// Show a playlist with its complete track list
    ///
    /// Every page of the track listing is fetched before anything is shown.
    /// Press Ctrl-C to abandon a long walk.
    ///
    /// Usage examples:
    /// # List all tracks
    /// vibesync playlist 37i9dQZF1DXcBWIGoYBM5M
    ///
    /// # List tracks and print the player embed for one of them
    /// vibesync playlist 37i9dQZF1DXcBWIGoYBM5M --embed 4uLU6hMCjMI75M1A2tKUQC
    Playlist {
        /// Playlist identifier
        id: String,

        /// Track identifier to build a player embed for
        #[arg(long)]
        embed: Option<String>,
    },

    /// Print the player embed fragment for a track
    Embed {
        /// Track identifier
        track_id: String,
    },
}

pub fn build_client(
    args: &ConnectionArgs,
) -> Result<VibeSyncClient, Box<dyn std::error::Error>> {
    let config = ClientConfig::new()
        .with_api_base(args.api_base.clone())
        .with_max_pages(args.max_pages);

    let credentials: Box<dyn CredentialProvider> = match args.token.as_deref() {
        Some(token) if !token.trim().is_empty() => Box::new(StaticToken::new(token)),
        Some(_) => return Err("the provided token is empty".into()),
        None => {
            log::debug!("No token given, using endpoint {}", args.token_url);
            Box::new(TokenEndpoint::new(
                Box::new(http_client::native::NativeClient::new()),
                args.token_url.clone(),
            ))
        }
    };

    Ok(VibeSyncClient::with_config(
        Box::new(http_client::native::NativeClient::new()),
        credentials,
        config,
    ))
}

pub async fn execute_command(
    command: Commands,
    client: &VibeSyncClient,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Dashboard { limit } => {
            // Errors are surfaced here rather than silently degrading the view.
            let state = vibesync::load_dashboard(client, limit).await?;
            let mut view = DashboardView::new();
            view.apply(Ok(state));
            output::print_dashboard(&view, json)?;
        }
        Commands::Playlist { id, embed } => {
            let cancel = CancellationState::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let mut view = PlaylistView::new(client.config().embed_base.clone());
            let result = client.load_playlist_with_cancel(&id, &cancel).await;
            let failure = result.as_ref().err().map(|e| e.to_string());
            view.apply(result);

            if let Some(reason) = failure {
                return Err(format!("{}: {reason}", view.error().unwrap_or("load failed")).into());
            }

            output::print_playlist(&view, json)?;

            if let Some(track_id) = embed {
                let track = view
                    .playlist()
                    .and_then(|p| p.tracks.iter().find(|t| t.id == track_id))
                    .cloned()
                    .ok_or_else(|| format!("track {track_id} is not in this playlist"))?;
                let html = view.select_track(&track)?.to_string();
                println!("{html}");
            }
        }
        Commands::Embed { track_id } => {
            let mut controller = PlaybackController::new(client.config().embed_base.clone());
            let track = vibesync::Track {
                id: track_id,
                name: String::new(),
                artist: String::new(),
                cover_url: client.config().placeholder_cover.clone(),
                album: None,
                duration_ms: 0,
                kind: "track".to_string(),
            };
            println!("{}", controller.select(&track)?);
        }
    }

    Ok(())
}
