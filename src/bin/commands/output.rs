use vibesync::{format_duration, DashboardView, PlaylistView};

pub fn print_dashboard(
    view: &DashboardView,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let value = serde_json::json!({
            "username": view.username(),
            "playlists": view.playlists(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("🎵 {}", view.greeting());
    println!();

    if view.playlists().is_empty() {
        println!("No playlists found.");
        return Ok(());
    }

    println!("Your playlists:");
    for playlist in view.playlists() {
        println!("  [{}] {}", playlist.id, playlist.name);
        println!("      {}", playlist.description);
    }

    Ok(())
}

pub fn print_playlist(view: &PlaylistView, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let Some(playlist) = view.playlist() else {
        println!("No playlist data found.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(playlist)?);
        return Ok(());
    }

    println!("📀 {}", playlist.name);
    println!("   {}", playlist.description);
    println!(
        "   {} tracks, {}",
        playlist.tracks.len(),
        format_duration(playlist.total_duration_ms())
    );
    println!();

    for (index, track) in view.visible_tracks().enumerate() {
        let album = track.album.as_deref().unwrap_or("");
        println!(
            "{:>4}. {} - {} [{}] {}",
            index + 1,
            track.name,
            track.artist,
            album,
            track.formatted_duration()
        );
    }

    Ok(())
}
