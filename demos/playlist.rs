use dotenvy::dotenv;
use spotifly::{prelude::*, ClientBuilder};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let client = ClientBuilder::new(std::env::var("ACCESS_TOKEN").expect("Spotify access token not in environment"))
        .build()
        .expect("failed to build Spotify client");

    let playlist_id = std::env::args().nth(1).unwrap_or_else(|| "37i9dQZF1DXcBWIGoYBM5M".to_owned());
    let mut playlist = client.fetch_playlist(&playlist_id).await.unwrap();
    playlist.fetch_more_tracks().await.unwrap();

    println!(
        "{} by {} ({} tracks)",
        playlist,
        playlist.owner().display_name().unwrap_or(playlist.owner().id()),
        playlist.tracks().total()
    );

    for item in playlist.tracks() {
        println!("{} - {}", item.track, item.track.artists()[0].name());
    }

    // copying the playlist requires the playlist-modify-private scope
    if std::env::var("COPY_PLAYLIST").is_ok() {
        let user = client.current_user().await.unwrap();
        let copy = client
            .create_playlist(
                user.id(),
                &format!("{} (copy)", playlist.name()),
                playlist.description(),
                false,
            )
            .await
            .unwrap();

        let tracks: Vec<_> = playlist.tracks().into_iter().map(|item| &item.track).collect();
        let snapshots = client.add_tracks(copy.id(), &tracks, None).await.unwrap();

        println!("Copied into {} ({} requests)", copy.uri(), snapshots.len());
    }
}
