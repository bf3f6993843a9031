#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use spotifly::{Client, ClientBuilder};
use wiremock::MockServer;

pub const ACCESS_TOKEN: &str = "old-access-token";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A client pointed at the mock server, without refresh credentials.
pub fn builder(server: &MockServer) -> ClientBuilder {
    ClientBuilder::new(ACCESS_TOKEN)
        .api_base_url(server.uri())
        .token_endpoint(format!("{}/api/token", server.uri()))
        .server_error_backoff(Duration::from_millis(10))
        .max_ratelimit_timeout(Duration::from_secs(1))
}

pub fn client(server: &MockServer) -> Client {
    builder(server).build().unwrap()
}

pub fn refreshing_client(server: &MockServer) -> Client {
    builder(server)
        .refresh_credentials("refresh-token", "client-id", "client-secret")
        .build()
        .unwrap()
}

pub fn artist_payload(id: &str, name: &str) -> Value {
    json!({
        "external_urls": { "spotify": format!("https://open.spotify.com/artist/{id}") },
        "href": format!("https://api.spotify.com/v1/artists/{id}"),
        "id": id,
        "name": name,
        "type": "artist",
        "uri": format!("spotify:artist:{id}")
    })
}

pub fn album_payload() -> Value {
    json!({
        "album_type": "single",
        "artists": [artist_payload("2jzc5TC5TVFLXQlBNiIUzE", "a-ha")],
        "available_markets": ["FI"],
        "external_urls": { "spotify": "https://open.spotify.com/album/2WfaOiMkCvy7F5fcp2zZ8L" },
        "href": "https://api.spotify.com/v1/albums/2WfaOiMkCvy7F5fcp2zZ8L",
        "id": "2WfaOiMkCvy7F5fcp2zZ8L",
        "images": [],
        "name": "Hunting High and Low",
        "release_date": "1985",
        "release_date_precision": "year",
        "total_tracks": 10,
        "type": "album",
        "uri": "spotify:album:2WfaOiMkCvy7F5fcp2zZ8L"
    })
}

pub fn track_payload(id: &str) -> Value {
    json!({
        "album": album_payload(),
        "artists": [artist_payload("2jzc5TC5TVFLXQlBNiIUzE", "a-ha")],
        "disc_number": 1,
        "duration_ms": 225280,
        "explicit": false,
        "external_ids": { "isrc": "GBAYE8500017" },
        "external_urls": { "spotify": format!("https://open.spotify.com/track/{id}") },
        "href": format!("https://api.spotify.com/v1/tracks/{id}"),
        "id": id,
        "is_local": false,
        "name": "Take on Me",
        "popularity": 84,
        "preview_url": null,
        "track_number": 1,
        "type": "track",
        "uri": format!("spotify:track:{id}")
    })
}

pub fn user_payload(id: &str) -> Value {
    json!({
        "display_name": "Smedjan",
        "external_urls": { "spotify": format!("https://open.spotify.com/user/{id}") },
        "href": format!("https://api.spotify.com/v1/users/{id}"),
        "id": id,
        "type": "user",
        "uri": format!("spotify:user:{id}")
    })
}

pub fn playlist_item_payload(track_id: &str) -> Value {
    json!({
        "added_at": "2022-11-01T14:06:30Z",
        "added_by": user_payload("smedjan"),
        "is_local": false,
        "primary_color": null,
        "track": track_payload(track_id),
        "video_thumbnail": { "url": null }
    })
}

pub fn playlist_tracks_payload(ids: &[&str], offset: u32, total: u32, next: Option<String>) -> Value {
    json!({
        "href": "https://api.spotify.com/v1/playlists/pl/tracks",
        "items": ids.iter().map(|id| playlist_item_payload(id)).collect::<Vec<_>>(),
        "limit": 2,
        "next": next,
        "offset": offset,
        "previous": null,
        "total": total
    })
}

pub fn playlist_payload(id: &str, tracks: Value) -> Value {
    json!({
        "collaborative": false,
        "description": "Songs to test with",
        "external_urls": { "spotify": format!("https://open.spotify.com/playlist/{id}") },
        "followers": { "href": null, "total": 3 },
        "href": format!("https://api.spotify.com/v1/playlists/{id}"),
        "id": id,
        "images": [],
        "name": "Test playlist",
        "owner": user_payload("smedjan"),
        "public": true,
        "snapshot_id": "MSw0NjMxMTI1OTc",
        "tracks": tracks,
        "type": "playlist",
        "uri": format!("spotify:playlist:{id}")
    })
}

pub fn api_error(status: u16, message: &str) -> Value {
    json!({ "error": { "status": status, "message": message } })
}
