use dotenvy::dotenv;
use spotifly::{oauth, Scope, ScopeSet};

fn main() {
    dotenv().ok();
    env_logger::init();

    let client_id = std::env::var("CLIENT_ID").expect("Spotify client ID not in environment");
    let scopes = ScopeSet::empty()
        .with(Scope::UserReadCurrentlyPlaying)
        .with(Scope::PlaylistReadPrivate)
        .with(Scope::PlaylistModifyPrivate);

    let state = oauth::generate_state();
    let url = oauth::generate_oauth_url(
        &client_id,
        "http://localhost:8888/callback",
        Some(&state),
        Some(scopes),
        true,
    );

    println!("State: {state}");
    println!("Authorize URL: {url}");
}
