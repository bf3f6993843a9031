use dotenvy::dotenv;
use spotifly::{prelude::*, ClientBuilder};

fn client_from_env() -> spotifly::Client {
    let access_token = std::env::var("ACCESS_TOKEN").expect("Spotify access token not in environment");
    let builder = ClientBuilder::new(access_token);

    // refreshing the access token is optional, but without it the client stops working once the token expires
    let builder = match (
        std::env::var("REFRESH_TOKEN"),
        std::env::var("CLIENT_ID"),
        std::env::var("CLIENT_SECRET"),
    ) {
        (Ok(refresh_token), Ok(client_id), Ok(client_secret)) => {
            builder.refresh_credentials(refresh_token, client_id, client_secret)
        }
        _ => builder,
    };

    builder.build().expect("failed to build Spotify client")
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let client = client_from_env();

    match client.fetch_currently_playing().await.unwrap() {
        Some(activity) => {
            println!("{activity}");

            if let Some(track) = activity.item() {
                println!(
                    "{} - {} ({})",
                    track.name(),
                    track.artists().first().map(|artist| artist.name()).unwrap_or_default(),
                    track.album().name()
                );
            }
        }
        None => println!("Not listening to anything"),
    }

    // store the possibly refreshed tokens to reuse them next time
    println!("Access token: {}", client.access_token());
    if let Some(refresh_token) = client.refresh_token() {
        println!("Refresh token: {refresh_token}");
    }
}
