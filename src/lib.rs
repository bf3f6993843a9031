//! An asynchronous wrapper for the [Spotify Web API](https://developer.spotify.com/documentation/web-api).
//!
//! # Features
//!
//! - Fetching artists, albums, tracks, playlists, the current user and what they're listening to, into typed
//!   [model] objects.
//! - Creating playlists and adding tracks to them.
//! - Automatic handling of rate limits and transient server errors, and refreshing expired access tokens when refresh
//!   credentials are given.
//! - OAuth [scopes](scope) as a compact bitset, and building [authorization URLs](oauth).
//!
//! # Usage
//!
//! The library doesn't perform the OAuth flow itself; it's given an access token, and optionally a refresh token along
//! with the application's client ID and secret. See the [client] module for how to build a client.
//!
//! ```no_run
//! # async fn run() -> spotifly::Result<()> {
//! use spotifly::{prelude::*, ClientBuilder};
//!
//! let client = ClientBuilder::new("access token").build()?;
//!
//! if let Some(activity) = client.fetch_currently_playing().await? {
//!     println!("{activity}");
//! }
//!
//! let mut playlist = client.fetch_playlist("37i9dQZF1DXcBWIGoYBM5M").await?;
//! playlist.fetch_more_tracks().await?;
//!
//! println!("{} by {}", playlist, playlist.owner().id());
//! for item in playlist.tracks() {
//!     println!("{}", item.track);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Crate features
//!
//! Rate limits and server error backoff are waited out with an asynchronous sleep from either `tokio` or `async-std`,
//! selected with the `tokio_sleep` (default) and `async_std_sleep` features. With neither enabled, any request that
//! would have to wait fails with [SleepUnavailable](Error::SleepUnavailable).
//!
//! The TLS backend is selected with the `native-tls` (default) and `rustls-tls` features.

pub mod client;
pub mod error;
pub mod model;
pub mod oauth;
pub mod scope;

mod util;

pub use crate::{
    client::{AccessTokenRefresh, Client, ClientBuilder},
    error::{Error, Result},
    scope::{Scope, ScopeSet},
};

/// Contains all the traits used to access object information.
pub mod prelude {
    pub use crate::{
        client::AccessTokenRefresh,
        model::{
            artist::{CommonArtistInformation, FullArtistInformation},
            user::{CommonUserInformation, PrivateUserInformation},
        },
    };
}
