//! The Spotify Web API client.
//!
//! [Client] is the entry point to the library. It's built with a [ClientBuilder] from an access token and optionally
//! the credentials required to refresh it:
//!
//! ```no_run
//! # async fn run() -> spotifly::Result<()> {
//! use spotifly::ClientBuilder;
//!
//! let client = ClientBuilder::new("access token")
//!     .refresh_credentials("refresh token", "client ID", "client secret")
//!     .build()?;
//!
//! let track = client.fetch_track("4uLU6hMCjMI75M1A2tKUQC").await?;
//! println!("{} by {}", track, track.artists()[0]);
//! # Ok(())
//! # }
//! ```
//!
//! Every request goes through the client's [Transport], which handles rate limits, transient server errors and
//! refreshing the access token.

pub mod route;
pub mod transport;

pub(crate) mod private {
    pub trait Sealed {}
}

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use self::{
    route::API_BASE_URL,
    transport::{Transport, TransportConfig, ACCOUNTS_API_TOKEN_ENDPOINT},
};
use crate::{
    error::{Error, Result},
    model::{
        album::{Album, AlbumObject},
        artist::Artist,
        playback::{Activity, ActivityObject},
        playlist::{Playlist, PlaylistObject},
        track::{AsTrackUri, Track},
        user::User,
    },
};

const ARTIST_ENDPOINT: &str = "/artists/{id}";
const ALBUM_ENDPOINT: &str = "/albums/{id}";
const TRACK_ENDPOINT: &str = "/tracks/{id}";
const PLAYLIST_ENDPOINT: &str = "/playlists/{playlist_id}";
const PLAYLIST_TRACKS_ENDPOINT: &str = "/playlists/{playlist_id}/tracks";
const USER_PLAYLISTS_ENDPOINT: &str = "/users/{user_id}/playlists";
const CURRENT_USER_ENDPOINT: &str = "/me";
const CURRENTLY_PLAYING_ENDPOINT: &str = "/me/player/currently-playing";

/// The most tracks Spotify accepts in a single add request.
const ADD_TRACKS_BATCH_SIZE: usize = 100;

const DEFAULT_MAX_RATELIMIT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_SERVER_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Clients whose access token can be refreshed implement this trait.
#[async_trait]
pub trait AccessTokenRefresh: private::Sealed {
    /// Request a new access token from Spotify using the configured refresh token and save it internally.
    ///
    /// Fails with [MissingRefreshCredentials](Error::MissingRefreshCredentials) if no refresh credentials are
    /// configured. If refreshing fails, the current access token is kept.
    async fn refresh_access_token(&self) -> Result<()>;
}

/// A Spotify Web API client. Cloning the client is cheap; every clone shares the same transport.
#[derive(Debug, Clone)]
pub struct Client {
    transport: Transport,
}

/// Builder for [Client].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    access_token: String,
    refresh_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    max_ratelimit_timeout: Duration,
    server_error_backoff: Duration,
    http_client: Option<reqwest::Client>,
    api_base_url: String,
    token_endpoint: String,
}

#[derive(Debug, Serialize)]
struct CreatePlaylistBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    public: bool,
}

#[derive(Debug, Serialize)]
struct AddTracksBody<'a> {
    uris: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    snapshot_id: String,
}

impl ClientBuilder {
    pub fn new<S>(access_token: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            client_id: None,
            client_secret: None,
            max_ratelimit_timeout: DEFAULT_MAX_RATELIMIT_TIMEOUT,
            server_error_backoff: DEFAULT_SERVER_ERROR_BACKOFF,
            http_client: None,
            api_base_url: API_BASE_URL.to_owned(),
            token_endpoint: ACCOUNTS_API_TOKEN_ENDPOINT.to_owned(),
        }
    }

    /// Sets the refresh token, client ID and client secret used to refresh the access token once it expires.
    pub fn refresh_credentials<R, I, S>(self, refresh_token: R, client_id: I, client_secret: S) -> Self
    where
        R: Into<String>,
        I: Into<String>,
        S: Into<String>,
    {
        self.refresh_token(refresh_token)
            .client_id(client_id)
            .client_secret(client_secret)
    }

    /// Sets the refresh token. The client ID and client secret must be set as well.
    pub fn refresh_token<S>(self, refresh_token: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            refresh_token: Some(refresh_token.into()),
            ..self
        }
    }

    /// Sets the client ID. The refresh token and client secret must be set as well.
    pub fn client_id<S>(self, client_id: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            client_id: Some(client_id.into()),
            ..self
        }
    }

    /// Sets the client secret. The refresh token and client ID must be set as well.
    pub fn client_secret<S>(self, client_secret: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            client_secret: Some(client_secret.into()),
            ..self
        }
    }

    /// The longest `Retry-After` the client is willing to wait out when rate limited. Rate limits longer than this fail
    /// with [RateLimited](Error::RateLimited). Defaults to 30 seconds.
    pub fn max_ratelimit_timeout(self, max_ratelimit_timeout: Duration) -> Self {
        Self {
            max_ratelimit_timeout,
            ..self
        }
    }

    /// The base unit of the backoff between retries of transient server errors. The `n`th retry waits
    /// `unit * (2n - 1)`. Defaults to one second.
    pub fn server_error_backoff(self, server_error_backoff: Duration) -> Self {
        Self {
            server_error_backoff,
            ..self
        }
    }

    /// Use an existing HTTP client instead of creating one when the first request is made.
    pub fn http_client(self, http_client: reqwest::Client) -> Self {
        Self {
            http_client: Some(http_client),
            ..self
        }
    }

    /// Override the Web API base URL. Defaults to `https://api.spotify.com/v1`.
    pub fn api_base_url<S>(self, api_base_url: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            api_base_url: api_base_url.into(),
            ..self
        }
    }

    /// Override the token endpoint used to refresh access tokens. Defaults to `https://accounts.spotify.com/api/token`.
    pub fn token_endpoint<S>(self, token_endpoint: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            token_endpoint: token_endpoint.into(),
            ..self
        }
    }

    /// Builds the client. Fails with [IncompleteRefreshCredentials](Error::IncompleteRefreshCredentials) if only some
    /// of the refresh token, client ID and client secret were given.
    pub fn build(self) -> Result<Client> {
        let refresh = match (self.refresh_token, self.client_id, self.client_secret) {
            (Some(refresh_token), Some(client_id), Some(client_secret)) => {
                Some((refresh_token, client_id, client_secret))
            }
            (None, None, None) => None,
            _ => return Err(Error::IncompleteRefreshCredentials),
        };

        Ok(Client {
            transport: Transport::new(TransportConfig {
                access_token: self.access_token,
                refresh,
                max_ratelimit_timeout: self.max_ratelimit_timeout,
                server_error_backoff: self.server_error_backoff,
                http_client: self.http_client,
                api_base_url: self.api_base_url,
                token_endpoint: self.token_endpoint,
            }),
        })
    }
}

impl Client {
    /// Get Spotify catalog information for a single artist.
    pub async fn fetch_artist(&self, id: &str) -> Result<Artist> {
        let route = self.transport.route(Method::GET, ARTIST_ENDPOINT, &[("id", id.into())])?;
        self.transport.request(&route).await?.json()
    }

    /// Get Spotify catalog information for a single album.
    ///
    /// An album with a malformed release date fails with [Conversion](Error::Conversion).
    pub async fn fetch_album(&self, id: &str) -> Result<Album> {
        let route = self.transport.route(Method::GET, ALBUM_ENDPOINT, &[("id", id.into())])?;
        let obj: AlbumObject = self.transport.request(&route).await?.json()?;

        Ok(Album::try_from(obj)?)
    }

    /// Get Spotify catalog information for a single track.
    pub async fn fetch_track(&self, id: &str) -> Result<Track> {
        let route = self.transport.route(Method::GET, TRACK_ENDPOINT, &[("id", id.into())])?;
        self.transport.request(&route).await?.json()
    }

    /// Get a playlist along with its first page of items. Use [Playlist::fetch_more_tracks] to fetch the rest of them.
    pub async fn fetch_playlist(&self, id: &str) -> Result<Playlist> {
        let route = self
            .transport
            .route(Method::GET, PLAYLIST_ENDPOINT, &[("playlist_id", id.into())])?;

        let obj: PlaylistObject = self.transport.request(&route).await?.json()?;
        Ok(Playlist::new(obj, self.transport.handle()))
    }

    /// Get what the current user is listening to. Returns `None` if nothing is playing.
    ///
    /// Requires the [UserReadCurrentlyPlaying](crate::scope::Scope::UserReadCurrentlyPlaying) scope.
    pub async fn fetch_currently_playing(&self) -> Result<Option<Activity>> {
        let route = self.transport.route(Method::GET, CURRENTLY_PLAYING_ENDPOINT, &[])?;
        let body = self.transport.request(&route).await?;

        if body.is_empty() {
            debug!("Nothing is currently playing");
            return Ok(None);
        }

        let obj: ActivityObject = body.json()?;
        Activity::try_from(obj).map(Some)
    }

    /// Get the current user's profile.
    pub async fn current_user(&self) -> Result<User> {
        let route = self.transport.route(Method::GET, CURRENT_USER_ENDPOINT, &[])?;
        self.transport.request(&route).await?.json()
    }

    /// Create an empty playlist for the given user. The user must be the current user.
    ///
    /// Creating a public playlist requires the [PlaylistModifyPublic](crate::scope::Scope::PlaylistModifyPublic)
    /// scope and a private one the [PlaylistModifyPrivate](crate::scope::Scope::PlaylistModifyPrivate) scope.
    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
        public: bool,
    ) -> Result<Playlist> {
        let route = self
            .transport
            .route(Method::POST, USER_PLAYLISTS_ENDPOINT, &[("user_id", user_id.into())])?;

        let body = CreatePlaylistBody {
            name,
            description,
            public,
        };

        let obj: PlaylistObject = self.transport.request_with_body(&route, &body).await?.json()?;
        let playlist = Playlist::new(obj, self.transport.handle());
        debug!("Created playlist {} for user {}", playlist.id(), user_id);

        Ok(playlist)
    }

    /// Add tracks to a playlist, optionally inserting them at the given zero-based position. Returns the playlist's
    /// snapshot IDs after each request.
    ///
    /// Spotify accepts at most 100 tracks per request so the tracks are sent in batches of 100, sequentially and in
    /// order. With a position, each batch is inserted after the ones before it so the tracks end up in the given order.
    ///
    /// Adding tracks is not transactional. If a batch fails, the batches before it stay in the playlist.
    pub async fn add_tracks<T>(&self, playlist_id: &str, tracks: &[T], position: Option<usize>) -> Result<Vec<String>>
    where
        T: AsTrackUri,
    {
        let route = self
            .transport
            .route(Method::POST, PLAYLIST_TRACKS_ENDPOINT, &[("playlist_id", playlist_id.into())])?;

        let mut snapshot_ids = Vec::new();

        for (index, batch) in tracks.chunks(ADD_TRACKS_BATCH_SIZE).enumerate() {
            let added = index * ADD_TRACKS_BATCH_SIZE;
            debug!(
                "Adding tracks {}..{} of {} to playlist {}",
                added,
                added + batch.len(),
                tracks.len(),
                playlist_id
            );

            let body = AddTracksBody {
                uris: batch.iter().map(|track| track.as_track_uri()).collect(),
                position: position.map(|position| position + added),
            };

            let response: SnapshotResponse = self.transport.request_with_body(&route, &body).await?.json()?;
            snapshot_ids.push(response.snapshot_id);
        }

        Ok(snapshot_ids)
    }

    /// The current access token. Store it to reuse it later; it may change as the client refreshes it.
    pub fn access_token(&self) -> String {
        self.transport.access_token()
    }

    /// The current refresh token, if the client has refresh credentials.
    pub fn refresh_token(&self) -> Option<String> {
        self.transport.refresh_token()
    }

    /// The transport this client sends its requests through.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Closes the client's HTTP session. Requests made afterwards fail with [TransportClosed](Error::TransportClosed).
    /// Closing an already closed client does nothing.
    pub fn close(&self) {
        self.transport.close();
    }
}

impl private::Sealed for Client {}

#[async_trait]
impl AccessTokenRefresh for Client {
    async fn refresh_access_token(&self) -> Result<()> {
        self.transport.refresh_access_token().await
    }
}
