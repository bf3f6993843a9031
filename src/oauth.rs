//! Building authorization URLs for Spotify's authorization code flow.
//!
//! The user is sent to the authorization URL, where Spotify asks them to grant the application the requested scopes.
//! Afterwards Spotify redirects them to the redirect URI with an authorization code and the given state in the query
//! parameters. Exchanging the code for tokens is left to the application.
//!
//! ```
//! # use spotifly::{oauth::{self, AuthorizeUrlBuilder}, scope::{Scope, ScopeSet}};
//! let state = oauth::generate_state();
//!
//! let url = AuthorizeUrlBuilder::new("client-id", "http://localhost:8888/callback")
//!     .state(&state)
//!     .scopes(ScopeSet::from(Scope::UserReadCurrentlyPlaying))
//!     .build();
//!
//! assert!(url.starts_with("https://accounts.spotify.com/authorize?response_type=code&client_id=client-id"));
//! assert!(url.contains("scope=user-read-currently-playing"));
//! ```

use rand::{distributions::Alphanumeric, Rng};
use reqwest::Url;

use crate::scope::ScopeSet;

/// Spotify's authorization endpoint.
pub const ACCOUNTS_AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/authorize";

const RANDOM_STATE_LENGTH: usize = 16;

/// Builder for an authorization URL.
#[derive(Debug, Clone)]
pub struct AuthorizeUrlBuilder {
    client_id: String,
    redirect_uri: String,
    state: Option<String>,
    scopes: Option<ScopeSet>,
    show_dialog: bool,
}

impl AuthorizeUrlBuilder {
    /// The redirect URI must match one of the redirect URIs registered for the application.
    pub fn new<I, R>(client_id: I, redirect_uri: R) -> Self
    where
        I: Into<String>,
        R: Into<String>,
    {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            state: None,
            scopes: None,
            show_dialog: false,
        }
    }

    /// A value that is passed back in the redirect, used to match the redirect to the request. See
    /// [generate_state].
    pub fn state<S>(self, state: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            state: Some(state.into()),
            ..self
        }
    }

    /// The scopes to request. Without scopes, only publicly available information is accessible.
    pub fn scopes(self, scopes: ScopeSet) -> Self {
        Self {
            scopes: Some(scopes),
            ..self
        }
    }

    /// Whether to ask the user to approve the application again even if they already have.
    pub fn show_dialog(self, show_dialog: bool) -> Self {
        Self { show_dialog, ..self }
    }

    pub fn build(self) -> String {
        let scopes = self
            .scopes
            .filter(|scopes| !scopes.is_empty())
            .map(ScopeSet::to_scopes_string);

        let mut query_params = vec![
            ("response_type", "code"),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        if let Some(state) = &self.state {
            query_params.push(("state", state.as_str()));
        }

        if let Some(scopes) = &scopes {
            query_params.push(("scope", scopes.as_str()));
        }

        if self.show_dialog {
            query_params.push(("show_dialog", "true"));
        }

        // parsing the URL fails only if the base URL is invalid, not the parameters. the base URL is a constant that is
        // known to be valid
        Url::parse_with_params(ACCOUNTS_AUTHORIZE_ENDPOINT, &query_params)
            .expect("failed to build authorize URL: invalid base URL (this is likely a bug)")
            .into()
    }
}

/// Builds an authorization URL. Shorthand for [AuthorizeUrlBuilder].
pub fn generate_oauth_url(
    client_id: &str,
    redirect_uri: &str,
    state: Option<&str>,
    scopes: Option<ScopeSet>,
    show_dialog: bool,
) -> String {
    let mut builder = AuthorizeUrlBuilder::new(client_id, redirect_uri).show_dialog(show_dialog);

    if let Some(state) = state {
        builder = builder.state(state);
    }

    if let Some(scopes) = scopes {
        builder = builder.scopes(scopes);
    }

    builder.build()
}

/// Generates a random 16-character alphanumeric state value.
pub fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_STATE_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;

    #[test]
    fn minimal_url() {
        let url = AuthorizeUrlBuilder::new("abc", "http://localhost/callback").build();

        assert_eq!(
            url,
            concat!(
                "https://accounts.spotify.com/authorize?response_type=code&client_id=abc",
                "&redirect_uri=http%3A%2F%2Flocalhost%2Fcallback"
            )
        );
    }

    #[test]
    fn full_url() {
        let scopes = ScopeSet::empty()
            .with(Scope::UserReadEmail)
            .with(Scope::PlaylistModifyPublic);

        let url = generate_oauth_url("abc", "http://localhost/callback", Some("xyz"), Some(scopes), true);
        let url = Url::parse(&url).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(
            params,
            [
                ("response_type".to_owned(), "code".to_owned()),
                ("client_id".to_owned(), "abc".to_owned()),
                ("redirect_uri".to_owned(), "http://localhost/callback".to_owned()),
                ("state".to_owned(), "xyz".to_owned()),
                ("scope".to_owned(), "playlist-modify-public user-read-email".to_owned()),
                ("show_dialog".to_owned(), "true".to_owned()),
            ]
        );
    }

    #[test]
    fn empty_scopes_are_left_out() {
        let url = AuthorizeUrlBuilder::new("abc", "http://localhost/callback")
            .scopes(ScopeSet::empty())
            .build();

        assert!(!url.contains("scope="));
    }

    #[test]
    fn random_state() {
        let state = generate_state();

        assert_eq!(state.len(), RANDOM_STATE_LENGTH);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(state, generate_state());
    }
}
