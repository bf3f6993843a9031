//! The HTTP transport every API request goes through.
//!
//! The transport owns the access token and the HTTP session. It sends requests built from [Routes](Route) and reacts
//! to the responses:
//! - `429 Too Many Requests` responses are waited out and retried, as long as the wait is within the configured
//!   maximum. Rate-limit retries don't count against the request's attempts.
//! - `401 Unauthorized` responses cause the access token to be refreshed once, if refresh credentials are configured,
//!   after which the request is retried.
//! - Transient server errors (`500`, `502`, `504` and `524`) are retried with a linearly growing backoff, up to five
//!   attempts in total.
//! - Every other unsuccessful response fails the request immediately.

use std::{
    sync::{Arc, Mutex, PoisonError, RwLock, Weak},
    time::Duration,
};

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use const_format::concatcp;
use log::{debug, error, info, trace, warn};
use reqwest::{
    header::{self, HeaderMap},
    Method, Response, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::{
    private,
    route::{Route, RouteParameter},
    AccessTokenRefresh,
};
use crate::{
    error::{Error, HttpErrorDetails, Result},
    model::error::ErrorResponse,
};

/// Spotify's token endpoint.
pub const ACCOUNTS_API_TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";

const SPOTIFLY_USER_AGENT: &str = concatcp!("spotifly/", env!("CARGO_PKG_VERSION"));

/// How many times a request is sent before giving up on transient server errors.
const MAX_ATTEMPTS: u32 = 5;

/// Server errors that are considered transient and worth retrying.
const RETRYABLE_SERVER_ERRORS: [u16; 4] = [500, 502, 504, 524];

/// A handle to the HTTP transport. Cloning the handle is cheap; every clone shares the same access token and session.
#[derive(Debug, Clone)]
pub struct Transport {
    inner: Arc<TransportRef>,
}

/// A non-owning handle to a [Transport]. Used by objects that need to make requests after being constructed without
/// keeping the transport alive.
#[derive(Debug, Clone)]
pub struct TransportHandle {
    inner: Weak<TransportRef>,
}

#[derive(Debug)]
struct TransportRef {
    access_token: RwLock<String>,
    refresh: Option<RefreshCredentials>,
    max_ratelimit_timeout: Duration,
    server_error_backoff: Duration,
    api_base_url: String,
    token_endpoint: String,
    session: Mutex<Session>,
}

#[derive(Debug)]
struct RefreshCredentials {
    refresh_token: RwLock<String>,
    client_id: String,
    client_secret: String,
}

#[derive(Debug)]
enum Session {
    Unopened,
    Open(reqwest::Client),
    Closed,
}

/// Everything needed to construct a [Transport]. Built by [ClientBuilder](crate::client::ClientBuilder).
#[derive(Debug)]
pub(crate) struct TransportConfig {
    pub access_token: String,
    /// The refresh token, client ID and client secret.
    pub refresh: Option<(String, String, String)>,
    pub max_ratelimit_timeout: Duration,
    pub server_error_backoff: Duration,
    pub http_client: Option<reqwest::Client>,
    pub api_base_url: String,
    pub token_endpoint: String,
}

/// A successful response's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// The body of a response with a JSON content type.
    Json(Value),
    /// The body of any other response, including empty ones.
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RefreshTokenResponse {
    access_token: String,
    refresh_token: Option<String>,

    // only used for logging
    token_type: String,
    expires_in: u32,
}

impl Transport {
    pub(crate) fn new(config: TransportConfig) -> Self {
        let session = match config.http_client {
            Some(client) => Session::Open(client),
            None => Session::Unopened,
        };

        let refresh = config
            .refresh
            .map(|(refresh_token, client_id, client_secret)| RefreshCredentials {
                refresh_token: RwLock::new(refresh_token),
                client_id,
                client_secret,
            });

        Transport {
            inner: Arc::new(TransportRef {
                access_token: RwLock::new(config.access_token),
                refresh,
                max_ratelimit_timeout: config.max_ratelimit_timeout,
                server_error_backoff: config.server_error_backoff,
                api_base_url: config.api_base_url,
                token_endpoint: config.token_endpoint,
                session: Mutex::new(session),
            }),
        }
    }

    /// Returns a non-owning handle to this transport.
    pub fn handle(&self) -> TransportHandle {
        TransportHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Builds a route against the API base URL this transport is configured with.
    pub fn route(&self, method: Method, template: &str, params: &[(&str, RouteParameter<'_>)]) -> Result<Route> {
        Route::with_base(&self.inner.api_base_url, method, template, params)
    }

    /// Builds a route from an absolute URL handed out by the API, such as a pagination cursor. The URL must have the
    /// same origin as the configured API base URL so the access token isn't sent anywhere else.
    pub fn cursor_route(&self, method: Method, url: &str) -> Result<Route> {
        let route = Route::from_url(method, url)?;
        let base = Url::parse(&self.inner.api_base_url)?;

        if route.url().origin() != base.origin() {
            warn!("Refusing to follow cursor {url} outside {}", self.inner.api_base_url);
            return Err(Error::UnexpectedCursorOrigin(url.to_owned()));
        }

        Ok(route)
    }

    /// The current access token. It may change over time as it gets refreshed.
    pub fn access_token(&self) -> String {
        self.inner
            .access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current refresh token, if refresh credentials are configured. Spotify may hand out a new refresh token when
    /// refreshing the access token.
    pub fn refresh_token(&self) -> Option<String> {
        self.inner.refresh.as_ref().map(|refresh| {
            refresh
                .refresh_token
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }

    /// Whether the transport has refresh credentials to refresh its access token with.
    pub fn can_refresh(&self) -> bool {
        self.inner.refresh.is_some()
    }

    /// Closes the HTTP session. Any request made after closing fails with [TransportClosed](Error::TransportClosed).
    /// Closing an already closed transport does nothing.
    pub fn close(&self) {
        let mut session = self.inner.session.lock().unwrap_or_else(PoisonError::into_inner);

        if !matches!(*session, Session::Closed) {
            debug!("Closing HTTP session");
            *session = Session::Closed;
        }
    }

    /// Whether the transport has been closed.
    pub fn is_closed(&self) -> bool {
        matches!(
            *self.inner.session.lock().unwrap_or_else(PoisonError::into_inner),
            Session::Closed
        )
    }

    /// Sends a request without a body.
    pub async fn request(&self, route: &Route) -> Result<ResponseBody> {
        self.send(route, None).await
    }

    /// Sends a request with the given value serialized as its JSON body.
    pub async fn request_with_body<B>(&self, route: &Route, body: &B) -> Result<ResponseBody>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)?;
        self.send(route, Some(body)).await
    }

    async fn send(&self, route: &Route, body: Option<Vec<u8>>) -> Result<ResponseBody> {
        let mut attempt = 0;
        let mut refreshed = false;

        loop {
            let session = self.session()?;
            let access_token = self.access_token();

            trace!("{route} (attempt {})", attempt + 1);

            let mut request = session
                .request(route.method().clone(), route.url().clone())
                .header(header::USER_AGENT, SPOTIFLY_USER_AGENT)
                .bearer_auth(&access_token);

            if let Some(body) = &body {
                trace!("Request body: {}", String::from_utf8_lossy(body));
                request = request
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.clone());
            // Spotify requires empty POST and PUT requests to carry a Content-Length of 0, which reqwest doesn't set
            } else if route.method() == Method::POST || route.method() == Method::PUT {
                request = request.header(header::CONTENT_LENGTH, header::HeaderValue::from_static("0"));
            }

            let response = request.send().await?;
            let status = response.status();

            if status.is_success() {
                let body = ResponseBody::read(response).await?;
                trace!("Response body: {body:?}");
                return Ok(body);
            }

            match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = extract_rate_limit_retry_after(response.headers())?;

                    if retry_after > self.inner.max_ratelimit_timeout {
                        error!(
                            "Rate limit of {:.2}s for {} exceeds the maximum of {:.2}s",
                            retry_after.as_secs_f64(),
                            route.key(),
                            self.inner.max_ratelimit_timeout.as_secs_f64()
                        );

                        return Err(Error::RateLimited {
                            retry_after,
                            max_wait: self.inner.max_ratelimit_timeout,
                        });
                    }

                    info!(
                        "Got rate limited on {}, waiting {:.2} seconds...",
                        route.key(),
                        retry_after.as_secs_f64()
                    );
                    sleep(retry_after).await?;
                }

                StatusCode::UNAUTHORIZED => {
                    let details = error_details(response).await;
                    warn!("Got 401 Unauthorized response: {details}");

                    if refreshed || !self.can_refresh() {
                        return Err(Error::Unauthorized(details));
                    }

                    refreshed = true;

                    if self.access_token() != access_token {
                        debug!("Access token was refreshed while the request was in flight, retrying with the new one");
                        continue;
                    }

                    if let Err(err) = self.refresh_access_token().await {
                        error!("Failed to refresh access token: {err}");
                        return Err(Error::Unauthorized(details));
                    }
                }

                status if RETRYABLE_SERVER_ERRORS.contains(&status.as_u16()) => {
                    let details = error_details(response).await;

                    if attempt + 1 >= MAX_ATTEMPTS {
                        error!("Giving up on {} after {MAX_ATTEMPTS} attempts: {details}", route.key());
                        return Err(Error::ServerError(details));
                    }

                    let backoff = self.inner.server_error_backoff * (1 + attempt * 2);
                    warn!(
                        "Got {details} on {}, retrying in {:.2} seconds",
                        route.key(),
                        backoff.as_secs_f64()
                    );

                    attempt += 1;
                    sleep(backoff).await?;
                }

                status => {
                    let details = error_details(response).await;
                    return Err(error_for_status(status, details));
                }
            }
        }
    }

    fn session(&self) -> Result<reqwest::Client> {
        let mut session = self.inner.session.lock().unwrap_or_else(PoisonError::into_inner);

        match &*session {
            Session::Open(client) => Ok(client.clone()),
            Session::Closed => Err(Error::TransportClosed),
            Session::Unopened => {
                debug!("Opening HTTP session");
                let client = reqwest::Client::builder().build()?;
                *session = Session::Open(client.clone());
                Ok(client)
            }
        }
    }
}

impl private::Sealed for Transport {}

#[async_trait]
impl AccessTokenRefresh for Transport {
    async fn refresh_access_token(&self) -> Result<()> {
        let refresh = self.inner.refresh.as_ref().ok_or(Error::MissingRefreshCredentials)?;
        let refresh_token = refresh
            .refresh_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        debug!("Refreshing access token");
        let response = self
            .session()?
            .post(&self.inner.token_endpoint)
            .header(header::USER_AGENT, SPOTIFLY_USER_AGENT)
            .header(
                header::AUTHORIZATION,
                build_authorization_header(&refresh.client_id, &refresh.client_secret),
            )
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = error_details(response).await;
            error!("Access token refresh failed: {details}");
            return Err(error_for_status(status, details));
        }

        let token_response: RefreshTokenResponse = response.json().await?;
        debug!(
            "Got token response: token type {}, expires in {} seconds, new refresh token: {}",
            token_response.token_type,
            token_response.expires_in,
            token_response.refresh_token.is_some()
        );

        *self.inner.access_token.write().unwrap_or_else(PoisonError::into_inner) = token_response.access_token;

        if let Some(new_refresh_token) = token_response.refresh_token {
            *refresh.refresh_token.write().unwrap_or_else(PoisonError::into_inner) = new_refresh_token;
        }

        Ok(())
    }
}

impl TransportHandle {
    /// Returns the transport this handle points to, or [TransportDropped](Error::TransportDropped) if every owning
    /// handle to it has been dropped.
    pub fn upgrade(&self) -> Result<Transport> {
        self.inner
            .upgrade()
            .map(|inner| Transport { inner })
            .ok_or(Error::TransportDropped)
    }
}

impl ResponseBody {
    async fn read(response: Response) -> Result<Self> {
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, is_json_content_type);

        let bytes = response.bytes().await?;

        if is_json && !bytes.is_empty() {
            Ok(ResponseBody::Json(serde_json::from_slice(&bytes)?))
        } else {
            Ok(ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned()))
        }
    }

    /// Deserializes the body into the given type. Fails with [EmptyResponse](Error::EmptyResponse) if the body is
    /// empty.
    pub fn json<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        match self {
            ResponseBody::Json(value) => Ok(serde_json::from_value(value)?),
            ResponseBody::Text(text) if text.is_empty() => Err(Error::EmptyResponse),
            ResponseBody::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }

    /// Whether the response had no body, such as with `204 No Content` responses.
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Text(text) if text.is_empty())
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map_or(false, |essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

fn build_authorization_header(client_id: &str, client_secret: &str) -> String {
    let auth = format!("{client_id}:{client_secret}");
    format!("Basic {}", general_purpose::STANDARD.encode(auth))
}

fn extract_rate_limit_retry_after(headers: &HeaderMap) -> Result<Duration> {
    if let Some(wait_time) = headers
        .get(header::RETRY_AFTER)
        .and_then(|header| header.to_str().ok())
        .and_then(|header_str| header_str.trim().parse::<f64>().ok())
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
    {
        warn!(
            "Got 429 rate-limit response from Spotify with Retry-After: {:.2}",
            wait_time.as_secs_f64()
        );

        Ok(wait_time)
    } else {
        warn!("Invalid rate-limit response");
        Err(Error::InvalidRateLimitResponse)
    }
}

/// Reads an unsuccessful response's body into error details. The message is taken from Spotify's error object if
/// there is one, otherwise the body is used verbatim.
async fn error_details(response: Response) -> HttpErrorDetails {
    let status = response.status();

    let message = match ResponseBody::read(response).await {
        Ok(ResponseBody::Json(value)) => match serde_json::from_value::<ErrorResponse>(value.clone()) {
            Ok(error_response) => error_response.into_message(),
            Err(_) => value.to_string(),
        },
        Ok(ResponseBody::Text(text)) => text,
        Err(err) => {
            warn!("Failed to read error response body: {err}");
            String::new()
        }
    };

    HttpErrorDetails::new(status, message)
}

fn error_for_status(status: StatusCode, details: HttpErrorDetails) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized(details),
        StatusCode::FORBIDDEN => {
            error!("Got 403 Forbidden response: {details}");
            Error::Forbidden(details)
        }
        StatusCode::NOT_FOUND => Error::NotFound(details),
        status if status.is_server_error() => {
            error!("Got unrecoverable server error: {details}");
            Error::ServerError(details)
        }
        _ => {
            error!("Unhandled HTTP error: {details}");
            Error::Http(details)
        }
    }
}

/// Return an error since no sleep utility has been enabled.
#[cfg(all(not(feature = "tokio_sleep"), not(feature = "async_std_sleep")))]
async fn sleep(duration: Duration) -> Result<()> {
    Err(Error::SleepUnavailable(duration))
}

// sleeping with tokio takes precedence over async_std so if the user enables both features for some reason, they get
// tokio sleep
/// Sleep for the specified amount of time using tokio's sleep function.
#[cfg(feature = "tokio_sleep")]
async fn sleep(duration: Duration) -> Result<()> {
    tokio::time::sleep(duration).await;
    Ok(())
}

/// Sleep for the specified amount of time using async_std's sleep function.
#[cfg(all(feature = "async_std_sleep", not(feature = "tokio_sleep")))]
async fn sleep(duration: Duration) -> Result<()> {
    async_std::task::sleep(duration).await;
    Ok(())
}
