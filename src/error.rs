use std::{fmt, time::Duration};

use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::model::playback::PlayableType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(
        "Too many requests. Retry-After exceeded the configured maximum rate limit timeout ({:.2}s > {:.2}s)",
        .retry_after.as_secs_f64(),
        .max_wait.as_secs_f64()
    )]
    RateLimited { retry_after: Duration, max_wait: Duration },

    #[error(
        "Missing or invalid Retry-After header in 429 rate-limit response. This is likely an issue on Spotify's side"
    )]
    InvalidRateLimitResponse,

    #[error("Unauthorized: {0}")]
    Unauthorized(HttpErrorDetails),

    #[error("Forbidden: {0}")]
    Forbidden(HttpErrorDetails),

    #[error("Not found: {0}")]
    NotFound(HttpErrorDetails),

    #[error("Spotify server error: {0}")]
    ServerError(HttpErrorDetails),

    #[error("Unhandled HTTP error: {0}")]
    Http(HttpErrorDetails),

    #[error("Invalid HTTP method for a route: {0}")]
    InvalidMethod(Method),

    #[error("Route path template is missing a value for parameter '{0}'")]
    MissingRouteParameter(String),

    #[error("Route parameter '{name}' has a relative path segment in its value '{value}'")]
    InvalidRouteParameter { name: String, value: String },

    #[error("Pagination cursor '{0}' points outside the configured API base URL")]
    UnexpectedCursorOrigin(String),

    #[error("'{0}' is not a valid scope flag name")]
    InvalidFlagName(String),

    #[error("When providing a refresh token, client ID or a client secret, all three must be provided")]
    IncompleteRefreshCredentials,

    #[error("No refresh token and client credentials have been configured; the access token cannot be refreshed")]
    MissingRefreshCredentials,

    #[error("The transport has been closed")]
    TransportClosed,

    #[error("The transport backing this object has been dropped")]
    TransportDropped,

    #[error("Spotify returned an empty response where a body was expected")]
    EmptyResponse,

    #[error("No sleep implementation enabled; cannot wait {:.2} seconds before retrying", .0.as_secs_f64())]
    SleepUnavailable(Duration),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A response body didn't decode. Conversion failures of objects nested in the body, such as a track's album,
    /// surface as this error with the conversion error's message.
    #[error("Failed to decode response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    HttpClient(#[from] reqwest::Error),
}

/// Errors from converting a Spotify API payload into a model object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConversionError {
    #[error("Unrecognised release date precision: {0}")]
    UnknownDatePrecision(String),

    #[error("Release date '{date}' does not match its precision '{precision}'")]
    InvalidReleaseDate { date: String, precision: String },

    #[error("Timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("Tracks are the only supported currently playing type, got {0}")]
    UnsupportedPlayableType(PlayableType),
}

/// Information about a failed HTTP exchange with the Spotify API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpErrorDetails {
    /// The response's status code.
    pub status: StatusCode,
    /// The status code's reason phrase, such as `Not Found`. Empty if the status code has no canonical reason.
    pub reason: String,
    /// The error message Spotify included in the response body, if any.
    pub message: String,
}

impl HttpErrorDetails {
    pub(crate) fn new<S>(status: StatusCode, message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            status,
            reason: status.canonical_reason().unwrap_or_default().to_owned(),
            message: message.into(),
        }
    }
}

impl fmt::Display for HttpErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.reason)?;

        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }

        Ok(())
    }
}

impl Error {
    /// Returns the HTTP error details if this error originated from an unsuccessful API response.
    pub fn http_details(&self) -> Option<&HttpErrorDetails> {
        match self {
            Error::Unauthorized(details)
            | Error::Forbidden(details)
            | Error::NotFound(details)
            | Error::ServerError(details)
            | Error::Http(details) => Some(details),

            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_display_includes_message() {
        let details = HttpErrorDetails::new(StatusCode::NOT_FOUND, "Non existing id");
        assert_eq!(details.to_string(), "404 Not Found: Non existing id");
    }

    #[test]
    fn details_display_without_message() {
        let details = HttpErrorDetails::new(StatusCode::FORBIDDEN, "");
        assert_eq!(details.to_string(), "403 Forbidden");
    }

    #[test]
    fn unknown_status_has_empty_reason() {
        let status = StatusCode::from_u16(524).unwrap();
        let details = HttpErrorDetails::new(status, "timeout");

        assert_eq!(details.reason, "");
        assert_eq!(details.to_string(), "524 : timeout");
    }

    #[test]
    fn rate_limited_display() {
        let err = Error::RateLimited {
            retry_after: Duration::from_secs(60),
            max_wait: Duration::from_secs(30),
        };

        assert!(err.to_string().contains("60.00s > 30.00s"));
    }
}
