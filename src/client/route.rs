//! Fully-resolved API requests.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Method, Url};

use crate::error::{Error, Result};

/// The Spotify Web API origin every route is resolved against unless another base is given.
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Path parameter values are quoted like URL path segments: unreserved characters and `/` pass through.
const PATH_PARAMETER: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~').remove(b'/');

/// A value substituted into a route's path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteParameter<'a> {
    /// A string value. Percent-encoded before substitution.
    Str(&'a str),
    /// A value substituted as-is, such as a number.
    Raw(String),
}

/// An API request's method and URL.
///
/// Routes are built from a path template such as `/artists/{id}` and the values of its placeholders. The template
/// itself is kept around as the route's [key](Route::key), which identifies the endpoint regardless of the parameters.
///
/// ```
/// # use spotifly::client::route::{Route, RouteParameter};
/// # use reqwest::Method;
/// let route = Route::new(Method::GET, "/artists/{id}", &[("id", RouteParameter::Str("abc 123"))]).unwrap();
///
/// assert_eq!(route.url().as_str(), "https://api.spotify.com/v1/artists/abc%20123");
/// assert_eq!(route.key(), "GET /artists/{id}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    method: Method,
    template: String,
    url: Url,
}

impl Route {
    /// Builds a route against the public Spotify API.
    pub fn new(method: Method, template: &str, params: &[(&str, RouteParameter<'_>)]) -> Result<Self> {
        Self::with_base(API_BASE_URL, method, template, params)
    }

    /// Builds a route against the given base URL.
    pub fn with_base(
        base: &str,
        method: Method,
        template: &str,
        params: &[(&str, RouteParameter<'_>)],
    ) -> Result<Self> {
        check_method(&method)?;

        let path = substitute(template, params)?;
        let url = Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))?;

        Ok(Route {
            method,
            template: template.to_owned(),
            url,
        })
    }

    /// Wraps an absolute URL, such as a pagination cursor. The URL's path is used as the route's template.
    pub fn from_url(method: Method, url: &str) -> Result<Self> {
        check_method(&method)?;
        let url = Url::parse(url)?;

        Ok(Route {
            method,
            template: url.path().to_owned(),
            url,
        })
    }

    /// Identifies the endpoint this route targets, in the form `METHOD template`.
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.template)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

impl<'a> From<&'a str> for RouteParameter<'a> {
    fn from(value: &'a str) -> Self {
        RouteParameter::Str(value)
    }
}

impl<'a> From<&'a String> for RouteParameter<'a> {
    fn from(value: &'a String) -> Self {
        RouteParameter::Str(value)
    }
}

macro_rules! raw_route_parameter {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RouteParameter<'_> {
                fn from(value: $ty) -> Self {
                    RouteParameter::Raw(value.to_string())
                }
            }
        )*
    };
}

raw_route_parameter!(u32, u64, usize, i32, i64);

fn check_method(method: &Method) -> Result<()> {
    if [Method::GET, Method::POST, Method::PUT, Method::DELETE].contains(method) {
        Ok(())
    } else {
        Err(Error::InvalidMethod(method.clone()))
    }
}

fn substitute(template: &str, params: &[(&str, RouteParameter<'_>)]) -> Result<String> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}').map(|end| start + end) else {
            break;
        };

        let name = &rest[start + 1..end];
        let value = params
            .iter()
            .find_map(|(key, value)| (*key == name).then_some(value))
            .ok_or_else(|| Error::MissingRouteParameter(name.to_owned()))?;

        path.push_str(&rest[..start]);
        match value {
            RouteParameter::Str(value) => {
                // dot segments get resolved when the URL is parsed
                if value.split('/').any(|segment| segment == "." || segment == "..") {
                    return Err(Error::InvalidRouteParameter {
                        name: name.to_owned(),
                        value: (*value).to_owned(),
                    });
                }

                path.extend(utf8_percent_encode(value, PATH_PARAMETER))
            }
            RouteParameter::Raw(value) => path.push_str(value),
        }

        rest = &rest[end + 1..];
    }

    path.push_str(rest);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_string_parameters() {
        let route = Route::new(Method::GET, "/artists/{id}", &[("id", "abc 123".into())]).unwrap();
        assert_eq!(route.url().as_str(), "https://api.spotify.com/v1/artists/abc%20123");
    }

    #[test]
    fn does_not_double_encode() {
        let route = Route::new(Method::GET, "/artists/{id}", &[("id", "abc%20123".into())]).unwrap();
        assert_eq!(route.url().as_str(), "https://api.spotify.com/v1/artists/abc%2520123");

        let route = Route::new(Method::GET, "/artists/{id}", &[("id", "a-b_c.d~e/f".into())]).unwrap();
        assert_eq!(route.url().as_str(), "https://api.spotify.com/v1/artists/a-b_c.d~e/f");
    }

    #[test]
    fn raw_parameters_are_not_encoded() {
        let route = Route::new(
            Method::GET,
            "/users/{user_id}/playlists/{page}",
            &[("user_id", "smedjan".into()), ("page", 2u32.into())],
        )
        .unwrap();

        assert_eq!(route.url().as_str(), "https://api.spotify.com/v1/users/smedjan/playlists/2");
    }

    #[test]
    fn key_uses_template() {
        let route = Route::new(
            Method::POST,
            "/playlists/{playlist_id}/tracks",
            &[("playlist_id", "pl".into())],
        )
        .unwrap();

        assert_eq!(route.key(), "POST /playlists/{playlist_id}/tracks");
        assert_eq!(route.template(), "/playlists/{playlist_id}/tracks");
        assert_eq!(route.method(), &Method::POST);
    }

    #[test]
    fn rejects_other_methods() {
        assert!(matches!(
            Route::new(Method::PATCH, "/me", &[]),
            Err(Error::InvalidMethod(method)) if method == Method::PATCH
        ));
        assert!(matches!(
            Route::from_url(Method::HEAD, "https://api.spotify.com/v1/me"),
            Err(Error::InvalidMethod(_))
        ));
    }

    #[test]
    fn missing_parameter() {
        assert!(matches!(
            Route::new(Method::GET, "/tracks/{id}", &[("other", "abc".into())]),
            Err(Error::MissingRouteParameter(name)) if name == "id"
        ));
    }

    #[test]
    fn dot_segments_are_rejected() {
        for id in ["..", ".", "../me", "abc/../../me", "./abc"] {
            assert!(
                matches!(
                    Route::new(Method::GET, "/artists/{id}", &[("id", id.into())]),
                    Err(Error::InvalidRouteParameter { name, value }) if name == "id" && value == id
                ),
                "{id} was accepted"
            );
        }

        let route = Route::new(Method::GET, "/artists/{id}", &[("id", "a..b/.c".into())]).unwrap();
        assert_eq!(route.url().as_str(), "https://api.spotify.com/v1/artists/a..b/.c");
    }

    #[test]
    fn custom_base() {
        let route = Route::with_base("http://127.0.0.1:8080/", Method::GET, "/me", &[]).unwrap();
        assert_eq!(route.url().as_str(), "http://127.0.0.1:8080/me");
    }

    #[test]
    fn from_absolute_url() {
        let route = Route::from_url(
            Method::GET,
            "https://api.spotify.com/v1/playlists/pl/tracks?offset=100&limit=100",
        )
        .unwrap();

        assert_eq!(route.url().query(), Some("offset=100&limit=100"));
        assert_eq!(route.key(), "GET /v1/playlists/pl/tracks");
    }

    #[test]
    fn invalid_url() {
        assert!(matches!(
            Route::from_url(Method::GET, "not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }
}
