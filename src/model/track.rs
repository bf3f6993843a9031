//! Everything related to tracks.

use std::{fmt, time::Duration};

use serde::Deserialize;

use super::{album::Album, artist::PartialArtist, CommonObjectFields, ExternalIds, ExternalUrls, Restrictions};
use crate::util::duration_millis;

/// A track from Spotify's catalog, along with its album and artists.
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    #[serde(flatten)]
    common: CommonObjectFields,
    album: Album,
    artists: Vec<PartialArtist>,
    #[serde(default)]
    available_markets: Vec<String>,
    disc_number: u32,
    #[serde(rename = "duration_ms", with = "duration_millis")]
    duration: Duration,
    explicit: bool,
    #[serde(default)]
    external_ids: ExternalIds,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    is_local: bool,

    // track relinking
    #[serde(default)]
    is_playable: Option<bool>,
    #[serde(default)]
    linked_from: Option<LinkedTrack>,
    #[serde(default)]
    restrictions: Option<Restrictions>,

    popularity: u32,
    #[serde(default)]
    preview_url: Option<String>,
    track_number: u32,
}

/// The originally requested track when Spotify has relinked it to another one available in the user's market.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkedTrack {
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub href: String,
    pub id: String,
    pub uri: String,
}

/// Anything that can be added to a playlist as a track.
///
/// Implemented for [Track] and for strings holding a Spotify track URI such as `spotify:track:4uLU6hMCjMI75M1A2tKUQC`.
pub trait AsTrackUri {
    fn as_track_uri(&self) -> &str;
}

impl Track {
    pub fn album(&self) -> &Album {
        &self.album
    }

    pub fn artists(&self) -> &[PartialArtist] {
        &self.artists
    }

    pub fn available_markets(&self) -> &[String] {
        &self.available_markets
    }

    pub fn disc_number(&self) -> u32 {
        self.disc_number
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn explicit(&self) -> bool {
        self.explicit
    }

    pub fn external_ids(&self) -> &ExternalIds {
        &self.external_ids
    }

    pub fn external_urls(&self) -> &ExternalUrls {
        &self.external_urls
    }

    pub fn href(&self) -> &str {
        &self.common.href
    }

    pub fn id(&self) -> &str {
        &self.common.id
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    /// Whether the track is playable in the market it was requested with. `None` if no market was given.
    pub fn is_playable(&self) -> Option<bool> {
        self.is_playable
    }

    pub fn linked_from(&self) -> Option<&LinkedTrack> {
        self.linked_from.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.common.name
    }

    /// The track's popularity between 0 and 100, 100 being the most popular.
    pub fn popularity(&self) -> u32 {
        self.popularity
    }

    /// A link to a 30 second MP3 preview of the track.
    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    pub fn restrictions(&self) -> Option<&Restrictions> {
        self.restrictions.as_ref()
    }

    pub fn track_number(&self) -> u32 {
        self.track_number
    }

    pub fn uri(&self) -> &str {
        &self.common.uri
    }
}

impl AsTrackUri for Track {
    fn as_track_uri(&self) -> &str {
        self.uri()
    }
}

impl AsTrackUri for str {
    fn as_track_uri(&self) -> &str {
        self
    }
}

impl AsTrackUri for String {
    fn as_track_uri(&self) -> &str {
        self
    }
}

impl<T> AsTrackUri for &T
where
    T: AsTrackUri + ?Sized,
{
    fn as_track_uri(&self) -> &str {
        (*self).as_track_uri()
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Track {}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
