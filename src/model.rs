//! Typed objects hydrated from Spotify API payloads.
//!
//! Every object is an immutable snapshot of the payload it was built from. Nested objects (such as a track's album and
//! artists) are hydrated along with their parent. The only object that talks to the API after construction is
//! [Playlist](playlist::Playlist), which may fetch the rest of its tracks on demand.
//!
//! Objects that have a Spotify ID compare equal if their IDs are equal, regardless of the rest of their contents.

pub mod album;
pub mod artist;
pub(crate) mod error;
pub mod playback;
pub mod playlist;
pub mod track;
pub mod user;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

mod private {
    pub trait Sealed {}
}

/// An image, such as an album's cover art or a user's profile picture.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    /// Spotify leaves out the dimensions for some images, such as user-uploaded playlist covers.
    #[serde(flatten)]
    pub dimensions: Option<ImageDimensions>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Information about the followers of an artist, a playlist or a user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followers {
    // the API documents a href parameter but says it's always null, so it's not included here
    pub total: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restrictions {
    pub reason: Option<String>,
}

/// The precision of a release date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIds {
    pub isrc: Option<String>,
    pub ean: Option<String>,
    pub upc: Option<String>,
}

/// Fields every catalog object shares.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommonObjectFields {
    pub(crate) href: String,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) uri: String,
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl DatePrecision {
    pub fn as_str(self) -> &'static str {
        match self {
            DatePrecision::Year => "year",
            DatePrecision::Month => "month",
            DatePrecision::Day => "day",
        }
    }
}

impl FromStr for DatePrecision {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "year" => Ok(DatePrecision::Year),
            "month" => Ok(DatePrecision::Month),
            "day" => Ok(DatePrecision::Day),
            other => Err(ConversionError::UnknownDatePrecision(other.to_owned())),
        }
    }
}
