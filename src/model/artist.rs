//! Everything related to artists.
//!
//! Spotify returns two kinds of artist objects: the full [Artist] from the artist endpoint, and the [PartialArtist]
//! that is embedded in tracks and albums. Information common to both is available through
//! [CommonArtistInformation], and information only in full artists through [FullArtistInformation].

use std::fmt;

use serde::Deserialize;

use super::{CommonObjectFields, ExternalUrls, Followers, Image};

mod private {
    use super::{CommonArtistFields, FullArtistFields};

    pub(super) trait CommonFields {
        fn common_fields(&self) -> &CommonArtistFields;
    }

    pub(super) trait FullFields {
        fn full_fields(&self) -> &FullArtistFields;
    }
}

/// Functions for retrieving information that is common to both artist kinds.
pub trait CommonArtistInformation: super::private::Sealed {
    /// The artist's name.
    fn name(&self) -> &str;
    /// The artist's Spotify ID.
    fn id(&self) -> &str;
    /// The artist's Spotify URI.
    fn uri(&self) -> &str;
    /// A link to the Web API endpoint with the artist's full details.
    fn href(&self) -> &str;
    /// Known external URLs for the artist.
    fn external_urls(&self) -> &ExternalUrls;
}

/// Functions for retrieving information only in full artists.
pub trait FullArtistInformation: super::private::Sealed {
    /// Information about the artist's followers.
    fn followers(&self) -> Followers;
    /// Genres associated with the artist. May be empty if the artist hasn't been classified.
    fn genres(&self) -> &[String];
    /// Images of the artist in various sizes, widest first.
    fn images(&self) -> &[Image];
    /// The artist's popularity between 0 and 100, 100 being the most popular.
    fn popularity(&self) -> u32;
}

/// A full artist object.
#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    #[serde(flatten)]
    common: CommonArtistFields,
    #[serde(flatten)]
    full: FullArtistFields,
}

/// A simplified artist object, as embedded in tracks and albums.
#[derive(Debug, Clone, Deserialize)]
pub struct PartialArtist {
    #[serde(flatten)]
    common: CommonArtistFields,
}

#[derive(Debug, Clone, Deserialize)]
struct CommonArtistFields {
    #[serde(flatten)]
    object: CommonObjectFields,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Deserialize)]
struct FullArtistFields {
    #[serde(default)]
    followers: Followers,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    images: Vec<Image>,
    popularity: u32,
}

impl<T> CommonArtistInformation for T
where
    T: private::CommonFields + super::private::Sealed,
{
    fn name(&self) -> &str {
        &self.common_fields().object.name
    }

    fn id(&self) -> &str {
        &self.common_fields().object.id
    }

    fn uri(&self) -> &str {
        &self.common_fields().object.uri
    }

    fn href(&self) -> &str {
        &self.common_fields().object.href
    }

    fn external_urls(&self) -> &ExternalUrls {
        &self.common_fields().external_urls
    }
}

impl<T> FullArtistInformation for T
where
    T: private::FullFields + super::private::Sealed,
{
    fn followers(&self) -> Followers {
        self.full_fields().followers
    }

    fn genres(&self) -> &[String] {
        &self.full_fields().genres
    }

    fn images(&self) -> &[Image] {
        &self.full_fields().images
    }

    fn popularity(&self) -> u32 {
        self.full_fields().popularity
    }
}

impl From<Artist> for PartialArtist {
    fn from(full: Artist) -> Self {
        PartialArtist { common: full.common }
    }
}

impl super::private::Sealed for Artist {}
impl super::private::Sealed for PartialArtist {}

impl private::CommonFields for Artist {
    fn common_fields(&self) -> &CommonArtistFields {
        &self.common
    }
}

impl private::CommonFields for PartialArtist {
    fn common_fields(&self) -> &CommonArtistFields {
        &self.common
    }
}

impl private::FullFields for Artist {
    fn full_fields(&self) -> &FullArtistFields {
        &self.full
    }
}

impl PartialEq for Artist {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Artist {}

impl PartialEq for PartialArtist {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for PartialArtist {}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for PartialArtist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
