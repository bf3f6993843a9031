use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{artist::PartialArtist, CommonObjectFields, DatePrecision, ExternalUrls, Image};
use crate::error::ConversionError;

/// An album from Spotify's catalog.
///
/// The release date is parsed according to its precision. Albums with month or year precision have their release date
/// anchored to the first day of the month or year respectively.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "AlbumObject")]
pub struct Album {
    album_type: AlbumType,
    artists: Vec<PartialArtist>,
    available_markets: Vec<String>,
    external_urls: ExternalUrls,
    href: String,
    id: String,
    images: Vec<Image>,
    name: String,
    release_date: NaiveDate,
    release_date_precision: DatePrecision,
    total_tracks: u32,
    uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumType {
    #[serde(alias = "ALBUM")]
    Album,
    #[serde(alias = "SINGLE")]
    Single,
    #[serde(alias = "COMPILATION")]
    Compilation,
}

/// The album payload as Spotify sends it, before the release date is parsed.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AlbumObject {
    #[serde(flatten)]
    common: CommonObjectFields,
    album_type: AlbumType,
    #[serde(default)]
    artists: Vec<PartialArtist>,
    #[serde(default)]
    available_markets: Vec<String>,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    images: Vec<Image>,
    release_date: String,
    release_date_precision: String,
    total_tracks: u32,
}

impl TryFrom<AlbumObject> for Album {
    type Error = ConversionError;

    fn try_from(obj: AlbumObject) -> Result<Self, Self::Error> {
        let release_date_precision: DatePrecision = obj.release_date_precision.parse()?;
        let release_date = parse_release_date(&obj.release_date, release_date_precision)?;

        Ok(Album {
            album_type: obj.album_type,
            artists: obj.artists,
            available_markets: obj.available_markets,
            external_urls: obj.external_urls,
            href: obj.common.href,
            id: obj.common.id,
            images: obj.images,
            name: obj.common.name,
            release_date,
            release_date_precision,
            total_tracks: obj.total_tracks,
            uri: obj.common.uri,
        })
    }
}

fn parse_release_date(date: &str, precision: DatePrecision) -> Result<NaiveDate, ConversionError> {
    let padded = match precision {
        DatePrecision::Year => format!("{date}-01-01"),
        DatePrecision::Month => format!("{date}-01"),
        DatePrecision::Day => date.to_owned(),
    };

    NaiveDate::parse_from_str(&padded, "%Y-%m-%d").map_err(|_| ConversionError::InvalidReleaseDate {
        date: date.to_owned(),
        precision: precision.as_str().to_owned(),
    })
}

impl Album {
    pub fn album_type(&self) -> AlbumType {
        self.album_type
    }

    pub fn artists(&self) -> &[PartialArtist] {
        &self.artists
    }

    /// The markets the album is available in, as ISO 3166-1 alpha-2 country codes.
    pub fn available_markets(&self) -> &[String] {
        &self.available_markets
    }

    pub fn external_urls(&self) -> &ExternalUrls {
        &self.external_urls
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The album's cover art in various sizes, widest first.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn release_date(&self) -> NaiveDate {
        self.release_date
    }

    pub fn release_date_precision(&self) -> DatePrecision {
        self.release_date_precision
    }

    pub fn total_tracks(&self) -> u32 {
        self.total_tracks
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl PartialEq for Album {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Album {}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::model::artist::{tests::partial_artist_payload, CommonArtistInformation};

    pub(crate) fn album_payload(release_date: &str, precision: &str) -> Value {
        json!({
            "album_type": "album",
            "artists": [partial_artist_payload("0LyfQWJT6nXafLPZqxe9Of", "Various Artists")],
            "available_markets": ["FI", "SE"],
            "external_urls": { "spotify": "https://open.spotify.com/album/6akEvsycLGftJxYudPjmqK" },
            "href": "https://api.spotify.com/v1/albums/6akEvsycLGftJxYudPjmqK",
            "id": "6akEvsycLGftJxYudPjmqK",
            "images": [
                { "url": "https://i.scdn.co/image/ab67616d0000b273", "height": 640, "width": 640 },
                { "url": "https://i.scdn.co/image/ab67616d00001e02", "height": 300, "width": 300 }
            ],
            "name": "Place In The Sun",
            "release_date": release_date,
            "release_date_precision": precision,
            "total_tracks": 12,
            "type": "album",
            "uri": "spotify:album:6akEvsycLGftJxYudPjmqK"
        })
    }

    #[test]
    fn day_precision() {
        let album: Album = serde_json::from_value(album_payload("2019-05-17", "day")).unwrap();

        assert_eq!(album.release_date(), NaiveDate::from_ymd_opt(2019, 5, 17).unwrap());
        assert_eq!(album.release_date_precision(), DatePrecision::Day);
        assert_eq!(album.album_type(), AlbumType::Album);
        assert_eq!(album.artists()[0].name(), "Various Artists");
        assert_eq!(album.available_markets(), ["FI", "SE"]);
        assert_eq!(album.images().len(), 2);
        assert_eq!(album.total_tracks(), 12);
        assert_eq!(album.to_string(), "Place In The Sun");
    }

    #[test]
    fn month_precision_anchors_to_first_day() {
        let album: Album = serde_json::from_value(album_payload("1981-12", "month")).unwrap();
        assert_eq!(album.release_date(), NaiveDate::from_ymd_opt(1981, 12, 1).unwrap());
    }

    #[test]
    fn year_precision_anchors_to_first_day() {
        let album: Album = serde_json::from_value(album_payload("2020", "year")).unwrap();

        assert_eq!(album.release_date(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(album.release_date_precision(), DatePrecision::Year);
    }

    #[test]
    fn unknown_precision_fails() {
        let err = serde_json::from_value::<Album>(album_payload("2020", "decade")).unwrap_err();
        assert!(err.to_string().contains("decade"));
    }

    #[test]
    fn date_not_matching_precision_fails() {
        let obj: AlbumObject = serde_json::from_value(album_payload("2020", "day")).unwrap();

        assert_eq!(
            Album::try_from(obj).unwrap_err(),
            ConversionError::InvalidReleaseDate {
                date: "2020".to_owned(),
                precision: "day".to_owned()
            }
        );
    }

    #[test]
    fn uppercase_album_type() {
        let mut payload = album_payload("2020", "year");
        payload["album_type"] = json!("COMPILATION");

        let album: Album = serde_json::from_value(payload).unwrap();
        assert_eq!(album.album_type(), AlbumType::Compilation);
    }
}
