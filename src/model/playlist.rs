//! Everything related to playlists.

use std::fmt;

use chrono::NaiveDate;
use log::debug;
use reqwest::Method;
use serde::Deserialize;

use super::{
    track::{AsTrackUri, Track},
    user::PartialUser,
    CommonObjectFields, ExternalUrls, Followers, Image,
};
use crate::{
    client::transport::TransportHandle,
    error::Result,
    util::date_only,
};

/// A playlist along with its first page of items.
///
/// Spotify only includes the first page of a playlist's items in the playlist object. The rest of them can be fetched
/// with [fetch_more_tracks](Playlist::fetch_more_tracks). The playlist holds a weak handle to the transport it was
/// fetched with for this purpose; if the client has been dropped by then, fetching fails with
/// [TransportDropped](crate::error::Error::TransportDropped). Cursors pointing outside the client's API base URL are
/// not followed.
#[derive(Debug, Clone)]
pub struct Playlist {
    collaborative: bool,
    description: Option<String>,
    external_urls: ExternalUrls,
    followers: Followers,
    href: String,
    id: String,
    images: Vec<Image>,
    name: String,
    owner: PartialUser,
    public: Option<bool>,
    snapshot_id: String,
    tracks: PlaylistTracks,
    uri: String,
    transport: TransportHandle,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlaylistObject {
    #[serde(flatten)]
    common: CommonObjectFields,
    collaborative: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    followers: Followers,
    #[serde(default)]
    images: Vec<Image>,
    owner: PartialUser,
    #[serde(default)]
    public: Option<bool>,
    snapshot_id: String,
    tracks: PlaylistTracks,
}

/// A page of a playlist's items. After fetching more tracks, contains every item fetched so far and the paging
/// information of the last fetched page.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracks {
    href: String,
    items: Vec<PlaylistItem>,
    limit: u32,
    next: Option<String>,
    offset: u32,
    previous: Option<String>,
    total: u32,
}

/// An item in a playlist.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    /// The date the item was added. Very old playlists may not have one.
    #[serde(default, with = "date_only")]
    pub added_at: Option<NaiveDate>,
    /// The user who added the item. Very old playlists may not have one.
    #[serde(default)]
    pub added_by: Option<PartialUser>,
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub primary_color: Option<String>,
    pub track: Track,
    #[serde(default)]
    pub video_thumbnail: Option<VideoThumbnail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoThumbnail {
    pub url: Option<String>,
}

impl Playlist {
    pub(crate) fn new(obj: PlaylistObject, transport: TransportHandle) -> Self {
        Playlist {
            collaborative: obj.collaborative,
            description: obj.description,
            external_urls: obj.external_urls,
            followers: obj.followers,
            href: obj.common.href,
            id: obj.common.id,
            images: obj.images,
            name: obj.common.name,
            owner: obj.owner,
            public: obj.public,
            snapshot_id: obj.snapshot_id,
            tracks: obj.tracks,
            uri: obj.common.uri,
            transport,
        }
    }

    /// Fetches the rest of the playlist's items, appending them to its [tracks](Playlist::tracks).
    ///
    /// Pages are requested sequentially by following each page's `next` cursor until either there are no more pages
    /// or the fetched items cover the playlist's total item count. Calling this when every item is already fetched
    /// does nothing. If fetching a page fails, the items fetched before it are kept.
    pub async fn fetch_more_tracks(&mut self) -> Result<()> {
        if self.tracks.is_complete() {
            return Ok(());
        }

        let transport = self.transport.upgrade()?;

        while let Some(next) = self.tracks.next.clone() {
            debug!("Fetching next page of playlist {} items: {}", self.id, next);

            let route = transport.cursor_route(Method::GET, &next)?;
            let page: PlaylistTracks = transport.request(&route).await?.json()?;
            self.tracks.append_page(page);

            if self.tracks.is_complete() {
                break;
            }
        }

        debug!(
            "Playlist {} has {} of {} items fetched",
            self.id,
            self.tracks.items.len(),
            self.tracks.total
        );

        Ok(())
    }

    /// `true` if the playlist is collaborative, i.e. other users may modify it.
    pub fn collaborative(&self) -> bool {
        self.collaborative
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn external_urls(&self) -> &ExternalUrls {
        &self.external_urls
    }

    pub fn followers(&self) -> Followers {
        self.followers
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The playlist's cover images. May be empty, or contain up to three images in various sizes.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &PartialUser {
        &self.owner
    }

    /// The playlist's public status. `None` if the status isn't relevant.
    pub fn public(&self) -> Option<bool> {
        self.public
    }

    /// The playlist's version identifier.
    pub fn snapshot_id(&self) -> &str {
        &self.snapshot_id
    }

    pub fn tracks(&self) -> &PlaylistTracks {
        &self.tracks
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl PlaylistTracks {
    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn items(&self) -> &[PlaylistItem] {
        &self.items
    }

    /// The maximum number of items in the last fetched page.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// The offset of the last fetched page.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// The total number of items in the playlist.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Whether any fetched item is the given track.
    pub fn contains<T>(&self, track: T) -> bool
    where
        T: AsTrackUri,
    {
        let uri = track.as_track_uri();
        self.items.iter().any(|item| item.track.uri() == uri)
    }

    fn is_complete(&self) -> bool {
        self.next.is_none() || self.offset + self.limit >= self.total
    }

    fn append_page(&mut self, mut page: PlaylistTracks) {
        self.items.append(&mut page.items);
        self.href = page.href;
        self.limit = page.limit;
        self.next = page.next;
        self.offset = page.offset;
        self.previous = page.previous;
        self.total = page.total;
    }
}

impl<'a> IntoIterator for &'a PlaylistTracks {
    type Item = &'a PlaylistItem;
    type IntoIter = std::slice::Iter<'a, PlaylistItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl PartialEq for Playlist {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Playlist {}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for PlaylistItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.track, f)
    }
}
