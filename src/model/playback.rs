//! Everything related to the current user's playback.

use std::{fmt, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use super::{track::Track, ExternalUrls};
use crate::{
    error::{ConversionError, Error},
    util::duration_millis,
};

/// What the current user is listening to.
///
/// Tracks are the only supported kind of playing item. Fetching the activity while an episode or an advertisement is
/// playing fails with [ConversionError::UnsupportedPlayableType].
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "ActivityObject")]
pub struct Activity {
    actions: Option<Actions>,
    context: Option<Context>,
    currently_playing_type: PlayableType,
    device: Option<Device>,
    is_playing: bool,
    item: Option<Track>,
    progress: Option<Duration>,
    timestamp: DateTime<Utc>,
}

/// The currently playing payload as Spotify sends it. The item is kept as raw JSON until the playing type is known.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ActivityObject {
    #[serde(default)]
    actions: Option<Actions>,
    #[serde(default)]
    context: Option<Context>,
    currently_playing_type: PlayableType,
    #[serde(default)]
    device: Option<Device>,
    is_playing: bool,
    #[serde(default)]
    item: Option<serde_json::Value>,
    #[serde(default, rename = "progress_ms", with = "duration_millis::option")]
    progress: Option<Duration>,
    timestamp: i64,
}

/// The kind of item that is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayableType {
    Track,
    Episode,
    Ad,
    #[serde(other)]
    Unknown,
}

/// A device in an user's account that may be used for playback.
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    #[serde(default)]
    id: Option<String>,
    is_active: bool,
    #[serde(default)]
    is_private_session: bool,
    #[serde(default)]
    is_restricted: bool,
    name: String,
    #[serde(rename = "type")]
    device_type: DeviceType,
    #[serde(default)]
    volume_percent: Option<u8>,
}

/// A device's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DeviceType {
    Computer,
    Tablet,
    Smartphone,
    Speaker,
    TV,
    AVR,
    STB,
    AudioDongle,
    GameConsole,
    CastVideo,
    CastAudio,
    Automobile,
    #[serde(other)]
    Unknown,
}

/// The context of the current playback, such as an album, an artist, a playlist or a show.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Context {
    #[serde(rename = "type")]
    pub context_type: ContextType,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub href: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    Album,
    Artist,
    Playlist,
    Show,
    #[serde(other)]
    Other,
}

/// What actions can be taken on the current playing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Actions {
    /// Disallowed actions on the current playing item.
    #[serde(default)]
    pub disallows: Disallows,
}

/// Disallowed actions on the current playing item.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Disallows {
    #[serde(default)]
    pub interrupting_playback: bool,
    #[serde(default)]
    pub pausing: bool,
    #[serde(default)]
    pub resuming: bool,
    #[serde(default)]
    pub seeking: bool,
    #[serde(default)]
    pub skipping_next: bool,
    #[serde(default)]
    pub skipping_prev: bool,
    #[serde(default)]
    pub toggling_repeat_context: bool,
    #[serde(default)]
    pub toggling_shuffle: bool,
    #[serde(default)]
    pub toggling_repeat_track: bool,
    #[serde(default)]
    pub transferring_playback: bool,
}

impl TryFrom<ActivityObject> for Activity {
    type Error = Error;

    fn try_from(obj: ActivityObject) -> Result<Self, Self::Error> {
        if obj.currently_playing_type != PlayableType::Track {
            return Err(ConversionError::UnsupportedPlayableType(obj.currently_playing_type).into());
        }

        let timestamp = Utc
            .timestamp_millis_opt(obj.timestamp)
            .single()
            .ok_or(ConversionError::InvalidTimestamp(obj.timestamp))?;

        // the item is null when playing a private session or between tracks
        let item = match obj.item {
            Some(serde_json::Value::Null) | None => None,
            Some(value) => Some(serde_json::from_value(value)?),
        };

        Ok(Activity {
            actions: obj.actions,
            context: obj.context,
            currently_playing_type: obj.currently_playing_type,
            device: obj.device,
            is_playing: obj.is_playing,
            item,
            progress: obj.progress,
            timestamp,
        })
    }
}

impl Activity {
    /// Which actions can be performed on the player in the current context.
    pub fn actions(&self) -> Option<Actions> {
        self.actions
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    pub fn currently_playing_type(&self) -> PlayableType {
        self.currently_playing_type
    }

    /// The device the item is playing on. Only included when the current playback state was requested.
    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// The currently playing track.
    pub fn item(&self) -> Option<&Track> {
        self.item.as_ref()
    }

    /// Progress into the currently playing track.
    pub fn progress(&self) -> Option<Duration> {
        self.progress
    }

    /// When Spotify fetched the playback data.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Device {
    /// The device ID. Some devices don't have one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current volume as a percentage between 0 and 100 inclusive.
    pub fn volume_percent(&self) -> Option<u8> {
        self.volume_percent
    }

    /// If this device is the currently active device.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// If this device is currently in a private session.
    pub fn is_private_session(&self) -> bool {
        self.is_private_session
    }

    /// Whether controlling this device is restricted. If this is `true`, no Web API commands will be accepted by this
    /// device.
    pub fn is_restricted(&self) -> bool {
        self.is_restricted
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for PlayableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlayableType::Track => "track",
            PlayableType::Episode => "episode",
            PlayableType::Ad => "ad",
            PlayableType::Unknown => "unknown",
        })
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(track) = &self.item else {
            return f.write_str("Not listening to anything");
        };

        write!(f, "Listening to {}", track.name())?;

        if let Some((last, rest)) = track.artists().split_last() {
            f.write_str(" by ")?;

            if !rest.is_empty() {
                let names: Vec<_> = rest.iter().map(|artist| artist.to_string()).collect();
                write!(f, "{} and ", names.join(", "))?;
            }

            write!(f, "{last}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::model::{artist::tests::partial_artist_payload, track::tests::track_payload};

    fn activity_payload(playing_type: &str, item: Value) -> Value {
        json!({
            "actions": { "disallows": { "resuming": true } },
            "context": {
                "external_urls": { "spotify": "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M" },
                "href": "https://api.spotify.com/v1/playlists/37i9dQZF1DXcBWIGoYBM5M",
                "type": "playlist",
                "uri": "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"
            },
            "currently_playing_type": playing_type,
            "is_playing": true,
            "item": item,
            "progress_ms": 44272,
            "timestamp": 1667311590140i64
        })
    }

    #[test]
    fn playing_track() {
        let activity: Activity = serde_json::from_value(activity_payload("track", track_payload("abc"))).unwrap();

        assert_eq!(activity.currently_playing_type(), PlayableType::Track);
        assert_eq!(activity.item().map(Track::id), Some("abc"));
        assert_eq!(activity.progress(), Some(Duration::from_millis(44272)));
        assert_eq!(activity.timestamp().timestamp_millis(), 1667311590140);
        assert_eq!(activity.context().map(|c| c.context_type), Some(ContextType::Playlist));
        assert!(activity.actions().unwrap().disallows.resuming);
        assert!(activity.device().is_none());
        assert_eq!(activity.to_string(), "Listening to Take on Me by a-ha");
    }

    #[test]
    fn playing_episode_is_unsupported() {
        let obj: ActivityObject =
            serde_json::from_value(activity_payload("episode", json!({ "id": "512ojhOuo1ktJprKbVcKyQ" }))).unwrap();

        match Activity::try_from(obj) {
            Err(Error::Conversion(ConversionError::UnsupportedPlayableType(PlayableType::Episode))) => {}
            other => panic!("expected unsupported playable type, got {other:?}"),
        }
    }

    #[test]
    fn unrecognised_playing_type_is_unknown() {
        let obj: ActivityObject = serde_json::from_value(activity_payload("podcast_clip", Value::Null)).unwrap();
        assert_eq!(obj.currently_playing_type, PlayableType::Unknown);
    }

    #[test]
    fn with_device_and_null_item() {
        let mut payload = activity_payload("track", Value::Null);
        payload["device"] = json!({
            "id": null,
            "is_active": true,
            "is_private_session": false,
            "is_restricted": false,
            "name": "Kitchen speaker",
            "type": "Speaker",
            "volume_percent": null
        });
        payload["context"] = Value::Null;

        let activity: Activity = serde_json::from_value(payload).unwrap();
        let device = activity.device().unwrap();

        assert!(activity.item().is_none());
        assert!(activity.context().is_none());
        assert_eq!(device.id(), None);
        assert_eq!(device.volume_percent(), None);
        assert_eq!(device.device_type(), DeviceType::Speaker);
        assert_eq!(activity.to_string(), "Not listening to anything");
    }

    #[test]
    fn several_artists_display() {
        let mut track = track_payload("abc");
        track["artists"] = json!([
            partial_artist_payload("1", "First"),
            partial_artist_payload("2", "Second"),
            partial_artist_payload("3", "Third")
        ]);

        let activity: Activity = serde_json::from_value(activity_payload("track", track)).unwrap();
        assert_eq!(activity.to_string(), "Listening to Take on Me by First, Second and Third");
    }
}
