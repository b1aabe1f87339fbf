//! Tracks and streams
//!
//! A [`Track`] is an immutable URI plus display metadata. Its [`TrackKind`]
//! decides how the URI is normalised and which DIDL-Lite document is sent
//! alongside it. [`TrackFactory`] picks the kind from a URI prefix.

mod factory;
mod text_to_speech;

pub use factory::TrackFactory;
pub use text_to_speech::{Directory, Synthesizer, TextToSpeech, VoiceRss};

use sonos_api::didl::{self, DidlItem};

use crate::error::Result;

/// URI schemes that play as a live stream rather than from the queue
pub const STREAM_PREFIXES: [&str; 8] = [
    "x-sonosapi-stream:",
    "x-sonosapi-radio:",
    "x-rincon-mp3radio:",
    "x-sonosapi-hls:",
    "x-rincon-stream:",
    "x-sonos-htastream:",
    "aac:",
    "hls-radio:",
];

pub(crate) const SPOTIFY_PREFIX: &str = "x-sonos-spotify:";
pub(crate) const SPOTIFY_ALBUM_PREFIX: &str = "x-rincon-cpcontainer:1004206c";
pub(crate) const SPOTIFY_PLAYLIST_PREFIX: &str = "x-rincon-cpcontainer:1006206c";
pub(crate) const DEEZER_PREFIX: &str = "x-sonos-http:tr%3a";
pub(crate) const GOOGLE_PREFIX: &str = "x-sonos-http:_dklxfo";
pub(crate) const GOOGLE_UNLIMITED_PREFIX: &str = "x-sonos-http:A0DvPDnows";
pub(crate) const RADIO_PREFIX: &str = "x-sonosapi-radio:";

const SPOTIFY_REGION: &str = "2311";
const DEEZER_REGION: &str = "519";
const GOOGLE_REGION: &str = "151";
const TUNEIN_DESC: &str = "SA_RINCON65031_";

/// True when `uri` is played as a stream
pub fn is_stream_uri(uri: &str) -> bool {
    STREAM_PREFIXES.iter().any(|prefix| uri.starts_with(prefix))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    NetworkFile,
    SpotifyTrack,
    SpotifyAlbum,
    SpotifyPlaylist,
    Deezer,
    Google,
    GoogleUnlimited,
    Stream,
    GoogleInstantMix,
}

impl TrackKind {
    /// Whether the kind plays as a stream instead of a queue entry
    pub fn is_stream(&self) -> bool {
        matches!(self, TrackKind::Stream | TrackKind::GoogleInstantMix)
    }
}

/// Something that can be turned into a playable [`Track`]
///
/// Resolution may be effectful (speech synthesis); callers resolve before
/// any speaker is paused.
pub trait Playable {
    fn resolve(&self) -> Result<Track>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    kind: TrackKind,
    uri: String,
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    number: Option<u32>,
    album_art: Option<String>,
}

impl Track {
    fn with_kind(kind: TrackKind, uri: String) -> Self {
        Self {
            kind,
            uri,
            title: None,
            artist: None,
            album: None,
            number: None,
            album_art: None,
        }
    }

    /// A file on a share or web server, played as-is
    pub fn network_file(uri: impl Into<String>) -> Self {
        Self::with_kind(TrackKind::NetworkFile, uri.into())
    }

    /// Accepts a bare track id, `spotify:track:<id>` or an existing
    /// `x-sonos-spotify:` URI
    pub fn spotify(id: &str) -> Self {
        if id.starts_with(SPOTIFY_PREFIX) {
            return Self::with_kind(TrackKind::SpotifyTrack, id.to_string());
        }
        let id = id.strip_prefix("spotify:track:").unwrap_or(id);
        let uri = format!(
            "{SPOTIFY_PREFIX}{}",
            urlencoding::encode(&format!("spotify:track:{id}"))
        );
        Self::with_kind(TrackKind::SpotifyTrack, uri)
    }

    pub fn spotify_album(id: &str) -> Self {
        if id.starts_with(SPOTIFY_ALBUM_PREFIX) {
            return Self::with_kind(TrackKind::SpotifyAlbum, id.to_string());
        }
        let id = id.strip_prefix("spotify:album:").unwrap_or(id);
        let uri = format!(
            "{SPOTIFY_ALBUM_PREFIX}{}",
            urlencoding::encode(&format!("spotify:album:{id}"))
        );
        Self::with_kind(TrackKind::SpotifyAlbum, uri)
    }

    /// Accepts a bare playlist id or any `spotify:` playlist URI
    pub fn spotify_playlist(id: &str) -> Self {
        if id.starts_with(SPOTIFY_PLAYLIST_PREFIX) {
            return Self::with_kind(TrackKind::SpotifyPlaylist, id.to_string());
        }
        let spotify_uri = if id.starts_with("spotify:") {
            id.to_string()
        } else {
            format!("spotify:playlist:{id}")
        };
        let uri = format!(
            "{SPOTIFY_PLAYLIST_PREFIX}{}",
            urlencoding::encode(&spotify_uri)
        );
        Self::with_kind(TrackKind::SpotifyPlaylist, uri)
    }

    pub fn deezer(id: &str) -> Self {
        if starts_with_ignore_case(id, DEEZER_PREFIX) {
            return Self::with_kind(TrackKind::Deezer, id.to_string());
        }
        Self::with_kind(
            TrackKind::Deezer,
            format!("{DEEZER_PREFIX}{id}.mp3?sid=2&sn=0"),
        )
    }

    pub fn google(id: &str) -> Self {
        if id.starts_with(GOOGLE_PREFIX) {
            return Self::with_kind(TrackKind::Google, id.to_string());
        }
        Self::with_kind(TrackKind::Google, format!("{GOOGLE_PREFIX}{id}.mp4?sid=151"))
    }

    pub fn google_unlimited(id: &str) -> Self {
        if id.starts_with(GOOGLE_UNLIMITED_PREFIX) {
            return Self::with_kind(TrackKind::GoogleUnlimited, id.to_string());
        }
        Self::with_kind(
            TrackKind::GoogleUnlimited,
            format!("{GOOGLE_UNLIMITED_PREFIX}{id}.mp3?sid=151"),
        )
    }

    pub fn google_instant_mix(id: &str) -> Self {
        if id.starts_with(RADIO_PREFIX) {
            return Self::with_kind(TrackKind::GoogleInstantMix, id.to_string());
        }
        Self::with_kind(
            TrackKind::GoogleInstantMix,
            format!("{RADIO_PREFIX}{id}?sid=151"),
        )
    }

    /// A radio station or other live stream
    pub fn stream(uri: impl Into<String>) -> Self {
        Self::with_kind(TrackKind::Stream, uri.into())
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }

    pub fn with_album_art(mut self, album_art: impl Into<String>) -> Self {
        self.album_art = Some(album_art.into());
        self
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    pub fn number(&self) -> Option<u32> {
        self.number
    }

    pub fn album_art(&self) -> Option<&str> {
        self.album_art.as_deref()
    }

    /// The DIDL-Lite document sent with this track's URI
    pub fn metadata(&self) -> String {
        let mut item = DidlItem {
            title: self.title.clone(),
            creator: self.artist.clone(),
            album: self.album.clone(),
            album_art_uri: self.album_art.clone(),
            original_track_number: self.number,
            class: Some(didl::CLASS_MUSIC_TRACK.to_string()),
            ..DidlItem::new("-1", "-1")
        };

        match self.kind {
            TrackKind::NetworkFile => {
                item.res = Some(self.uri.clone());
            }
            TrackKind::SpotifyTrack => {
                item.id = format!("00032020{}", after(&self.uri, SPOTIFY_PREFIX));
                item.desc = Some(service_token(SPOTIFY_REGION));
            }
            TrackKind::SpotifyAlbum => {
                item.id = format!("0004206c{}", after(&self.uri, SPOTIFY_ALBUM_PREFIX));
                item.class = Some(didl::CLASS_ALBUM.to_string());
                item.desc = Some(service_token(SPOTIFY_REGION));
            }
            TrackKind::SpotifyPlaylist => {
                item.id = format!("0006206c{}", after(&self.uri, SPOTIFY_PLAYLIST_PREFIX));
                item.class = Some(didl::CLASS_PLAYLIST.to_string());
                item.desc = Some(service_token(SPOTIFY_REGION));
            }
            TrackKind::Deezer => {
                item.id = format!("10032020{}", after(&self.uri, "x-sonos-http:"));
                item.desc = Some(service_token(DEEZER_REGION));
            }
            TrackKind::Google | TrackKind::GoogleUnlimited => {
                item.id = format!("10032020{}", after(&self.uri, "x-sonos-http:"));
                item.desc = Some(service_token(GOOGLE_REGION));
            }
            TrackKind::GoogleInstantMix => {
                item.id = format!("000c206c{}", after(&self.uri, RADIO_PREFIX));
                item.class = Some(didl::CLASS_BROADCAST.to_string());
                item.desc = Some(service_token(GOOGLE_REGION));
            }
            TrackKind::Stream => {
                item.class = Some(didl::CLASS_BROADCAST.to_string());
                item.desc = Some(TUNEIN_DESC.to_string());
                if item.title.is_none() {
                    item.title = Some("Stream".to_string());
                }
            }
        }

        item.to_didl()
    }
}

impl Playable for Track {
    fn resolve(&self) -> Result<Track> {
        Ok(self.clone())
    }
}

fn service_token(region: &str) -> String {
    format!("SA_RINCON{region}_X_#Svc{region}-0-Token")
}

fn after<'a>(uri: &'a str, prefix: &str) -> &'a str {
    uri.get(prefix.len()..).unwrap_or("")
}

pub(crate) fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
