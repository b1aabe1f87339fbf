use sonos_api::didl::DidlItem;

use super::{
    is_stream_uri, starts_with_ignore_case, Track, DEEZER_PREFIX, GOOGLE_PREFIX,
    GOOGLE_UNLIMITED_PREFIX, RADIO_PREFIX, SPOTIFY_ALBUM_PREFIX, SPOTIFY_PLAYLIST_PREFIX,
    SPOTIFY_PREFIX,
};

type Predicate = fn(&str) -> bool;
type Constructor = fn(&str) -> Track;

/// Builds the right [`Track`] variant for a URI
///
/// Rules are tried in order; the first matching predicate wins and anything
/// unmatched becomes a network file.
///
/// ```rust
/// use sonos_sdk::{TrackFactory, TrackKind};
///
/// let factory = TrackFactory::default();
/// let track = factory.create_from_uri("spotify:track:4iV5W9uYEdYUVa79Axb7Rh");
/// assert_eq!(track.kind(), TrackKind::SpotifyTrack);
/// ```
#[derive(Clone)]
pub struct TrackFactory {
    rules: Vec<(Predicate, Constructor)>,
}

impl TrackFactory {
    /// A factory with no rules: every URI is a network file
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule, tried after those already registered
    pub fn with_rule(mut self, predicate: Predicate, constructor: Constructor) -> Self {
        self.rules.push((predicate, constructor));
        self
    }

    pub fn create_from_uri(&self, uri: &str) -> Track {
        self.rules
            .iter()
            .find(|(matches, _)| matches(uri))
            .map(|(_, create)| create(uri))
            .unwrap_or_else(|| Track::network_file(uri))
    }

    /// Build a track from a browse result
    ///
    /// Relative album art paths are made absolute against the speaker at `ip`.
    pub fn create_from_didl(&self, item: &DidlItem, ip: &str) -> Track {
        let mut track = self.create_from_uri(item.res.as_deref().unwrap_or_default());
        if let Some(title) = &item.title {
            track = track.with_title(title.clone());
        }
        if let Some(artist) = &item.creator {
            track = track.with_artist(artist.clone());
        }
        if let Some(album) = &item.album {
            track = track.with_album(album.clone());
        }
        if let Some(number) = item.original_track_number {
            track = track.with_number(number);
        }
        if let Some(art) = &item.album_art_uri {
            track = track.with_album_art(absolute_art(art, ip));
        }
        track
    }
}

impl Default for TrackFactory {
    fn default() -> Self {
        Self::empty()
            .with_rule(
                |uri| uri.starts_with(SPOTIFY_PREFIX) || uri.starts_with("spotify:track:"),
                Track::spotify,
            )
            .with_rule(
                |uri| uri.starts_with(SPOTIFY_ALBUM_PREFIX) || uri.starts_with("spotify:album:"),
                Track::spotify_album,
            )
            .with_rule(
                |uri| {
                    uri.starts_with(SPOTIFY_PLAYLIST_PREFIX)
                        || (uri.starts_with("spotify:") && uri.contains(":playlist:"))
                },
                Track::spotify_playlist,
            )
            .with_rule(|uri| starts_with_ignore_case(uri, DEEZER_PREFIX), Track::deezer)
            .with_rule(
                |uri| uri.starts_with(GOOGLE_UNLIMITED_PREFIX),
                Track::google_unlimited,
            )
            .with_rule(|uri| uri.starts_with(GOOGLE_PREFIX), Track::google)
            .with_rule(
                |uri| uri.starts_with(RADIO_PREFIX) && uri.contains("sid=151"),
                Track::google_instant_mix,
            )
            .with_rule(is_stream_uri, |uri| Track::stream(uri))
    }
}

impl std::fmt::Debug for TrackFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackFactory")
            .field("rules", &self.rules.len())
            .finish()
    }
}

fn absolute_art(art: &str, ip: &str) -> String {
    if art.starts_with("http://") || art.starts_with("https://") {
        art.to_string()
    } else if art.starts_with('/') {
        format!("http://{ip}:1400{art}")
    } else {
        format!("http://{ip}:1400/{art}")
    }
}
