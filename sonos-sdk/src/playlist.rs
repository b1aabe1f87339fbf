//! Saved queues (`SQ:n`), shown as playlists in the Sonos apps

use sonos_api::services::{av_transport, content_directory};

use crate::error::Result;
use crate::speaker::Speaker;
use crate::tracklist::{consecutive_ranges, Container, TrackList};
use crate::tracks::Track;

/// `AddAtIndex` value that appends
const APPEND: u32 = u32::MAX;

#[derive(Debug)]
pub struct Playlist<'a> {
    container: Container<'a>,
    name: String,
}

impl<'a> Playlist<'a> {
    pub(crate) fn new(speaker: &'a Speaker, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            container: Container::new(speaker, id),
            name: name.into(),
        }
    }

    /// The `SQ:n` object id
    pub fn id(&self) -> &str {
        self.container.object_id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn speaker(&self) -> &'a Speaker {
        self.container.speaker()
    }

    /// Move the track at `from` so it ends up at `to`
    pub fn move_track(&self, from: u32, to: u32) -> Result<()> {
        self.reorder(from.to_string(), to.to_string())
    }

    /// Remove the playlist from the household
    pub fn delete(self) -> Result<()> {
        tracing::info!(playlist = %self.id(), name = %self.name, "deleting playlist");
        self.speaker()
            .execute(content_directory::destroy_object(self.id().to_string()))
    }

    fn reorder(&self, track_list: String, new_position_list: String) -> Result<()> {
        let response = self
            .speaker()
            .execute(av_transport::reorder_tracks_in_saved_queue(
                self.id().to_string(),
                self.container.update_id()?,
                track_list,
                new_position_list,
            ))?;
        self.container.set_update_id(response.new_update_id);
        Ok(())
    }
}

impl TrackList for Playlist<'_> {
    fn count(&self) -> Result<u32> {
        self.container.count()
    }

    fn tracks(&self, start: u32, limit: Option<u32>) -> Result<Vec<Track>> {
        self.container.tracks(start, limit)
    }

    fn add_tracks(&self, tracks: &[Track], position: Option<u32>) -> Result<()> {
        for (offset, track) in tracks.iter().enumerate() {
            let index = position.map_or(APPEND, |p| p + offset as u32);
            let response = self
                .speaker()
                .execute(av_transport::add_uri_to_saved_queue(
                    self.id().to_string(),
                    self.container.update_id()?,
                    track.uri().to_string(),
                    track.metadata(),
                    index,
                ))?;
            self.container.set_update_id(response.new_update_id);
        }
        Ok(())
    }

    /// An empty new position list removes the listed tracks
    fn remove_tracks(&self, positions: &[u32]) -> Result<()> {
        let ranges = consecutive_ranges(positions);
        if ranges.is_empty() {
            return Ok(());
        }
        let track_list = ranges
            .iter()
            .flat_map(|&(start, length)| start..start + length)
            .map(|position| position.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.reorder(track_list, String::new())
    }

    fn clear(&self) -> Result<()> {
        let count = self.count()?;
        if count == 0 {
            return Ok(());
        }
        self.remove_tracks(&(0..count).collect::<Vec<_>>())
    }
}
