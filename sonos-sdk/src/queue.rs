//! The play queue of a group coordinator (`Q:0`)

use sonos_api::services::av_transport;

use crate::error::Result;
use crate::speaker::Speaker;
use crate::tracklist::{consecutive_ranges, Container, TrackList};
use crate::tracks::Track;

/// Most URIs one `AddMultipleURIsToQueue` call accepts
const ADD_CHUNK: usize = 16;

/// The queue of one coordinator
///
/// ```rust,ignore
/// let queue = network.controller()?.queue();
/// queue.add_tracks(&[Track::network_file("x-file-cifs://nas/a.mp3")], None)?;
/// queue.remove_track(0)?;
/// ```
#[derive(Debug)]
pub struct Queue<'a> {
    container: Container<'a>,
}

impl<'a> Queue<'a> {
    pub(crate) fn new(speaker: &'a Speaker) -> Self {
        Self {
            container: Container::new(speaker, "Q:0"),
        }
    }

    fn speaker(&self) -> &'a Speaker {
        self.container.speaker()
    }
}

impl TrackList for Queue<'_> {
    fn count(&self) -> Result<u32> {
        self.container.count()
    }

    fn tracks(&self, start: u32, limit: Option<u32>) -> Result<Vec<Track>> {
        self.container.tracks(start, limit)
    }

    fn add_tracks(&self, tracks: &[Track], position: Option<u32>) -> Result<()> {
        // 0 appends, otherwise the 1-based slot of the first new track
        let mut desired = position.map_or(0, |p| p + 1);

        for chunk in tracks.chunks(ADD_CHUNK) {
            let uris = chunk.iter().map(Track::uri).collect::<Vec<_>>().join(" ");
            let metadata = chunk
                .iter()
                .map(Track::metadata)
                .collect::<Vec<_>>()
                .join(" ");

            let response = self
                .speaker()
                .execute(av_transport::add_multiple_uris_to_queue(
                    self.container.update_id()?,
                    chunk.len() as u32,
                    uris,
                    metadata,
                    String::new(),
                    String::new(),
                    desired,
                    false,
                ))?;
            self.container.set_update_id(response.new_update_id);
            tracing::debug!(
                speaker = %self.speaker().uuid(),
                added = response.num_tracks_added,
                length = response.new_queue_length,
                "queued tracks"
            );

            if desired > 0 {
                desired += chunk.len() as u32;
            }
        }
        Ok(())
    }

    fn remove_tracks(&self, positions: &[u32]) -> Result<()> {
        // Back to front so earlier ranges keep their positions
        for (start, length) in consecutive_ranges(positions).into_iter().rev() {
            let response = self
                .speaker()
                .execute(av_transport::remove_track_range_from_queue(
                    self.container.update_id()?,
                    start + 1,
                    length,
                ))?;
            self.container.set_update_id(response.new_update_id);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.speaker()
            .execute(av_transport::remove_all_tracks_from_queue())?;
        self.container.invalidate();
        Ok(())
    }
}
