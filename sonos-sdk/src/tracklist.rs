//! Behaviour shared by the queue and saved playlists
//!
//! Both live in the ContentDirectory and both reject a mutation that does
//! not carry the latest `UpdateID`. [`Container`] browses them page by page
//! and remembers the token each browse reports.

use std::cell::Cell;

use sonos_api::didl;
use sonos_api::services::content_directory;

use crate::error::Result;
use crate::speaker::Speaker;
use crate::tracks::{Track, TrackFactory};

/// Tracks requested per Browse call
pub(crate) const PAGE_SIZE: u32 = 100;

/// An ordered, remotely stored list of tracks
///
/// Positions are 0-based.
pub trait TrackList {
    fn count(&self) -> Result<u32>;

    /// Up to `limit` tracks from `start`, or every remaining track
    fn tracks(&self, start: u32, limit: Option<u32>) -> Result<Vec<Track>>;

    /// Insert at `position`, or append when `None`
    fn add_tracks(&self, tracks: &[Track], position: Option<u32>) -> Result<()>;

    fn remove_tracks(&self, positions: &[u32]) -> Result<()>;

    fn clear(&self) -> Result<()>;

    fn add_track(&self, track: &Track, position: Option<u32>) -> Result<()> {
        self.add_tracks(std::slice::from_ref(track), position)
    }

    fn remove_track(&self, position: u32) -> Result<()> {
        self.remove_tracks(&[position])
    }

    fn all_tracks(&self) -> Result<Vec<Track>> {
        self.tracks(0, None)
    }
}

/// A browsable ContentDirectory object and its update token
#[derive(Debug)]
pub(crate) struct Container<'a> {
    speaker: &'a Speaker,
    object_id: String,
    update_id: Cell<Option<u32>>,
}

impl<'a> Container<'a> {
    pub fn new(speaker: &'a Speaker, object_id: impl Into<String>) -> Self {
        Self {
            speaker,
            object_id: object_id.into(),
            update_id: Cell::new(None),
        }
    }

    pub fn speaker(&self) -> &'a Speaker {
        self.speaker
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// The current token, browsing once if none is known yet
    pub fn update_id(&self) -> Result<u32> {
        match self.update_id.get() {
            Some(id) => Ok(id),
            None => {
                self.browse(0, 1)?;
                Ok(self.update_id.get().unwrap_or_default())
            }
        }
    }

    pub fn set_update_id(&self, update_id: u32) {
        self.update_id.set(Some(update_id));
    }

    /// Force a browse before the next mutation
    pub fn invalidate(&self) {
        self.update_id.set(None);
    }

    pub fn count(&self) -> Result<u32> {
        Ok(self.browse(0, 1)?.total_matches)
    }

    pub fn tracks(&self, start: u32, limit: Option<u32>) -> Result<Vec<Track>> {
        let factory = TrackFactory::default();
        let mut tracks = Vec::new();
        let mut index = start;

        loop {
            let wanted = match limit {
                Some(limit) => limit.saturating_sub(tracks.len() as u32).min(PAGE_SIZE),
                None => PAGE_SIZE,
            };
            if wanted == 0 {
                break;
            }

            let page = self.browse(index, wanted)?;
            let items = didl::parse(&page.result)?;
            if items.is_empty() {
                break;
            }
            index += items.len() as u32;
            tracks.extend(
                items
                    .iter()
                    .map(|item| factory.create_from_didl(item, self.speaker.ip())),
            );
            if index >= page.total_matches {
                break;
            }
        }

        if let Some(limit) = limit {
            tracks.truncate(limit as usize);
        }
        Ok(tracks)
    }

    fn browse(&self, start: u32, count: u32) -> Result<content_directory::BrowseResponse> {
        let response = self.speaker.execute(content_directory::browse_children(
            &self.object_id,
            start,
            count,
        ))?;
        self.update_id.set(Some(response.update_id));
        Ok(response)
    }
}

/// Every direct child of `object_id`, read one page at a time
pub(crate) fn browse_all(speaker: &Speaker, object_id: &str) -> Result<Vec<didl::DidlItem>> {
    let mut items = Vec::new();
    loop {
        let page = speaker.execute(content_directory::browse_children(
            object_id,
            items.len() as u32,
            PAGE_SIZE,
        ))?;
        let parsed = didl::parse(&page.result)?;
        if parsed.is_empty() {
            break;
        }
        items.extend(parsed);
        if items.len() as u32 >= page.total_matches {
            break;
        }
    }
    Ok(items)
}

/// Group sorted, de-duplicated positions into `(start, length)` runs
pub(crate) fn consecutive_ranges(positions: &[u32]) -> Vec<(u32, u32)> {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges: Vec<(u32, u32)> = Vec::new();
    for position in sorted {
        match ranges.last_mut() {
            Some((start, length)) if *start + *length == position => *length += 1,
            _ => ranges.push((position, 1)),
        }
    }
    ranges
}
