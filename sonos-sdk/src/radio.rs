//! Radio favourites from "My Radio"

use crate::error::{Result, SdkError};
use crate::lookup::find_by_name;
use crate::speaker::Speaker;
use crate::tracklist::browse_all;
use crate::tracks::Track;

const STATIONS: &str = "R:0/0";
const SHOWS: &str = "R:0/1";

#[derive(Debug)]
pub struct Radio<'a> {
    speaker: &'a Speaker,
}

impl<'a> Radio<'a> {
    pub(crate) fn new(speaker: &'a Speaker) -> Self {
        Self { speaker }
    }

    pub fn stations(&self) -> Result<Vec<Track>> {
        self.favourites(STATIONS)
    }

    pub fn shows(&self) -> Result<Vec<Track>> {
        self.favourites(SHOWS)
    }

    /// Exact title first, then ignoring case and surrounding spaces
    pub fn station(&self, name: &str) -> Result<Track> {
        find_by_name(self.stations()?, name, |track| track.title().unwrap_or_default())
            .ok_or_else(|| SdkError::not_found("station", name))
    }

    pub fn show(&self, name: &str) -> Result<Track> {
        find_by_name(self.shows()?, name, |track| track.title().unwrap_or_default())
            .ok_or_else(|| SdkError::not_found("show", name))
    }

    fn favourites(&self, object_id: &str) -> Result<Vec<Track>> {
        Ok(browse_all(self.speaker, object_id)?
            .into_iter()
            .filter_map(|item| {
                let uri = item.res?;
                let track = Track::stream(uri);
                Some(match item.title {
                    Some(title) => track.with_title(title),
                    None => track,
                })
            })
            .collect())
    }
}
