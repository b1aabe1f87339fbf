//! Network - entry point owning every discovered speaker
//!
//! There is no process-wide registry: callers hold a [`Network`] and pass
//! it (or its speakers) around explicitly.

use std::time::Duration;

use sonos_api::services::{alarm_clock, av_transport};
use sonos_api::SonosClient;
use sonos_discovery::Device;

use crate::alarm::Alarm;
use crate::controller::Controller;
use crate::error::{Result, SdkError};
use crate::group::{GroupInterrupt, InterruptOptions, InterruptReport};
use crate::lookup::find_by_name;
use crate::playlist::Playlist;
use crate::radio::Radio;
use crate::speaker::Speaker;
use crate::tracklist::browse_all;
use crate::tracks::Playable;

/// All speakers of one household
///
/// # Example
///
/// ```rust,ignore
/// use sonos_sdk::Network;
///
/// fn main() -> Result<(), sonos_sdk::SdkError> {
///     let network = Network::discover()?;
///     let kitchen = network.controller_by_room("Kitchen")?;
///     kitchen.pause()?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Network {
    client: SonosClient,
    speakers: Vec<Speaker>,
}

impl Network {
    /// Find speakers with SSDP, waiting the default three seconds
    pub fn discover() -> Result<Self> {
        let devices = sonos_discovery::get()?;
        Ok(Self::from_devices(SonosClient::new(), devices))
    }

    pub fn discover_with_timeout(timeout: Duration) -> Result<Self> {
        let devices = sonos_discovery::get_with_timeout(timeout)?;
        Ok(Self::from_devices(SonosClient::new(), devices))
    }

    /// Use devices found elsewhere; duplicates by UUID are dropped
    pub fn from_devices(client: SonosClient, devices: Vec<Device>) -> Self {
        let mut speakers: Vec<Speaker> = Vec::with_capacity(devices.len());
        for device in &devices {
            if speakers.iter().any(|s| s.uuid() == device.uuid()) {
                continue;
            }
            speakers.push(Speaker::from_device(device, client.clone()));
        }
        tracing::info!(speakers = speakers.len(), "network ready");
        Self { client, speakers }
    }

    pub fn client(&self) -> &SonosClient {
        &self.client
    }

    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    /// Look a speaker up by room name, exact match first
    pub fn speaker_by_room(&self, room: &str) -> Result<&Speaker> {
        find_by_name(&self.speakers, room, |speaker| speaker.room())
            .ok_or_else(|| SdkError::not_found("room", room))
    }

    pub fn speaker_by_uuid(&self, uuid: &str) -> Option<&Speaker> {
        self.speakers.iter().find(|speaker| speaker.uuid() == uuid)
    }

    /// Drop every speaker's cached group
    pub fn invalidate_topology(&self) {
        for speaker in &self.speakers {
            speaker.update_group();
        }
    }

    // =========================================================================
    // CONTROLLERS
    // =========================================================================

    /// One controller per group
    pub fn controllers(&self) -> Result<Vec<Controller<'_>>> {
        let mut controllers = Vec::new();
        for speaker in &self.speakers {
            if speaker.is_coordinator()? {
                controllers.push(Controller::new(speaker, self)?);
            }
        }
        Ok(controllers)
    }

    /// The first group coordinator found
    pub fn controller(&self) -> Result<Controller<'_>> {
        for speaker in &self.speakers {
            if speaker.is_coordinator()? {
                return Controller::new(speaker, self);
            }
        }
        Err(SdkError::not_found("controller", "any group"))
    }

    /// The coordinator of the group `room` belongs to
    pub fn controller_by_room(&self, room: &str) -> Result<Controller<'_>> {
        self.controller_for(self.speaker_by_room(room)?)
    }

    /// The coordinator of `speaker`'s group
    pub fn controller_for<'a>(&'a self, speaker: &Speaker) -> Result<Controller<'a>> {
        let speaker = self
            .speaker_by_uuid(speaker.uuid())
            .ok_or_else(|| SdkError::not_found("speaker", speaker.uuid()))?;
        if speaker.is_coordinator()? {
            return Controller::new(speaker, self);
        }

        let group = speaker.group()?;
        let leader = group.split(':').next().unwrap_or_default();
        if let Some(coordinator) = self.speaker_by_uuid(leader) {
            if coordinator.group()? == group && coordinator.is_coordinator()? {
                return Controller::new(coordinator, self);
            }
        }
        for candidate in &self.speakers {
            if candidate.group()? == group && candidate.is_coordinator()? {
                return Controller::new(candidate, self);
            }
        }
        Err(SdkError::not_found("coordinator of group", group))
    }

    fn any_speaker(&self) -> Result<&Speaker> {
        self.speakers
            .first()
            .ok_or_else(|| SdkError::not_found("speaker", "any"))
    }

    // =========================================================================
    // PLAYLISTS
    // =========================================================================

    pub fn playlists(&self) -> Result<Vec<Playlist<'_>>> {
        let speaker = self.any_speaker()?;
        Ok(browse_all(speaker, "SQ:")?
            .into_iter()
            .map(|item| {
                let name = item.title.unwrap_or_default();
                Playlist::new(speaker, item.id, name)
            })
            .collect())
    }

    /// Exact name first, then ignoring case and surrounding spaces
    pub fn playlist_by_name(&self, name: &str) -> Result<Playlist<'_>> {
        find_by_name(self.playlists()?, name, |playlist| playlist.name())
            .ok_or_else(|| SdkError::not_found("playlist", name))
    }

    /// Accepts `SQ:3` or just `3`
    pub fn playlist_by_id(&self, id: &str) -> Result<Playlist<'_>> {
        let id = if id.starts_with("SQ:") {
            id.to_string()
        } else {
            format!("SQ:{id}")
        };
        self.playlists()?
            .into_iter()
            .find(|playlist| playlist.id() == id)
            .ok_or_else(|| SdkError::not_found("playlist", id))
    }

    pub fn has_playlist(&self, name: &str) -> Result<bool> {
        match self.playlist_by_name(name) {
            Ok(_) => Ok(true),
            Err(SdkError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub fn create_playlist(&self, name: &str) -> Result<Playlist<'_>> {
        let speaker = self.any_speaker()?;
        let response = speaker.execute(av_transport::create_saved_queue(
            name.to_string(),
            String::new(),
            String::new(),
        ))?;
        tracing::info!(playlist = %response.assigned_object_id, name, "created playlist");
        Ok(Playlist::new(speaker, response.assigned_object_id, name))
    }

    // =========================================================================
    // ALARMS AND RADIO
    // =========================================================================

    pub fn alarms(&self) -> Result<Vec<Alarm<'_>>> {
        let speaker = self.any_speaker()?;
        let response = speaker.execute(alarm_clock::list_alarms())?;
        let list = alarm_clock::AlarmList::from_xml(&response.current_alarm_list)?;
        Ok(list
            .alarms
            .into_iter()
            .map(|entry| Alarm::new(speaker, entry))
            .collect())
    }

    pub fn alarm_by_id(&self, id: u32) -> Result<Alarm<'_>> {
        self.alarms()?
            .into_iter()
            .find(|alarm| alarm.id() == id)
            .ok_or_else(|| SdkError::not_found("alarm", id.to_string()))
    }

    pub fn radio(&self) -> Result<Radio<'_>> {
        Ok(Radio::new(self.any_speaker()?))
    }

    // =========================================================================
    // INTERRUPTS
    // =========================================================================

    /// Play `track` on exactly `speakers`, then restore every affected group
    ///
    /// See [`GroupInterrupt`].
    pub fn interrupt(
        &self,
        speakers: &[&Speaker],
        track: &dyn Playable,
        options: InterruptOptions,
    ) -> Result<InterruptReport> {
        GroupInterrupt::new(self).with_options(options).run(speakers, track)
    }
}
