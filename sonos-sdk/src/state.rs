//! Snapshot and restore of a coordinator's playback
//!
//! A [`ControllerState`] copies everything needed to put a group back the
//! way it was: transport state, queue contents by value, position, play
//! modes, the active stream and the volume of every member.

use crate::controller::{Controller, Mode, PlayState};
use crate::error::Result;
use crate::time::Time;
use crate::tracklist::TrackList;
use crate::tracks::Track;

use sonos_api::services::av_transport;

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub state: PlayState,
    /// 0-based queue position of the active track
    pub track: u32,
    pub position: Time,
    pub repeat: bool,
    pub shuffle: bool,
    pub crossfade: bool,
    pub tracks: Vec<Track>,
    /// Set when the group was playing a stream instead of the queue
    pub stream: Option<Track>,
    /// `(uuid, volume)` of every member of the group
    pub volumes: Vec<(String, u8)>,
}

impl ControllerState {
    /// Capture `controller`, pausing it first when `pause` is set and it is
    /// playing
    pub fn export(controller: &Controller<'_>, pause: bool) -> Result<Self> {
        let state = controller.state()?;
        if pause && state == PlayState::Playing {
            controller.pause()?;
        }

        let position = controller.execute(av_transport::get_position_info())?;
        let mode = controller.mode()?;
        let crossfade = controller.crossfade()?;
        let tracks = controller.queue().all_tracks()?;
        let stream = controller.current_stream()?;

        let mut volumes = Vec::new();
        for speaker in controller.speakers()? {
            volumes.push((speaker.uuid().to_string(), speaker.volume()?));
        }

        tracing::debug!(
            controller = %controller.uuid(),
            %state,
            tracks = tracks.len(),
            "exported state"
        );

        Ok(Self {
            state,
            track: position.track.saturating_sub(1),
            position: Time::parse(&position.rel_time)?,
            repeat: mode.repeat,
            shuffle: mode.shuffle,
            crossfade,
            tracks,
            stream,
            volumes,
        })
    }

    /// Put `controller` back into this state
    ///
    /// Steps run in a fixed order with the transport command last; the
    /// first failure is returned and the rest are not attempted.
    ///
    /// Repeat, shuffle and crossfade are only reapplied when the queue is
    /// the restored source. A stream has no play mode, and devices fault
    /// `SetPlayMode` while one is selected.
    pub fn restore(&self, controller: &Controller<'_>) -> Result<()> {
        tracing::debug!(controller = %controller.uuid(), state = %self.state, "restoring state");

        let queue = controller.queue();
        queue.clear()?;
        if !self.tracks.is_empty() {
            queue.add_tracks(&self.tracks, None)?;
        }

        match &self.stream {
            Some(stream) => controller.use_stream(stream)?,
            None => {
                controller.use_queue()?;
                if !self.tracks.is_empty() {
                    controller.select_track(self.track)?;
                    if !self.position.is_zero() {
                        controller.seek(self.position)?;
                    }
                }
                controller.set_mode(Mode {
                    repeat: self.repeat,
                    shuffle: self.shuffle,
                })?;
                controller.set_crossfade(self.crossfade)?;
            }
        }

        for (uuid, volume) in &self.volumes {
            match controller.network().speaker_by_uuid(uuid) {
                Some(speaker) => speaker.set_volume(*volume)?,
                None => tracing::warn!(speaker = %uuid, "speaker gone, volume not restored"),
            }
        }

        if self.state == PlayState::Playing {
            controller.play()?;
        }
        Ok(())
    }
}
