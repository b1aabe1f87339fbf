//! Group coordinators
//!
//! Only the coordinator of a group accepts transport and queue commands.
//! [`Controller`] wraps such a speaker and exposes playback, play modes,
//! group membership and state capture/restore. Playback state is never
//! tracked locally: every query goes to the device.

use std::fmt;
use std::ops::Deref;

use sonos_api::didl;
use sonos_api::services::av_transport;

use crate::error::{Result, SdkError};
use crate::group::{GroupInterrupt, InterruptOptions, InterruptReport};
use crate::network::Network;
use crate::queue::Queue;
use crate::speaker::Speaker;
use crate::state::ControllerState;
use crate::time::Time;
use crate::tracklist::TrackList;
use crate::tracks::{is_stream_uri, Playable, Track, TrackFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayState {
    Stopped,
    Playing,
    Paused,
    Transitioning,
    Unknown,
}

impl PlayState {
    /// Map a `CurrentTransportState` value; anything unrecognised is `Unknown`
    pub fn from_transport_state(state: &str) -> Self {
        match state.trim() {
            "STOPPED" => PlayState::Stopped,
            "PLAYING" => PlayState::Playing,
            "PAUSED_PLAYBACK" => PlayState::Paused,
            "TRANSITIONING" => PlayState::Transitioning,
            _ => PlayState::Unknown,
        }
    }
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayState::Stopped => "STOPPED",
            PlayState::Playing => "PLAYING",
            PlayState::Paused => "PAUSED",
            PlayState::Transitioning => "TRANSITIONING",
            PlayState::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Repeat and shuffle together, as the device stores them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mode {
    pub repeat: bool,
    pub shuffle: bool,
}

impl Mode {
    pub fn from_play_mode(play_mode: &str) -> Self {
        let (repeat, shuffle) = match play_mode.trim() {
            "REPEAT_ALL" | "REPEAT_ONE" => (true, false),
            "SHUFFLE_NOREPEAT" => (false, true),
            "SHUFFLE" | "SHUFFLE_REPEAT_ONE" => (true, true),
            _ => (false, false),
        };
        Self { repeat, shuffle }
    }

    pub fn as_play_mode(&self) -> &'static str {
        match (self.repeat, self.shuffle) {
            (false, false) => "NORMAL",
            (true, false) => "REPEAT_ALL",
            (false, true) => "SHUFFLE_NOREPEAT",
            (true, true) => "SHUFFLE",
        }
    }
}

/// What the coordinator is playing right now
#[derive(Debug, Clone, PartialEq)]
pub struct StateDetails {
    pub track: Option<Track>,
    /// 0-based queue position, `None` when the queue is not the source
    pub queue_number: Option<u32>,
    pub position: Time,
    pub duration: Time,
    pub stream: bool,
}

/// A speaker known to coordinate its group
pub struct Controller<'a> {
    speaker: &'a Speaker,
    network: &'a Network,
}

impl<'a> Controller<'a> {
    /// Fails with `InvalidArgument` unless `speaker` is a coordinator
    pub fn new(speaker: &'a Speaker, network: &'a Network) -> Result<Self> {
        if !speaker.is_coordinator()? {
            return Err(SdkError::InvalidArgument(format!(
                "{} ({}) is not a group coordinator",
                speaker.room(),
                speaker.uuid()
            )));
        }
        Ok(Self { speaker, network })
    }

    pub fn speaker(&self) -> &'a Speaker {
        self.speaker
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    /// Start playback
    ///
    /// A fault while the queue is the source and holds nothing is reported
    /// as [`SdkError::EmptyQueue`]; every other fault is returned as sent.
    pub fn play(&self) -> Result<()> {
        match self.execute(av_transport::play("1".to_string())) {
            Err(err @ SdkError::ApiError(sonos_api::ApiError::SoapFault { .. })) => {
                if matches!(self.is_using_queue(), Ok(true))
                    && matches!(self.queue().count(), Ok(0))
                {
                    Err(SdkError::EmptyQueue)
                } else {
                    Err(err)
                }
            }
            other => other,
        }
    }

    pub fn pause(&self) -> Result<()> {
        self.execute(av_transport::pause())
    }

    pub fn stop(&self) -> Result<()> {
        self.execute(av_transport::stop())
    }

    pub fn next(&self) -> Result<()> {
        self.execute(av_transport::next())
    }

    pub fn previous(&self) -> Result<()> {
        self.execute(av_transport::previous())
    }

    /// Jump to a position in the current track
    pub fn seek(&self, position: Time) -> Result<()> {
        self.execute(av_transport::seek(
            "REL_TIME".to_string(),
            position.to_string(),
        ))
    }

    /// Jump to the queue entry at 0-based `position`
    pub fn select_track(&self, position: u32) -> Result<()> {
        let number = position.checked_add(1).ok_or_else(|| {
            SdkError::InvalidArgument(format!("queue position {position} is out of range"))
        })?;
        self.execute(av_transport::seek("TRACK_NR".to_string(), number.to_string()))
    }

    pub fn state(&self) -> Result<PlayState> {
        Ok(PlayState::from_transport_state(&self.state_name()?))
    }

    /// The raw `CurrentTransportState` string
    pub fn state_name(&self) -> Result<String> {
        Ok(self
            .execute(av_transport::get_transport_info())?
            .current_transport_state)
    }

    pub fn state_details(&self) -> Result<StateDetails> {
        let position = self.execute(av_transport::get_position_info())?;
        let stream = self.is_streaming()?;

        let track = if position.track_uri.is_empty() {
            None
        } else {
            let factory = TrackFactory::default();
            let track = match didl::parse(&position.track_meta_data)
                .ok()
                .and_then(|items| items.into_iter().next())
            {
                Some(mut item) => {
                    item.res = Some(position.track_uri.clone());
                    factory.create_from_didl(&item, self.ip())
                }
                None => factory.create_from_uri(&position.track_uri),
            };
            Some(track)
        };

        Ok(StateDetails {
            track,
            queue_number: (!stream && position.track > 0).then(|| position.track - 1),
            position: Time::parse(&position.rel_time)?,
            duration: Time::parse(&position.track_duration)?,
            stream,
        })
    }

    // =========================================================================
    // PLAY MODES
    // =========================================================================

    pub fn mode(&self) -> Result<Mode> {
        let settings = self.execute(av_transport::get_transport_settings())?;
        Ok(Mode::from_play_mode(&settings.play_mode))
    }

    pub fn set_mode(&self, mode: Mode) -> Result<()> {
        self.execute(av_transport::set_play_mode(
            mode.as_play_mode().to_string(),
        ))
    }

    pub fn repeat(&self) -> Result<bool> {
        Ok(self.mode()?.repeat)
    }

    pub fn set_repeat(&self, repeat: bool) -> Result<()> {
        let mode = self.mode()?;
        if mode.repeat == repeat {
            return Ok(());
        }
        self.set_mode(Mode { repeat, ..mode })
    }

    pub fn shuffle(&self) -> Result<bool> {
        Ok(self.mode()?.shuffle)
    }

    pub fn set_shuffle(&self, shuffle: bool) -> Result<()> {
        let mode = self.mode()?;
        if mode.shuffle == shuffle {
            return Ok(());
        }
        self.set_mode(Mode { shuffle, ..mode })
    }

    pub fn crossfade(&self) -> Result<bool> {
        Ok(self
            .execute(av_transport::get_crossfade_mode())?
            .crossfade_mode)
    }

    pub fn set_crossfade(&self, crossfade: bool) -> Result<()> {
        self.execute(av_transport::set_crossfade_mode(crossfade))
    }

    // =========================================================================
    // GROUP MEMBERSHIP
    // =========================================================================

    /// Make `speaker` join this group
    ///
    /// The other speaker's cached group is dropped.
    pub fn add_speaker(&self, speaker: &Speaker) -> Result<()> {
        if speaker.uuid() == self.uuid() {
            return Ok(());
        }
        tracing::info!(group = %self.uuid(), speaker = %speaker.uuid(), "adding speaker to group");
        let result = speaker.execute(av_transport::set_av_transport_uri(
            format!("x-rincon:{}", self.uuid()),
            String::new(),
        ));
        speaker.update_group();
        result
    }

    /// Make `speaker` leave this group and stand alone
    pub fn remove_speaker(&self, speaker: &Speaker) -> Result<()> {
        tracing::info!(group = %self.uuid(), speaker = %speaker.uuid(), "removing speaker from group");
        let result = speaker
            .execute(av_transport::become_coordinator_of_standalone_group())
            .map(|_| ());
        speaker.update_group();
        result
    }

    /// Every speaker in this group, this one included
    pub fn speakers(&self) -> Result<Vec<&'a Speaker>> {
        let group = self.group()?;
        let mut members = Vec::new();
        for speaker in self.network.speakers() {
            if speaker.group()? == group {
                members.push(speaker);
            }
        }
        Ok(members)
    }

    // =========================================================================
    // SOURCES
    // =========================================================================

    pub fn queue(&self) -> Queue<'a> {
        Queue::new(self.speaker)
    }

    /// Play from this coordinator's queue
    pub fn use_queue(&self) -> Result<()> {
        self.execute(av_transport::set_av_transport_uri(
            format!("x-rincon-queue:{}#0", self.uuid()),
            String::new(),
        ))
    }

    /// Play a stream directly, bypassing the queue
    pub fn use_stream(&self, track: &Track) -> Result<()> {
        self.execute(av_transport::set_av_transport_uri(
            track.uri().to_string(),
            track.metadata(),
        ))
    }

    /// Play the line-in socket of `speaker`
    pub fn use_line_in(&self, speaker: &Speaker) -> Result<()> {
        self.execute(av_transport::set_av_transport_uri(
            format!("x-rincon-stream:{}", speaker.uuid()),
            String::new(),
        ))
    }

    pub fn is_using_queue(&self) -> Result<bool> {
        Ok(self.current_uri()?.starts_with("x-rincon-queue:"))
    }

    pub fn is_streaming(&self) -> Result<bool> {
        Ok(is_stream_uri(&self.current_uri()?))
    }

    /// The current stream, `None` when playing from the queue
    pub(crate) fn current_stream(&self) -> Result<Option<Track>> {
        let media = self.execute(av_transport::get_media_info())?;
        if !is_stream_uri(&media.current_uri) {
            return Ok(None);
        }
        let track = match didl::parse(&media.current_uri_meta_data)
            .ok()
            .and_then(|items| items.into_iter().next())
            .and_then(|item| item.title)
        {
            Some(title) => Track::stream(media.current_uri).with_title(title),
            None => Track::stream(media.current_uri),
        };
        Ok(Some(track))
    }

    fn current_uri(&self) -> Result<String> {
        Ok(self.execute(av_transport::get_media_info())?.current_uri)
    }

    // =========================================================================
    // GROUP VOLUME
    // =========================================================================

    /// Average volume of the group's speakers
    pub fn volume(&self) -> Result<u8> {
        let speakers = self.speakers()?;
        let mut total: u32 = 0;
        for speaker in &speakers {
            total += u32::from(speaker.volume()?);
        }
        let count = speakers.len().max(1) as u32;
        Ok(((total + count / 2) / count) as u8)
    }

    /// Set every speaker in the group to `volume`
    pub fn set_volume(&self, volume: u8) -> Result<()> {
        for speaker in self.speakers()? {
            speaker.set_volume(volume)?;
        }
        Ok(())
    }

    pub fn adjust_volume(&self, adjustment: i8) -> Result<()> {
        for speaker in self.speakers()? {
            speaker.adjust_volume(adjustment)?;
        }
        Ok(())
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Snapshot the group's playback, pausing first when `pause` is set
    pub fn export_state(&self, pause: bool) -> Result<ControllerState> {
        ControllerState::export(self, pause)
    }

    pub fn restore_state(&self, state: &ControllerState) -> Result<()> {
        state.restore(self)
    }

    /// Play `track` on this group only, then put everything back
    pub fn interrupt(&self, track: &dyn Playable, volume: Option<u8>) -> Result<InterruptReport> {
        let options = InterruptOptions::default();
        let options = match volume {
            Some(volume) => options.with_volume(volume),
            None => options,
        };
        GroupInterrupt::new(self.network)
            .with_options(options)
            .run(&[self.speaker], track)
    }
}

impl Deref for Controller<'_> {
    type Target = Speaker;

    fn deref(&self) -> &Speaker {
        self.speaker
    }
}

impl fmt::Debug for Controller<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("uuid", &self.speaker.uuid())
            .field("room", &self.speaker.room())
            .finish()
    }
}
