//! # Sonos SDK - group coordination for Sonos speakers
//!
//! Control a household of Sonos speakers over UPnP/SOAP:
//!
//! ```rust,ignore
//! use sonos_sdk::{Network, Track, TrackList};
//!
//! fn main() -> Result<(), sonos_sdk::SdkError> {
//!     let network = Network::discover()?;
//!     let kitchen = network.controller_by_room("Kitchen")?;
//!
//!     // Queue a track and play it
//!     let track = Track::network_file("x-file-cifs://nas/music/song.mp3");
//!     kitchen.queue().add_track(&track, None)?;
//!     kitchen.use_queue()?;
//!     kitchen.play()?;
//!
//!     // Interrupt the group with an announcement, then put everything back
//!     let chime = Track::network_file("x-file-cifs://nas/sounds/chime.mp3");
//!     kitchen.interrupt(&chime, Some(40))?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Topology**: every [`Speaker`] knows its group and whether it
//!   coordinates it; the answer is cached until [`Speaker::update_group`]
//! - **Controllers**: transport, play modes, group membership and sources
//!   for a group coordinator
//! - **State transfer**: [`ControllerState`] captures a group's queue,
//!   position, modes and volumes and restores them later
//! - **Interrupts**: [`GroupInterrupt`] plays a track on any set of
//!   speakers and restores every group it touched, reporting each step
//! - **Library**: the queue, saved playlists, alarms and radio favourites
//!
//! ## Architecture
//!
//! ```text
//! sonos-sdk (Network, Speaker, Controller, GroupInterrupt)
//!     ↓
//! sonos-api (typed UPnP operations, DIDL-Lite)
//!     ↓
//! soap-client (SOAP over HTTP)
//! ```
//!
//! Everything is blocking and single-threaded: a [`Network`] and its
//! speakers are `!Sync`.

// Main exports
pub use alarm::{Alarm, Frequency};
pub use controller::{Controller, Mode, PlayState, StateDetails};
pub use error::{Result, SdkError};
pub use group::{
    ActionOutcome, Completion, GroupInterrupt, InterruptOptions, InterruptReport, PollPolicy,
    RestoreAction,
};
pub use network::Network;
pub use playlist::Playlist;
pub use queue::Queue;
pub use radio::Radio;
pub use speaker::Speaker;
pub use state::ControllerState;
pub use time::Time;
pub use tracklist::TrackList;
pub use tracks::{
    is_stream_uri, Directory, Playable, Synthesizer, TextToSpeech, Track, TrackFactory, TrackKind,
    VoiceRss, STREAM_PREFIXES,
};

// Re-export the layers below
pub use sonos_api;
pub use sonos_discovery::Device;

// Internal modules
mod alarm;
mod controller;
mod error;
mod group;
mod lookup;
mod network;
mod playlist;
mod queue;
mod radio;
mod speaker;
mod state;
mod time;
mod tracklist;
mod tracks;
