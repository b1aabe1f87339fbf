//! A single Sonos unit
//!
//! Identity is fixed at construction. Group membership is owned by the
//! household and only cached here: [`Speaker::group`] and
//! [`Speaker::is_coordinator`] share one `GetZoneGroupAttributes` lookup
//! that stays cached until [`Speaker::update_group`].

use std::cell::RefCell;

use sonos_api::operation::{OperationBuilder, UPnPOperation};
use sonos_api::services::{device_properties, rendering_control, zone_group_topology};
use sonos_api::{ApiError, SonosClient};
use sonos_discovery::Device;

use crate::error::{Result, SdkError};

const MASTER: &str = "Master";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Topology {
    group: String,
    coordinator: bool,
}

/// One physical speaker
///
/// The topology cache is a `RefCell`, so a `Speaker` cannot be shared
/// between threads; wrap the owning [`Network`](crate::Network) in a lock if
/// a host needs that.
#[derive(Debug)]
pub struct Speaker {
    ip: String,
    uuid: String,
    name: String,
    room: String,
    model: String,
    client: SonosClient,
    topology: RefCell<Option<Topology>>,
}

impl Speaker {
    pub fn new(
        ip: impl Into<String>,
        uuid: impl Into<String>,
        room: impl Into<String>,
        client: SonosClient,
    ) -> Self {
        let room = room.into();
        Self {
            ip: ip.into(),
            uuid: uuid.into(),
            name: room.clone(),
            room,
            model: String::new(),
            client,
            topology: RefCell::new(None),
        }
    }

    pub fn from_device(device: &Device, client: SonosClient) -> Self {
        Self {
            ip: device.ip_address.clone(),
            uuid: device.uuid().to_string(),
            name: device.name.clone(),
            room: device.room_name.clone(),
            model: device.model_name.clone(),
            client,
            topology: RefCell::new(None),
        }
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// `RINCON_…` identifier, without the `uuid:` prefix
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build, validate and send one operation to this speaker
    pub(crate) fn execute<Op: UPnPOperation>(
        &self,
        operation: OperationBuilder<Op>,
    ) -> Result<Op::Response> {
        let operation = operation.build().map_err(ApiError::from)?;
        Ok(self.client.execute(&self.ip, operation)?)
    }

    /// The id of the group this speaker belongs to, e.g. `RINCON_…:42`
    pub fn group(&self) -> Result<String> {
        Ok(self.topology()?.group)
    }

    pub fn is_coordinator(&self) -> Result<bool> {
        Ok(self.topology()?.coordinator)
    }

    /// Forget the cached group; the next lookup asks the device again
    pub fn update_group(&self) {
        self.topology.borrow_mut().take();
    }

    fn topology(&self) -> Result<Topology> {
        if let Some(topology) = self.topology.borrow().as_ref() {
            return Ok(topology.clone());
        }

        let attributes = self.execute(zone_group_topology::get_zone_group_attributes())?;
        let group = attributes.current_zone_group_id.trim().to_string();
        if group.is_empty() {
            return Err(SdkError::UnknownGroup {
                speaker: self.uuid.clone(),
            });
        }

        let coordinator = if attributes.member_uuids().len() == 1 {
            true
        } else {
            group.split(':').next() == Some(self.uuid.as_str())
        };

        let topology = Topology { group, coordinator };
        tracing::debug!(
            speaker = %self.uuid,
            group = %topology.group,
            coordinator = topology.coordinator,
            "resolved topology"
        );
        *self.topology.borrow_mut() = Some(topology.clone());
        Ok(topology)
    }

    pub fn volume(&self) -> Result<u8> {
        Ok(self
            .execute(rendering_control::get_volume(MASTER.to_string()))?
            .current_volume)
    }

    pub fn set_volume(&self, volume: u8) -> Result<()> {
        self.execute(rendering_control::set_volume(MASTER.to_string(), volume))
    }

    /// Change the volume by a relative amount, returning the new volume
    pub fn adjust_volume(&self, adjustment: i8) -> Result<u8> {
        Ok(self
            .execute(rendering_control::set_relative_volume(
                MASTER.to_string(),
                adjustment,
            ))?
            .new_volume)
    }

    pub fn is_muted(&self) -> Result<bool> {
        Ok(self
            .execute(rendering_control::get_mute(MASTER.to_string()))?
            .current_mute)
    }

    pub fn mute(&self) -> Result<()> {
        self.execute(rendering_control::set_mute(MASTER.to_string(), true))
    }

    pub fn unmute(&self) -> Result<()> {
        self.execute(rendering_control::set_mute(MASTER.to_string(), false))
    }

    pub fn bass(&self) -> Result<i8> {
        Ok(self.execute(rendering_control::get_bass())?.current_bass)
    }

    /// -10 to 10
    pub fn set_bass(&self, bass: i8) -> Result<()> {
        self.execute(rendering_control::set_bass(bass))
    }

    pub fn treble(&self) -> Result<i8> {
        Ok(self.execute(rendering_control::get_treble())?.current_treble)
    }

    pub fn set_treble(&self, treble: i8) -> Result<()> {
        self.execute(rendering_control::set_treble(treble))
    }

    pub fn loudness(&self) -> Result<bool> {
        Ok(self
            .execute(rendering_control::get_loudness(MASTER.to_string()))?
            .current_loudness)
    }

    pub fn set_loudness(&self, on: bool) -> Result<()> {
        self.execute(rendering_control::set_loudness(MASTER.to_string(), on))
    }

    /// Whether the white status light is on
    pub fn indicator(&self) -> Result<bool> {
        let state = self.execute(device_properties::get_led_state())?;
        Ok(state.current_led_state.eq_ignore_ascii_case("On"))
    }

    pub fn set_indicator(&self, on: bool) -> Result<()> {
        let state = if on { "On" } else { "Off" };
        self.execute(device_properties::set_led_state(state.to_string()))
    }
}
