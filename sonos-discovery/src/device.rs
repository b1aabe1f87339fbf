//! Device description parsing.
//!
//! Every speaker serves `/xml/device_description.xml`; the fields we keep
//! end up on [`Device`].

use crate::error::{DiscoveryError, Result};
use crate::Device;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Root {
    device: DeviceDescription,
}

/// The parts of the UPnP device description Sonos speakers publish.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    pub device_type: String,
    pub friendly_name: String,
    pub manufacturer: String,
    pub model_name: String,
    pub model_number: Option<String>,
    #[serde(rename = "UDN")]
    pub udn: String,
    pub room_name: Option<String>,
    pub display_name: Option<String>,
}

impl DeviceDescription {
    /// Parse a device description document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let root: Root = quick_xml::de::from_str(xml)
            .map_err(|e| DiscoveryError::ParseError(format!("Failed to parse device XML: {e}")))?;
        Ok(root.device)
    }

    pub fn is_sonos_device(&self) -> bool {
        self.manufacturer.to_lowercase().contains("sonos")
            && self.device_type.contains("ZonePlayer")
    }

    /// Turn the description into a [`Device`], rejecting non-Sonos hardware.
    pub fn into_device(self, ip_address: String, port: u16) -> Result<Device> {
        if !self.is_sonos_device() {
            return Err(DiscoveryError::InvalidDevice(format!(
                "{} ({}) is not a Sonos zone player",
                self.friendly_name, self.manufacturer
            )));
        }
        Ok(Device {
            id: self.udn,
            room_name: self
                .room_name
                .unwrap_or_else(|| self.friendly_name.clone()),
            name: self.friendly_name,
            ip_address,
            port,
            model_name: self.model_name,
        })
    }
}

/// Split a description URL into its host and port (default 80).
///
/// `http://192.168.1.100:1400/xml/device_description.xml` gives
/// `("192.168.1.100", 1400)`.
pub fn host_and_port(url: &str) -> Option<(String, u16)> {
    let rest = url.split_once("://")?.1;
    let authority = rest.split('/').next()?;
    if authority.is_empty() {
        return None;
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => Some((host.to_string(), port.parse().ok()?)),
        None => Some((authority.to_string(), 80)),
    }
}
