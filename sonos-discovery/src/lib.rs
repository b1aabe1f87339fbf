//! Sonos device discovery
//!
//! Finds zone players with an SSDP M-SEARCH and reads each responder's
//! UPnP device description.
//!
//! ```no_run
//! let devices = sonos_discovery::get().unwrap();
//! for device in devices {
//!     println!("Found {} at {}", device.room_name, device.ip_address);
//! }
//! ```

pub mod device;
mod error;
mod ssdp;

pub use error::{DiscoveryError, Result};

use std::time::Duration;

use device::{host_and_port, DeviceDescription};

/// Information about a discovered Sonos device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Unique device identifier (UDN), e.g. "uuid:RINCON_000E58A0123456"
    pub id: String,
    /// Friendly name of the device
    pub name: String,
    /// Room name the speaker is assigned to
    pub room_name: String,
    /// IP address of the device
    pub ip_address: String,
    /// Port number (1400 for every current model)
    pub port: u16,
    /// Model name (e.g. "Sonos One")
    pub model_name: String,
}

impl Device {
    /// The UDN without its `uuid:` prefix, as used in group ids
    pub fn uuid(&self) -> &str {
        self.id.strip_prefix("uuid:").unwrap_or(&self.id)
    }
}

/// Discover all Sonos devices on the local network with a 3 second timeout.
pub fn get() -> Result<Vec<Device>> {
    get_with_timeout(Duration::from_secs(3))
}

/// Discover all Sonos devices, waiting up to `timeout` for SSDP answers.
///
/// Responders whose description cannot be fetched are skipped with a
/// warning; socket failures are returned.
pub fn get_with_timeout(timeout: Duration) -> Result<Vec<Device>> {
    let responses = ssdp::search(ssdp::ZONE_PLAYER_TARGET, timeout)?;
    let http = http_client(timeout)?;

    let mut devices = Vec::new();
    for response in responses.into_iter().filter(|r| r.looks_like_sonos()) {
        match fetch_device(&http, &response.location) {
            Ok(device) => {
                tracing::info!(room = %device.room_name, ip = %device.ip_address, "discovered speaker");
                devices.push(device);
            }
            Err(err) => {
                tracing::warn!(location = %response.location, error = %err, "skipping responder");
            }
        }
    }
    Ok(devices)
}

/// Read the device description of a speaker at a known address.
pub fn describe(ip: &str) -> Result<Device> {
    describe_url(&format!("http://{ip}:1400/xml/device_description.xml"))
}

/// Read a device description from an explicit URL.
pub fn describe_url(url: &str) -> Result<Device> {
    fetch_device(&http_client(Duration::from_secs(5))?, url)
}

fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(DiscoveryError::from)
}

fn fetch_device(http: &reqwest::blocking::Client, url: &str) -> Result<Device> {
    let (ip, port) = host_and_port(url)
        .ok_or_else(|| DiscoveryError::ParseError(format!("Invalid location URL: {url}")))?;
    let xml = http.get(url).send()?.error_for_status()?.text()?;
    DeviceDescription::from_xml(&xml)?.into_device(ip, port)
}
