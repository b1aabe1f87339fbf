use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// Represents the different UPnP services exposed by Sonos devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Playback, queue and grouping on the current transport
    AVTransport,

    /// Per-speaker volume, mute and equalisation
    RenderingControl,

    /// Group membership as the household sees it
    ZoneGroupTopology,

    /// Browsing the queue, saved queues and favourites
    ContentDirectory,

    AlarmClock,

    /// Speaker hardware settings such as the status light
    DeviceProperties,
}

/// Contains the endpoint and service URI information for a UPnP service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// The HTTP control path relative to the device base URL
    pub endpoint: &'static str,

    /// The UPnP service URI used in SOAP requests
    pub service_uri: &'static str,
}

impl Service {
    pub const ALL: [Service; 6] = [
        Service::AVTransport,
        Service::RenderingControl,
        Service::ZoneGroupTopology,
        Service::ContentDirectory,
        Service::AlarmClock,
        Service::DeviceProperties,
    ];

    /// Get the name of this service as a string
    pub fn name(&self) -> &'static str {
        match self {
            Service::AVTransport => "AVTransport",
            Service::RenderingControl => "RenderingControl",
            Service::ZoneGroupTopology => "ZoneGroupTopology",
            Service::ContentDirectory => "ContentDirectory",
            Service::AlarmClock => "AlarmClock",
            Service::DeviceProperties => "DeviceProperties",
        }
    }

    /// Get the service information (endpoint and URI) for this service
    pub fn info(&self) -> ServiceInfo {
        match self {
            Service::AVTransport => ServiceInfo {
                endpoint: "MediaRenderer/AVTransport/Control",
                service_uri: "urn:schemas-upnp-org:service:AVTransport:1",
            },
            Service::RenderingControl => ServiceInfo {
                endpoint: "MediaRenderer/RenderingControl/Control",
                service_uri: "urn:schemas-upnp-org:service:RenderingControl:1",
            },
            Service::ZoneGroupTopology => ServiceInfo {
                endpoint: "ZoneGroupTopology/Control",
                service_uri: "urn:schemas-upnp-org:service:ZoneGroupTopology:1",
            },
            Service::ContentDirectory => ServiceInfo {
                endpoint: "MediaServer/ContentDirectory/Control",
                service_uri: "urn:schemas-upnp-org:service:ContentDirectory:1",
            },
            Service::AlarmClock => ServiceInfo {
                endpoint: "AlarmClock/Control",
                service_uri: "urn:schemas-upnp-org:service:AlarmClock:1",
            },
            Service::DeviceProperties => ServiceInfo {
                endpoint: "DeviceProperties/Control",
                service_uri: "urn:schemas-upnp-org:service:DeviceProperties:1",
            },
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Service {
    type Err = ApiError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|service| service.name() == name)
            .ok_or_else(|| ApiError::UnknownService(name.to_string()))
    }
}
