//! Typed operations per UPnP service

pub mod alarm_clock;
pub mod av_transport;
pub mod content_directory;
pub mod device_properties;
pub mod rendering_control;
pub mod zone_group_topology;
