//! RenderingControl service operations

use crate::operation::ValidationError;
use crate::{define_operation_with_response, define_upnp_operation};

fn check_channel(channel: &str) -> Result<(), ValidationError> {
    match channel {
        "Master" | "LF" | "RF" => Ok(()),
        other => Err(ValidationError::invalid_value(
            "channel",
            other,
            "must be Master, LF or RF",
        )),
    }
}

fn check_eq(parameter: &str, level: i8) -> Result<(), ValidationError> {
    if (-10..=10).contains(&level) {
        Ok(())
    } else {
        Err(ValidationError::range_error(parameter, -10, 10, level))
    }
}

define_operation_with_response! {
    operation: GetVolumeOperation,
    action: "GetVolume",
    service: RenderingControl,
    request: {
        channel: String,
    },
    arguments: {
        "InstanceID" => instance_id,
        "Channel" => channel,
    },
    response: GetVolumeResponse {
        current_volume: u8 => "CurrentVolume",
    },
    validate: |req| check_channel(&req.channel),
}

define_upnp_operation! {
    operation: SetVolumeOperation,
    action: "SetVolume",
    service: RenderingControl,
    request: {
        channel: String,
        desired_volume: u8,
    },
    arguments: {
        "InstanceID" => instance_id,
        "Channel" => channel,
        "DesiredVolume" => desired_volume,
    },
    validate: |req| {
        check_channel(&req.channel)?;
        if req.desired_volume > 100 {
            return Err(ValidationError::range_error("desired_volume", 0, 100, req.desired_volume));
        }
        Ok(())
    },
}

define_operation_with_response! {
    operation: SetRelativeVolumeOperation,
    action: "SetRelativeVolume",
    service: RenderingControl,
    request: {
        channel: String,
        adjustment: i8,
    },
    arguments: {
        "InstanceID" => instance_id,
        "Channel" => channel,
        "Adjustment" => adjustment,
    },
    response: SetRelativeVolumeResponse {
        new_volume: u8 => "NewVolume",
    },
    validate: |req| check_channel(&req.channel),
}

define_operation_with_response! {
    operation: GetMuteOperation,
    action: "GetMute",
    service: RenderingControl,
    request: {
        channel: String,
    },
    arguments: {
        "InstanceID" => instance_id,
        "Channel" => channel,
    },
    response: GetMuteResponse {
        current_mute: bool => "CurrentMute",
    },
    validate: |req| check_channel(&req.channel),
}

define_upnp_operation! {
    operation: SetMuteOperation,
    action: "SetMute",
    service: RenderingControl,
    request: {
        channel: String,
        desired_mute: bool,
    },
    arguments: {
        "InstanceID" => instance_id,
        "Channel" => channel,
        "DesiredMute" => desired_mute,
    },
    validate: |req| check_channel(&req.channel),
}

define_operation_with_response! {
    operation: GetBassOperation,
    action: "GetBass",
    service: RenderingControl,
    request: {},
    arguments: { "InstanceID" => instance_id },
    response: GetBassResponse {
        current_bass: i8 => "CurrentBass",
    },
}

define_upnp_operation! {
    operation: SetBassOperation,
    action: "SetBass",
    service: RenderingControl,
    request: {
        desired_bass: i8,
    },
    arguments: {
        "InstanceID" => instance_id,
        "DesiredBass" => desired_bass,
    },
    validate: |req| check_eq("desired_bass", req.desired_bass),
}

define_operation_with_response! {
    operation: GetTrebleOperation,
    action: "GetTreble",
    service: RenderingControl,
    request: {},
    arguments: { "InstanceID" => instance_id },
    response: GetTrebleResponse {
        current_treble: i8 => "CurrentTreble",
    },
}

define_upnp_operation! {
    operation: SetTrebleOperation,
    action: "SetTreble",
    service: RenderingControl,
    request: {
        desired_treble: i8,
    },
    arguments: {
        "InstanceID" => instance_id,
        "DesiredTreble" => desired_treble,
    },
    validate: |req| check_eq("desired_treble", req.desired_treble),
}

define_operation_with_response! {
    operation: GetLoudnessOperation,
    action: "GetLoudness",
    service: RenderingControl,
    request: {
        channel: String,
    },
    arguments: {
        "InstanceID" => instance_id,
        "Channel" => channel,
    },
    response: GetLoudnessResponse {
        current_loudness: bool => "CurrentLoudness",
    },
    validate: |req| check_channel(&req.channel),
}

define_upnp_operation! {
    operation: SetLoudnessOperation,
    action: "SetLoudness",
    service: RenderingControl,
    request: {
        channel: String,
        desired_loudness: bool,
    },
    arguments: {
        "InstanceID" => instance_id,
        "Channel" => channel,
        "DesiredLoudness" => desired_loudness,
    },
    validate: |req| check_channel(&req.channel),
}

pub use get_bass_operation as get_bass;
pub use get_loudness_operation as get_loudness;
pub use get_mute_operation as get_mute;
pub use get_treble_operation as get_treble;
pub use get_volume_operation as get_volume;
pub use set_bass_operation as set_bass;
pub use set_loudness_operation as set_loudness;
pub use set_mute_operation as set_mute;
pub use set_relative_volume_operation as set_relative_volume;
pub use set_treble_operation as set_treble;
pub use set_volume_operation as set_volume;
