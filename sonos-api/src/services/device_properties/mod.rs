//! DeviceProperties service: the status light on the speaker

use crate::define_operation_with_response;
use crate::define_upnp_operation;
use crate::operation::ValidationError;

define_operation_with_response! {
    operation: GetLedStateOperation,
    action: "GetLEDState",
    service: DeviceProperties,
    request: {},
    arguments: {},
    response: GetLedStateResponse {
        current_led_state: String => "CurrentLEDState",
    },
}

define_upnp_operation! {
    operation: SetLedStateOperation,
    action: "SetLEDState",
    service: DeviceProperties,
    request: {
        desired_led_state: String,
    },
    arguments: {
        "DesiredLEDState" => desired_led_state,
    },
    validate: |req| match req.desired_led_state.as_str() {
        "On" | "Off" => Ok(()),
        other => Err(ValidationError::invalid_value("desired_led_state", other, "must be On or Off")),
    },
}

pub use get_led_state_operation as get_led_state;
pub use set_led_state_operation as set_led_state;
