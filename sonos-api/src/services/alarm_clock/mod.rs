//! AlarmClock service
//!
//! `ListAlarms` returns the household's alarms as an XML document inside
//! `CurrentAlarmList`; [`AlarmList::from_xml`] reads it.

use serde::{Deserialize, Deserializer};

use crate::error::ApiError;
use crate::operation::ValidationError;
use crate::{define_operation_with_response, define_upnp_operation};

define_operation_with_response! {
    operation: ListAlarmsOperation,
    action: "ListAlarms",
    service: AlarmClock,
    request: {},
    arguments: {},
    response: ListAlarmsResponse {
        current_alarm_list: String => "CurrentAlarmList",
        current_alarm_list_version: String => "CurrentAlarmListVersion",
    },
}

define_upnp_operation! {
    operation: UpdateAlarmOperation,
    action: "UpdateAlarm",
    service: AlarmClock,
    request: {
        id: u32,
        start_local_time: String,
        duration: String,
        recurrence: String,
        enabled: bool,
        room_uuid: String,
        program_uri: String,
        program_meta_data: String,
        play_mode: String,
        volume: u8,
        include_linked_zones: bool,
    },
    arguments: {
        "ID" => id,
        "StartLocalTime" => start_local_time,
        "Duration" => duration,
        "Recurrence" => recurrence,
        "Enabled" => enabled,
        "RoomUUID" => room_uuid,
        "ProgramURI" => program_uri,
        "ProgramMetaData" => program_meta_data,
        "PlayMode" => play_mode,
        "Volume" => volume,
        "IncludeLinkedZones" => include_linked_zones,
    },
    validate: |req| {
        if req.volume > 100 {
            return Err(ValidationError::range_error("volume", 0, 100, req.volume));
        }
        if req.room_uuid.is_empty() {
            return Err(ValidationError::missing("room_uuid"));
        }
        Ok(())
    },
}

define_upnp_operation! {
    operation: DestroyAlarmOperation,
    action: "DestroyAlarm",
    service: AlarmClock,
    request: {
        id: u32,
    },
    arguments: {
        "ID" => id,
    },
}

pub use destroy_alarm_operation as destroy_alarm;
pub use list_alarms_operation as list_alarms;
pub use update_alarm_operation as update_alarm;

/// One `<Alarm>` element of the alarm list
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlarmEntry {
    #[serde(rename = "@ID")]
    pub id: u32,
    #[serde(rename = "@StartTime")]
    pub start_time: String,
    #[serde(rename = "@Duration", default)]
    pub duration: String,
    #[serde(rename = "@Recurrence")]
    pub recurrence: String,
    #[serde(rename = "@Enabled", deserialize_with = "flag")]
    pub enabled: bool,
    #[serde(rename = "@RoomUUID")]
    pub room_uuid: String,
    #[serde(rename = "@ProgramURI", default)]
    pub program_uri: String,
    #[serde(rename = "@ProgramMetaData", default)]
    pub program_meta_data: String,
    #[serde(rename = "@PlayMode", default)]
    pub play_mode: String,
    #[serde(rename = "@Volume", default)]
    pub volume: u8,
    #[serde(rename = "@IncludeLinkedZones", default, deserialize_with = "flag")]
    pub include_linked_zones: bool,
}

/// The parsed `<Alarms>` document
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AlarmList {
    #[serde(rename = "Alarm", default)]
    pub alarms: Vec<AlarmEntry>,
}

impl AlarmList {
    pub fn from_xml(xml: &str) -> Result<Self, ApiError> {
        if xml.trim().is_empty() {
            return Ok(Self::default());
        }
        quick_xml::de::from_str(xml)
            .map_err(|e| ApiError::ParseError(format!("Failed to parse alarm list: {e}")))
    }
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = String::deserialize(deserializer)?;
    Ok(matches!(value.trim(), "1" | "true"))
}

impl AlarmEntry {
    /// Build the `UpdateAlarm` request that writes this entry back
    pub fn update_request(&self) -> crate::operation::OperationBuilder<UpdateAlarmOperation> {
        update_alarm(
            self.id,
            self.start_time.clone(),
            self.duration.clone(),
            self.recurrence.clone(),
            self.enabled,
            self.room_uuid.clone(),
            self.program_uri.clone(),
            self.program_meta_data.clone(),
            self.play_mode.clone(),
            self.volume,
            self.include_linked_zones,
        )
    }
}
