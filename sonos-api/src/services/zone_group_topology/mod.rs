//! ZoneGroupTopology service: which group a speaker belongs to

use crate::define_operation_with_response;

define_operation_with_response! {
    operation: GetZoneGroupAttributesOperation,
    action: "GetZoneGroupAttributes",
    service: ZoneGroupTopology,
    request: {},
    arguments: {},
    response: GetZoneGroupAttributesResponse {
        current_zone_group_name: String => "CurrentZoneGroupName",
        current_zone_group_id: String => "CurrentZoneGroupID",
        current_zone_player_uuids_in_group: String => "CurrentZonePlayerUUIDsInGroup",
    },
}

pub use get_zone_group_attributes_operation as get_zone_group_attributes;

impl GetZoneGroupAttributesResponse {
    /// Member UUIDs in the order the device lists them
    pub fn member_uuids(&self) -> Vec<&str> {
        self.current_zone_player_uuids_in_group
            .split(',')
            .map(str::trim)
            .filter(|uuid| !uuid.is_empty())
            .collect()
    }
}
