//! AVTransport service operations
//!
//! Playback, play modes, the queue, saved queues and group membership all
//! live on this service.

use crate::operation::ValidationError;
use crate::{define_operation_with_response, define_upnp_operation};

/// Play modes accepted by `SetPlayMode`
pub const PLAY_MODES: [&str; 6] = [
    "NORMAL",
    "REPEAT_ALL",
    "REPEAT_ONE",
    "SHUFFLE_NOREPEAT",
    "SHUFFLE",
    "SHUFFLE_REPEAT_ONE",
];

/// Seek units accepted by `Seek`
pub const SEEK_UNITS: [&str; 3] = ["TRACK_NR", "REL_TIME", "TIME_DELTA"];

// =============================================================================
// BASIC PLAYBACK CONTROL
// =============================================================================

define_upnp_operation! {
    operation: PlayOperation,
    action: "Play",
    service: AVTransport,
    request: {
        speed: String,
    },
    arguments: {
        "InstanceID" => instance_id,
        "Speed" => speed,
    },
    validate: |req| {
        if req.speed == "1" || req.speed.parse::<f32>().is_ok() {
            Ok(())
        } else {
            Err(ValidationError::invalid_value("speed", &req.speed, "must be numeric"))
        }
    },
}

define_upnp_operation! {
    operation: PauseOperation,
    action: "Pause",
    service: AVTransport,
    request: {},
    arguments: { "InstanceID" => instance_id },
}

define_upnp_operation! {
    operation: StopOperation,
    action: "Stop",
    service: AVTransport,
    request: {},
    arguments: { "InstanceID" => instance_id },
}

define_upnp_operation! {
    operation: NextOperation,
    action: "Next",
    service: AVTransport,
    request: {},
    arguments: { "InstanceID" => instance_id },
}

define_upnp_operation! {
    operation: PreviousOperation,
    action: "Previous",
    service: AVTransport,
    request: {},
    arguments: { "InstanceID" => instance_id },
}

// =============================================================================
// SEEK AND POSITION
// =============================================================================

define_upnp_operation! {
    operation: SeekOperation,
    action: "Seek",
    service: AVTransport,
    request: {
        unit: String,
        target: String,
    },
    arguments: {
        "InstanceID" => instance_id,
        "Unit" => unit,
        "Target" => target,
    },
    validate: |req| {
        if !SEEK_UNITS.contains(&req.unit.as_str()) {
            return Err(ValidationError::invalid_value(
                "unit",
                &req.unit,
                "must be TRACK_NR, REL_TIME or TIME_DELTA",
            ));
        }
        if req.unit == "TRACK_NR" && req.target.parse::<u32>().map_or(true, |n| n == 0) {
            return Err(ValidationError::invalid_value(
                "target",
                &req.target,
                "track numbers start at 1",
            ));
        }
        Ok(())
    },
}

define_operation_with_response! {
    operation: GetPositionInfoOperation,
    action: "GetPositionInfo",
    service: AVTransport,
    request: {},
    arguments: { "InstanceID" => instance_id },
    response: GetPositionInfoResponse {
        track: u32 => "Track",
        track_duration: String => "TrackDuration",
        track_meta_data: String => "TrackMetaData",
        track_uri: String => "TrackURI",
        rel_time: String => "RelTime",
    },
}

// =============================================================================
// TRANSPORT INFO AND SETTINGS
// =============================================================================

define_operation_with_response! {
    operation: GetTransportInfoOperation,
    action: "GetTransportInfo",
    service: AVTransport,
    request: {},
    arguments: { "InstanceID" => instance_id },
    response: GetTransportInfoResponse {
        current_transport_state: String => "CurrentTransportState",
        current_transport_status: String => "CurrentTransportStatus",
        current_speed: String => "CurrentSpeed",
    },
}

define_operation_with_response! {
    operation: GetTransportSettingsOperation,
    action: "GetTransportSettings",
    service: AVTransport,
    request: {},
    arguments: { "InstanceID" => instance_id },
    response: GetTransportSettingsResponse {
        play_mode: String => "PlayMode",
        rec_quality_mode: String => "RecQualityMode",
    },
}

define_upnp_operation! {
    operation: SetPlayModeOperation,
    action: "SetPlayMode",
    service: AVTransport,
    request: {
        new_play_mode: String,
    },
    arguments: {
        "InstanceID" => instance_id,
        "NewPlayMode" => new_play_mode,
    },
    validate: |req| {
        if PLAY_MODES.contains(&req.new_play_mode.as_str()) {
            Ok(())
        } else {
            Err(ValidationError::invalid_value(
                "new_play_mode",
                &req.new_play_mode,
                "not a Sonos play mode",
            ))
        }
    },
}

define_operation_with_response! {
    operation: GetCrossfadeModeOperation,
    action: "GetCrossfadeMode",
    service: AVTransport,
    request: {},
    arguments: { "InstanceID" => instance_id },
    response: GetCrossfadeModeResponse {
        crossfade_mode: bool => "CrossfadeMode",
    },
}

define_upnp_operation! {
    operation: SetCrossfadeModeOperation,
    action: "SetCrossfadeMode",
    service: AVTransport,
    request: {
        crossfade_mode: bool,
    },
    arguments: {
        "InstanceID" => instance_id,
        "CrossfadeMode" => crossfade_mode,
    },
}

// =============================================================================
// MEDIA INFO AND URI SETTING
// =============================================================================

define_operation_with_response! {
    operation: GetMediaInfoOperation,
    action: "GetMediaInfo",
    service: AVTransport,
    request: {},
    arguments: { "InstanceID" => instance_id },
    response: GetMediaInfoResponse {
        nr_tracks: u32 => "NrTracks",
        media_duration: String => "MediaDuration",
        current_uri: String => "CurrentURI",
        current_uri_meta_data: String => "CurrentURIMetaData",
    },
}

define_upnp_operation! {
    operation: SetAvTransportUriOperation,
    action: "SetAVTransportURI",
    service: AVTransport,
    request: {
        current_uri: String,
        current_uri_meta_data: String,
    },
    arguments: {
        "InstanceID" => instance_id,
        "CurrentURI" => current_uri,
        "CurrentURIMetaData" => current_uri_meta_data,
    },
    validate: |req| {
        if req.current_uri.is_empty() {
            Err(ValidationError::missing("current_uri"))
        } else {
            Ok(())
        }
    },
}

// =============================================================================
// QUEUE OPERATIONS
// =============================================================================

define_operation_with_response! {
    operation: AddUriToQueueOperation,
    action: "AddURIToQueue",
    service: AVTransport,
    request: {
        enqueued_uri: String,
        enqueued_uri_meta_data: String,
        desired_first_track_number_enqueued: u32,
        enqueue_as_next: bool,
    },
    arguments: {
        "InstanceID" => instance_id,
        "EnqueuedURI" => enqueued_uri,
        "EnqueuedURIMetaData" => enqueued_uri_meta_data,
        "DesiredFirstTrackNumberEnqueued" => desired_first_track_number_enqueued,
        "EnqueueAsNext" => enqueue_as_next,
    },
    response: AddUriToQueueResponse {
        first_track_number_enqueued: u32 => "FirstTrackNumberEnqueued",
        num_tracks_added: u32 => "NumTracksAdded",
        new_queue_length: u32 => "NewQueueLength",
    },
}

define_operation_with_response! {
    operation: AddMultipleUrisToQueueOperation,
    action: "AddMultipleURIsToQueue",
    service: AVTransport,
    request: {
        update_id: u32,
        number_of_uris: u32,
        enqueued_uris: String,
        enqueued_uris_meta_data: String,
        container_uri: String,
        container_meta_data: String,
        desired_first_track_number_enqueued: u32,
        enqueue_as_next: bool,
    },
    arguments: {
        "InstanceID" => instance_id,
        "UpdateID" => update_id,
        "NumberOfURIs" => number_of_uris,
        "EnqueuedURIs" => enqueued_uris,
        "EnqueuedURIsMetaData" => enqueued_uris_meta_data,
        "ContainerURI" => container_uri,
        "ContainerMetaData" => container_meta_data,
        "DesiredFirstTrackNumberEnqueued" => desired_first_track_number_enqueued,
        "EnqueueAsNext" => enqueue_as_next,
    },
    response: AddMultipleUrisToQueueResponse {
        first_track_number_enqueued: u32 => "FirstTrackNumberEnqueued",
        num_tracks_added: u32 => "NumTracksAdded",
        new_queue_length: u32 => "NewQueueLength",
        new_update_id: u32 => "NewUpdateID",
    },
    validate: |req| {
        if req.number_of_uris == 0 {
            return Err(ValidationError::missing("enqueued_uris"));
        }
        if req.number_of_uris > 16 {
            return Err(ValidationError::range_error("number_of_uris", 1, 16, req.number_of_uris));
        }
        Ok(())
    },
}

define_operation_with_response! {
    operation: RemoveTrackRangeFromQueueOperation,
    action: "RemoveTrackRangeFromQueue",
    service: AVTransport,
    request: {
        update_id: u32,
        starting_index: u32,
        number_of_tracks: u32,
    },
    arguments: {
        "InstanceID" => instance_id,
        "UpdateID" => update_id,
        "StartingIndex" => starting_index,
        "NumberOfTracks" => number_of_tracks,
    },
    response: RemoveTrackRangeFromQueueResponse {
        new_update_id: u32 => "NewUpdateID",
    },
    validate: |req| {
        if req.starting_index == 0 {
            return Err(ValidationError::invalid_value(
                "starting_index",
                req.starting_index,
                "queue positions start at 1",
            ));
        }
        Ok(())
    },
}

define_upnp_operation! {
    operation: RemoveAllTracksFromQueueOperation,
    action: "RemoveAllTracksFromQueue",
    service: AVTransport,
    request: {},
    arguments: { "InstanceID" => instance_id },
}

// =============================================================================
// SAVED QUEUES (PLAYLISTS)
// =============================================================================

define_operation_with_response! {
    operation: CreateSavedQueueOperation,
    action: "CreateSavedQueue",
    service: AVTransport,
    request: {
        title: String,
        enqueued_uri: String,
        enqueued_uri_meta_data: String,
    },
    arguments: {
        "InstanceID" => instance_id,
        "Title" => title,
        "EnqueuedURI" => enqueued_uri,
        "EnqueuedURIMetaData" => enqueued_uri_meta_data,
    },
    response: CreateSavedQueueResponse {
        num_tracks_added: u32 => "NumTracksAdded",
        new_queue_length: u32 => "NewQueueLength",
        assigned_object_id: String => "AssignedObjectID",
        new_update_id: u32 => "NewUpdateID",
    },
    validate: |req| {
        if req.title.trim().is_empty() {
            Err(ValidationError::missing("title"))
        } else {
            Ok(())
        }
    },
}

define_operation_with_response! {
    operation: AddUriToSavedQueueOperation,
    action: "AddURIToSavedQueue",
    service: AVTransport,
    request: {
        object_id: String,
        update_id: u32,
        enqueued_uri: String,
        enqueued_uri_meta_data: String,
        add_at_index: u32,
    },
    arguments: {
        "InstanceID" => instance_id,
        "ObjectID" => object_id,
        "UpdateID" => update_id,
        "EnqueuedURI" => enqueued_uri,
        "EnqueuedURIMetaData" => enqueued_uri_meta_data,
        "AddAtIndex" => add_at_index,
    },
    response: AddUriToSavedQueueResponse {
        num_tracks_added: u32 => "NumTracksAdded",
        new_queue_length: u32 => "NewQueueLength",
        new_update_id: u32 => "NewUpdateID",
    },
}

define_operation_with_response! {
    operation: ReorderTracksInSavedQueueOperation,
    action: "ReorderTracksInSavedQueue",
    service: AVTransport,
    request: {
        object_id: String,
        update_id: u32,
        track_list: String,
        new_position_list: String,
    },
    arguments: {
        "InstanceID" => instance_id,
        "ObjectID" => object_id,
        "UpdateID" => update_id,
        "TrackList" => track_list,
        "NewPositionList" => new_position_list,
    },
    response: ReorderTracksInSavedQueueResponse {
        queue_length_change: i32 => "QueueLengthChange",
        new_queue_length: u32 => "NewQueueLength",
        new_update_id: u32 => "NewUpdateID",
    },
}

// =============================================================================
// GROUP COORDINATION
// =============================================================================

define_operation_with_response! {
    operation: BecomeCoordinatorOfStandaloneGroupOperation,
    action: "BecomeCoordinatorOfStandaloneGroup",
    service: AVTransport,
    request: {},
    arguments: { "InstanceID" => instance_id },
    response: BecomeCoordinatorOfStandaloneGroupResponse {
        delegated_group_coordinator_id: String => "DelegatedGroupCoordinatorID",
        new_group_id: String => "NewGroupID",
    },
}

pub use add_multiple_uris_to_queue_operation as add_multiple_uris_to_queue;
pub use add_uri_to_queue_operation as add_uri_to_queue;
pub use add_uri_to_saved_queue_operation as add_uri_to_saved_queue;
pub use become_coordinator_of_standalone_group_operation as become_coordinator_of_standalone_group;
pub use create_saved_queue_operation as create_saved_queue;
pub use get_crossfade_mode_operation as get_crossfade_mode;
pub use get_media_info_operation as get_media_info;
pub use get_position_info_operation as get_position_info;
pub use get_transport_info_operation as get_transport_info;
pub use get_transport_settings_operation as get_transport_settings;
pub use next_operation as next;
pub use pause_operation as pause;
pub use play_operation as play;
pub use previous_operation as previous;
pub use remove_all_tracks_from_queue_operation as remove_all_tracks_from_queue;
pub use remove_track_range_from_queue_operation as remove_track_range_from_queue;
pub use reorder_tracks_in_saved_queue_operation as reorder_tracks_in_saved_queue;
pub use seek_operation as seek;
pub use set_av_transport_uri_operation as set_av_transport_uri;
pub use set_crossfade_mode_operation as set_crossfade_mode;
pub use set_play_mode_operation as set_play_mode;
pub use stop_operation as stop;
