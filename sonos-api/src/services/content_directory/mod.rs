//! ContentDirectory service: the queue (`Q:0`), saved queues (`SQ:`) and
//! radio favourites (`R:0/0`, `R:0/1`) are all browsed through here.

use crate::operation::ValidationError;
use crate::{define_operation_with_response, define_upnp_operation};

pub const BROWSE_DIRECT_CHILDREN: &str = "BrowseDirectChildren";
pub const BROWSE_METADATA: &str = "BrowseMetadata";

define_operation_with_response! {
    operation: BrowseOperation,
    action: "Browse",
    service: ContentDirectory,
    request: {
        object_id: String,
        browse_flag: String,
        filter: String,
        starting_index: u32,
        requested_count: u32,
        sort_criteria: String,
    },
    arguments: {
        "ObjectID" => object_id,
        "BrowseFlag" => browse_flag,
        "Filter" => filter,
        "StartingIndex" => starting_index,
        "RequestedCount" => requested_count,
        "SortCriteria" => sort_criteria,
    },
    response: BrowseResponse {
        result: String => "Result",
        number_returned: u32 => "NumberReturned",
        total_matches: u32 => "TotalMatches",
        update_id: u32 => "UpdateID",
    },
    validate: |req| {
        if req.object_id.is_empty() {
            return Err(ValidationError::missing("object_id"));
        }
        match req.browse_flag.as_str() {
            BROWSE_DIRECT_CHILDREN | BROWSE_METADATA => Ok(()),
            other => Err(ValidationError::invalid_value(
                "browse_flag",
                other,
                "must be BrowseDirectChildren or BrowseMetadata",
            )),
        }
    },
}

define_upnp_operation! {
    operation: DestroyObjectOperation,
    action: "DestroyObject",
    service: ContentDirectory,
    request: {
        object_id: String,
    },
    arguments: {
        "ObjectID" => object_id,
    },
    validate: |req| {
        if req.object_id.is_empty() {
            Err(ValidationError::missing("object_id"))
        } else {
            Ok(())
        }
    },
}

pub use browse_operation as browse;
pub use destroy_object_operation as destroy_object;

/// Browse the children of a container, all fields requested
pub fn browse_children(
    object_id: &str,
    starting_index: u32,
    requested_count: u32,
) -> crate::operation::OperationBuilder<BrowseOperation> {
    browse(
        object_id.to_string(),
        BROWSE_DIRECT_CHILDREN.to_string(),
        "*".to_string(),
        starting_index,
        requested_count,
        String::new(),
    )
}
