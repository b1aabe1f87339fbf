use thiserror::Error;

use crate::group::InterruptReport;

#[derive(Error, Debug)]
pub enum SdkError {
    /// A SOAP action failed or the device answered with a UPnP fault
    #[error("API error: {0}")]
    ApiError(#[from] sonos_api::ApiError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] sonos_discovery::DiscoveryError),

    /// The device reported an empty group id
    #[error("Unable to determine the group of speaker {speaker}")]
    UnknownGroup { speaker: String },

    #[error("No {kind} matching '{name}' was found")]
    NotFound { kind: &'static str, name: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unable to play, the queue is empty")]
    EmptyQueue,

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An interrupt timed out or left some restore actions failed
    #[error("Interrupt did not complete cleanly: {0}")]
    Interrupt(Box<InterruptReport>),
}

impl SdkError {
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        SdkError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// The UPnP error code if the device rejected an action
    pub fn fault_code(&self) -> Option<u16> {
        match self {
            SdkError::ApiError(err) => err.fault_code(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;
