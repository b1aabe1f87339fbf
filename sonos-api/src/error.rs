use soap_client::SoapError;
use thiserror::Error;

/// High-level API errors for Sonos operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection timeouts, refused connections or an unreachable device.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response parsing error
    ///
    /// The device answered but the content did not have the expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// UPnP fault returned by the device, with the raw exchange attached
    #[error("SOAP fault: error code {code}")]
    SoapFault {
        code: u16,
        request: String,
        response: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A service name that no Sonos device exposes
    #[error("Unknown service: {0}")]
    UnknownService(String),
}

impl ApiError {
    /// The UPnP error code if the device rejected the action
    pub fn fault_code(&self) -> Option<u16> {
        match self {
            ApiError::SoapFault { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Parse(msg) => ApiError::ParseError(msg),
            SoapError::Fault {
                code,
                request,
                response,
                ..
            } => ApiError::SoapFault {
                code,
                request,
                response,
            },
        }
    }
}

impl From<crate::operation::ValidationError> for ApiError {
    fn from(validation_error: crate::operation::ValidationError) -> Self {
        ApiError::InvalidParameter(validation_error.to_string())
    }
}
