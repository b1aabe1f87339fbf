//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network or HTTP communication error
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// UPnP fault returned by the device.
    ///
    /// Carries the raw request envelope and response body so callers can
    /// inspect exactly what was exchanged.
    #[error("SOAP fault: error code {code}")]
    Fault {
        code: u16,
        description: Option<String>,
        request: String,
        response: String,
    },
}

impl SoapError {
    /// The UPnP error code when this is a device fault
    pub fn fault_code(&self) -> Option<u16> {
        match self {
            SoapError::Fault { code, .. } => Some(*code),
            _ => None,
        }
    }
}
