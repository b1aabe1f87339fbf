use std::fmt;
use std::sync::Arc;

use soap_client::{SoapClient, SoapError};
use xmltree::Element;

use crate::operation::{ComposableOperation, UPnPOperation};
use crate::{Result, Service};

/// Sends one UPnP action to one speaker
///
/// [`SoapClient`] is the production implementation; tests substitute an
/// in-memory device network.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        ip: &str,
        service: Service,
        action: &str,
        payload: &str,
    ) -> std::result::Result<Element, SoapError>;
}

impl Transport for SoapClient {
    fn send(
        &self,
        ip: &str,
        service: Service,
        action: &str,
        payload: &str,
    ) -> std::result::Result<Element, SoapError> {
        let info = service.info();
        self.call(ip, info.endpoint, info.service_uri, action, payload)
    }
}

/// A client for executing Sonos operations against devices
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct SonosClient {
    transport: Arc<dyn Transport>,
}

impl SonosClient {
    /// Client speaking SOAP over HTTP with default timeouts
    pub fn new() -> Self {
        Self::with_soap_client(SoapClient::new())
    }

    pub fn with_soap_client(soap_client: SoapClient) -> Self {
        Self::with_transport(Arc::new(soap_client))
    }

    /// Client over any [`Transport`]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Execute an operation against the device at `ip`
    ///
    /// Faults are returned as-is; actions are never retried.
    ///
    /// ```rust,ignore
    /// use sonos_api::{services::av_transport, SonosClient};
    ///
    /// let client = SonosClient::new();
    /// let info = client.execute("192.168.1.100", av_transport::get_transport_info().build()?)?;
    /// println!("{}", info.current_transport_state);
    /// ```
    pub fn execute<Op: UPnPOperation>(
        &self,
        ip: &str,
        operation: ComposableOperation<Op>,
    ) -> Result<Op::Response> {
        let payload = operation.build_payload()?;
        tracing::debug!(ip, service = Op::SERVICE.name(), action = Op::ACTION, "sending UPnP action");

        let xml = self
            .transport
            .send(ip, Op::SERVICE, Op::ACTION, &payload)
            .map_err(|err| {
                tracing::debug!(ip, action = Op::ACTION, error = %err, "UPnP action failed");
                err
            })?;

        operation.parse_response(&xml)
    }
}

impl Default for SonosClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SonosClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SonosClient").finish_non_exhaustive()
    }
}
