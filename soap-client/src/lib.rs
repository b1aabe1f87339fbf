//! Private SOAP client for Sonos UPnP control actions
//!
//! This crate builds SOAP envelopes, posts them to a speaker's control
//! endpoint and hands back the `{Action}Response` element. Device faults are
//! reported with the raw request and response bodies attached.

mod error;

pub use error::SoapError;

use std::time::Duration;
use xmltree::Element;

/// Port every Sonos speaker serves its UPnP services on
pub const DEFAULT_PORT: u16 = 1400;

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
    port: u16,
}

impl SoapClient {
    /// Create a new SOAP client with default configuration
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
    }

    /// Create a client with explicit connect and read timeouts
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .build(),
            port: DEFAULT_PORT,
        }
    }

    /// Use a port other than 1400 (useful against local test servers)
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Send a SOAP request and return the parsed response element
    pub fn call(
        &self,
        ip: &str,
        endpoint: &str,
        service_uri: &str,
        action: &str,
        payload: &str,
    ) -> Result<Element, SoapError> {
        let body = envelope(service_uri, action, payload);
        let url = format!("http://{}:{}/{}", ip, self.port, endpoint);
        let soap_action = format!("\"{}#{}\"", service_uri, action);

        let result = self
            .agent
            .post(&url)
            .set("Content-Type", "text/xml; charset=\"utf-8\"")
            .set("SOAPACTION", &soap_action)
            .send_string(&body);

        let xml_text = match result {
            Ok(response) => response
                .into_string()
                .map_err(|e| SoapError::Network(e.to_string()))?,
            // Sonos answers UPnP faults with HTTP 500 and a fault body
            Err(ureq::Error::Status(status, response)) => {
                let text = response
                    .into_string()
                    .map_err(|e| SoapError::Network(e.to_string()))?;
                if Element::parse(text.as_bytes()).is_err() {
                    return Err(SoapError::Network(format!("HTTP {} from {}", status, url)));
                }
                text
            }
            Err(e) => return Err(SoapError::Network(e.to_string())),
        };

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        extract_response(&xml, action).map_err(|fault| match fault {
            SoapError::Fault {
                code, description, ..
            } => SoapError::Fault {
                code,
                description,
                request: body.clone(),
                response: xml_text.clone(),
            },
            other => other,
        })
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

fn envelope(service_uri: &str, action: &str, payload: &str) -> String {
    format!(
        r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body><u:{action} xmlns:u="{service_uri}">{payload}</u:{action}></s:Body></s:Envelope>"#
    )
}

/// Pull `{action}Response` out of a SOAP envelope, or the UPnP fault.
///
/// Faults returned from here have empty request/response bodies; `call`
/// fills them in.
fn extract_response(xml: &Element, action: &str) -> Result<Element, SoapError> {
    let body = xml
        .get_child("Body")
        .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

    if let Some(fault) = body.get_child("Fault") {
        let upnp_error = fault
            .get_child("detail")
            .and_then(|d| d.get_child("UPnPError").or_else(|| d.get_child("UpnPError")));
        let code = upnp_error
            .and_then(|e| e.get_child("errorCode"))
            .and_then(|c| c.get_text())
            .and_then(|t| t.trim().parse::<u16>().ok())
            .unwrap_or(500);
        let description = upnp_error
            .and_then(|e| e.get_child("errorDescription"))
            .and_then(|d| d.get_text())
            .map(|d| d.into_owned());
        return Err(SoapError::Fault {
            code,
            description,
            request: String::new(),
            response: String::new(),
        });
    }

    let response_name = format!("{}Response", action);
    body.get_child(response_name.as_str())
        .cloned()
        .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
}
