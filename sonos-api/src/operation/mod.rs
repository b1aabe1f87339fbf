//! Operation framework for typed UPnP actions
//!
//! Every action is a zero-sized type implementing [`UPnPOperation`]. Requests
//! are validated when built through an [`OperationBuilder`] and rendered into
//! escaped SOAP arguments; responses are read back into typed structs.

mod builder;
pub mod macros;

pub use builder::*;

use std::borrow::Cow;

use xmltree::Element;

use crate::error::ApiError;
use crate::service::Service;

/// Validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Parameter '{parameter}' value '{value}' is out of range ({min}..={max})")]
    RangeError {
        parameter: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("Parameter '{parameter}' value '{value}' is invalid: {reason}")]
    InvalidValue {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("Required parameter '{parameter}' is missing")]
    MissingParameter { parameter: String },
}

impl ValidationError {
    pub fn range_error(
        parameter: &str,
        min: impl std::fmt::Display,
        max: impl std::fmt::Display,
        value: impl std::fmt::Display,
    ) -> Self {
        Self::RangeError {
            parameter: parameter.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn invalid_value(parameter: &str, value: impl std::fmt::Display, reason: &str) -> Self {
        Self::InvalidValue {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn missing(parameter: &str) -> Self {
        Self::MissingParameter {
            parameter: parameter.to_string(),
        }
    }
}

/// Validation levels for operation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationLevel {
    /// No validation
    None,
    /// Type and range checks at the API boundary
    #[default]
    Boundary,
    /// Boundary checks plus domain rules
    Comprehensive,
}

/// Trait for types that can be validated
pub trait Validate {
    /// Cheap checks that catch obviously invalid input
    fn validate_boundary(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Boundary checks plus domain rules
    fn validate_comprehensive(&self) -> Result<(), ValidationError> {
        self.validate_boundary()
    }

    /// Validate with the specified level
    fn validate(&self, level: ValidationLevel) -> Result<(), ValidationError> {
        match level {
            ValidationLevel::None => Ok(()),
            ValidationLevel::Boundary => self.validate_boundary(),
            ValidationLevel::Comprehensive => self.validate_comprehensive(),
        }
    }
}

/// A UPnP action with typed request and response
pub trait UPnPOperation {
    type Request: Validate;

    type Response;

    /// The UPnP service this operation belongs to
    const SERVICE: Service;

    /// The SOAP action name for this operation
    const ACTION: &'static str;

    /// Render the request as the arguments inside the action element
    fn build_payload(request: &Self::Request) -> Result<String, ValidationError>;

    /// Read the `{Action}Response` element into the typed response
    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError>;

    fn metadata() -> OperationMetadata {
        OperationMetadata {
            service: Self::SERVICE.name(),
            action: Self::ACTION,
        }
    }
}

/// Metadata about a UPnP operation, used in logs and debug output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationMetadata {
    pub service: &'static str,
    pub action: &'static str,
}

/// Escape text for use inside an XML element or attribute
pub fn escape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// Values that can be sent as SOAP arguments
pub trait ToUpnpValue {
    fn to_upnp(&self) -> String;
}

/// Values that can be read back out of SOAP responses
pub trait FromUpnpValue: Sized {
    fn from_upnp(text: &str) -> Option<Self>;
}

impl ToUpnpValue for String {
    fn to_upnp(&self) -> String {
        self.clone()
    }
}

impl ToUpnpValue for &str {
    fn to_upnp(&self) -> String {
        (*self).to_string()
    }
}

impl ToUpnpValue for bool {
    fn to_upnp(&self) -> String {
        if *self { "1" } else { "0" }.to_string()
    }
}

impl FromUpnpValue for String {
    fn from_upnp(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

impl FromUpnpValue for bool {
    fn from_upnp(text: &str) -> Option<Self> {
        match text.trim() {
            "1" | "true" | "True" | "On" => Some(true),
            "0" | "false" | "False" | "Off" => Some(false),
            _ => None,
        }
    }
}

macro_rules! numeric_upnp_value {
    ($($t:ty),*) => {
        $(
            impl ToUpnpValue for $t {
                fn to_upnp(&self) -> String {
                    self.to_string()
                }
            }

            impl FromUpnpValue for $t {
                fn from_upnp(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }
            }
        )*
    };
}

numeric_upnp_value!(u8, u16, u32, i8, i16, i32);

/// Append `<Name>value</Name>` with the value escaped
pub fn push_argument(xml: &mut String, name: &str, value: &impl ToUpnpValue) {
    let value = value.to_upnp();
    xml.push('<');
    xml.push_str(name);
    xml.push('>');
    xml.push_str(&escape(&value));
    xml.push_str("</");
    xml.push_str(name);
    xml.push('>');
}

/// Text of a direct child element, empty when absent
pub fn child_text(xml: &Element, name: &str) -> String {
    xml.get_child(name)
        .and_then(|e| e.get_text())
        .map(|t| t.into_owned())
        .unwrap_or_default()
}
