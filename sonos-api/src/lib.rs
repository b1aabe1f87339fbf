//! Typed Sonos UPnP API
//!
//! Operations are grouped per service under [`services`]. Each one is built
//! and validated through an [`operation::OperationBuilder`] and executed by a
//! [`SonosClient`] over a [`Transport`] (SOAP over HTTP by default).
//!
//! ```rust,ignore
//! use sonos_api::{services::rendering_control, SonosClient};
//!
//! let client = SonosClient::new();
//! let op = rendering_control::get_volume("Master".to_string()).build()?;
//! let volume = client.execute("192.168.1.100", op)?.current_volume;
//! ```

pub mod client;
pub mod didl;
pub mod error;
pub mod operation;
pub mod service;
pub mod services;

pub use client::{SonosClient, Transport};
pub use error::{ApiError, Result};
pub use service::{Service, ServiceInfo};
pub use soap_client::{SoapClient, SoapError};
