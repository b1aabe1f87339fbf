//! RenderingControl service: per-speaker volume and equalisation
//!
//! ```rust,ignore
//! use sonos_api::services::rendering_control;
//!
//! let op = rendering_control::set_volume("Master".to_string(), 25).build()?;
//! client.execute("192.168.1.100", op)?;
//! ```

pub mod operations;

pub use operations::*;
