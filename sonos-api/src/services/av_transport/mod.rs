//! AVTransport service for playback, queue and grouping control
//!
//! ```rust,ignore
//! use sonos_api::services::av_transport;
//!
//! let play_op = av_transport::play("1".to_string()).build()?;
//! client.execute("192.168.1.100", play_op)?;
//! ```

pub mod operations;

pub use operations::*;
