//! Track positions and durations
//!
//! Sonos reports times as `h:mm:ss` strings (`RelTime`, `TrackDuration`,
//! alarm start times). [`Time`] holds whole seconds and converts both ways.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SdkError};

/// A position or duration in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time {
    seconds: u32,
}

impl Time {
    pub const ZERO: Time = Time { seconds: 0 };

    pub const fn from_seconds(seconds: u32) -> Self {
        Self { seconds }
    }

    /// Parse `h:mm:ss`, `mm:ss` or `ss`
    ///
    /// Devices answer `NOT_IMPLEMENTED` (or nothing) for streams; both read
    /// as zero. Fractional seconds are dropped.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() || text == "NOT_IMPLEMENTED" {
            return Ok(Self::ZERO);
        }

        let whole = text.split('.').next().unwrap_or(text);
        let parts: Vec<&str> = whole.split(':').collect();
        if parts.len() > 3 {
            return Err(SdkError::InvalidTime(text.to_string()));
        }

        let mut seconds: u32 = 0;
        for part in parts {
            let value: u32 = part
                .trim()
                .parse()
                .map_err(|_| SdkError::InvalidTime(text.to_string()))?;
            seconds = seconds
                .checked_mul(60)
                .and_then(|s| s.checked_add(value))
                .ok_or_else(|| SdkError::InvalidTime(text.to_string()))?;
        }
        Ok(Self { seconds })
    }

    pub fn as_seconds(&self) -> u32 {
        self.seconds
    }

    pub fn hours(&self) -> u32 {
        self.seconds / 3600
    }

    pub fn minutes(&self) -> u32 {
        self.seconds / 60 % 60
    }

    pub fn seconds(&self) -> u32 {
        self.seconds % 60
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

impl FromStr for Time {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<u32> for Time {
    fn from(seconds: u32) -> Self {
        Self::from_seconds(seconds)
    }
}
