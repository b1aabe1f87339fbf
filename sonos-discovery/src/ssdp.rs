//! SSDP M-SEARCH for Sonos zone players
//!
//! Internal to the crate: callers only see the locations it yields.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::time::{Duration, Instant};

use crate::error::{DiscoveryError, Result};

const MULTICAST_ADDR: &str = "239.255.255.250:1900";

/// Search target answered by every Sonos speaker
pub(crate) const ZONE_PLAYER_TARGET: &str = "urn:schemas-upnp-org:device:ZonePlayer:1";

/// The headers of one SSDP answer we care about
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SsdpResponse {
    pub location: String,
    pub search_target: String,
    pub usn: String,
    pub server: Option<String>,
}

impl SsdpResponse {
    /// Parse an HTTP-over-UDP answer, `None` if a required header is missing
    pub fn parse(text: &str) -> Option<Self> {
        let mut location = None;
        let mut search_target = None;
        let mut usn = None;
        let mut server = None;

        for line in text.lines() {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match name.trim().to_ascii_uppercase().as_str() {
                "LOCATION" => location = Some(value.to_string()),
                "ST" => search_target = Some(value.to_string()),
                "USN" => usn = Some(value.to_string()),
                "SERVER" => server = Some(value.to_string()),
                _ => {}
            }
        }

        Some(Self {
            location: location?,
            search_target: search_target?,
            usn: usn?,
            server,
        })
    }

    /// Sonos advertises itself in the SERVER header and USN
    pub fn looks_like_sonos(&self) -> bool {
        self.usn.contains("RINCON_")
            || self
                .server
                .as_deref()
                .is_some_and(|s| s.to_ascii_lowercase().contains("sonos"))
    }
}

fn search_request(search_target: &str) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {MULTICAST_ADDR}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: 1\r\n\
         ST: {search_target}\r\n\r\n"
    )
}

/// Send one M-SEARCH and collect distinct answers until `timeout` elapses
pub(crate) fn search(search_target: &str, timeout: Duration) -> Result<Vec<SsdpResponse>> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to bind UDP socket: {e}")))?;
    socket
        .set_multicast_loop_v4(true)
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set multicast loop: {e}")))?;
    socket
        .send_to(search_request(search_target).as_bytes(), MULTICAST_ADDR)
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to send M-SEARCH: {e}")))?;

    let deadline = Instant::now() + timeout;
    let mut seen = HashSet::new();
    let mut responses = Vec::new();
    let mut buffer = [0u8; 2048];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        socket
            .set_read_timeout(Some(remaining))
            .map_err(|e| DiscoveryError::NetworkError(e.to_string()))?;

        let size = match socket.recv_from(&mut buffer) {
            Ok((size, _)) => size,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
            Err(e) => return Err(DiscoveryError::NetworkError(format!("Socket error: {e}"))),
        };

        let Ok(text) = std::str::from_utf8(&buffer[..size]) else {
            continue;
        };
        match SsdpResponse::parse(text) {
            Some(response) if seen.insert(response.location.clone()) => {
                tracing::debug!(location = %response.location, "SSDP response");
                responses.push(response);
            }
            _ => {}
        }
    }

    Ok(responses)
}
