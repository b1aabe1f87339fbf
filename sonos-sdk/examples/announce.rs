//! Speak a short announcement in one or more rooms, then put every group back
//!
//! The speech is rendered by VoiceRSS into a directory that the speakers can
//! read as an SMB share.
//!
//! Run with:
//!   VOICERSS_KEY=... SONOS_SHARE_PATH=/srv/sonos SONOS_SHARE=nas/sonos \
//!   cargo run -p sonos-sdk --example announce -- "Dinner is ready" Kitchen "Living Room"

use std::env;

use sonos_sdk::{Directory, InterruptOptions, Network, SdkError, TextToSpeech, VoiceRss};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), SdkError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = env::args().skip(1);
    let Some(text) = args.next() else {
        eprintln!("usage: announce <text> [room...]");
        return Ok(());
    };
    let rooms: Vec<String> = args.collect();

    let api_key = env::var("VOICERSS_KEY").unwrap_or_default();
    let share_path = env::var("SONOS_SHARE_PATH").unwrap_or_else(|_| "/tmp/sonos".to_string());
    let share = env::var("SONOS_SHARE").unwrap_or_else(|_| "nas/sonos".to_string());

    println!("Discovering Sonos devices...");
    let network = Network::discover()?;
    if network.speakers().is_empty() {
        println!("No Sonos speakers found on the network");
        return Ok(());
    }

    let targets = if rooms.is_empty() {
        network.speakers().iter().collect::<Vec<_>>()
    } else {
        rooms
            .iter()
            .map(|room| network.speaker_by_room(room))
            .collect::<Result<Vec<_>, _>>()?
    };

    let directory = Directory::new(share_path, share, "announcements");
    let speech = TextToSpeech::new(text, directory, VoiceRss::new(api_key));

    println!("Announcing in {} room(s)", targets.len());
    match network.interrupt(&targets, &speech, InterruptOptions::default().with_volume(35)) {
        Ok(report) => println!("{report}"),
        Err(SdkError::Interrupt(report)) => {
            println!("Announcement finished with problems: {report}");
            for outcome in report.failed_actions() {
                println!("  {}", outcome.action);
            }
        }
        Err(e) => return Err(e),
    }

    Ok(())
}
