//! An in-memory Sonos household for integration tests
//!
//! `FakeSonos` implements [`Transport`] and answers the UPnP actions the SDK
//! sends with the same grouping, queue and fault behaviour as real players.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sonos_sdk::sonos_api::didl;
use sonos_sdk::sonos_api::operation::escape;
use sonos_sdk::sonos_api::{Service, SoapError, SonosClient, Transport};
use sonos_sdk::{Device, Network};
use xmltree::{Element, XMLNode};

/// Actions only a group coordinator accepts
const COORDINATOR_ONLY: [&str; 8] = [
    "Play",
    "Pause",
    "Stop",
    "Next",
    "Previous",
    "Seek",
    "SetPlayMode",
    "SetCrossfadeMode",
];

#[derive(Debug, Clone)]
struct Entry {
    uri: String,
    meta: String,
}

#[derive(Debug)]
struct Player {
    ip: String,
    uuid: String,
    room: String,
    group: String,
    transport_uri: String,
    transport_meta: String,
    state: String,
    track: u32,
    position: String,
    queue: Vec<Entry>,
    update_id: u32,
    play_mode: String,
    crossfade: bool,
    volume: u8,
    mute: bool,
    bass: i8,
    treble: i8,
    loudness: bool,
    led: String,
    remaining_polls: Option<u32>,
}

impl Player {
    fn current_uri(&self) -> String {
        if self.transport_uri.starts_with("x-rincon-queue:") {
            self.queue
                .get(self.track.saturating_sub(1) as usize)
                .map(|entry| entry.uri.clone())
                .unwrap_or_default()
        } else {
            self.transport_uri.clone()
        }
    }

    fn current_meta(&self) -> String {
        if self.transport_uri.starts_with("x-rincon-queue:") {
            self.queue
                .get(self.track.saturating_sub(1) as usize)
                .map(|entry| entry.meta.clone())
                .unwrap_or_default()
        } else {
            self.transport_meta.clone()
        }
    }
}

#[derive(Debug)]
struct SavedQueue {
    id: String,
    title: String,
    entries: Vec<Entry>,
    update_id: u32,
}

#[derive(Debug, Clone)]
pub struct FakeAlarm {
    pub id: u32,
    pub start_time: String,
    pub duration: String,
    pub recurrence: String,
    pub enabled: bool,
    pub room_uuid: String,
    pub play_mode: String,
    pub volume: u8,
}

#[derive(Debug, Default)]
struct State {
    players: Vec<Player>,
    next_group: u32,
    playlists: Vec<SavedQueue>,
    next_playlist: u32,
    alarms: Vec<FakeAlarm>,
    stations: Vec<(String, String)>,
    shows: Vec<(String, String)>,
    finish_after: HashMap<String, u32>,
    calls: Vec<(String, String)>,
    failures: Vec<Failure>,
}

/// A fault returned once `skip` matching calls have gone through
#[derive(Debug)]
struct Failure {
    ip: String,
    action: String,
    skip: u32,
    code: u16,
}

impl State {
    fn index(&self, ip: &str) -> Result<usize, SoapError> {
        self.players
            .iter()
            .position(|p| p.ip == ip)
            .ok_or_else(|| SoapError::Network(format!("no route to {ip}")))
    }

    fn index_of_uuid(&self, uuid: &str) -> Option<usize> {
        self.players.iter().position(|p| p.uuid == uuid)
    }

    fn members(&self, group: &str) -> Vec<usize> {
        (0..self.players.len())
            .filter(|&i| self.players[i].group == group)
            .collect()
    }

    fn is_coordinator(&self, i: usize) -> bool {
        let player = &self.players[i];
        self.members(&player.group).len() == 1
            || player.group.split(':').next() == Some(player.uuid.as_str())
    }

    fn new_group(&mut self, uuid: &str) -> String {
        self.next_group += 1;
        format!("{uuid}:{}", self.next_group)
    }

    /// Take player `i` out of its group; a departing coordinator hands the
    /// rest of the group to the next member
    fn detach(&mut self, i: usize) {
        let group = self.players[i].group.clone();
        let others: Vec<usize> = self.members(&group).into_iter().filter(|&m| m != i).collect();
        if others.is_empty() {
            return;
        }

        if self.is_coordinator(i) {
            let heir = self.players[others[0]].uuid.clone();
            let group = self.new_group(&heir);
            for &m in &others {
                self.players[m].group = group.clone();
                if m != others[0] {
                    self.players[m].transport_uri = format!("x-rincon:{heir}");
                }
            }
            let heir = &mut self.players[others[0]];
            heir.transport_uri = String::new();
            heir.state = "STOPPED".to_string();
        }

        let uuid = self.players[i].uuid.clone();
        let group = self.new_group(&uuid);
        let player = &mut self.players[i];
        player.group = group;
        player.transport_uri = String::new();
        player.transport_meta = String::new();
        player.state = "STOPPED".to_string();
    }
}

#[derive(Debug, Default)]
pub struct FakeSonos {
    state: Mutex<State>,
}

impl FakeSonos {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A standalone player at `ip`
    pub fn add_speaker(&self, ip: &str, uuid: &str, room: &str) {
        let mut state = self.state.lock().unwrap();
        let group = state.new_group(uuid);
        state.players.push(Player {
            ip: ip.to_string(),
            uuid: uuid.to_string(),
            room: room.to_string(),
            group,
            transport_uri: String::new(),
            transport_meta: String::new(),
            state: "STOPPED".to_string(),
            track: 0,
            position: "0:00:00".to_string(),
            queue: Vec::new(),
            update_id: 1,
            play_mode: "NORMAL".to_string(),
            crossfade: false,
            volume: 20,
            mute: false,
            bass: 0,
            treble: 0,
            loudness: true,
            led: "On".to_string(),
            remaining_polls: None,
        });
    }

    /// Put `member` in the group `coordinator` leads
    pub fn join(&self, member: &str, coordinator: &str) {
        let mut state = self.state.lock().unwrap();
        let m = state.index_of_uuid(member).unwrap();
        let c = state.index_of_uuid(coordinator).unwrap();
        state.detach(m);
        state.players[m].group = state.players[c].group.clone();
        state.players[m].transport_uri = format!("x-rincon:{coordinator}");
    }

    pub fn set_queue(&self, uuid: &str, uris: &[&str]) {
        let mut state = self.state.lock().unwrap();
        let i = state.index_of_uuid(uuid).unwrap();
        let player = &mut state.players[i];
        player.queue = uris
            .iter()
            .map(|uri| Entry {
                uri: uri.to_string(),
                meta: String::new(),
            })
            .collect();
        player.update_id += 1;
        player.transport_uri = format!("x-rincon-queue:{uuid}#0");
        player.track = 1;
    }

    /// Playing queue entry `track` (1-based) from `position`
    pub fn set_playing(&self, uuid: &str, track: u32, position: &str) {
        let mut state = self.state.lock().unwrap();
        let i = state.index_of_uuid(uuid).unwrap();
        let player = &mut state.players[i];
        player.state = "PLAYING".to_string();
        player.track = track;
        player.position = position.to_string();
    }

    pub fn set_play_mode(&self, uuid: &str, play_mode: &str) {
        let mut state = self.state.lock().unwrap();
        let i = state.index_of_uuid(uuid).unwrap();
        state.players[i].play_mode = play_mode.to_string();
    }

    pub fn set_volume(&self, uuid: &str, volume: u8) {
        let mut state = self.state.lock().unwrap();
        let i = state.index_of_uuid(uuid).unwrap();
        state.players[i].volume = volume;
    }

    /// Playing `uri` reports PLAYING for `polls` transport queries, then stops
    pub fn finishes_after(&self, uri: &str, polls: u32) {
        self.state
            .lock()
            .unwrap()
            .finish_after
            .insert(uri.to_string(), polls);
    }

    pub fn add_playlist(&self, title: &str, uris: &[&str]) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_playlist += 1;
        let id = format!("SQ:{}", state.next_playlist);
        state.playlists.push(SavedQueue {
            id: id.clone(),
            title: title.to_string(),
            entries: uris
                .iter()
                .map(|uri| Entry {
                    uri: uri.to_string(),
                    meta: String::new(),
                })
                .collect(),
            update_id: 1,
        });
        id
    }

    pub fn add_alarm(&self, alarm: FakeAlarm) {
        self.state.lock().unwrap().alarms.push(alarm);
    }

    pub fn add_station(&self, title: &str, uri: &str) {
        self.state
            .lock()
            .unwrap()
            .stations
            .push((title.to_string(), uri.to_string()));
    }

    pub fn add_show(&self, title: &str, uri: &str) {
        self.state
            .lock()
            .unwrap()
            .shows
            .push((title.to_string(), uri.to_string()));
    }

    /// Answer the next `action` sent to `ip` with UPnP fault `code`
    pub fn fail_next(&self, ip: &str, action: &str, code: u16) {
        self.fail_after(ip, action, 0, code);
    }

    /// Let `skip` calls of `action` through, then fault the one after
    pub fn fail_after(&self, ip: &str, action: &str, skip: u32, code: u16) {
        self.state.lock().unwrap().failures.push(Failure {
            ip: ip.to_string(),
            action: action.to_string(),
            skip,
            code,
        });
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    pub fn count(&self, ip: &str, action: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(i, a)| i == ip && a == action)
            .count()
    }

    pub fn count_all(&self, action: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(_, a)| a == action)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn reset_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn group_of(&self, uuid: &str) -> String {
        let state = self.state.lock().unwrap();
        let i = state.index_of_uuid(uuid).unwrap();
        state.players[i].group.clone()
    }

    pub fn coordinator_of(&self, uuid: &str) -> String {
        self.group_of(uuid)
            .split(':')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    pub fn transport_state(&self, uuid: &str) -> String {
        let state = self.state.lock().unwrap();
        let i = state.index_of_uuid(uuid).unwrap();
        state.players[i].state.clone()
    }

    pub fn queue_uris(&self, uuid: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let i = state.index_of_uuid(uuid).unwrap();
        state.players[i].queue.iter().map(|e| e.uri.clone()).collect()
    }

    pub fn volume(&self, uuid: &str) -> u8 {
        let state = self.state.lock().unwrap();
        let i = state.index_of_uuid(uuid).unwrap();
        state.players[i].volume
    }

    pub fn playlist_uris(&self, id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .playlists
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.entries.iter().map(|e| e.uri.clone()).collect())
            .unwrap_or_default()
    }

    pub fn alarm(&self, id: u32) -> Option<FakeAlarm> {
        let state = self.state.lock().unwrap();
        state.alarms.iter().find(|a| a.id == id).cloned()
    }

    /// A network over this fake, speakers in the order they were added
    pub fn network(self: &Arc<Self>) -> Network {
        let devices = {
            let state = self.state.lock().unwrap();
            state
                .players
                .iter()
                .map(|p| Device {
                    id: format!("uuid:{}", p.uuid),
                    name: format!("{} - Sonos One", p.room),
                    room_name: p.room.clone(),
                    ip_address: p.ip.clone(),
                    port: 1400,
                    model_name: "Sonos One".to_string(),
                })
                .collect()
        };
        let transport: Arc<dyn Transport> = self.clone();
        Network::from_devices(SonosClient::with_transport(transport), devices)
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    fn handle(
        &self,
        ip: &str,
        action: &str,
        args: &HashMap<String, String>,
    ) -> Result<Vec<(&'static str, String)>, u16> {
        let mut state = self.state.lock().unwrap();
        let i = state.index(ip).map_err(|_| 0u16)?;
        let arg = |name: &str| args.get(name).cloned().unwrap_or_default();
        let num = |name: &str| arg(name).trim().parse::<u32>().unwrap_or_default();

        if COORDINATOR_ONLY.contains(&action) && !state.is_coordinator(i) {
            return Err(800);
        }

        let reply = match action {
            // ZoneGroupTopology
            "GetZoneGroupAttributes" => {
                let group = state.players[i].group.clone();
                let members: Vec<String> = state
                    .members(&group)
                    .into_iter()
                    .map(|m| state.players[m].uuid.clone())
                    .collect();
                vec![
                    ("CurrentZoneGroupName", state.players[i].room.clone()),
                    ("CurrentZoneGroupID", group),
                    ("CurrentZonePlayerUUIDsInGroup", members.join(",")),
                ]
            }

            // AVTransport: transport
            "Play" => {
                let player = &state.players[i];
                if player.transport_uri.is_empty()
                    || (player.transport_uri.starts_with("x-rincon-queue:")
                        && player.queue.is_empty())
                {
                    return Err(701);
                }
                let uri = player.current_uri();
                let polls = state.finish_after.get(&uri).copied();
                let player = &mut state.players[i];
                player.state = "PLAYING".to_string();
                player.remaining_polls = polls;
                vec![]
            }
            "Pause" => {
                if state.players[i].state != "PLAYING" {
                    return Err(701);
                }
                state.players[i].state = "PAUSED_PLAYBACK".to_string();
                vec![]
            }
            "Stop" => {
                state.players[i].state = "STOPPED".to_string();
                vec![]
            }
            "Next" | "Previous" => {
                let player = &mut state.players[i];
                player.track = if action == "Next" {
                    (player.track + 1).min(player.queue.len() as u32)
                } else {
                    player.track.saturating_sub(1).max(1)
                };
                player.position = "0:00:00".to_string();
                vec![]
            }
            "Seek" => {
                let player = &mut state.players[i];
                match arg("Unit").as_str() {
                    "TRACK_NR" => {
                        let track = num("Target");
                        if track == 0 || track as usize > player.queue.len() {
                            return Err(711);
                        }
                        player.track = track;
                        player.position = "0:00:00".to_string();
                    }
                    "REL_TIME" => player.position = arg("Target"),
                    _ => return Err(402),
                }
                vec![]
            }
            "GetTransportInfo" => {
                let player = &mut state.players[i];
                if player.state == "PLAYING" {
                    match player.remaining_polls {
                        Some(0) => {
                            player.state = "STOPPED".to_string();
                            player.remaining_polls = None;
                        }
                        Some(n) => player.remaining_polls = Some(n - 1),
                        None => {}
                    }
                }
                vec![
                    ("CurrentTransportState", player.state.clone()),
                    ("CurrentTransportStatus", "OK".to_string()),
                    ("CurrentSpeed", "1".to_string()),
                ]
            }
            "GetPositionInfo" => {
                let player = &state.players[i];
                let queued = player.transport_uri.starts_with("x-rincon-queue:");
                vec![
                    ("Track", if queued { player.track } else { 1 }.to_string()),
                    ("TrackDuration", "0:03:00".to_string()),
                    ("TrackMetaData", player.current_meta()),
                    ("TrackURI", player.current_uri()),
                    ("RelTime", player.position.clone()),
                ]
            }
            "GetMediaInfo" => {
                let player = &state.players[i];
                vec![
                    ("NrTracks", player.queue.len().to_string()),
                    ("MediaDuration", "NOT_IMPLEMENTED".to_string()),
                    ("CurrentURI", player.transport_uri.clone()),
                    ("CurrentURIMetaData", player.transport_meta.clone()),
                ]
            }
            "GetTransportSettings" => vec![
                ("PlayMode", state.players[i].play_mode.clone()),
                ("RecQualityMode", "NOT_IMPLEMENTED".to_string()),
            ],
            "SetPlayMode" => {
                state.players[i].play_mode = arg("NewPlayMode");
                vec![]
            }
            "GetCrossfadeMode" => vec![(
                "CrossfadeMode",
                if state.players[i].crossfade { "1" } else { "0" }.to_string(),
            )],
            "SetCrossfadeMode" => {
                state.players[i].crossfade = arg("CrossfadeMode") == "1";
                vec![]
            }

            // AVTransport: sources and grouping
            "SetAVTransportURI" => {
                let uri = arg("CurrentURI");
                if let Some(leader) = uri.strip_prefix("x-rincon:") {
                    let c = state.index_of_uuid(leader).ok_or(701u16)?;
                    if c == i {
                        return Err(701);
                    }
                    state.detach(i);
                    let group = state.players[c].group.clone();
                    let player = &mut state.players[i];
                    player.group = group;
                    player.transport_uri = uri;
                } else {
                    if !state.is_coordinator(i) {
                        state.detach(i);
                    }
                    let player = &mut state.players[i];
                    player.transport_uri = uri;
                    player.transport_meta = arg("CurrentURIMetaData");
                    player.state = "STOPPED".to_string();
                    player.track = 1;
                    player.position = "0:00:00".to_string();
                    player.remaining_polls = None;
                }
                vec![]
            }
            "BecomeCoordinatorOfStandaloneGroup" => {
                state.detach(i);
                vec![
                    ("DelegatedGroupCoordinatorID", String::new()),
                    ("NewGroupID", state.players[i].group.clone()),
                ]
            }

            // AVTransport: queue
            "AddMultipleURIsToQueue" => {
                let player = &mut state.players[i];
                if num("UpdateID") != player.update_id {
                    return Err(412);
                }
                let uris: Vec<String> = arg("EnqueuedURIs")
                    .split(' ')
                    .filter(|u| !u.is_empty())
                    .map(str::to_string)
                    .collect();
                let metas = split_metadata(&arg("EnqueuedURIsMetaData"));
                if uris.len() as u32 != num("NumberOfURIs") {
                    return Err(402);
                }
                let desired = num("DesiredFirstTrackNumberEnqueued");
                let at = if desired == 0 {
                    player.queue.len()
                } else {
                    (desired as usize - 1).min(player.queue.len())
                };
                for (offset, uri) in uris.iter().enumerate() {
                    let meta = metas.get(offset).cloned().unwrap_or_default();
                    player.queue.insert(
                        at + offset,
                        Entry {
                            uri: uri.clone(),
                            meta,
                        },
                    );
                }
                player.update_id += 1;
                vec![
                    ("FirstTrackNumberEnqueued", (at + 1).to_string()),
                    ("NumTracksAdded", uris.len().to_string()),
                    ("NewQueueLength", player.queue.len().to_string()),
                    ("NewUpdateID", player.update_id.to_string()),
                ]
            }
            "RemoveTrackRangeFromQueue" => {
                let player = &mut state.players[i];
                if num("UpdateID") != player.update_id {
                    return Err(412);
                }
                let start = num("StartingIndex") as usize;
                let count = num("NumberOfTracks") as usize;
                if start == 0 || start - 1 + count > player.queue.len() {
                    return Err(711);
                }
                player.queue.drain(start - 1..start - 1 + count);
                player.update_id += 1;
                vec![("NewUpdateID", player.update_id.to_string())]
            }
            "RemoveAllTracksFromQueue" => {
                let player = &mut state.players[i];
                player.queue.clear();
                player.update_id += 1;
                vec![]
            }

            // AVTransport: saved queues
            "CreateSavedQueue" => {
                state.next_playlist += 1;
                let id = format!("SQ:{}", state.next_playlist);
                state.playlists.push(SavedQueue {
                    id: id.clone(),
                    title: arg("Title"),
                    entries: Vec::new(),
                    update_id: 1,
                });
                vec![
                    ("NumTracksAdded", "0".to_string()),
                    ("NewQueueLength", "0".to_string()),
                    ("AssignedObjectID", id),
                    ("NewUpdateID", "1".to_string()),
                ]
            }
            "AddURIToSavedQueue" => {
                let playlist = state
                    .playlists
                    .iter_mut()
                    .find(|p| p.id == arg("ObjectID"))
                    .ok_or(701u16)?;
                if num("UpdateID") != playlist.update_id {
                    return Err(412);
                }
                let index = num("AddAtIndex") as usize;
                let at = index.min(playlist.entries.len());
                playlist.entries.insert(
                    at,
                    Entry {
                        uri: arg("EnqueuedURI"),
                        meta: arg("EnqueuedURIMetaData"),
                    },
                );
                playlist.update_id += 1;
                vec![
                    ("NumTracksAdded", "1".to_string()),
                    ("NewQueueLength", playlist.entries.len().to_string()),
                    ("NewUpdateID", playlist.update_id.to_string()),
                ]
            }
            "ReorderTracksInSavedQueue" => {
                let playlist = state
                    .playlists
                    .iter_mut()
                    .find(|p| p.id == arg("ObjectID"))
                    .ok_or(701u16)?;
                if num("UpdateID") != playlist.update_id {
                    return Err(412);
                }
                let before = playlist.entries.len() as i32;
                let tracks: Vec<usize> = arg("TrackList")
                    .split(',')
                    .filter_map(|t| t.trim().parse().ok())
                    .collect();
                let positions = arg("NewPositionList");
                if positions.is_empty() {
                    let mut tracks = tracks;
                    tracks.sort_unstable();
                    for position in tracks.into_iter().rev() {
                        if position < playlist.entries.len() {
                            playlist.entries.remove(position);
                        }
                    }
                } else {
                    let from = tracks.first().copied().ok_or(402u16)?;
                    let to: usize = positions.trim().parse().map_err(|_| 402u16)?;
                    if from >= playlist.entries.len() {
                        return Err(711);
                    }
                    let entry = playlist.entries.remove(from);
                    playlist.entries.insert(to.min(playlist.entries.len()), entry);
                }
                playlist.update_id += 1;
                vec![
                    (
                        "QueueLengthChange",
                        (playlist.entries.len() as i32 - before).to_string(),
                    ),
                    ("NewQueueLength", playlist.entries.len().to_string()),
                    ("NewUpdateID", playlist.update_id.to_string()),
                ]
            }

            // ContentDirectory
            "Browse" => browse(&state, i, &arg("ObjectID"), num("StartingIndex"), num("RequestedCount"))?,
            "DestroyObject" => {
                let id = arg("ObjectID");
                let before = state.playlists.len();
                state.playlists.retain(|p| p.id != id);
                if state.playlists.len() == before {
                    return Err(701);
                }
                vec![]
            }

            // RenderingControl
            "GetVolume" => vec![("CurrentVolume", state.players[i].volume.to_string())],
            "SetVolume" => {
                state.players[i].volume = num("DesiredVolume").min(100) as u8;
                vec![]
            }
            "SetRelativeVolume" => {
                let adjustment: i32 = arg("Adjustment").trim().parse().unwrap_or_default();
                let player = &mut state.players[i];
                player.volume = (i32::from(player.volume) + adjustment).clamp(0, 100) as u8;
                vec![("NewVolume", player.volume.to_string())]
            }
            "GetMute" => vec![("CurrentMute", flag(state.players[i].mute))],
            "SetMute" => {
                state.players[i].mute = arg("DesiredMute") == "1";
                vec![]
            }
            "GetBass" => vec![("CurrentBass", state.players[i].bass.to_string())],
            "SetBass" => {
                state.players[i].bass = arg("DesiredBass").trim().parse().unwrap_or_default();
                vec![]
            }
            "GetTreble" => vec![("CurrentTreble", state.players[i].treble.to_string())],
            "SetTreble" => {
                state.players[i].treble = arg("DesiredTreble").trim().parse().unwrap_or_default();
                vec![]
            }
            "GetLoudness" => vec![("CurrentLoudness", flag(state.players[i].loudness))],
            "SetLoudness" => {
                state.players[i].loudness = arg("DesiredLoudness") == "1";
                vec![]
            }

            // DeviceProperties
            "GetLEDState" => vec![("CurrentLEDState", state.players[i].led.clone())],
            "SetLEDState" => {
                state.players[i].led = arg("DesiredLEDState");
                vec![]
            }

            // AlarmClock
            "ListAlarms" => {
                let mut xml = String::from("<Alarms>");
                for alarm in &state.alarms {
                    xml.push_str(&format!(
                        r#"<Alarm ID="{}" StartTime="{}" Duration="{}" Recurrence="{}" Enabled="{}" RoomUUID="{}" ProgramURI="x-rincon-buzzer:0" ProgramMetaData="" PlayMode="{}" Volume="{}" IncludeLinkedZones="0"/>"#,
                        alarm.id,
                        escape(&alarm.start_time),
                        escape(&alarm.duration),
                        escape(&alarm.recurrence),
                        flag(alarm.enabled),
                        escape(&alarm.room_uuid),
                        escape(&alarm.play_mode),
                        alarm.volume,
                    ));
                }
                xml.push_str("</Alarms>");
                vec![
                    ("CurrentAlarmList", xml),
                    ("CurrentAlarmListVersion", "RINCON_FAKE:1".to_string()),
                ]
            }
            "UpdateAlarm" => {
                let id = num("ID");
                let alarm = state
                    .alarms
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or(801u16)?;
                alarm.start_time = arg("StartLocalTime");
                alarm.duration = arg("Duration");
                alarm.recurrence = arg("Recurrence");
                alarm.enabled = arg("Enabled") == "1";
                alarm.room_uuid = arg("RoomUUID");
                alarm.play_mode = arg("PlayMode");
                alarm.volume = num("Volume").min(100) as u8;
                vec![]
            }
            "DestroyAlarm" => {
                let id = num("ID");
                let before = state.alarms.len();
                state.alarms.retain(|a| a.id != id);
                if state.alarms.len() == before {
                    return Err(801);
                }
                vec![]
            }

            _ => return Err(401),
        };
        Ok(reply)
    }
}

impl Transport for FakeSonos {
    fn send(
        &self,
        ip: &str,
        _service: Service,
        action: &str,
        payload: &str,
    ) -> Result<Element, SoapError> {
        {
            let mut state = self.state.lock().unwrap();
            state.index(ip)?;
            state.calls.push((ip.to_string(), action.to_string()));
            if let Some(at) = state
                .failures
                .iter()
                .position(|f| f.ip == ip && f.action == action)
            {
                if state.failures[at].skip > 0 {
                    state.failures[at].skip -= 1;
                } else {
                    let failure = state.failures.remove(at);
                    return Err(fault(failure.code, payload));
                }
            }
        }

        let args = parse_arguments(payload)?;
        match self.handle(ip, action, &args) {
            Ok(fields) => Ok(response(action, fields)),
            Err(code) => Err(fault(code, payload)),
        }
    }
}

fn fault(code: u16, request: &str) -> SoapError {
    SoapError::Fault {
        code,
        description: None,
        request: request.to_string(),
        response: format!("<errorCode>{code}</errorCode>"),
    }
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

fn parse_arguments(payload: &str) -> Result<HashMap<String, String>, SoapError> {
    let root = Element::parse(format!("<args>{payload}</args>").as_bytes())
        .map_err(|e| SoapError::Parse(e.to_string()))?;
    Ok(root
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .map(|e| {
            (
                e.name.clone(),
                e.get_text().map(|t| t.into_owned()).unwrap_or_default(),
            )
        })
        .collect())
}

fn response(action: &str, fields: Vec<(&'static str, String)>) -> Element {
    let mut root = Element::new(&format!("{action}Response"));
    for (name, value) in fields {
        let mut child = Element::new(name);
        if !value.is_empty() {
            child.children.push(XMLNode::Text(value));
        }
        root.children.push(XMLNode::Element(child));
    }
    root
}

/// Space-joined DIDL-Lite documents back into one document per track
fn split_metadata(joined: &str) -> Vec<String> {
    joined
        .split("</DIDL-Lite>")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| format!("{part}</DIDL-Lite>"))
        .collect()
}

fn browse(
    state: &State,
    i: usize,
    object_id: &str,
    start: u32,
    count: u32,
) -> Result<Vec<(&'static str, String)>, u16> {
    let mut items = Vec::new();
    let update_id;

    match object_id {
        "Q:0" => {
            let player = &state.players[i];
            for (n, entry) in player.queue.iter().enumerate() {
                items.push(render_item(&format!("Q:0/{}", n + 1), "Q:0", entry));
            }
            update_id = player.update_id;
        }
        "SQ:" => {
            for playlist in &state.playlists {
                items.push(format!(
                    r#"<container id="{}" parentID="SQ:" restricted="true"><dc:title>{}</dc:title><upnp:class>{}</upnp:class></container>"#,
                    escape(&playlist.id),
                    escape(&playlist.title),
                    didl::CLASS_PLAYLIST,
                ));
            }
            update_id = 1;
        }
        "R:0/0" | "R:0/1" => {
            let favourites = if object_id == "R:0/0" {
                &state.stations
            } else {
                &state.shows
            };
            for (n, (title, uri)) in favourites.iter().enumerate() {
                items.push(format!(
                    r#"<item id="{object_id}/{n}" parentID="{object_id}" restricted="true"><dc:title>{}</dc:title><upnp:class>{}</upnp:class><res protocolInfo="x-rincon-mp3radio:*:*:*">{}</res></item>"#,
                    escape(title),
                    didl::CLASS_BROADCAST,
                    escape(uri),
                ));
            }
            update_id = 1;
        }
        id => {
            let playlist = state
                .playlists
                .iter()
                .find(|p| p.id == id)
                .ok_or(701u16)?;
            for (n, entry) in playlist.entries.iter().enumerate() {
                items.push(render_item(&format!("{id}/{n}"), id, entry));
            }
            update_id = playlist.update_id;
        }
    }

    let total = items.len();
    let page: Vec<String> = items
        .into_iter()
        .skip(start as usize)
        .take(count as usize)
        .collect();
    let result = if page.is_empty() {
        String::new()
    } else {
        format!(
            r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns:r="urn:schemas-rinconnetworks-com:metadata-1-0/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">{}</DIDL-Lite>"#,
            page.concat()
        )
    };

    Ok(vec![
        ("Result", result),
        ("NumberReturned", page_len(start, count, total).to_string()),
        ("TotalMatches", total.to_string()),
        ("UpdateID", update_id.to_string()),
    ])
}

fn page_len(start: u32, count: u32, total: usize) -> usize {
    total.saturating_sub(start as usize).min(count as usize)
}

/// A queue or playlist entry as the device lists it
fn render_item(id: &str, parent: &str, entry: &Entry) -> String {
    let item = didl::parse(&entry.meta)
        .ok()
        .and_then(|items| items.into_iter().next())
        .unwrap_or_default();

    let mut xml = format!(
        r#"<item id="{}" parentID="{}" restricted="true"><res protocolInfo="*:*:audio/mpeg:*">{}</res>"#,
        escape(id),
        escape(parent),
        escape(&entry.uri)
    );
    let fields = [
        ("dc:title", item.title),
        ("dc:creator", item.creator),
        ("upnp:album", item.album),
        ("upnp:albumArtURI", item.album_art_uri),
        ("upnp:class", item.class),
        (
            "upnp:originalTrackNumber",
            item.original_track_number.map(|n| n.to_string()),
        ),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            xml.push_str(&format!("<{name}>{}</{name}>", escape(&value)));
        }
    }
    xml.push_str("</item>");
    xml
}
