//! Network lookups, topology, queue, playlists, alarms and radio

mod support;

use sonos_sdk::{Frequency, SdkError, Time, Track, TrackKind, TrackList};
use support::{FakeAlarm, FakeSonos};

const KITCHEN: (&str, &str) = ("192.168.1.30", "RINCON_KITCHEN01400");
const PATIO: (&str, &str) = ("192.168.1.31", "RINCON_PATIO01400");

fn household() -> std::sync::Arc<FakeSonos> {
    let fake = FakeSonos::new();
    fake.add_speaker(KITCHEN.0, KITCHEN.1, "Kitchen");
    fake.add_speaker(PATIO.0, PATIO.1, "Patio");
    fake
}

fn file(name: &str) -> Track {
    Track::network_file(format!("x-file-cifs://nas/music/{name}.mp3"))
}

fn uris(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(Track::uri).collect()
}

// ============================================================================
// Network and topology
// ============================================================================

#[test]
fn test_lookup_by_room() {
    let fake = household();
    let network = fake.network();

    assert_eq!(network.speakers().len(), 2);
    assert_eq!(network.speaker_by_room("Patio").unwrap().uuid(), PATIO.1);
    assert_eq!(network.speaker_by_room("  kitchen ").unwrap().ip(), KITCHEN.0);
    assert!(matches!(
        network.speaker_by_room("Garage"),
        Err(SdkError::NotFound { kind: "room", .. })
    ));
    assert!(network.speaker_by_uuid(PATIO.1).is_some());
}

#[test]
fn test_group_is_queried_once() {
    let fake = household();
    let network = fake.network();
    let kitchen = network.speaker_by_room("Kitchen").unwrap();

    kitchen.group().unwrap();
    kitchen.group().unwrap();
    kitchen.is_coordinator().unwrap();
    assert_eq!(fake.count(KITCHEN.0, "GetZoneGroupAttributes"), 1);

    kitchen.update_group();
    kitchen.group().unwrap();
    assert_eq!(fake.count(KITCHEN.0, "GetZoneGroupAttributes"), 2);
}

#[test]
fn test_controllers_follow_groups() {
    let fake = household();
    fake.join(PATIO.1, KITCHEN.1);
    let network = fake.network();

    let controllers = network.controllers().unwrap();
    assert_eq!(controllers.len(), 1);
    assert_eq!(controllers[0].uuid(), KITCHEN.1);

    let patio = network.speaker_by_room("Patio").unwrap();
    assert!(!patio.is_coordinator().unwrap());
    assert_eq!(network.controller_for(patio).unwrap().uuid(), KITCHEN.1);
    assert_eq!(network.controller_by_room("Patio").unwrap().uuid(), KITCHEN.1);

    let members: Vec<_> = controllers[0]
        .speakers()
        .unwrap()
        .into_iter()
        .map(|s| s.room().to_string())
        .collect();
    assert_eq!(members, vec!["Kitchen", "Patio"]);
}

#[test]
fn test_add_and_remove_speaker() {
    let fake = household();
    let network = fake.network();
    let kitchen = network.controller_by_room("Kitchen").unwrap();
    let patio = network.speaker_by_room("Patio").unwrap();

    kitchen.add_speaker(patio).unwrap();
    assert_eq!(patio.group().unwrap(), kitchen.group().unwrap());
    assert_eq!(kitchen.speakers().unwrap().len(), 2);

    kitchen.remove_speaker(patio).unwrap();
    assert!(patio.is_coordinator().unwrap());
    assert_ne!(patio.group().unwrap(), kitchen.group().unwrap());
}

#[test]
fn test_member_cannot_be_a_controller() {
    let fake = household();
    fake.join(PATIO.1, KITCHEN.1);
    let network = fake.network();
    let patio = network.speaker_by_room("Patio").unwrap();

    assert!(matches!(
        sonos_sdk::Controller::new(patio, &network),
        Err(SdkError::InvalidArgument(_))
    ));
}

#[test]
fn test_group_volume() {
    let fake = household();
    fake.join(PATIO.1, KITCHEN.1);
    fake.set_volume(KITCHEN.1, 30);
    fake.set_volume(PATIO.1, 41);
    let network = fake.network();
    let controller = network.controller().unwrap();

    assert_eq!(controller.volume().unwrap(), 36);
    controller.adjust_volume(-5).unwrap();
    assert_eq!(fake.volume(KITCHEN.1), 25);
    assert_eq!(fake.volume(PATIO.1), 36);
    controller.set_volume(10).unwrap();
    assert_eq!(controller.volume().unwrap(), 10);
}

#[test]
fn test_speaker_settings() {
    let fake = household();
    let network = fake.network();
    let kitchen = network.speaker_by_room("Kitchen").unwrap();

    kitchen.mute().unwrap();
    assert!(kitchen.is_muted().unwrap());
    kitchen.set_bass(-3).unwrap();
    assert_eq!(kitchen.bass().unwrap(), -3);
    kitchen.set_treble(4).unwrap();
    assert_eq!(kitchen.treble().unwrap(), 4);
    kitchen.set_loudness(false).unwrap();
    assert!(!kitchen.loudness().unwrap());
    kitchen.set_indicator(false).unwrap();
    assert!(!kitchen.indicator().unwrap());
    assert_eq!(kitchen.adjust_volume(7).unwrap(), 27);
}

// ============================================================================
// Queue
// ============================================================================

#[test]
fn test_add_then_remove_first_track() {
    let fake = household();
    let network = fake.network();
    let queue = network.controller_by_room("Kitchen").unwrap().queue();

    queue.add_tracks(&[file("A"), file("B")], None).unwrap();
    queue.remove_track(0).unwrap();

    assert_eq!(
        uris(&queue.all_tracks().unwrap()),
        vec!["x-file-cifs://nas/music/B.mp3"]
    );
}

#[test]
fn test_queue_insert_remove_and_page() {
    let fake = household();
    let network = fake.network();
    let queue = network.controller_by_room("Kitchen").unwrap().queue();

    let tracks: Vec<Track> = (0..40).map(|n| file(&n.to_string())).collect();
    queue.add_tracks(&tracks, None).unwrap();
    // 40 tracks go out in chunks of 16
    assert_eq!(fake.count(KITCHEN.0, "AddMultipleURIsToQueue"), 3);
    assert_eq!(queue.count().unwrap(), 40);

    queue.add_track(&file("first"), Some(0)).unwrap();
    queue.remove_tracks(&[1, 2, 3, 10]).unwrap();
    // Two ranges, removed back to front
    assert_eq!(fake.count(KITCHEN.0, "RemoveTrackRangeFromQueue"), 2);

    let all = queue.all_tracks().unwrap();
    assert_eq!(all.len(), 37);
    assert_eq!(all[0].uri(), "x-file-cifs://nas/music/first.mp3");
    assert_eq!(all[1].uri(), "x-file-cifs://nas/music/3.mp3");

    let page = queue.tracks(5, Some(2)).unwrap();
    assert_eq!(uris(&page), uris(&all[5..7]));

    queue.clear().unwrap();
    assert_eq!(queue.count().unwrap(), 0);
}

#[test]
fn test_stale_update_id_is_rejected() {
    let fake = household();
    fake.set_queue(KITCHEN.1, &["x-file-cifs://nas/music/A.mp3"]);
    let network = fake.network();
    let queue = network.controller_by_room("Kitchen").unwrap().queue();
    queue.count().unwrap();

    // Another client changes the queue behind our back
    fake.set_queue(KITCHEN.1, &["x-file-cifs://nas/music/Z.mp3"]);

    let err = queue.remove_track(0).unwrap_err();
    assert_eq!(err.fault_code(), Some(412));
}

// ============================================================================
// Playlists
// ============================================================================

#[test]
fn test_playlist_lookup() {
    let fake = household();
    let id = fake.add_playlist("Road Trip", &["x-file-cifs://nas/music/A.mp3"]);
    let network = fake.network();

    assert_eq!(network.playlists().unwrap().len(), 1);
    assert_eq!(network.playlist_by_name("road trip").unwrap().id(), id);
    assert_eq!(network.playlist_by_id(&id).unwrap().name(), "Road Trip");
    assert_eq!(network.playlist_by_id("1").unwrap().id(), "SQ:1");
    assert!(network.has_playlist("Road Trip").unwrap());
    assert!(!network.has_playlist("Workout").unwrap());
}

#[test]
fn test_playlists_beyond_one_page() {
    let fake = household();
    let ids: Vec<String> = (0..150)
        .map(|n| fake.add_playlist(&format!("List {n}"), &[]))
        .collect();
    let network = fake.network();

    assert_eq!(network.playlists().unwrap().len(), 150);
    assert_eq!(fake.count_all("Browse"), 2);
    assert_eq!(network.playlist_by_name("List 120").unwrap().id(), ids[120]);
    assert_eq!(network.playlist_by_id(&ids[149]).unwrap().name(), "List 149");
    assert!(network.has_playlist("list 101").unwrap());
}

#[test]
fn test_playlist_edits() {
    let fake = household();
    let network = fake.network();
    let playlist = network.create_playlist("Dinner").unwrap();
    assert_eq!(playlist.name(), "Dinner");

    playlist
        .add_tracks(&[file("A"), file("B"), file("C")], None)
        .unwrap();
    playlist.add_track(&file("first"), Some(0)).unwrap();
    assert_eq!(
        fake.playlist_uris(playlist.id()),
        vec![
            "x-file-cifs://nas/music/first.mp3",
            "x-file-cifs://nas/music/A.mp3",
            "x-file-cifs://nas/music/B.mp3",
            "x-file-cifs://nas/music/C.mp3",
        ]
    );

    playlist.move_track(0, 3).unwrap();
    playlist.remove_tracks(&[0, 1]).unwrap();
    assert_eq!(
        uris(&playlist.all_tracks().unwrap()),
        vec![
            "x-file-cifs://nas/music/C.mp3",
            "x-file-cifs://nas/music/first.mp3",
        ]
    );

    playlist.clear().unwrap();
    assert_eq!(playlist.count().unwrap(), 0);

    let id = playlist.id().to_string();
    playlist.delete().unwrap();
    assert!(matches!(
        network.playlist_by_id(&id),
        Err(SdkError::NotFound { .. })
    ));
}

// ============================================================================
// Alarms
// ============================================================================

fn alarm(id: u32) -> FakeAlarm {
    FakeAlarm {
        id,
        start_time: "07:00:00".to_string(),
        duration: "01:00:00".to_string(),
        recurrence: "WEEKDAYS".to_string(),
        enabled: true,
        room_uuid: KITCHEN.1.to_string(),
        play_mode: "SHUFFLE_NOREPEAT".to_string(),
        volume: 25,
    }
}

#[test]
fn test_read_alarms() {
    let fake = household();
    fake.add_alarm(alarm(4));
    fake.add_alarm(alarm(9));
    let network = fake.network();

    let alarms = network.alarms().unwrap();
    assert_eq!(alarms.len(), 2);

    let alarm = network.alarm_by_id(4).unwrap();
    assert_eq!(alarm.time().unwrap(), Time::from_seconds(7 * 3600));
    assert_eq!(alarm.frequency().unwrap(), Frequency::WEEKDAYS);
    assert_eq!(alarm.frequency_description().unwrap(), "Weekdays");
    assert!(alarm.is_enabled());
    assert!(alarm.shuffle() && !alarm.repeat());
    assert_eq!(alarm.room(), KITCHEN.1);
    assert!(matches!(
        network.alarm_by_id(5),
        Err(SdkError::NotFound { kind: "alarm", .. })
    ));
}

#[test]
fn test_edit_alarm() {
    let fake = household();
    fake.add_alarm(alarm(4));
    let network = fake.network();
    let mut alarm = network.alarm_by_id(4).unwrap();

    alarm.set_time(Time::parse("06:45:00").unwrap()).unwrap();
    alarm
        .set_frequency(Frequency::MONDAY.with(Frequency::FRIDAY))
        .unwrap();
    alarm.disable().unwrap();
    alarm.set_repeat(true).unwrap();
    alarm
        .set_room(network.speaker_by_room("Patio").unwrap())
        .unwrap();

    let stored = fake.alarm(4).unwrap();
    assert_eq!(stored.start_time, "06:45:00");
    assert_eq!(stored.recurrence, "ON_15");
    assert!(!stored.enabled);
    assert_eq!(stored.play_mode, "SHUFFLE");
    assert_eq!(stored.room_uuid, PATIO.1);

    alarm.delete().unwrap();
    assert!(fake.alarm(4).is_none());
}

#[test]
fn test_failed_alarm_edit_keeps_local_copy() {
    let fake = household();
    fake.add_alarm(alarm(4));
    let network = fake.network();
    let mut alarm = network.alarm_by_id(4).unwrap();
    fake.fail_next(KITCHEN.0, "UpdateAlarm", 501);

    assert!(alarm.set_volume(60).is_err());
    assert_eq!(alarm.volume(), 25);
}

// ============================================================================
// Radio
// ============================================================================

#[test]
fn test_radio_favourites() {
    let fake = household();
    fake.add_station("Jazz FM", "x-sonosapi-stream:s1234?sid=254");
    fake.add_station("News 24", "x-rincon-mp3radio://news.example.com/live");
    fake.add_show("Morning Show", "x-sonosapi-radio:p567?sid=254");
    let network = fake.network();
    let radio = network.radio().unwrap();

    assert_eq!(radio.stations().unwrap().len(), 2);
    let station = radio.station("jazz fm").unwrap();
    assert_eq!(station.kind(), TrackKind::Stream);
    assert_eq!(station.uri(), "x-sonosapi-stream:s1234?sid=254");
    assert_eq!(station.title(), Some("Jazz FM"));

    assert_eq!(radio.show("Morning Show").unwrap().uri(), "x-sonosapi-radio:p567?sid=254");
    assert!(matches!(
        radio.station("Classic"),
        Err(SdkError::NotFound { kind: "station", .. })
    ));
}

#[test]
fn test_radio_favourites_beyond_one_page() {
    let fake = household();
    for n in 0..120 {
        fake.add_station(
            &format!("Station {n}"),
            &format!("x-rincon-mp3radio://radio.example.com/{n}"),
        );
    }
    let network = fake.network();
    let radio = network.radio().unwrap();

    assert_eq!(radio.stations().unwrap().len(), 120);
    assert_eq!(
        radio.station("Station 110").unwrap().uri(),
        "x-rincon-mp3radio://radio.example.com/110"
    );
}
