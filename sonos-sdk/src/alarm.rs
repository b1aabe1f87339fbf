//! Household alarms
//!
//! Sonos stores the days an alarm fires as a recurrence string (`DAILY`,
//! `WEEKDAYS`, `ON_135`, …). [`Frequency`] is the equivalent day bitmask
//! and converts both ways.

use std::fmt;

use sonos_api::services::alarm_clock::{self, AlarmEntry};

use crate::controller::Mode;
use crate::error::{Result, SdkError};
use crate::speaker::Speaker;
use crate::time::Time;

/// Days of the week as a bitmask, Monday = 1 through Sunday = 64
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Frequency(u8);

/// Bit, recurrence digit and short name, Monday first
const DAYS: [(u8, char, &str); 7] = [
    (1, '1', "Mon"),
    (2, '2', "Tue"),
    (4, '3', "Wed"),
    (8, '4', "Thu"),
    (16, '5', "Fri"),
    (32, '6', "Sat"),
    (64, '0', "Sun"),
];

impl Frequency {
    pub const ONCE: Frequency = Frequency(0);
    pub const MONDAY: Frequency = Frequency(1);
    pub const TUESDAY: Frequency = Frequency(2);
    pub const WEDNESDAY: Frequency = Frequency(4);
    pub const THURSDAY: Frequency = Frequency(8);
    pub const FRIDAY: Frequency = Frequency(16);
    pub const SATURDAY: Frequency = Frequency(32);
    pub const SUNDAY: Frequency = Frequency(64);
    pub const WEEKDAYS: Frequency = Frequency(31);
    pub const WEEKENDS: Frequency = Frequency(96);
    pub const DAILY: Frequency = Frequency(127);

    /// Bits above Sunday are dropped
    pub const fn from_bits(bits: u8) -> Self {
        Frequency(bits & 127)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, days: Frequency) -> bool {
        self.0 & days.0 == days.0
    }

    pub fn with(self, days: Frequency) -> Self {
        Frequency(self.0 | days.0)
    }

    pub fn without(self, days: Frequency) -> Self {
        Frequency(self.0 & !days.0)
    }

    /// Parse a device recurrence string
    pub fn from_recurrence(recurrence: &str) -> Result<Self> {
        let recurrence = recurrence.trim();
        match recurrence {
            "ONCE" => return Ok(Self::ONCE),
            "DAILY" => return Ok(Self::DAILY),
            "WEEKDAYS" => return Ok(Self::WEEKDAYS),
            "WEEKENDS" => return Ok(Self::WEEKENDS),
            _ => {}
        }

        let digits = recurrence
            .strip_prefix("ON_")
            .filter(|digits| !digits.is_empty())
            .ok_or_else(|| SdkError::InvalidRecurrence(recurrence.to_string()))?;

        let mut bits = 0;
        for digit in digits.chars() {
            let (bit, _, _) = DAYS
                .iter()
                .find(|(_, d, _)| *d == digit)
                .ok_or_else(|| SdkError::InvalidRecurrence(recurrence.to_string()))?;
            bits |= bit;
        }
        Ok(Frequency(bits))
    }

    /// The recurrence string the device expects
    pub fn recurrence(&self) -> String {
        match *self {
            Self::ONCE => "ONCE".to_string(),
            Self::DAILY => "DAILY".to_string(),
            Self::WEEKDAYS => "WEEKDAYS".to_string(),
            Self::WEEKENDS => "WEEKENDS".to_string(),
            _ => {
                let mut digits: Vec<char> = DAYS
                    .iter()
                    .filter(|(bit, _, _)| self.0 & bit != 0)
                    .map(|(_, digit, _)| *digit)
                    .collect();
                digits.sort_unstable();
                format!("ON_{}", digits.into_iter().collect::<String>())
            }
        }
    }

    /// "Once", "Daily", "Weekdays", "Weekends" or a list like "Mon, Wed"
    pub fn description(&self) -> String {
        match *self {
            Self::ONCE => "Once".to_string(),
            Self::DAILY => "Daily".to_string(),
            Self::WEEKDAYS => "Weekdays".to_string(),
            Self::WEEKENDS => "Weekends".to_string(),
            _ => DAYS
                .iter()
                .filter(|(bit, _, _)| self.0 & bit != 0)
                .map(|(_, _, name)| *name)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// One alarm, bound to the speaker used to edit it
///
/// Setters write the whole alarm back with `UpdateAlarm` straight away.
#[derive(Debug)]
pub struct Alarm<'a> {
    speaker: &'a Speaker,
    entry: AlarmEntry,
}

impl<'a> Alarm<'a> {
    pub(crate) fn new(speaker: &'a Speaker, entry: AlarmEntry) -> Self {
        Self { speaker, entry }
    }

    pub fn id(&self) -> u32 {
        self.entry.id
    }

    pub fn time(&self) -> Result<Time> {
        Time::parse(&self.entry.start_time)
    }

    pub fn duration(&self) -> Result<Time> {
        Time::parse(&self.entry.duration)
    }

    pub fn frequency(&self) -> Result<Frequency> {
        Frequency::from_recurrence(&self.entry.recurrence)
    }

    pub fn frequency_description(&self) -> Result<String> {
        Ok(self.frequency()?.description())
    }

    pub fn is_enabled(&self) -> bool {
        self.entry.enabled
    }

    /// UUID of the speaker the alarm plays on
    pub fn room(&self) -> &str {
        &self.entry.room_uuid
    }

    pub fn volume(&self) -> u8 {
        self.entry.volume
    }

    pub fn repeat(&self) -> bool {
        Mode::from_play_mode(&self.entry.play_mode).repeat
    }

    pub fn shuffle(&self) -> bool {
        Mode::from_play_mode(&self.entry.play_mode).shuffle
    }

    pub fn includes_linked_zones(&self) -> bool {
        self.entry.include_linked_zones
    }

    pub fn set_time(&mut self, time: Time) -> Result<()> {
        self.update(|entry| entry.start_time = time.to_string())
    }

    pub fn set_duration(&mut self, duration: Time) -> Result<()> {
        self.update(|entry| entry.duration = duration.to_string())
    }

    pub fn set_frequency(&mut self, frequency: Frequency) -> Result<()> {
        self.update(|entry| entry.recurrence = frequency.recurrence())
    }

    pub fn enable(&mut self) -> Result<()> {
        self.update(|entry| entry.enabled = true)
    }

    pub fn disable(&mut self) -> Result<()> {
        self.update(|entry| entry.enabled = false)
    }

    pub fn set_room(&mut self, speaker: &Speaker) -> Result<()> {
        let uuid = speaker.uuid().to_string();
        self.update(|entry| entry.room_uuid = uuid)
    }

    pub fn set_volume(&mut self, volume: u8) -> Result<()> {
        self.update(|entry| entry.volume = volume)
    }

    pub fn set_repeat(&mut self, repeat: bool) -> Result<()> {
        let mode = Mode {
            repeat,
            shuffle: self.shuffle(),
        };
        self.update(|entry| entry.play_mode = mode.as_play_mode().to_string())
    }

    pub fn set_shuffle(&mut self, shuffle: bool) -> Result<()> {
        let mode = Mode {
            repeat: self.repeat(),
            shuffle,
        };
        self.update(|entry| entry.play_mode = mode.as_play_mode().to_string())
    }

    pub fn delete(self) -> Result<()> {
        tracing::info!(alarm = self.entry.id, "deleting alarm");
        self.speaker
            .execute(alarm_clock::destroy_alarm(self.entry.id))
    }

    /// Apply `change` and persist; the local copy only changes on success
    fn update(&mut self, change: impl FnOnce(&mut AlarmEntry)) -> Result<()> {
        let mut entry = self.entry.clone();
        change(&mut entry);
        self.speaker.execute(entry.update_request())?;
        self.entry = entry;
        Ok(())
    }
}
