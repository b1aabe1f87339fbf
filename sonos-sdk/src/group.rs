//! Group interrupts
//!
//! [`GroupInterrupt`] plays one track on an arbitrary set of speakers,
//! possibly spread over several groups, and then puts every affected group
//! back: membership, queue, position, play modes and volumes.
//!
//! The sequence is:
//!
//! 1. resolve the track (text-to-speech synthesis happens here, before
//!    anything is paused)
//! 2. snapshot and pause every group a target belongs to
//! 3. pick a target that already coordinates a group, or promote one
//! 4. regroup so exactly the targets are in that group
//! 5. queue the track and play it
//! 6. poll until playback ends, bounded by a [`PollPolicy`]
//! 7. run an ordered list of [`RestoreAction`]s and report every outcome

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use sonos_api::services::av_transport;

use crate::controller::{Controller, PlayState};
use crate::error::{Result, SdkError};
use crate::network::Network;
use crate::speaker::Speaker;
use crate::state::ControllerState;
use crate::tracklist::TrackList;
use crate::tracks::{Playable, Track};

/// How long to wait for the interrupting track to finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before the first poll so the pre-play state is not read as finished
    pub settle_delay: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            interval: Duration::from_millis(500),
            max_attempts: 7200,
            timeout: Duration::from_secs(3600),
        }
    }
}

impl PollPolicy {
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptOptions {
    /// Volume for every speaker of the interrupt group while it plays
    pub volume: Option<u8>,
    pub poll: PollPolicy,
}

impl InterruptOptions {
    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}

/// One step of putting the household back, by speaker UUID
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreAction {
    /// Stop a track that was still playing when polling gave up
    Stop { coordinator: String },
    /// Take a speaker out of the interrupt group
    Ungroup { speaker: String },
    /// Restore the queue of a speaker promoted out of its group
    RestoreOwnState { speaker: String },
    /// Put a speaker back into its original group
    Rejoin { coordinator: String, speaker: String },
    /// Restore the playback captured from an original group
    RestoreState { coordinator: String },
}

impl fmt::Display for RestoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreAction::Stop { coordinator } => write!(f, "stop {coordinator}"),
            RestoreAction::Ungroup { speaker } => write!(f, "ungroup {speaker}"),
            RestoreAction::RestoreOwnState { speaker } => {
                write!(f, "restore own state of {speaker}")
            }
            RestoreAction::Rejoin {
                coordinator,
                speaker,
            } => write!(f, "rejoin {speaker} to {coordinator}"),
            RestoreAction::RestoreState { coordinator } => {
                write!(f, "restore state of {coordinator}")
            }
        }
    }
}

#[derive(Debug)]
pub struct ActionOutcome {
    pub action: RestoreAction,
    pub error: Option<SdkError>,
}

impl ActionOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// How the interrupting track ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Playback stopped on its own
    Finished,
    /// Still playing when the poll policy ran out; it was stopped
    TimedOut { waited: Duration },
    /// No target speakers, nothing was done
    Skipped,
    /// Regrouping or starting playback failed
    NotStarted,
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Finished => f.write_str("finished"),
            Completion::TimedOut { waited } => write!(f, "timed out after {waited:?}"),
            Completion::Skipped => f.write_str("skipped"),
            Completion::NotStarted => f.write_str("not started"),
        }
    }
}

/// Everything an interrupt did after the snapshots were taken
#[derive(Debug)]
pub struct InterruptReport {
    pub completion: Completion,
    /// Why regrouping or playback failed, if it did
    pub interruption_error: Option<SdkError>,
    /// Restore actions in the order they ran
    pub actions: Vec<ActionOutcome>,
}

impl InterruptReport {
    fn new(completion: Completion) -> Self {
        Self {
            completion,
            interruption_error: None,
            actions: Vec::new(),
        }
    }

    /// Played to the end and every restore action succeeded
    pub fn is_clean(&self) -> bool {
        !matches!(self.completion, Completion::TimedOut { .. })
            && self.interruption_error.is_none()
            && self.actions.iter().all(ActionOutcome::succeeded)
    }

    pub fn failed_actions(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.actions.iter().filter(|outcome| !outcome.succeeded())
    }
}

impl fmt::Display for InterruptReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.completion)?;
        if let Some(err) = &self.interruption_error {
            write!(f, " ({err})")?;
        }
        let failed: Vec<_> = self.failed_actions().collect();
        write!(
            f,
            ", {} of {} restore actions failed",
            failed.len(),
            self.actions.len()
        )?;
        for outcome in failed {
            if let Some(err) = &outcome.error {
                write!(f, "; {}: {err}", outcome.action)?;
            }
        }
        Ok(())
    }
}

/// An original group captured before the interrupt
struct SavedGroup<'a> {
    group: String,
    coordinator: &'a Speaker,
    members: Vec<&'a Speaker>,
    state: ControllerState,
}

/// Plays a track on a set of speakers and restores them afterwards
///
/// # Example
///
/// ```rust,ignore
/// use sonos_sdk::{GroupInterrupt, InterruptOptions, Network, Track};
///
/// let network = Network::discover()?;
/// let targets = [network.speaker_by_room("Kitchen")?, network.speaker_by_room("Office")?];
/// let chime = Track::network_file("x-file-cifs://nas/sounds/chime.mp3");
///
/// let report = GroupInterrupt::new(&network)
///     .with_options(InterruptOptions::default().with_volume(40))
///     .run(&targets, &chime)?;
/// println!("{report}");
/// ```
#[derive(Debug)]
pub struct GroupInterrupt<'a> {
    network: &'a Network,
    options: InterruptOptions,
}

impl<'a> GroupInterrupt<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self {
            network,
            options: InterruptOptions::default(),
        }
    }

    pub fn with_options(mut self, options: InterruptOptions) -> Self {
        self.options = options;
        self
    }

    /// Play `playable` on exactly `targets`, then restore every group they
    /// came from
    ///
    /// Failing to resolve the track or to snapshot a group returns the error
    /// before anything is regrouped (snapshots already taken are restored).
    /// After that every restore action runs regardless of earlier failures;
    /// the result is `Err(SdkError::Interrupt)` carrying the report unless
    /// the run was clean.
    pub fn run(&self, targets: &[&Speaker], playable: &dyn Playable) -> Result<InterruptReport> {
        let targets = self.resolve_targets(targets)?;
        if targets.is_empty() {
            return Ok(InterruptReport::new(Completion::Skipped));
        }

        let track = playable.resolve()?;
        tracing::info!(
            targets = targets.len(),
            track = %track.uri(),
            "starting interrupt"
        );

        self.network.invalidate_topology();
        let saved = self.snapshot(&targets)?;

        let mut report = InterruptReport::new(Completion::NotStarted);
        let mut coordinator = None;
        let mut promoted = None;
        match self.elect(&targets) {
            Ok((speaker, own_state)) => {
                coordinator = Some(speaker);
                promoted = own_state.map(|state| (speaker, state));
            }
            Err(err) => report.interruption_error = Some(err),
        }

        let mut stop = false;
        if let Some(coordinator) = coordinator {
            match self
                .regroup(coordinator, &targets)
                .and_then(|()| self.start(coordinator, &track))
            {
                Ok(controller) => match self.wait(&controller) {
                    Ok(completion) => {
                        stop = matches!(completion, Completion::TimedOut { .. });
                        report.completion = completion;
                    }
                    Err(err) => {
                        stop = true;
                        report.interruption_error = Some(err);
                    }
                },
                Err(err) => report.interruption_error = Some(err),
            }
        }
        if let Some(err) = &report.interruption_error {
            tracing::warn!(error = %err, "interrupt did not play, restoring");
        }

        let plan = plan(&targets, &saved, coordinator, promoted.is_some(), stop);
        report.actions = self.execute(plan, &saved, promoted.as_ref().map(|(_, state)| state));
        self.network.invalidate_topology();

        tracing::info!(report = %report, "interrupt done");
        if report.is_clean() {
            Ok(report)
        } else {
            Err(SdkError::Interrupt(Box::new(report)))
        }
    }

    /// Map targets onto this network's speakers, dropping duplicates
    fn resolve_targets(&self, targets: &[&Speaker]) -> Result<Vec<&'a Speaker>> {
        let mut resolved: Vec<&'a Speaker> = Vec::with_capacity(targets.len());
        for target in targets {
            let speaker = self
                .network
                .speaker_by_uuid(target.uuid())
                .ok_or_else(|| SdkError::not_found("speaker", target.uuid()))?;
            if !resolved.iter().any(|s| s.uuid() == speaker.uuid()) {
                resolved.push(speaker);
            }
        }
        Ok(resolved)
    }

    /// Pause and capture each distinct group the targets belong to
    fn snapshot(&self, targets: &[&'a Speaker]) -> Result<Vec<SavedGroup<'a>>> {
        let mut saved: Vec<SavedGroup<'a>> = Vec::new();
        for target in targets {
            if let Err(err) = self.snapshot_group(*target, &mut saved) {
                tracing::warn!(speaker = %target.uuid(), error = %err, "snapshot failed, undoing");
                for group in &saved {
                    let restored = Controller::new(group.coordinator, self.network)
                        .and_then(|controller| controller.restore_state(&group.state));
                    if let Err(err) = restored {
                        tracing::warn!(group = %group.group, error = %err, "could not restore group");
                    }
                }
                return Err(err);
            }
        }
        Ok(saved)
    }

    fn snapshot_group(&self, target: &'a Speaker, saved: &mut Vec<SavedGroup<'a>>) -> Result<()> {
        let controller = self.network.controller_for(target)?;
        let group = controller.group()?;
        if saved.iter().any(|g| g.group == group) {
            return Ok(());
        }
        let members = controller.speakers()?;
        let state = controller.export_state(true)?;
        tracing::debug!(group = %group, members = members.len(), "saved group");
        saved.push(SavedGroup {
            group,
            coordinator: controller.speaker(),
            members,
            state,
        });
        Ok(())
    }

    /// The first target already coordinating a group, or the first target
    /// made standalone along with a snapshot of its own queue
    fn elect(&self, targets: &[&'a Speaker]) -> Result<(&'a Speaker, Option<ControllerState>)> {
        for target in targets {
            if target.is_coordinator()? {
                return Ok((*target, None));
            }
        }

        let speaker = targets[0];
        tracing::debug!(speaker = %speaker.uuid(), "promoting speaker to coordinator");
        speaker.execute(av_transport::become_coordinator_of_standalone_group())?;
        self.network.invalidate_topology();
        let state = Controller::new(speaker, self.network)?.export_state(false)?;
        Ok((speaker, Some(state)))
    }

    /// Add every target to the coordinator's group and drop everyone else
    fn regroup(&self, coordinator: &'a Speaker, targets: &[&'a Speaker]) -> Result<()> {
        let controller = Controller::new(coordinator, self.network)?;
        let group = controller.group()?;
        for target in targets {
            if target.uuid() != coordinator.uuid() && target.group()? != group {
                controller.add_speaker(target)?;
            }
        }

        self.network.invalidate_topology();
        for member in controller.speakers()? {
            if !targets.iter().any(|target| target.uuid() == member.uuid()) {
                controller.remove_speaker(member)?;
            }
        }
        Ok(())
    }

    fn start(&self, coordinator: &'a Speaker, track: &Track) -> Result<Controller<'a>> {
        let controller = Controller::new(coordinator, self.network)?;
        let queue = controller.queue();
        queue.clear()?;
        queue.add_track(track, None)?;
        controller.use_queue()?;
        controller.set_repeat(false)?;
        if let Some(volume) = self.options.volume {
            controller.set_volume(volume)?;
        }
        controller.play()?;
        Ok(controller)
    }

    fn wait(&self, controller: &Controller<'_>) -> Result<Completion> {
        let poll = &self.options.poll;
        let started = Instant::now();
        thread::sleep(poll.settle_delay);

        for _ in 0..poll.max_attempts {
            let state = controller.state()?;
            if !matches!(state, PlayState::Playing | PlayState::Transitioning) {
                tracing::debug!(%state, "interrupt track finished");
                return Ok(Completion::Finished);
            }
            if started.elapsed() >= poll.timeout {
                break;
            }
            thread::sleep(poll.interval);
        }

        let waited = started.elapsed();
        tracing::warn!(?waited, "interrupt track still playing, giving up");
        Ok(Completion::TimedOut { waited })
    }

    fn execute(
        &self,
        plan: Vec<RestoreAction>,
        saved: &[SavedGroup<'a>],
        own_state: Option<&ControllerState>,
    ) -> Vec<ActionOutcome> {
        plan.into_iter()
            .map(|action| {
                let result = self.apply(&action, saved, own_state);
                if let Err(err) = &result {
                    tracing::warn!(%action, error = %err, "restore action failed");
                }
                ActionOutcome {
                    action,
                    error: result.err(),
                }
            })
            .collect()
    }

    fn apply(
        &self,
        action: &RestoreAction,
        saved: &[SavedGroup<'a>],
        own_state: Option<&ControllerState>,
    ) -> Result<()> {
        match action {
            RestoreAction::Stop { coordinator } => {
                Controller::new(self.speaker(coordinator)?, self.network)?.stop()
            }
            RestoreAction::Ungroup { speaker } => {
                let speaker = self.speaker(speaker)?;
                let result = speaker
                    .execute(av_transport::become_coordinator_of_standalone_group())
                    .map(|_| ());
                self.network.invalidate_topology();
                result
            }
            RestoreAction::RestoreOwnState { speaker } => {
                let state = own_state
                    .ok_or_else(|| SdkError::not_found("saved state of", speaker.clone()))?;
                Controller::new(self.speaker(speaker)?, self.network)?.restore_state(state)
            }
            RestoreAction::Rejoin {
                coordinator,
                speaker,
            } => {
                let coordinator = self.speaker(coordinator)?;
                let speaker = self.speaker(speaker)?;
                coordinator.update_group();
                speaker.update_group();
                if speaker.group()? == coordinator.group()? {
                    return Ok(());
                }
                let result = speaker.execute(av_transport::set_av_transport_uri(
                    format!("x-rincon:{}", coordinator.uuid()),
                    String::new(),
                ));
                self.network.invalidate_topology();
                result
            }
            RestoreAction::RestoreState { coordinator } => {
                let group = saved
                    .iter()
                    .find(|group| group.coordinator.uuid() == coordinator)
                    .ok_or_else(|| SdkError::not_found("saved group of", coordinator.clone()))?;
                Controller::new(group.coordinator, self.network)?.restore_state(&group.state)
            }
        }
    }

    fn speaker(&self, uuid: &str) -> Result<&'a Speaker> {
        self.network
            .speaker_by_uuid(uuid)
            .ok_or_else(|| SdkError::not_found("speaker", uuid))
    }
}

/// Order the actions that undo an interrupt
///
/// `coordinator` is the speaker that played the track, if one was chosen;
/// `promoted` says it had to leave its group for that.
fn plan(
    targets: &[&Speaker],
    saved: &[SavedGroup<'_>],
    coordinator: Option<&Speaker>,
    promoted: bool,
    stop: bool,
) -> Vec<RestoreAction> {
    let mut actions = Vec::new();
    let interrupt_uuid = coordinator.map(Speaker::uuid);

    if let (true, Some(uuid)) = (stop, interrupt_uuid) {
        actions.push(RestoreAction::Stop {
            coordinator: uuid.to_string(),
        });
    }

    for target in targets {
        if Some(target.uuid()) == interrupt_uuid {
            continue;
        }
        let original = saved
            .iter()
            .find(|group| group.members.iter().any(|m| m.uuid() == target.uuid()))
            .map(|group| group.coordinator.uuid());
        if original.is_some() && original == interrupt_uuid {
            continue;
        }
        actions.push(RestoreAction::Ungroup {
            speaker: target.uuid().to_string(),
        });
    }

    if let (true, Some(uuid)) = (promoted, interrupt_uuid) {
        actions.push(RestoreAction::RestoreOwnState {
            speaker: uuid.to_string(),
        });
    }

    for group in saved {
        for member in &group.members {
            if member.uuid() != group.coordinator.uuid() {
                actions.push(RestoreAction::Rejoin {
                    coordinator: group.coordinator.uuid().to_string(),
                    speaker: member.uuid().to_string(),
                });
            }
        }
    }

    for group in saved {
        actions.push(RestoreAction::RestoreState {
            coordinator: group.coordinator.uuid().to_string(),
        });
    }
    actions
}
