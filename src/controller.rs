//! Player controller.
//!
//! The controller turns tagged lifecycle signals from the media engine into
//! panel state. [`transition`] and [`remount`] are pure; [`PlayerController`]
//! owns the current [`Machine`] and executes the resulting effects against the
//! store and a [`MediaEngine`].

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::PlaybackError;
use crate::store::VideoStore;

pub type InstanceKey = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Idle clip is looping, muted, without controls.
    Idle,
    /// Current instance has not reported ready, or is buffering.
    Loading,
    /// Answer clip playing.
    Playing,
    Paused,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    Ready,
    Error(PlaybackError),
    BufferStart,
    BufferEnd,
    Ended,
    Paused,
}

/// A lifecycle event tagged with the instance that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub key: InstanceKey,
    pub event: MediaEvent,
}

impl Signal {
    pub fn new(key: InstanceKey, event: MediaEvent) -> Self {
        Signal { key, event }
    }
}

/// Declarative flags handed to the engine when mounting a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaFlags {
    pub autoplay: bool,
    pub muted: bool,
    pub looped: bool,
    pub inline: bool,
}

impl MediaFlags {
    pub fn for_store(store: &VideoStore) -> Self {
        let idle = store.is_idle_clip();
        MediaFlags {
            autoplay: store.playing_intent() || idle,
            muted: idle,
            looped: idle,
            inline: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Mount {
        key: InstanceKey,
        source: String,
        flags: MediaFlags,
    },
    SeekToStart,
    Play,
    SetPlayingIntent(bool),
    ResetToIdle,
}

/// The media playback capability driven by the controller.
pub trait MediaEngine {
    /// Replace the current media instance with a fresh one for `source`.
    fn mount(
        &mut self,
        key: InstanceKey,
        source: &str,
        flags: MediaFlags,
    ) -> Result<(), PlaybackError>;

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError>;

    /// May be rejected with [`PlaybackError::Interrupted`], which is benign.
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);
}

/// Controller state for the mounted instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    pub key: Option<InstanceKey>,
    pub state: PlayerState,
    /// State to return to when buffering ends.
    pub resume: Option<PlayerState>,
    pub failure: Option<PlaybackError>,
}

impl Default for Machine {
    fn default() -> Self {
        Machine {
            key: None,
            state: PlayerState::Loading,
            resume: None,
            failure: None,
        }
    }
}

fn settled(is_idle_clip: bool) -> PlayerState {
    if is_idle_clip {
        PlayerState::Idle
    } else {
        PlayerState::Playing
    }
}

/// Start a fresh instance for the store's current source.
pub fn remount(machine: &Machine, store: &VideoStore) -> (Machine, Vec<Effect>) {
    let key = store.instance_key();
    let next = Machine {
        key: Some(key),
        state: PlayerState::Loading,
        resume: None,
        failure: None,
    };
    log::debug!(
        "Remount: key {:?} -> {}, state {:?} -> Loading",
        machine.key,
        key,
        machine.state
    );

    let effects = vec![
        Effect::Mount {
            key,
            source: store.active_source().to_string(),
            flags: MediaFlags::for_store(store),
        },
        Effect::SeekToStart,
    ];
    (next, effects)
}

/// Apply one lifecycle signal. Signals from any instance other than the
/// mounted one leave the machine untouched.
pub fn transition(
    machine: &Machine,
    signal: &Signal,
    is_idle_clip: bool,
) -> (Machine, Vec<Effect>) {
    if machine.key != Some(signal.key) {
        log::debug!(
            "Discarding stale signal {:?} for key {} (mounted {:?})",
            signal.event,
            signal.key,
            machine.key
        );
        return (machine.clone(), Vec::new());
    }

    let mut next = machine.clone();
    let mut effects = Vec::new();

    match &signal.event {
        MediaEvent::Ready => {
            next.state = settled(is_idle_clip);
            next.resume = None;
            effects.push(Effect::Play);
        }
        MediaEvent::BufferStart => {
            if machine.state != PlayerState::Loading {
                next.resume = Some(machine.state);
                next.state = PlayerState::Loading;
            }
        }
        MediaEvent::BufferEnd => {
            if machine.state == PlayerState::Loading {
                next.state = machine.resume.unwrap_or_else(|| settled(is_idle_clip));
                next.resume = None;
            }
        }
        MediaEvent::Paused => {
            effects.push(Effect::SeekToStart);
            effects.push(Effect::SetPlayingIntent(false));
            if machine.state != PlayerState::Error {
                next.resume = None;
                if is_idle_clip {
                    // The idle clip is never left paused.
                    next.state = PlayerState::Idle;
                    effects.push(Effect::Play);
                } else {
                    next.state = PlayerState::Paused;
                }
            }
        }
        MediaEvent::Ended => {
            // The idle clip loops on its own.
            if !is_idle_clip {
                effects.push(Effect::ResetToIdle);
            }
        }
        MediaEvent::Error(err) if err.is_benign() => {
            log::info!("Playback interrupted for key {}, not an error", signal.key);
        }
        MediaEvent::Error(err) => {
            next.state = PlayerState::Error;
            next.resume = None;
            next.failure = Some(err.clone());
        }
    }

    (next, effects)
}

#[derive(Debug, Default)]
pub struct PlayerController {
    machine: Machine,
}

impl PlayerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlayerState {
        self.machine.state
    }

    pub fn is_loading(&self) -> bool {
        self.machine.state == PlayerState::Loading
    }

    pub fn failure(&self) -> Option<&PlaybackError> {
        self.machine.failure.as_ref()
    }

    pub fn mounted_key(&self) -> Option<InstanceKey> {
        self.machine.key
    }

    /// Remount when the store's instance key moved past the mounted one.
    pub fn sync<E: MediaEngine>(&mut self, store: &mut VideoStore, engine: &mut E) {
        if self.machine.key == Some(store.instance_key()) {
            return;
        }
        let (next, effects) = remount(&self.machine, store);
        self.machine = next;
        self.execute(effects, store, engine);
    }

    pub fn handle<E: MediaEngine>(
        &mut self,
        signal: Signal,
        store: &mut VideoStore,
        engine: &mut E,
    ) {
        let (next, effects) = transition(&self.machine, &signal, store.is_idle_clip());
        if next.state != self.machine.state {
            log::info!(
                "Player state {:?} -> {:?} on {:?} (key {})",
                self.machine.state,
                next.state,
                signal.event,
                signal.key
            );
        }
        if let (Some(err), None) = (&next.failure, &self.machine.failure) {
            log::error!("Playback failed for key {}: {}", signal.key, err);
        }
        self.machine = next;
        self.execute(effects, store, engine);
        self.sync(store, engine);
    }

    /// The viewer's own play control.
    pub fn resume<E: MediaEngine>(&mut self, store: &mut VideoStore, engine: &mut E) {
        if self.machine.state != PlayerState::Paused {
            return;
        }
        self.machine.state = settled(store.is_idle_clip());
        self.execute(
            vec![Effect::SetPlayingIntent(true), Effect::Play],
            store,
            engine,
        );
    }

    fn execute<E: MediaEngine>(
        &mut self,
        effects: Vec<Effect>,
        store: &mut VideoStore,
        engine: &mut E,
    ) {
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Mount { key, source, flags } => {
                    if let Err(err) = engine.mount(key, &source, flags) {
                        let signal = Signal::new(key, MediaEvent::Error(err));
                        let (next, follow) =
                            transition(&self.machine, &signal, store.is_idle_clip());
                        log::error!("Mount failed for key {}: {:?}", key, signal.event);
                        self.machine = next;
                        queue.extend(follow);
                    }
                }
                Effect::SeekToStart => {
                    if let Err(err) = engine.seek(Duration::ZERO) {
                        log::warn!("Seek to start failed: {}", err);
                    }
                }
                Effect::Play => match engine.play() {
                    Ok(()) => {}
                    Err(err) if err.is_benign() => {
                        log::info!("Autoplay was prevented, waiting for the viewer: {}", err);
                    }
                    Err(err) => log::error!("Autoplay failed: {}", err),
                },
                Effect::SetPlayingIntent(playing) => store.set_playing_intent(playing),
                Effect::ResetToIdle => store.reset_to_idle(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: &str = "https://cdn.example.edu/video/upload/v1/waiting.mp4";
    const CLIP_A: &str = "https://cdn.example.edu/video/upload/v2/a.mp4";
    const CLIP_B: &str = "https://cdn.example.edu/video/upload/v3/b.mp4";

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Mount(InstanceKey, String, MediaFlags),
        Seek(Duration),
        Play,
        Pause,
    }

    /// Records every call; optionally rejects play or mount.
    #[derive(Debug, Default)]
    struct RecordingEngine {
        calls: Vec<Call>,
        reject_play: Option<PlaybackError>,
        reject_mount: Option<PlaybackError>,
    }

    impl RecordingEngine {
        fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.iter().filter(|c| pred(c)).count()
        }

        fn seeks(&self) -> usize {
            self.count(|c| matches!(c, Call::Seek(d) if d.is_zero()))
        }

        fn mounts(&self) -> usize {
            self.count(|c| matches!(c, Call::Mount(..)))
        }
    }

    impl MediaEngine for RecordingEngine {
        fn mount(
            &mut self,
            key: InstanceKey,
            source: &str,
            flags: MediaFlags,
        ) -> Result<(), PlaybackError> {
            self.calls.push(Call::Mount(key, source.to_string(), flags));
            match &self.reject_mount {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
            self.calls.push(Call::Seek(position));
            Ok(())
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            self.calls.push(Call::Play);
            match &self.reject_play {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn pause(&mut self) {
            self.calls.push(Call::Pause);
        }
    }

    fn booted() -> (PlayerController, VideoStore, RecordingEngine) {
        let mut controller = PlayerController::new();
        let mut store = VideoStore::new(IDLE);
        let mut engine = RecordingEngine::default();
        controller.sync(&mut store, &mut engine);
        (controller, store, engine)
    }

    fn select(
        controller: &mut PlayerController,
        store: &mut VideoStore,
        engine: &mut RecordingEngine,
        source: &str,
    ) {
        store.select_clip(source);
        controller.sync(store, engine);
    }

    #[test]
    fn boot_mounts_idle_clip_looped_and_muted() {
        let (controller, _store, engine) = booted();

        assert_eq!(controller.state(), PlayerState::Loading);
        assert_eq!(controller.mounted_key(), Some(0));
        assert_eq!(
            engine.calls,
            vec![
                Call::Mount(
                    0,
                    IDLE.to_string(),
                    MediaFlags {
                        autoplay: true,
                        muted: true,
                        looped: true,
                        inline: true,
                    }
                ),
                Call::Seek(Duration::ZERO),
            ]
        );
    }

    #[test]
    fn ready_on_idle_clip_settles_in_idle() {
        let (mut controller, mut store, mut engine) = booted();
        controller.handle(Signal::new(0, MediaEvent::Ready), &mut store, &mut engine);

        assert_eq!(controller.state(), PlayerState::Idle);
        assert!(!controller.is_loading());
        assert_eq!(engine.calls.last(), Some(&Call::Play));
    }

    #[test]
    fn answer_clip_mounts_unmuted_with_autoplay() {
        let (mut controller, mut store, mut engine) = booted();
        select(&mut controller, &mut store, &mut engine, CLIP_A);

        assert_eq!(controller.mounted_key(), Some(1));
        assert!(controller.is_loading());
        // The new instance is mounted first, then rewound.
        let tail = &engine.calls[engine.calls.len() - 2..];
        assert_eq!(
            tail,
            [
                Call::Mount(
                    1,
                    CLIP_A.to_string(),
                    MediaFlags {
                        autoplay: true,
                        muted: false,
                        looped: false,
                        inline: true,
                    }
                ),
                Call::Seek(Duration::ZERO),
            ]
        );
    }

    #[test]
    fn stale_ready_is_ignored_after_newer_selection() {
        let (mut controller, mut store, mut engine) = booted();
        select(&mut controller, &mut store, &mut engine, CLIP_A);
        controller.handle(Signal::new(1, MediaEvent::Ready), &mut store, &mut engine);
        assert_eq!(controller.state(), PlayerState::Playing);
        assert!(!controller.is_loading());

        select(&mut controller, &mut store, &mut engine, CLIP_B);
        assert_eq!(store.instance_key(), 2);
        let calls_before = engine.calls.len();

        controller.handle(Signal::new(1, MediaEvent::Ready), &mut store, &mut engine);
        assert_eq!(controller.state(), PlayerState::Loading);
        assert_eq!(engine.calls.len(), calls_before);

        controller.handle(Signal::new(2, MediaEvent::Ready), &mut store, &mut engine);
        assert_eq!(controller.state(), PlayerState::Playing);
    }

    #[test]
    fn stale_signals_change_nothing() {
        let (mut controller, mut store, mut engine) = booted();
        select(&mut controller, &mut store, &mut engine, CLIP_A);
        select(&mut controller, &mut store, &mut engine, CLIP_B);
        let before = (controller.machine.clone(), store.clone(), engine.calls.len());

        for event in [
            MediaEvent::Ready,
            MediaEvent::BufferStart,
            MediaEvent::BufferEnd,
            MediaEvent::Paused,
            MediaEvent::Ended,
            MediaEvent::Error(PlaybackError::Decode("corrupt".into())),
        ] {
            controller.handle(Signal::new(1, event), &mut store, &mut engine);
        }

        assert_eq!(controller.machine, before.0);
        assert_eq!(store.instance_key(), before.1.instance_key());
        assert_eq!(store.active_source(), before.1.active_source());
        assert_eq!(store.playing_intent(), before.1.playing_intent());
        assert_eq!(engine.calls.len(), before.2);
    }

    #[test]
    fn pause_seeks_once_and_clears_intent() {
        let (mut controller, mut store, mut engine) = booted();
        select(&mut controller, &mut store, &mut engine, CLIP_A);
        controller.handle(Signal::new(1, MediaEvent::Ready), &mut store, &mut engine);
        let seeks_before = engine.seeks();

        controller.handle(Signal::new(1, MediaEvent::Paused), &mut store, &mut engine);

        assert_eq!(controller.state(), PlayerState::Paused);
        assert!(!store.playing_intent());
        assert_eq!(engine.seeks(), seeks_before + 1);
        assert_eq!(store.instance_key(), 1);
    }

    #[test]
    fn resume_after_pause_restores_intent() {
        let (mut controller, mut store, mut engine) = booted();
        select(&mut controller, &mut store, &mut engine, CLIP_A);
        controller.handle(Signal::new(1, MediaEvent::Ready), &mut store, &mut engine);
        controller.handle(Signal::new(1, MediaEvent::Paused), &mut store, &mut engine);

        controller.resume(&mut store, &mut engine);

        assert_eq!(controller.state(), PlayerState::Playing);
        assert!(store.playing_intent());
        assert_eq!(engine.calls.last(), Some(&Call::Play));
    }

    #[test]
    fn resume_outside_pause_is_ignored() {
        let (mut controller, mut store, mut engine) = booted();
        let calls = engine.calls.len();
        controller.resume(&mut store, &mut engine);
        assert_eq!(engine.calls.len(), calls);
        assert_eq!(controller.state(), PlayerState::Loading);
    }

    #[test]
    fn answer_clip_end_resets_to_idle_exactly_once() {
        let (mut controller, mut store, mut engine) = booted();
        select(&mut controller, &mut store, &mut engine, CLIP_A);
        controller.handle(Signal::new(1, MediaEvent::Ready), &mut store, &mut engine);
        let mounts_before = engine.mounts();

        controller.handle(Signal::new(1, MediaEvent::Ended), &mut store, &mut engine);

        assert_eq!(store.instance_key(), 2);
        assert!(store.is_idle_clip());
        assert!(!store.playing_intent());
        assert_eq!(controller.mounted_key(), Some(2));
        assert_eq!(controller.state(), PlayerState::Loading);
        assert_eq!(engine.mounts(), mounts_before + 1);

        // A duplicate end from the finished instance is stale now.
        controller.handle(Signal::new(1, MediaEvent::Ended), &mut store, &mut engine);
        assert_eq!(store.instance_key(), 2);
    }

    #[test]
    fn idle_clip_end_mutates_nothing() {
        let (mut controller, mut store, mut engine) = booted();
        controller.handle(Signal::new(0, MediaEvent::Ready), &mut store, &mut engine);
        let calls = engine.calls.len();

        controller.handle(Signal::new(0, MediaEvent::Ended), &mut store, &mut engine);

        assert_eq!(store.instance_key(), 0);
        assert!(store.is_idle_clip());
        assert_eq!(controller.state(), PlayerState::Idle);
        assert_eq!(engine.calls.len(), calls);
    }

    #[test]
    fn buffering_returns_to_previous_state() {
        let (mut controller, mut store, mut engine) = booted();
        select(&mut controller, &mut store, &mut engine, CLIP_A);
        controller.handle(Signal::new(1, MediaEvent::Ready), &mut store, &mut engine);

        controller.handle(Signal::new(1, MediaEvent::BufferStart), &mut store, &mut engine);
        assert!(controller.is_loading());
        controller.handle(Signal::new(1, MediaEvent::BufferStart), &mut store, &mut engine);
        controller.handle(Signal::new(1, MediaEvent::BufferEnd), &mut store, &mut engine);
        assert_eq!(controller.state(), PlayerState::Playing);
    }

    #[test]
    fn buffer_end_before_ready_clears_loading() {
        let (mut controller, mut store, mut engine) = booted();
        controller.handle(Signal::new(0, MediaEvent::BufferEnd), &mut store, &mut engine);
        assert_eq!(controller.state(), PlayerState::Idle);
    }

    #[test]
    fn playback_failure_surfaces_error_and_stops_loading() {
        let (mut controller, mut store, mut engine) = booted();
        select(&mut controller, &mut store, &mut engine, CLIP_A);

        let err = PlaybackError::Network("connection reset".into());
        controller.handle(
            Signal::new(1, MediaEvent::Error(err.clone())),
            &mut store,
            &mut engine,
        );

        assert_eq!(controller.state(), PlayerState::Error);
        assert!(!controller.is_loading());
        assert_eq!(controller.failure(), Some(&err));

        // Reselecting recovers cleanly.
        select(&mut controller, &mut store, &mut engine, CLIP_B);
        assert_eq!(controller.state(), PlayerState::Loading);
        assert_eq!(controller.failure(), None);
    }

    #[test]
    fn benign_interruption_is_not_an_error() {
        let (mut controller, mut store, mut engine) = booted();
        select(&mut controller, &mut store, &mut engine, CLIP_A);
        controller.handle(Signal::new(1, MediaEvent::Ready), &mut store, &mut engine);

        controller.handle(
            Signal::new(1, MediaEvent::Error(PlaybackError::Interrupted)),
            &mut store,
            &mut engine,
        );

        assert_eq!(controller.state(), PlayerState::Playing);
        assert_eq!(controller.failure(), None);
    }

    #[test]
    fn rejected_autoplay_keeps_state() {
        let (mut controller, mut store, mut engine) = booted();
        engine.reject_play = Some(PlaybackError::Interrupted);
        select(&mut controller, &mut store, &mut engine, CLIP_A);

        controller.handle(Signal::new(1, MediaEvent::Ready), &mut store, &mut engine);

        assert_eq!(controller.state(), PlayerState::Playing);
        assert!(store.playing_intent());
    }

    #[test]
    fn failed_mount_lands_in_error() {
        let (mut controller, mut store, mut engine) = booted();
        engine.reject_mount = Some(PlaybackError::Mount("no such file".into()));
        select(&mut controller, &mut store, &mut engine, CLIP_A);

        assert_eq!(controller.state(), PlayerState::Error);
        assert_eq!(controller.mounted_key(), Some(1));
    }

    #[test]
    fn transition_is_pure_for_paused() {
        let machine = Machine {
            key: Some(4),
            state: PlayerState::Playing,
            resume: None,
            failure: None,
        };
        let (next, effects) = transition(&machine, &Signal::new(4, MediaEvent::Paused), false);

        assert_eq!(machine.state, PlayerState::Playing);
        assert_eq!(next.state, PlayerState::Paused);
        assert_eq!(
            effects,
            vec![Effect::SeekToStart, Effect::SetPlayingIntent(false)]
        );
    }

    #[test]
    fn paused_idle_clip_keeps_looping() {
        let machine = Machine {
            key: Some(0),
            state: PlayerState::Idle,
            resume: None,
            failure: None,
        };
        let (next, effects) = transition(&machine, &Signal::new(0, MediaEvent::Paused), true);
        assert_eq!(next.state, PlayerState::Idle);
        assert_eq!(
            effects,
            vec![
                Effect::SeekToStart,
                Effect::SetPlayingIntent(false),
                Effect::Play,
            ]
        );
    }

    #[test]
    fn paused_idle_clip_is_restarted() {
        let (mut controller, mut store, mut engine) = booted();
        controller.handle(Signal::new(0, MediaEvent::Ready), &mut store, &mut engine);
        let seeks_before = engine.seeks();

        controller.handle(Signal::new(0, MediaEvent::Paused), &mut store, &mut engine);

        assert_eq!(controller.state(), PlayerState::Idle);
        assert_eq!(engine.seeks(), seeks_before + 1);
        assert_eq!(engine.calls.last(), Some(&Call::Play));
        assert_eq!(store.instance_key(), 0);
    }
}
