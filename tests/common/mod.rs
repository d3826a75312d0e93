#![allow(dead_code)]

use std::collections::HashMap;

use fireball_duel::platform::{Audio, Channel, Cue, Palette, Renderer, Sprite, VisualHandle};
use fireball_duel::rng::RandomSource;
use fireball_duel::{tick, ControlSource, Host, InputSnapshot, Match, MatchConfig, Phase};
use rand::rngs::mock::StepRng;

// ── Renderer that keeps books ─────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub sprite: Sprite,
    pub palette: Palette,
    pub x: i16,
    pub y: i16,
    pub flipped: bool,
    pub anim: u8,
    pub frame: u8,
}

/// Tracks every live visual and panics on any misuse of a handle.
#[derive(Debug, Default)]
pub struct Tally {
    next_id: u32,
    pub live: HashMap<u32, Record>,
    pub created: usize,
    pub released: usize,
    pub presented: usize,
}

impl Tally {
    pub fn record(&self, handle: &VisualHandle) -> &Record {
        self.live
            .get(&handle.id())
            .unwrap_or_else(|| panic!("handle {} is not live", handle.id()))
    }

    pub fn count(&self, sprite: Sprite) -> usize {
        self.live.values().filter(|r| r.sprite == sprite).count()
    }

    fn live_mut(&mut self, handle: &VisualHandle) -> &mut Record {
        let id = handle.id();
        self.live
            .get_mut(&id)
            .unwrap_or_else(|| panic!("handle {id} used after release"))
    }
}

impl Renderer for Tally {
    fn create_visual(&mut self, sprite: Sprite, palette: Palette, x: i16, y: i16) -> VisualHandle {
        self.next_id += 1;
        self.created += 1;
        self.live.insert(
            self.next_id,
            Record { sprite, palette, x, y, flipped: false, anim: 0, frame: 0 },
        );
        VisualHandle::new(self.next_id)
    }

    fn set_position(&mut self, handle: &VisualHandle, x: i16, y: i16) {
        let r = self.live_mut(handle);
        r.x = x;
        r.y = y;
    }

    fn set_hflip(&mut self, handle: &VisualHandle, flipped: bool) {
        self.live_mut(handle).flipped = flipped;
    }

    fn set_animation(&mut self, handle: &VisualHandle, anim: u8, frame: u8) {
        let r = self.live_mut(handle);
        r.anim = anim;
        r.frame = frame;
    }

    fn release_visual(&mut self, handle: VisualHandle) {
        let id = handle.id();
        assert!(self.live.remove(&id).is_some(), "handle {id} released twice");
        self.released += 1;
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}

// ── Audio that remembers ──────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Recorder {
    pub cues: Vec<(Cue, Channel)>,
}

impl Recorder {
    pub fn count(&self, cue: Cue) -> usize {
        self.cues.iter().filter(|(c, _)| *c == cue).count()
    }
}

impl Audio for Recorder {
    fn play_cue(&mut self, cue: Cue, channel: Channel) {
        self.cues.push((cue, channel));
    }
}

// ── Rigs ──────────────────────────────────────────────────────────────────────

/// Every draw returns 0: every random check passes.
pub fn always() -> StepRng {
    StepRng::new(0, 0)
}

/// Every draw returns 0xFFFF: no random check passes.
pub fn never() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

pub struct Rig<R: RandomSource> {
    pub video: Tally,
    pub audio: Recorder,
    pub rng: R,
}

impl<R: RandomSource> Rig<R> {
    pub fn new(rng: R) -> Self {
        Self { video: Tally::default(), audio: Recorder::default(), rng }
    }

    pub fn host(&mut self) -> Host<'_> {
        Host::new(&mut self.video, &mut self.audio, &mut self.rng)
    }

    pub fn start(&mut self, controls: [ControlSource; 2], config: MatchConfig) -> Match {
        fireball_duel::init(controls, config, &mut self.video)
    }

    /// A match already past its countdown.
    pub fn fighting(&mut self, controls: [ControlSource; 2], config: MatchConfig) -> Match {
        let mut game = self.start(controls, config);
        game.phase = Phase::Playing;
        game.paused = false;
        game
    }

    pub fn step(&mut self, game: Match, input: InputSnapshot) -> Match {
        let mut host = self.host();
        tick(game, &input, &mut host)
    }

    pub fn run(&mut self, mut game: Match, input: InputSnapshot, ticks: usize) -> Match {
        for _ in 0..ticks {
            game = self.step(game, input);
        }
        game
    }
}

pub const HUMANS: [ControlSource; 2] = [ControlSource::Human(0), ControlSource::Human(1)];
pub const VS_CPU: [ControlSource; 2] = [ControlSource::Human(0), ControlSource::Cpu];

pub fn idle() -> InputSnapshot {
    InputSnapshot::default()
}
