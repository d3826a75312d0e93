/// Collaborator seams: everything the core asks of the outside world.
///
/// The simulation never draws or plays anything itself. It hands out
/// requests through [`Renderer`] and [`Audio`], and draws its randomness
/// from a [`RandomSource`]. [`Host`] bundles the three for one tick.
use crate::rng::RandomSource;

// ── Visual vocabulary ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sprite {
    Cleric,
    Fireball,
    Particles,
    Health,
    Go,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Palette {
    /// Player one.
    Cleric,
    /// Player two.
    Crystal,
    /// Fireballs, hit sparks and the GO banner.
    Fire,
}

impl Palette {
    /// Projectiles and notches borrow the fire palette when the owner wears
    /// the cleric colours.
    pub fn projectile(self) -> Palette {
        match self {
            Palette::Cleric => Palette::Fire,
            other => other,
        }
    }
}

pub mod anim {
    pub const IDLE: u8 = 0;
    pub const CAST: u8 = 3;
    pub const CAST_FRAME: u8 = 3;
    pub const DEFEATED: u8 = 4;
}

/// Opaque token for one live visual. Not `Clone`: whoever holds it owns the
/// visual, and giving it back to [`Renderer::release_visual`] consumes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct VisualHandle(u32);

impl VisualHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

pub trait Renderer {
    fn create_visual(&mut self, sprite: Sprite, palette: Palette, x: i16, y: i16) -> VisualHandle;
    fn set_position(&mut self, handle: &VisualHandle, x: i16, y: i16);
    fn set_hflip(&mut self, handle: &VisualHandle, flipped: bool);
    fn set_animation(&mut self, handle: &VisualHandle, anim: u8, frame: u8);
    fn release_visual(&mut self, handle: VisualHandle);
    /// End of tick: every transform for this frame has been pushed.
    fn present(&mut self) {}
}

// ── Audio ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Fireball,
    Boing,
    Oof,
    Ouch,
    Ding,
}

impl Cue {
    /// Sample slot the cue was registered under on the cartridge.
    pub fn sample_id(self) -> u8 {
        match self {
            Cue::Fireball => 64,
            Cue::Boing => 65,
            Cue::Oof => 66,
            Cue::Ouch => 67,
            Cue::Ding => 68,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Pcm2,
    Pcm3,
}

pub trait Audio {
    fn play_cue(&mut self, cue: Cue, channel: Channel);
}

// ── Host bundle ───────────────────────────────────────────────────────────────

pub struct Host<'a> {
    pub video: &'a mut dyn Renderer,
    pub audio: &'a mut dyn Audio,
    pub rng: &'a mut dyn RandomSource,
}

impl<'a> Host<'a> {
    pub fn new(
        video: &'a mut dyn Renderer,
        audio: &'a mut dyn Audio,
        rng: &'a mut dyn RandomSource,
    ) -> Self {
        Self { video, audio, rng }
    }

    pub fn cue(&mut self, cue: Cue, channel: Channel) {
        self.audio.play_cue(cue, channel);
    }
}

// ── Headless collaborators ────────────────────────────────────────────────────

/// Hands out sequential handles and keeps a live count. Useful for running
/// matches with no screen attached.
#[derive(Debug, Default)]
pub struct Headless {
    next_id: u32,
    live: usize,
}

impl Headless {
    pub fn live(&self) -> usize {
        self.live
    }
}

impl Renderer for Headless {
    fn create_visual(&mut self, _: Sprite, _: Palette, _: i16, _: i16) -> VisualHandle {
        self.next_id = self.next_id.wrapping_add(1);
        self.live += 1;
        VisualHandle::new(self.next_id)
    }

    fn set_position(&mut self, _: &VisualHandle, _: i16, _: i16) {}

    fn set_hflip(&mut self, _: &VisualHandle, _: bool) {}

    fn set_animation(&mut self, _: &VisualHandle, _: u8, _: u8) {}

    fn release_visual(&mut self, _handle: VisualHandle) {
        self.live -= 1;
    }
}

/// Swallows every cue.
#[derive(Debug, Default)]
pub struct Silent;

impl Audio for Silent {
    fn play_cue(&mut self, _: Cue, _: Channel) {}
}
