/// Game data: entities, slot storage, players and the match itself.
///
/// Ownership is structural. A `Match` owns its players and the particle
/// pool, a `Player` owns its body, bullets and health notches, and every
/// `Entity` owns exactly one visual handle. Tearing down a parent consumes
/// it and releases each handle once.
use crate::config::{MatchConfig, INTRO_TICKS, START_HEALTH, X_MAX, X_MIN, Y_HORIZON};
use crate::particles::ParticlePool;
use crate::platform::{Palette, Renderer, Sprite, VisualHandle};

// ── Entity ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Entity {
    pub x: i16,
    pub y: i16,
    pub dx: i16,
    pub dy: i16,
    pub ddx: i16,
    pub ddy: i16,
    /// +1 faces right, -1 faces left.
    pub facing: i16,
    /// Ticks left to live; 0 means the entity never expires.
    pub ttl: i16,
    /// Set once the scripted opponent has finished deciding about this bullet.
    pub ai_resolved: bool,
    /// Mirror the sprite whenever `dx` changes sign.
    pub auto_flip: bool,
    handle: VisualHandle,
}

impl Entity {
    pub fn spawn(
        video: &mut dyn Renderer,
        sprite: Sprite,
        palette: Palette,
        x: i16,
        y: i16,
        ttl: i16,
    ) -> Self {
        let handle = video.create_visual(sprite, palette, x, y);
        Self {
            x,
            y,
            dx: 0,
            dy: 0,
            ddx: 0,
            ddy: 0,
            facing: 1,
            ttl,
            ai_resolved: false,
            auto_flip: false,
            handle,
        }
    }

    pub fn handle(&self) -> &VisualHandle {
        &self.handle
    }

    /// Advance one tick. Returns `false` when the lifetime has just run out;
    /// the caller must then [`destroy`](Self::destroy) it.
    pub fn update(&mut self, video: &mut dyn Renderer) -> bool {
        if self.ttl > 0 {
            self.ttl -= 1;
            if self.ttl == 0 {
                return false;
            }
        }
        let old_dx = self.dx;
        self.dx += self.ddx;
        self.dy += self.ddy;
        self.x += self.dx;
        self.y += self.dy;
        if self.auto_flip && self.dx != 0 && self.dx.signum() != old_dx.signum() {
            self.face(self.dx.signum(), video);
        }
        video.set_position(&self.handle, self.x, self.y);
        true
    }

    pub fn face(&mut self, facing: i16, video: &mut dyn Renderer) {
        self.facing = facing;
        video.set_hflip(&self.handle, facing < 0);
    }

    pub fn set_animation(&self, video: &mut dyn Renderer, anim: u8, frame: u8) {
        video.set_animation(&self.handle, anim, frame);
    }

    pub fn destroy(self, video: &mut dyn Renderer) {
        video.release_visual(self.handle);
    }
}

// ── Fixed-capacity slots ──────────────────────────────────────────────────────

/// A fixed number of entity slots, each empty or occupied. Allocation is a
/// forward linear scan for the first empty slot.
#[derive(Debug)]
pub struct SlotArray {
    slots: Box<[Option<Entity>]>,
}

impl SlotArray {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_free(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    /// First empty slot at or after `from`.
    pub fn first_free_from(&self, from: usize) -> Option<usize> {
        (from..self.slots.len()).find(|&i| self.slots[i].is_none())
    }

    /// Put `entity` in slot `index`. An occupant already there is destroyed.
    pub fn fill(&mut self, index: usize, entity: Entity, video: &mut dyn Renderer) {
        if let Some(old) = self.slots[index].replace(entity) {
            old.destroy(video);
        }
    }

    /// Place into the first free slot, or destroy `entity` if there is none.
    pub fn place(&mut self, entity: Entity, video: &mut dyn Renderer) -> Option<usize> {
        match self.first_free_from(0) {
            Some(i) => {
                self.slots[i] = Some(entity);
                Some(i)
            }
            None => {
                entity.destroy(video);
                None
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Destroy the occupant of `index`. Empty slots are left alone.
    pub fn destroy(&mut self, index: usize, video: &mut dyn Renderer) {
        if let Some(e) = self.slots.get_mut(index).and_then(Option::take) {
            e.destroy(video);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().flatten()
    }

    /// Raw view including empty slots, in slot order.
    pub fn slots(&self) -> &[Option<Entity>] {
        &self.slots
    }

    /// Update every occupant and reap the ones whose lifetime ran out.
    pub fn update_all(&mut self, video: &mut dyn Renderer) {
        for slot in self.slots.iter_mut() {
            let expired = match slot {
                Some(e) => !e.update(video),
                None => false,
            };
            if expired {
                if let Some(e) = slot.take() {
                    e.destroy(video);
                }
            }
        }
    }

    pub fn clear(&mut self, video: &mut dyn Renderer) {
        for slot in self.slots.iter_mut() {
            if let Some(e) = slot.take() {
                e.destroy(video);
            }
        }
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlSource {
    /// Driven by the given controller port.
    Human(u8),
    Cpu,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiMode {
    Attack,
    Defend,
}

impl AiMode {
    pub fn flipped(self) -> Self {
        match self {
            AiMode::Attack => AiMode::Defend,
            AiMode::Defend => AiMode::Attack,
        }
    }
}

#[derive(Debug)]
pub struct Player {
    pub index: usize,
    pub control: ControlSource,
    pub body: Entity,
    pub bullets: SlotArray,
    pub fireball_cooldown: u8,
    pub jump_cooldown: u8,
    /// Jumps taken since the body last touched the ground.
    pub jumps: u8,
    /// Ticks left before the body returns to the idle animation.
    pub anim_hold: u8,
    pub palette: Palette,
    pub health: u8,
    /// One decoration per remaining hit point, left to right.
    pub notches: SlotArray,
    pub ai_mode: AiMode,
    pub ai_mode_ticks: u16,
    /// Walking direction of the simple opponent.
    pub drift: i16,
}

impl Player {
    pub fn new(
        index: usize,
        control: ControlSource,
        palette: Palette,
        x: i16,
        y: i16,
        config: &MatchConfig,
        video: &mut dyn Renderer,
    ) -> Self {
        let body = Entity::spawn(video, Sprite::Cleric, palette, x, y, 0);
        let mut notches = SlotArray::new(START_HEALTH as usize);
        let mut hx = index as i16 * 150;
        for i in 0..START_HEALTH as usize {
            let notch = Entity::spawn(video, Sprite::Health, palette.projectile(), hx, 20, 0);
            notches.fill(i, notch, video);
            hx += 16;
        }
        Self {
            index,
            control,
            body,
            bullets: SlotArray::new(config.bullets_per_player),
            fireball_cooldown: 0,
            jump_cooldown: 0,
            jumps: 0,
            anim_hold: 0,
            palette,
            health: START_HEALTH,
            notches,
            ai_mode: AiMode::Attack,
            ai_mode_ticks: 0,
            drift: 1,
        }
    }

    pub fn is_cpu(&self) -> bool {
        self.control == ControlSource::Cpu
    }

    /// Take one point of damage and drop the matching notch. Returns the
    /// remaining health; a player already at zero is left untouched.
    pub fn take_hit(&mut self, video: &mut dyn Renderer) -> u8 {
        if self.health > 0 {
            self.health -= 1;
            self.notches.destroy(self.health as usize, video);
        }
        self.health
    }

    pub fn teardown(self, video: &mut dyn Renderer) {
        let Player { body, mut bullets, mut notches, .. } = self;
        bullets.clear(video);
        notches.clear(video);
        body.destroy(video);
    }
}

// ── Match ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Countdown before the fight; players are frozen.
    Intro,
    Playing,
    /// Someone was knocked out; frozen until the automatic reset.
    DeathPause,
}

#[derive(Debug)]
pub struct Match {
    pub players: [Player; 2],
    pub particles: ParticlePool,
    pub paused: bool,
    pub phase: Phase,
    pub timer: u8,
    pub config: MatchConfig,
}

impl Match {
    /// Fresh match: full health, empty pool, Intro countdown.
    pub fn new(controls: [ControlSource; 2], config: MatchConfig, video: &mut dyn Renderer) -> Self {
        let p0 = Player::new(0, controls[0], Palette::Cleric, X_MIN, Y_HORIZON, &config, video);
        let mut p1 = Player::new(1, controls[1], Palette::Crystal, X_MAX, Y_HORIZON, &config, video);
        p1.body.face(-1, video);
        p1.drift = -1;
        Self {
            players: [p0, p1],
            particles: ParticlePool::new(),
            paused: true,
            phase: Phase::Intro,
            timer: INTRO_TICKS,
            config,
        }
    }

    pub fn controls(&self) -> [ControlSource; 2] {
        [self.players[0].control, self.players[1].control]
    }

    /// Mutable access to player `index` and its opponent at once.
    pub fn pair_mut(&mut self, index: usize) -> (&mut Player, &mut Player, &mut ParticlePool) {
        let [p0, p1] = &mut self.players;
        if index == 0 {
            (p0, p1, &mut self.particles)
        } else {
            (p1, p0, &mut self.particles)
        }
    }

    pub fn teardown(self, video: &mut dyn Renderer) {
        let Match { players, particles, .. } = self;
        let [p0, p1] = players;
        p0.teardown(video);
        p1.teardown(video);
        particles.teardown(video);
    }
}
