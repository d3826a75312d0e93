/// Shared pool of short-lived decorations: hit sparks, jump dust and the
/// GO banner.
use crate::config::{MAX_PARTICLES, PARTICLE_TICKS};
use crate::entities::{Entity, SlotArray};
use crate::platform::{Palette, Renderer, Sprite};
use crate::rng::{scatter_step, RandomSource};

pub const BURST_SIZE: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// Random spray, used for hits.
    Scatter,
    /// Fixed downward fan, used under a jump.
    Fan,
}

#[derive(Debug)]
pub struct ParticlePool {
    slots: SlotArray,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticlePool {
    pub fn new() -> Self {
        Self {
            slots: SlotArray::new(MAX_PARTICLES),
        }
    }

    pub fn slots(&self) -> &SlotArray {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Spawn a burst of four at (x, y). Free slots are taken in order by a
    /// single forward scan; whatever does not fit is dropped.
    pub fn add_particles(
        &mut self,
        x: i16,
        y: i16,
        palette: Palette,
        pattern: Pattern,
        video: &mut dyn Renderer,
        rng: &mut dyn RandomSource,
    ) {
        let mut cursor = 0;
        for i in 0..BURST_SIZE {
            let Some(slot) = self.slots.first_free_from(cursor) else {
                return;
            };
            cursor = slot;
            let (dx, dy) = match pattern {
                Pattern::Scatter => {
                    let dy = scatter_step(rng);
                    (scatter_step(rng), dy)
                }
                Pattern::Fan => ((2 - i as i16) * 2, 1),
            };
            let mut e = Entity::spawn(video, Sprite::Particles, palette, x, y, PARTICLE_TICKS);
            e.dx = dx;
            e.dy = dy;
            self.slots.fill(slot, e, video);
        }
    }

    /// Drop a single decoration into the first free slot, if any.
    pub fn spawn(&mut self, entity: Entity, video: &mut dyn Renderer) -> Option<usize> {
        self.slots.place(entity, video)
    }

    pub fn update(&mut self, video: &mut dyn Renderer) {
        self.slots.update_all(video);
    }

    pub fn teardown(mut self, video: &mut dyn Renderer) {
        self.slots.clear(video);
    }
}
