/// Scripted opponent.
///
/// Two policies share the same intents as a human: set a walking velocity,
/// launch a fireball, jump. [`AiPolicy::Simple`] wanders and acts at random.
/// [`AiPolicy::Predictive`] projects each incoming fireball forward with a
/// ghost simulation and answers the ones that would land: counter-fire when
/// a shot is ready, otherwise hop over flat shots, otherwise
/// reposition according to its current behavior mode.
use std::cmp::Ordering;

use tracing::trace;

use crate::collision::in_range;
use crate::compute::{fireball, fireball_available, jump};
use crate::config::{
    AiPolicy, MatchConfig, DODGE_RANGE, GHOST_HORIZON, WALK_SPEED, X_MAX, X_MIN,
};
use crate::entities::{AiMode, Entity, Player};
use crate::particles::ParticlePool;
use crate::platform::Host;

/// Vertical launch speed for aimed AI shots.
pub const AIM_DY: i16 = 6;

// ── Ghost simulation ──────────────────────────────────────────────────────────

/// A point moving at constant velocity. Copying an entity into a ghost
/// detaches it from the game; nothing here touches real state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ghost {
    pub x: i16,
    pub y: i16,
    pub dx: i16,
    pub dy: i16,
}

impl Ghost {
    pub fn of(e: &Entity) -> Self {
        Self { x: e.x, y: e.y, dx: e.dx, dy: e.dy }
    }

    pub fn at_rest(x: i16, y: i16) -> Self {
        Self { x, y, dx: 0, dy: 0 }
    }

    fn at(self, k: i64) -> (i64, i64) {
        (self.x as i64 + k * self.dx as i64, self.y as i64 + k * self.dy as i64)
    }
}

/// Step both ghosts forward together for up to `horizon` ticks and report
/// whether they ever come within hit range. The starting positions are not
/// tested.
pub fn intercepts(a: Ghost, b: Ghost, horizon: u32) -> bool {
    (1..=horizon as i64).any(|k| {
        let (ax, ay) = a.at(k);
        let (bx, by) = b.at(k);
        in_range(ax - bx, ay - by)
    })
}

/// Would `bullet` reach a defender standing still at (x, y) within the
/// look-ahead window?
pub fn will_hit(x: i16, y: i16, bullet: Ghost) -> bool {
    intercepts(Ghost::at_rest(x, y), bullet, GHOST_HORIZON)
}

/// Coarse vertical aim: up, level or down toward `target_y`.
pub fn aim(target_y: i16, from_y: i16) -> i16 {
    match target_y.cmp(&from_y) {
        Ordering::Less => -AIM_DY,
        Ordering::Equal => 0,
        Ordering::Greater => AIM_DY,
    }
}

/// Walking velocity for the behavior mode: Attack closes in, Defend backs
/// off. Nothing inside the dead zone or against the wall being walked into.
pub fn steer(mode: AiMode, me_x: i16, op_x: i16, dead_zone: i16) -> Option<i16> {
    let gap = me_x as i32 - op_x as i32;
    let dz = dead_zone as i32;
    match mode {
        AiMode::Attack => {
            if gap >= dz && me_x > X_MIN {
                Some(-WALK_SPEED)
            } else if gap <= -dz && me_x < X_MAX {
                Some(WALK_SPEED)
            } else {
                None
            }
        }
        AiMode::Defend => {
            if gap >= dz && me_x < X_MAX {
                Some(WALK_SPEED)
            } else if gap <= -dz && me_x > X_MIN {
                Some(-WALK_SPEED)
            } else {
                None
            }
        }
    }
}

// ── Policies ──────────────────────────────────────────────────────────────────

pub fn think(
    me: &mut Player,
    op: &mut Player,
    particles: &mut ParticlePool,
    config: &MatchConfig,
    host: &mut Host,
) {
    match config.ai {
        AiPolicy::Simple => wander(me, op, particles, config, host),
        AiPolicy::Predictive => forecast(me, op, particles, config, host),
    }
}

fn wander(
    me: &mut Player,
    op: &Player,
    particles: &mut ParticlePool,
    config: &MatchConfig,
    host: &mut Host,
) {
    let t = &config.tuning;
    if me.body.x <= X_MIN {
        me.drift = 1;
    } else if me.body.x >= X_MAX {
        me.drift = -1;
    }
    me.body.dx = WALK_SPEED * me.drift;

    if host.rng.draw() < t.simple_jump_chance {
        jump(me, particles, config, host);
    }
    if fireball_available(me) && host.rng.draw() < t.simple_fire_chance {
        fireball(me, aim(op.body.y, me.body.y), config, host);
    }
}

fn forecast(
    me: &mut Player,
    op: &mut Player,
    particles: &mut ParticlePool,
    config: &MatchConfig,
    host: &mut Host,
) {
    let t = &config.tuning;
    me.body.dx = 0;
    let mut jumped = false;

    for slot in 0..op.bullets.capacity() {
        let Some(incoming) = op.bullets.get(slot).filter(|b| !b.ai_resolved).map(Ghost::of) else {
            continue;
        };

        if !will_hit(me.body.x, me.body.y, incoming) {
            resolve(op, slot);
            continue;
        }

        // The counter-shot is judged from where the CPU stands, the same
        // projection that flagged the threat, so an available shot is taken.
        if fireball_available(me) {
            fireball(me, aim(incoming.y, me.body.y), config, host);
            resolve(op, slot);
            continue;
        }

        let reach = (me.body.x as i32 - incoming.x as i32).abs();
        if incoming.dy == 0 && !jumped && reach <= DODGE_RANGE as i32 {
            jump(me, particles, config, host);
            jumped = true;
            resolve(op, slot);
        }

        if let Some(dx) = steer(me.ai_mode, me.body.x, op.body.x, 0) {
            me.body.dx = dx;
        }
    }

    if fireball_available(me) {
        let chance = match me.ai_mode {
            AiMode::Attack => t.attack_fire_chance,
            AiMode::Defend => t.defend_fire_chance,
        };
        if host.rng.draw() < chance {
            fireball(me, aim(op.body.y, me.body.y), config, host);
        }
    }

    if me.body.dx == 0 {
        if let Some(dx) = steer(me.ai_mode, me.body.x, op.body.x, t.dead_zone) {
            me.body.dx = dx;
        }
    }

    // Only a dodge issued above suppresses the random hop.
    if host.rng.draw() < t.jump_chance && !jumped {
        jump(me, particles, config, host);
    }

    me.ai_mode_ticks = me.ai_mode_ticks.saturating_add(1);
    let threshold = host.rng.draw().checked_shr(u32::from(t.mode_shift)).unwrap_or(0);
    if me.ai_mode_ticks > threshold {
        me.ai_mode_ticks = 0;
        me.ai_mode = me.ai_mode.flipped();
        trace!(player = me.index, mode = ?me.ai_mode, "ai mode flip");
    }
}

fn resolve(op: &mut Player, slot: usize) {
    if let Some(b) = op.bullets.get_mut(slot) {
        b.ai_resolved = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::COLLISION_THRESH;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Direct reading of the prediction rule, for cross-checking.
    fn brute_force(x0: i16, y0: i16, vx: i16, vy: i16, dx: i16, dy: i16) -> bool {
        (1..=32i64).any(|k| {
            let ex = x0 as i64 + k * vx as i64 - dx as i64;
            let ey = y0 as i64 + k * vy as i64 - dy as i64;
            ex * ex + ey * ey <= COLLISION_THRESH as i64
        })
    }

    #[test]
    fn will_hit_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..5000 {
            let x0 = rng.gen_range(-50..350);
            let y0 = rng.gen_range(0..220);
            let vx = rng.gen_range(-12..=12);
            let vy = rng.gen_range(-10..=10);
            let dx = rng.gen_range(X_MIN..=X_MAX);
            let dy = rng.gen_range(100..=170);
            let bullet = Ghost { x: x0, y: y0, dx: vx, dy: vy };
            assert_eq!(
                will_hit(dx, dy, bullet),
                brute_force(x0, y0, vx, vy, dx, dy),
                "bullet {bullet:?} vs defender ({dx}, {dy})"
            );
        }
    }

    #[test]
    fn starting_overlap_alone_is_not_a_hit() {
        // Sitting on the defender but flying away fast.
        let bullet = Ghost { x: 100, y: 160, dx: 20, dy: 0 };
        assert!(!will_hit(100, 160, bullet));
    }

    #[test]
    fn horizon_is_thirty_two_ticks() {
        // 320 px away at 10 px/tick: reaches exactly on tick 32.
        let edge = Ghost { x: 0, y: 160, dx: 10, dy: 0 };
        assert!(will_hit(320, 160, edge));
        // Still twelve pixels short on the last projected tick.
        assert!(!will_hit(332, 160, edge));
    }

    #[test]
    fn intercepts_moves_both_ghosts() {
        let incoming = Ghost { x: 200, y: 160, dx: -10, dy: 0 };
        let counter = Ghost { x: 20, y: 160, dx: 10, dy: 0 };
        assert!(intercepts(counter, incoming, GHOST_HORIZON));
        let wild = Ghost { x: 20, y: 160, dx: 10, dy: -6 };
        assert!(!intercepts(wild, incoming, GHOST_HORIZON));
    }

    #[test]
    fn aim_is_coarse() {
        assert_eq!(aim(100, 160), -AIM_DY);
        assert_eq!(aim(160, 160), 0);
        assert_eq!(aim(170, 160), AIM_DY);
    }

    #[test]
    fn steer_attack_closes_the_gap() {
        assert_eq!(steer(AiMode::Attack, 200, 100, 4), Some(-WALK_SPEED));
        assert_eq!(steer(AiMode::Attack, 100, 200, 4), Some(WALK_SPEED));
        assert_eq!(steer(AiMode::Attack, 102, 100, 4), None);
        assert_eq!(steer(AiMode::Attack, 98, 100, 4), None);
    }

    #[test]
    fn steer_defend_backs_off_unless_cornered() {
        assert_eq!(steer(AiMode::Defend, 200, 100, 4), Some(WALK_SPEED));
        assert_eq!(steer(AiMode::Defend, 100, 200, 4), Some(-WALK_SPEED));
        assert_eq!(steer(AiMode::Defend, X_MAX, 100, 4), None);
        assert_eq!(steer(AiMode::Defend, X_MIN, 200, 4), None);
    }

    #[test]
    fn steer_without_dead_zone_moves_when_level() {
        assert_eq!(steer(AiMode::Attack, 150, 150, 0), Some(-WALK_SPEED));
        assert_eq!(steer(AiMode::Defend, 150, 150, 0), Some(WALK_SPEED));
    }
}
