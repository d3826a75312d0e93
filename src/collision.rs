/// Bullet hit-testing for the Playing phase.
use tracing::debug;

use crate::config::{COLLISION_THRESH, DEATH_PAUSE_TICKS, DEFEAT_HOLD_TICKS};
use crate::entities::{Entity, Match, Phase};
use crate::particles::Pattern;
use crate::platform::{anim, Channel, Cue, Host, Palette};

/// True when an offset of (dx, dy) lies inside the hit radius.
pub fn in_range(dx: i64, dy: i64) -> bool {
    dx * dx + dy * dy <= COLLISION_THRESH as i64
}

pub fn touching(ax: i16, ay: i16, bx: i16, by: i16) -> bool {
    in_range(ax as i64 - bx as i64, ay as i64 - by as i64)
}

pub fn collide(a: &Entity, b: &Entity) -> bool {
    touching(a.x, a.y, b.x, b.y)
}

/// Resolve every live bullet against the opposing body, then against the
/// opposing bullets. A bullet that hit a body this tick does not also clash.
pub fn resolve(game: &mut Match, host: &mut Host) {
    for owner in 0..2 {
        let victim = 1 - owner;
        for slot in 0..game.players[owner].bullets.capacity() {
            let Some((bx, by)) = game.players[owner].bullets.get(slot).map(|b| (b.x, b.y)) else {
                continue;
            };

            if collide_body(game, victim, bx, by) {
                if let Some(b) = game.players[owner].bullets.get_mut(slot) {
                    b.ttl = 1;
                }
                register_hit(game, victim, bx, by, host);
                continue;
            }

            let mut clashed = false;
            for other in game.players[victim].bullets.iter_mut() {
                if touching(other.x, other.y, bx, by) {
                    other.ttl = 1;
                    clashed = true;
                }
            }
            if clashed {
                if let Some(b) = game.players[owner].bullets.get_mut(slot) {
                    b.ttl = 1;
                }
            }
        }
    }
}

fn collide_body(game: &Match, victim: usize, bx: i16, by: i16) -> bool {
    let body = &game.players[victim].body;
    touching(body.x, body.y, bx, by)
}

fn register_hit(game: &mut Match, victim: usize, x: i16, y: i16, host: &mut Host) {
    host.cue(Cue::Oof, Channel::Pcm3);
    game.particles
        .add_particles(x, y, Palette::Fire, Pattern::Scatter, host.video, host.rng);

    let p = &mut game.players[victim];
    if p.health == 0 {
        return;
    }
    let remaining = p.take_hit(host.video);
    debug!(player = victim, health = remaining, "fireball hit");
    if remaining == 0 {
        knock_out(game, victim, host);
    }
}

fn knock_out(game: &mut Match, victim: usize, host: &mut Host) {
    host.cue(Cue::Ouch, Channel::Pcm2);
    let p = &mut game.players[victim];
    p.body.dx = 0;
    p.body.set_animation(host.video, anim::DEFEATED, 0);
    p.anim_hold = DEFEAT_HOLD_TICKS;
    game.paused = true;
    game.phase = Phase::DeathPause;
    game.timer = DEATH_PAUSE_TICKS;
    debug!(player = victim, "knockout, entering death pause");
}
