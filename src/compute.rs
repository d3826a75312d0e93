/// Match state machine and the per-tick pipeline.
///
/// One call to [`tick`] is one frame, always in this order:
///
///  1. Phase timer (Intro countdown, DeathPause countdown and reset)
///  2. Second-controller join check
///  3. Player intents from controllers or the scripted opponent (unpaused only)
///  4. Bullet collisions (Playing only)
///  5. Physics, reaping and render sync
use tracing::{debug, trace};

use crate::ai;
use crate::collision;
use crate::config::{
    MatchConfig, CAST_HOLD_TICKS, FIREBALL_SPEED, FIREBALL_TICKS, GO_BANNER_TICKS, JUMP_IMPULSE,
    MAX_FALL_ACCEL, X_MAX, X_MIN, Y_HORIZON,
};
use crate::entities::{ControlSource, Entity, Match, Phase, Player};
use crate::input::{self, InputSnapshot};
use crate::particles::{ParticlePool, Pattern};
use crate::platform::{anim, Channel, Cue, Host, Palette, Renderer, Sprite};

// ── Construction ──────────────────────────────────────────────────────────────

/// Build a fresh match in its Intro countdown.
pub fn init(controls: [ControlSource; 2], config: MatchConfig, video: &mut dyn Renderer) -> Match {
    debug!(?controls, ai = ?config.ai, "new match");
    Match::new(controls, config, video)
}

// ── Per-frame tick ────────────────────────────────────────────────────────────

/// Advance the match by one frame. Usually the same match comes back,
/// mutated; when a knockout pause runs out a brand-new one is returned.
pub fn tick(game: Match, input: &InputSnapshot, host: &mut Host) -> Match {
    let mut game = advance_phase(game, host);

    input::claim_second_pad(&mut game, input, host);
    if !game.paused {
        drive_players(&mut game, input, host);
    }

    if game.phase == Phase::Playing {
        collision::resolve(&mut game, host);
    }

    physics(&mut game, host.video);
    host.video.present();
    game
}

fn advance_phase(mut game: Match, host: &mut Host) -> Match {
    match game.phase {
        Phase::Intro => {
            game.timer = game.timer.saturating_sub(1);
            match game.timer {
                60 | 40 | 20 => host.cue(Cue::Fireball, Channel::Pcm2),
                0 => start_fight(&mut game, host),
                _ => {}
            }
        }
        Phase::DeathPause => {
            game.timer = game.timer.saturating_sub(1);
            if game.timer == 0 {
                return reset(game, host.video);
            }
        }
        Phase::Playing => {}
    }
    game
}

fn start_fight(game: &mut Match, host: &mut Host) {
    host.cue(Cue::Ding, Channel::Pcm3);
    game.paused = false;
    game.phase = Phase::Playing;
    let banner = Entity::spawn(host.video, Sprite::Go, Palette::Fire, 80, 20, GO_BANNER_TICKS);
    game.particles.spawn(banner, host.video);
    debug!("fight");
}

/// Throw the finished match away and start over. Only who controls each
/// player survives.
fn reset(game: Match, video: &mut dyn Renderer) -> Match {
    let controls = game.controls();
    let config = game.config;
    game.teardown(video);
    debug!(?controls, "match reset");
    Match::new(controls, config, video)
}

fn drive_players(game: &mut Match, input: &InputSnapshot, host: &mut Host) {
    let config = game.config;
    for i in 0..game.players.len() {
        let (me, op, particles) = game.pair_mut(i);
        match me.control {
            ControlSource::Cpu => ai::think(me, op, particles, &config, host),
            ControlSource::Human(pad) => {
                input::route(me, input.pad(pad), particles, &config, host)
            }
        }
    }
}

// ── Physics ───────────────────────────────────────────────────────────────────

fn physics(game: &mut Match, video: &mut dyn Renderer) {
    for p in game.players.iter_mut() {
        settle(p, video);
    }

    let [p0, p1] = &mut game.players;
    if p0.body.x >= p1.body.x {
        p0.body.face(-1, video);
        p1.body.face(1, video);
    } else {
        p0.body.face(1, video);
        p1.body.face(-1, video);
    }

    game.particles.update(video);
}

/// Cooldowns, gravity, ground and wall clamps, then move everything the
/// player owns.
fn settle(p: &mut Player, video: &mut dyn Renderer) {
    p.fireball_cooldown = p.fireball_cooldown.saturating_sub(1);
    p.jump_cooldown = p.jump_cooldown.saturating_sub(1);
    if p.anim_hold > 0 {
        p.anim_hold -= 1;
        if p.anim_hold == 0 {
            p.body.set_animation(video, anim::IDLE, 0);
        }
    }

    if p.body.ddy < MAX_FALL_ACCEL {
        p.body.ddy += 1;
    }
    if p.body.y > Y_HORIZON {
        p.body.y = Y_HORIZON;
        p.body.dy = 0;
        p.jumps = 0;
    }
    p.body.x = p.body.x.clamp(X_MIN, X_MAX);

    p.body.update(video);
    p.bullets.update_all(video);
    p.notches.update_all(video);
}

// ── Actions ───────────────────────────────────────────────────────────────────

pub fn fireball_available(p: &Player) -> bool {
    p.fireball_cooldown == 0 && p.bullets.has_free()
}

/// Launch a fireball from the body in the facing direction. Does nothing
/// while cooling down or with every bullet slot in flight.
pub fn fireball(p: &mut Player, dy: i16, config: &MatchConfig, host: &mut Host) {
    if p.fireball_cooldown > 0 {
        return;
    }
    let Some(slot) = p.bullets.first_free_from(0) else {
        return;
    };
    let mut e = Entity::spawn(
        host.video,
        Sprite::Fireball,
        p.palette.projectile(),
        p.body.x,
        p.body.y,
        FIREBALL_TICKS,
    );
    e.dx = FIREBALL_SPEED * p.body.facing;
    e.dy = dy;
    if config.bullet_auto_flip {
        e.auto_flip = true;
        e.face(e.dx.signum(), host.video);
    }
    p.bullets.fill(slot, e, host.video);

    p.fireball_cooldown = config.fireball_cooldown;
    p.anim_hold = CAST_HOLD_TICKS;
    p.body.set_animation(host.video, anim::CAST, anim::CAST_FRAME);
    host.cue(Cue::Fireball, Channel::Pcm2);
    trace!(player = p.index, slot, dy, "fireball");
}

/// Kick the body upward and puff dust under its feet. Limited by the jump
/// cooldown and by how many jumps the preset allows before landing.
pub fn jump(p: &mut Player, particles: &mut ParticlePool, config: &MatchConfig, host: &mut Host) {
    if p.jump_cooldown > 0 || p.jumps >= config.max_jumps {
        return;
    }
    p.body.dy = 0;
    p.body.ddy = JUMP_IMPULSE;
    p.jump_cooldown = config.jump_cooldown;
    p.jumps += 1;
    particles.add_particles(
        p.body.x,
        p.body.y + 8,
        p.palette,
        Pattern::Fan,
        host.video,
        host.rng,
    );
    host.cue(Cue::Boing, Channel::Pcm3);
}
