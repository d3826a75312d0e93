/// Arena geometry, tuning tables and the two variant presets.
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Arena ─────────────────────────────────────────────────────────────────────

/// Ground line; bodies below it are snapped back up.
pub const Y_HORIZON: i16 = 160;
pub const X_MIN: i16 = 10;
pub const X_MAX: i16 = 280;

/// Squared pixel distance at or under which two entities touch.
pub const COLLISION_THRESH: i32 = 128;

pub const START_HEALTH: u8 = 3;
pub const MAX_PARTICLES: usize = 24;
pub const MAX_BULLETS_PER_PLAYER: usize = 4;

// ── Fixed timings ─────────────────────────────────────────────────────────────

pub const INTRO_TICKS: u8 = 80;
pub const DEATH_PAUSE_TICKS: u8 = 20;
pub const GO_BANNER_TICKS: i16 = 20;
pub const FIREBALL_TICKS: i16 = 30;
pub const PARTICLE_TICKS: i16 = 10;
pub const CAST_HOLD_TICKS: u8 = 10;
pub const DEFEAT_HOLD_TICKS: u8 = 20;

pub const FIREBALL_SPEED: i16 = 10;
pub const WALK_SPEED: i16 = 4;
pub const JUMP_IMPULSE: i16 = -5;
/// Gravity accumulates into `ddy` one step per tick up to this value.
pub const MAX_FALL_ACCEL: i16 = 4;

/// How many ticks ahead the opponent projects an incoming bullet.
pub const GHOST_HORIZON: u32 = 32;
/// Horizontal reach inside which a flat bullet is dodged by jumping.
pub const DODGE_RANGE: i16 = 128;

// ── Variant configuration ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiPolicy {
    /// Drift, bounce off the walls, fire and hop at random.
    Simple,
    /// Forecast incoming bullets and counter-fire, dodge or reposition.
    Predictive,
}

/// Probabilities are thresholds against a 16-bit draw: an event fires when
/// `draw < chance`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiTuning {
    pub attack_fire_chance: u16,
    pub defend_fire_chance: u16,
    pub jump_chance: u16,
    /// Right shift applied to a draw to get the next mode-flip threshold.
    pub mode_shift: u8,
    /// Dead zone around the opponent's x for idle approach/retreat.
    pub dead_zone: i16,
    pub simple_fire_chance: u16,
    pub simple_jump_chance: u16,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            attack_fire_chance: 10000,
            defend_fire_chance: 5000,
            jump_chance: 4048,
            mode_shift: 7,
            dead_zone: 4,
            simple_fire_chance: 3000,
            simple_jump_chance: 1024,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub bullets_per_player: usize,
    /// Jumps allowed before touching the ground again.
    pub max_jumps: u8,
    pub fireball_cooldown: u8,
    pub jump_cooldown: u8,
    pub ai: AiPolicy,
    /// When false, left/right is ignored while the body is rising.
    pub steer_while_ascending: bool,
    /// Bullets flip their sprite whenever their horizontal velocity
    /// changes sign.
    pub bullet_auto_flip: bool,
    #[serde(default)]
    pub tuning: AiTuning,
}

impl MatchConfig {
    /// One fireball in flight, single jump, wandering opponent.
    pub fn classic() -> Self {
        Self {
            bullets_per_player: 1,
            max_jumps: 1,
            fireball_cooldown: 20,
            jump_cooldown: 10,
            ai: AiPolicy::Simple,
            steer_while_ascending: true,
            bullet_auto_flip: true,
            tuning: AiTuning::default(),
        }
    }

    /// Two fireballs, double jump, forecasting opponent.
    pub fn predictive() -> Self {
        Self {
            bullets_per_player: 2,
            max_jumps: 2,
            fireball_cooldown: 30,
            jump_cooldown: 10,
            ai: AiPolicy::Predictive,
            steer_while_ascending: false,
            bullet_auto_flip: false,
            tuning: AiTuning::default(),
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(Self::classic()),
            "predictive" => Some(Self::predictive()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bullets_per_player == 0 || self.bullets_per_player > MAX_BULLETS_PER_PLAYER {
            return Err(ConfigError::BulletSlots {
                requested: self.bullets_per_player,
                max: MAX_BULLETS_PER_PLAYER,
            });
        }
        if self.max_jumps == 0 {
            return Err(ConfigError::NoJumps);
        }
        if self.fireball_cooldown == 0 {
            return Err(ConfigError::ZeroFireballCooldown);
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::predictive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    BulletSlots { requested: usize, max: usize },
    NoJumps,
    ZeroFireballCooldown,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BulletSlots { requested, max } => write!(
                f,
                "bullets_per_player must be between 1 and {max}, got {requested}"
            ),
            Self::NoJumps => write!(f, "max_jumps must allow at least one jump"),
            Self::ZeroFireballCooldown => write!(f, "fireball_cooldown must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}
