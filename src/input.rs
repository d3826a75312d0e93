/// Controller snapshot → player intents.
use tracing::debug;

use crate::compute::{fireball, jump};
use crate::config::{MatchConfig, WALK_SPEED, Y_HORIZON};
use crate::entities::{ControlSource, Match, Player};
use crate::particles::ParticlePool;
use crate::platform::{Channel, Cue, Host};

/// Vertical launch speed when aiming up or down.
pub const AIM_UP: i16 = -9;
pub const AIM_DOWN: i16 = 10;

/// One controller's held buttons, as the pad reports them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Buttons(pub u16);

impl Buttons {
    pub const UP: Buttons = Buttons(0x0001);
    pub const DOWN: Buttons = Buttons(0x0002);
    pub const LEFT: Buttons = Buttons(0x0004);
    pub const RIGHT: Buttons = Buttons(0x0008);
    pub const B: Buttons = Buttons(0x0010);
    pub const C: Buttons = Buttons(0x0020);
    pub const A: Buttons = Buttons(0x0040);
    pub const START: Buttons = Buttons(0x0080);
    pub const NONE: Buttons = Buttons(0);

    pub fn contains(self, other: Buttons) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Buttons {
    type Output = Buttons;

    fn bitor(self, rhs: Buttons) -> Buttons {
        Buttons(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Buttons {
    fn bitor_assign(&mut self, rhs: Buttons) {
        self.0 |= rhs.0;
    }
}

/// Every controller, read once at the top of the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub pads: [Buttons; 2],
}

impl InputSnapshot {
    pub fn new(pad0: Buttons, pad1: Buttons) -> Self {
        Self { pads: [pad0, pad1] }
    }

    /// Unknown ports read as nothing held.
    pub fn pad(&self, id: u8) -> Buttons {
        self.pads.get(id as usize).copied().unwrap_or_default()
    }
}

/// Vertical speed for the next fireball given the held direction.
pub fn launch_bias(buttons: Buttons) -> i16 {
    if buttons.contains(Buttons::UP) {
        AIM_UP
    } else if buttons.contains(Buttons::DOWN) {
        AIM_DOWN
    } else {
        0
    }
}

/// Start on the second pad hands player two to a human, mid-match and in
/// any phase.
pub fn claim_second_pad(game: &mut Match, input: &InputSnapshot, host: &mut Host) {
    let p = &mut game.players[1];
    if p.is_cpu() && input.pad(1).contains(Buttons::START) {
        p.control = ControlSource::Human(1);
        host.cue(Cue::Ding, Channel::Pcm3);
        debug!("second controller joined");
    }
}

pub fn route(
    p: &mut Player,
    buttons: Buttons,
    particles: &mut ParticlePool,
    config: &MatchConfig,
    host: &mut Host,
) {
    if p.body.y >= Y_HORIZON {
        p.body.dx = 0;
    }
    if config.steer_while_ascending || p.body.dy >= 0 {
        if buttons.contains(Buttons::LEFT) {
            p.body.dx = -WALK_SPEED;
        } else if buttons.contains(Buttons::RIGHT) {
            p.body.dx = WALK_SPEED;
        }
    }

    let dy = launch_bias(buttons);
    if buttons.contains(Buttons::B) {
        fireball(p, dy, config, host);
    }
    if buttons.contains(Buttons::C) {
        jump(p, particles, config, host);
    }
}
