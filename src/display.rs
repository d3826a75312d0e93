/// Terminal collaborators: the renderer, the audio sink and the frame painter.
///
/// `Screen` is the renderer the simulation talks to: it only remembers the
/// latest state of every visual. `render` turns that memory plus the
/// match phase into terminal commands once per frame.

use std::collections::HashMap;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use fireball_duel::config::{X_MAX, Y_HORIZON};
use fireball_duel::platform::{anim, Audio, Channel, Cue, Palette, Renderer, Sprite, VisualHandle};
use fireball_duel::{ControlSource, Match, Phase};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_GROUND: Color = Color::DarkGreen;
const C_HUD: Color = Color::White;
const C_CUE: Color = Color::DarkYellow;
const C_HINT: Color = Color::DarkGrey;
const C_BANNER: Color = Color::Yellow;

fn palette_color(palette: Palette) -> Color {
    match palette {
        Palette::Cleric => Color::Cyan,
        Palette::Crystal => Color::Magenta,
        Palette::Fire => Color::Red,
    }
}

// ── Pixel → cell mapping ──────────────────────────────────────────────────────

/// Pixels per terminal cell in both directions.
const CELL: i16 = 8;
const TOP: u16 = 2;
const LEFT: u16 = 1;

fn arena_cols() -> u16 {
    (X_MAX / CELL) as u16 + 4
}

fn ground_row() -> u16 {
    TOP + (Y_HORIZON / CELL) as u16 + 1
}

fn to_cell(x: i16, y: i16) -> Option<(u16, u16)> {
    let col = LEFT as i32 + (x / CELL) as i32;
    let row = TOP as i32 + (y / CELL) as i32;
    if col < LEFT as i32 || col >= arena_cols() as i32 || row < TOP as i32 || row > ground_row() as i32 {
        return None;
    }
    Some((col as u16, row as u16))
}

// ── Renderer ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Visual {
    sprite: Sprite,
    palette: Palette,
    x: i16,
    y: i16,
    flipped: bool,
    anim: u8,
}

#[derive(Debug, Default)]
pub struct Screen {
    visuals: HashMap<u32, Visual>,
    next_id: u32,
    frames: u64,
}

impl Screen {
    pub fn live(&self) -> usize {
        self.visuals.len()
    }
}

impl Renderer for Screen {
    fn create_visual(&mut self, sprite: Sprite, palette: Palette, x: i16, y: i16) -> VisualHandle {
        self.next_id = self.next_id.wrapping_add(1);
        self.visuals.insert(
            self.next_id,
            Visual { sprite, palette, x, y, flipped: false, anim: anim::IDLE },
        );
        VisualHandle::new(self.next_id)
    }

    fn set_position(&mut self, handle: &VisualHandle, x: i16, y: i16) {
        if let Some(v) = self.visuals.get_mut(&handle.id()) {
            v.x = x;
            v.y = y;
        }
    }

    fn set_hflip(&mut self, handle: &VisualHandle, flipped: bool) {
        if let Some(v) = self.visuals.get_mut(&handle.id()) {
            v.flipped = flipped;
        }
    }

    fn set_animation(&mut self, handle: &VisualHandle, anim: u8, _frame: u8) {
        if let Some(v) = self.visuals.get_mut(&handle.id()) {
            v.anim = anim;
        }
    }

    fn release_visual(&mut self, handle: VisualHandle) {
        self.visuals.remove(&handle.id());
    }

    fn present(&mut self) {
        self.frames += 1;
    }
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// Frames a cue name stays on the status line.
const CUE_DISPLAY_FRAMES: u8 = 30;

/// No sound in a terminal; the last cue is shown on the status line instead.
#[derive(Debug, Default)]
pub struct Speaker {
    last: Option<(Cue, u8)>,
}

impl Speaker {
    /// Age the status-line cue by one frame.
    pub fn fade(&mut self) {
        self.last = match self.last {
            Some((cue, left)) if left > 1 => Some((cue, left - 1)),
            _ => None,
        };
    }
}

impl Audio for Speaker {
    fn play_cue(&mut self, cue: Cue, channel: Channel) {
        tracing::trace!(?cue, ?channel, sample = cue.sample_id(), "cue");
        self.last = Some((cue, CUE_DISPLAY_FRAMES));
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    screen: &Screen,
    speaker: &Speaker,
    game: &Match,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out)?;
    draw_hud(out, screen, speaker, game)?;

    // Decorations first so bodies and fireballs draw over them.
    let mut visuals: Vec<&Visual> = screen.visuals.values().collect();
    visuals.sort_by_key(|v| match v.sprite {
        Sprite::Particles | Sprite::Health | Sprite::Go => 0,
        Sprite::Fireball => 1,
        Sprite::Cleric => 2,
    });
    for v in visuals {
        draw_visual(out, v)?;
    }

    draw_controls_hint(out)?;

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, ground_row() + 3))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W) -> std::io::Result<()> {
    let w = arena_cols() as usize;
    let ground = ground_row();

    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, TOP - 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;
    for row in TOP..ground {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(arena_cols() - 1, row))?;
        out.queue(Print("│"))?;
    }

    out.queue(style::SetForegroundColor(C_GROUND))?;
    out.queue(cursor::MoveTo(0, ground))?;
    out.queue(Print(format!("└{}┘", "▀".repeat(w.saturating_sub(2)))))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    screen: &Screen,
    speaker: &Speaker,
    game: &Match,
) -> std::io::Result<()> {
    let phase = match game.phase {
        Phase::Intro => format!("READY {:>2}", game.timer / 20),
        Phase::Playing => "FIGHT".to_string(),
        Phase::DeathPause => "K.O.".to_string(),
    };
    let who = |c: ControlSource| match c {
        ControlSource::Human(pad) => format!("P{}", pad + 1),
        ControlSource::Cpu => "CPU".to_string(),
    };
    let [p0, p1] = &game.players;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!(
        "{} vs {}  [{}]  frame {}",
        who(p0.control),
        who(p1.control),
        phase,
        screen.frames
    )))?;

    if let Some((cue, _)) = speaker.last {
        out.queue(style::SetForegroundColor(C_CUE))?;
        out.queue(Print(format!("  ♪ {cue:?}")))?;
    }
    Ok(())
}

// ── Visuals ───────────────────────────────────────────────────────────────────

fn glyph(v: &Visual) -> &'static str {
    match v.sprite {
        Sprite::Cleric => match v.anim {
            anim::DEFEATED => "x",
            anim::CAST => {
                if v.flipped {
                    "«"
                } else {
                    "»"
                }
            }
            _ => "☺",
        },
        Sprite::Fireball => {
            if v.flipped {
                "◄"
            } else {
                "►"
            }
        }
        Sprite::Particles => "·",
        Sprite::Health => "♥",
        Sprite::Go => "GO!",
    }
}

fn draw_visual<W: Write>(out: &mut W, v: &Visual) -> std::io::Result<()> {
    // Notches and the banner sit in the HUD band above the arena.
    let (col, row) = match v.sprite {
        Sprite::Health | Sprite::Go => (LEFT + (v.x / CELL).max(0) as u16, TOP - 1),
        _ => match to_cell(v.x, v.y) {
            Some(cell) => cell,
            None => return Ok(()),
        },
    };
    let color = match v.sprite {
        Sprite::Go => C_BANNER,
        _ => palette_color(v.palette),
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph(v)))?;
    Ok(())
}

// ── Controls hint (last rows) ─────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, ground_row() + 1))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("P1: A D move  W S aim  J fire  K jump"))?;
    out.queue(cursor::MoveTo(1, ground_row() + 2))?;
    out.queue(Print("P2: ← → move  ↑ ↓ aim  , fire  . jump  ENTER join   Q quit"))?;
    Ok(())
}
