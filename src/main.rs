mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use display::{Screen, Speaker};
use fireball_duel::{init, tick, Buttons, ControlSource, Host, InputSnapshot, Match, MatchConfig};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS, one tick per frame

/// Frames a key stays held after its last press or repeat event. Terminals
/// without release events only repeat a held key every 30-70 ms, so 8
/// frames (128 ms) outlasts the gap between repeats.
const HOLD_WINDOW: u64 = 8;

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// One fireball, one jump, wandering opponent.
    Classic,
    /// Two fireballs, double jump, forecasting opponent.
    Predictive,
}

#[derive(Debug, Parser)]
#[command(name = "fireball_duel", about = "Two clerics, one arena, lots of fireballs")]
struct Args {
    /// Rule set to play.
    #[arg(long, value_enum, default_value = "predictive")]
    preset: Preset,

    /// JSON file with a full match configuration; overrides --preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with a second human on the arrow keys instead of the CPU.
    #[arg(long)]
    versus: bool,

    /// Seed the random source for a repeatable match.
    #[arg(long)]
    seed: Option<u64>,

    /// Write trace output to this file (filter with RUST_LOG).
    #[arg(long)]
    log: Option<PathBuf>,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<MatchConfig> {
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read config {}", path.display()))?;
            serde_json::from_str::<MatchConfig>(&text)
                .with_context(|| format!("malformed config {}", path.display()))?
        }
        None => match args.preset {
            Preset::Classic => MatchConfig::classic(),
            Preset::Predictive => MatchConfig::predictive(),
        },
    };
    config.validate()?;
    Ok(config)
}

// ── Keyboard → pads ───────────────────────────────────────────────────────────

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn held_char(key_frame: &HashMap<KeyCode, u64>, c: char, frame: u64) -> bool {
    is_held(key_frame, &KeyCode::Char(c.to_ascii_lowercase()), frame)
        || is_held(key_frame, &KeyCode::Char(c.to_ascii_uppercase()), frame)
}

/// Left pad on WASD with J/K, right pad on the arrows with comma/period.
fn read_pads(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> InputSnapshot {
    let mut pad0 = Buttons::NONE;
    for (c, b) in [
        ('w', Buttons::UP),
        ('s', Buttons::DOWN),
        ('a', Buttons::LEFT),
        ('d', Buttons::RIGHT),
        ('j', Buttons::B),
        ('k', Buttons::C),
    ] {
        if held_char(key_frame, c, frame) {
            pad0 |= b;
        }
    }

    let mut pad1 = Buttons::NONE;
    for (key, b) in [
        (KeyCode::Up, Buttons::UP),
        (KeyCode::Down, Buttons::DOWN),
        (KeyCode::Left, Buttons::LEFT),
        (KeyCode::Right, Buttons::RIGHT),
        (KeyCode::Char(','), Buttons::B),
        (KeyCode::Char('.'), Buttons::C),
        (KeyCode::Enter, Buttons::START),
    ] {
        if is_held(key_frame, &key, frame) {
            pad1 |= b;
        }
    }

    InputSnapshot::new(pad0, pad1)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits and hands the live match back for teardown.
///
/// Every frame drains pending key events into `key_frame`, samples both pads
/// from it, runs exactly one tick and repaints.
fn game_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    mut game: Match,
    screen: &mut Screen,
    speaker: &mut Speaker,
    rng: &mut StdRng,
) -> std::io::Result<Match> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(game);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(game);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let input = read_pads(&key_frame, frame);
        speaker.fade();
        {
            let mut host = Host::new(screen, speaker, rng);
            game = tick(game, &input, &mut host);
        }

        display::render(out, screen, speaker, &game)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log {
        init_logging(path)?;
    }
    let config = load_config(&args)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let second = if args.versus { ControlSource::Human(1) } else { ControlSource::Cpu };
    info!(?config, ?second, seed = ?args.seed, "starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Release events let a held key stop the moment it is let go.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let mut screen = Screen::default();
    let mut speaker = Speaker::default();
    let game = init([ControlSource::Human(0), second], config, &mut screen);
    let result = game_loop(&mut out, &rx, game, &mut screen, &mut speaker, &mut rng);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    let game = result?;
    game.teardown(&mut screen);
    info!(leaked = screen.live(), "shutdown");
    Ok(())
}
