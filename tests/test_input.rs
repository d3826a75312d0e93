mod common;

use common::{idle, never, Rig, HUMANS, VS_CPU};
use fireball_duel::config::{MatchConfig, WALK_SPEED, X_MIN};
use fireball_duel::input::{AIM_DOWN, AIM_UP};
use fireball_duel::platform::{Channel, Cue};
use fireball_duel::{Buttons, ControlSource, InputSnapshot, Phase};

fn p0(buttons: Buttons) -> InputSnapshot {
    InputSnapshot::new(buttons, Buttons::NONE)
}

fn p1(buttons: Buttons) -> InputSnapshot {
    InputSnapshot::new(Buttons::NONE, buttons)
}

#[test]
fn walking_stops_when_the_direction_is_released() {
    let mut rig = Rig::new(never());
    let game = rig.fighting(HUMANS, MatchConfig::default());
    let game = rig.step(game, p0(Buttons::RIGHT));
    assert_eq!(game.players[0].body.x, X_MIN + WALK_SPEED);
    let game = rig.step(game, idle());
    assert_eq!(game.players[0].body.x, X_MIN + WALK_SPEED);
    game.teardown(&mut rig.video);
}

#[test]
fn left_wins_over_right() {
    let mut rig = Rig::new(never());
    let mut game = rig.fighting(HUMANS, MatchConfig::default());
    game.players[0].body.x = 100;
    let game = rig.step(game, p0(Buttons::LEFT | Buttons::RIGHT));
    assert_eq!(game.players[0].body.x, 100 - WALK_SPEED);
    game.teardown(&mut rig.video);
}

#[test]
fn steering_while_rising_depends_on_preset() {
    for (config, expected) in [
        (MatchConfig::predictive(), X_MIN),
        (MatchConfig::classic(), X_MIN + WALK_SPEED),
    ] {
        let mut rig = Rig::new(never());
        let game = rig.fighting(HUMANS, config);
        let game = rig.step(game, p0(Buttons::C));
        assert!(game.players[0].body.dy < 0);
        let game = rig.step(game, p0(Buttons::RIGHT));
        assert_eq!(game.players[0].body.x, expected, "{:?}", config.ai);
        game.teardown(&mut rig.video);
    }
}

#[test]
fn falling_players_steer_and_keep_momentum() {
    let mut rig = Rig::new(never());
    let game = rig.fighting(HUMANS, MatchConfig::predictive());
    let game = rig.step(game, p0(Buttons::C));
    let game = rig.run(game, idle(), 8);
    assert_eq!(game.players[0].body.dy, 0);

    let game = rig.step(game, p0(Buttons::RIGHT));
    assert_eq!(game.players[0].body.x, X_MIN + WALK_SPEED);
    let game = rig.step(game, idle());
    assert_eq!(game.players[0].body.x, X_MIN + 2 * WALK_SPEED);
    game.teardown(&mut rig.video);
}

#[test]
fn held_direction_aims_the_fireball() {
    for (held, dy) in [(Buttons::UP, AIM_UP), (Buttons::DOWN, AIM_DOWN), (Buttons::NONE, 0)] {
        let mut rig = Rig::new(never());
        let game = rig.fighting(HUMANS, MatchConfig::default());
        let game = rig.step(game, p0(Buttons::B | held));
        assert_eq!(game.players[0].bullets.get(0).map(|b| b.dy), Some(dy));
        game.teardown(&mut rig.video);
    }
}

#[test]
fn classic_fireballs_turn_their_sprite() {
    for (config, flipped) in [(MatchConfig::classic(), true), (MatchConfig::predictive(), false)] {
        let mut rig = Rig::new(never());
        let game = rig.fighting(HUMANS, config);
        let game = rig.step(game, p1(Buttons::B));
        let shot = game.players[1].bullets.get(0).map(|b| rig.video.record(b.handle()).flipped);
        assert_eq!(shot, Some(flipped), "{:?}", config.ai);
        game.teardown(&mut rig.video);
    }
}

#[test]
fn start_on_the_second_pad_takes_over_the_cpu() {
    let mut rig = Rig::new(never());
    let game = rig.start(VS_CPU, MatchConfig::default());
    let game = rig.step(game, p1(Buttons::START));
    assert_eq!(game.players[1].control, ControlSource::Human(1));
    assert_eq!(rig.audio.cues, vec![(Cue::Ding, Channel::Pcm3)]);
    assert_eq!(game.phase, Phase::Intro);

    let game = rig.step(game, p1(Buttons::START));
    assert_eq!(rig.audio.count(Cue::Ding), 1);
    game.teardown(&mut rig.video);
}

#[test]
fn start_is_ignored_without_a_cpu_to_replace() {
    let mut rig = Rig::new(never());
    let game = rig.fighting(HUMANS, MatchConfig::default());
    let game = rig.step(game, p1(Buttons::START));
    assert_eq!(rig.audio.count(Cue::Ding), 0);

    let game = rig.step(game, p0(Buttons::START));
    assert_eq!(rig.audio.count(Cue::Ding), 0);
    game.teardown(&mut rig.video);

    let mut rig = Rig::new(never());
    let game = rig.fighting(VS_CPU, MatchConfig::default());
    let game = rig.step(game, p0(Buttons::START));
    assert_eq!(game.players[1].control, ControlSource::Cpu);
    game.teardown(&mut rig.video);
}

#[test]
fn joined_player_survives_a_reset() {
    let mut rig = Rig::new(never());
    let mut game = rig.fighting(VS_CPU, MatchConfig::default());
    game = rig.step(game, p1(Buttons::START));
    game.players[0].health = 0;
    game.phase = Phase::DeathPause;
    game.paused = true;
    game.timer = 1;
    let game = rig.step(game, idle());
    assert_eq!(game.phase, Phase::Intro);
    assert_eq!(game.controls(), HUMANS);
    game.teardown(&mut rig.video);
}
