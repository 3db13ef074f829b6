use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use invader_rush::consts::*;
use invader_rush::persistence::MemoryStorage;
use invader_rush::renderer::DrawList;
use invader_rush::sim::{Enemy, GameEvent, GameState, Mode, TickInput, tick};
use invader_rush::{Game, HighScoreStore, ScoreBook, Tuning};

/// No random enemy fire and no bonus craft
fn quiet_state() -> GameState {
    let tuning = Tuning {
        base_fire_chance: 0.0,
        fire_chance_per_level: 0.0,
        bonus_spawn_chance: 0.0,
        ..Default::default()
    };
    GameState::with_tuning(2024, tuning)
}

/// Score book the test can keep reading after the game takes ownership
#[derive(Clone)]
struct SharedBook(Rc<RefCell<ScoreBook<MemoryStorage>>>);

impl HighScoreStore for SharedBook {
    fn read_high_score(&mut self) -> u64 {
        self.0.borrow_mut().read_high_score()
    }

    fn write_high_score(&mut self, score: u64) {
        self.0.borrow_mut().write_high_score(score);
    }
}

fn idle() -> TickInput {
    TickInput::default()
}

#[test]
fn fresh_game_starts_playing() {
    let state = GameState::new(1);
    assert_eq!(state.session.score, 0);
    assert_eq!(state.session.lives, 3);
    assert_eq!(state.session.level, 1);
    assert_eq!(state.mode.current(), Mode::Playing);
    assert_eq!(state.enemies.len(), ENEMY_ROWS * ENEMY_COLS);
    assert_eq!(state.player_shots.active_len(), 0);
    assert_eq!(state.enemy_shots.active_len(), 0);
}

#[test]
fn firing_spawns_one_shot_at_muzzle() {
    let mut state = quiet_state();
    let muzzle_x = state.player.rect.center_x();
    let fire = TickInput {
        fire: true,
        ..Default::default()
    };

    tick(&mut state, &fire, 16.0);
    assert_eq!(state.player_shots.active_len(), 1);
    let shot = state.player_shots.active().next().cloned().expect("shot in flight");
    assert_eq!(shot.rect.center_x(), muzzle_x);

    // Reload has not elapsed
    tick(&mut state, &fire, 16.0);
    assert_eq!(state.player_shots.active_len(), 1);
}

#[test]
fn shot_destroys_enemy_and_scores() {
    let mut state = quiet_state();
    let target = state.enemies[0].clone();
    let before = state.enemies.len();

    let h = state.player_shots.acquire();
    state
        .player_shots
        .get_mut(h)
        .launch(Vec2::new(target.rect.center_x(), target.rect.bottom()), 8.0);

    tick(&mut state, &idle(), 0.0);
    assert_eq!(state.enemies.len(), before - 1);
    assert_eq!(state.session.score, target.tier as u64 * 10);
    assert_eq!(state.player_shots.active_len(), 0);
}

#[test]
fn last_life_lost_ends_the_run() {
    let mut state = quiet_state();
    state.session.lives = 1;
    state.player.health = 1;

    let p = state.player.rect;
    let h = state.enemy_shots.acquire();
    state
        .enemy_shots
        .get_mut(h)
        .launch(Vec2::new(p.center_x(), p.top()), 5.0);

    tick(&mut state, &idle(), 16.0);
    assert_eq!(state.mode.current(), Mode::GameOver);
    assert_eq!(state.session.lives, 0);

    // No further steps run
    let frames = state.session.frame_count;
    let formation_x = state.enemies[0].rect.pos.x;
    for _ in 0..100 {
        tick(&mut state, &idle(), 100.0);
    }
    assert_eq!(state.session.frame_count, frames);
    assert_eq!(state.enemies[0].rect.pos.x, formation_x);
}

#[test]
fn clearing_the_formation_advances_level() {
    let mut state = quiet_state();
    state.enemies.clear();
    let speed = state.formation.speed_multiplier;

    tick(&mut state, &idle(), 0.0);
    assert_eq!(state.session.level, 2);
    assert_eq!(state.enemies.len(), ENEMY_ROWS * ENEMY_COLS);
    assert_eq!(state.session.score, 200);
    assert!((state.formation.speed_multiplier - speed - 0.2).abs() < 1e-6);
    assert!(
        state
            .events
            .contains(&GameEvent::LevelCleared { level: 2, bonus: 200 })
    );
}

#[test]
fn formation_reverses_in_lockstep() {
    let mut state = quiet_state();
    state.enemies = vec![
        Enemy::new(FIELD_WIDTH - ENEMY_WIDTH - FORMATION_EDGE_MARGIN, 100.0, 1),
        Enemy::new(100.0, 100.0, 2),
    ];
    let interval = state.formation.move_interval_ms;

    tick(&mut state, &idle(), interval);
    assert_eq!(state.formation.direction, -1.0);
    assert!(state.enemies.iter().all(|e| e.rect.pos.y == 100.0 + FORMATION_DROP));
    assert_eq!(state.enemies[1].rect.pos.x, 100.0);
}

#[test]
fn pause_freezes_everything() {
    let mut state = GameState::new(5);
    let pause = TickInput {
        pause: true,
        ..Default::default()
    };
    tick(&mut state, &pause, 16.0);
    assert_eq!(state.mode.current(), Mode::Paused);
    let snapshot = (state.session.frame_count, state.enemies[0].rect.pos);
    for _ in 0..60 {
        tick(&mut state, &idle(), 16.0);
    }
    assert_eq!(snapshot, (state.session.frame_count, state.enemies[0].rect.pos));
}

#[test]
fn attract_mode_game_persists_best_score() {
    let mut book = ScoreBook::with_clock(MemoryStorage::new(), || 0.0);
    book.write_high_score(1);
    let shared = SharedBook(Rc::new(RefCell::new(book)));

    let mut game = Game::new(77, Box::new(shared.clone()));
    assert_eq!(game.high_score(), 1);
    game.set_idle_mode(true);
    let mut canvas = DrawList::new();

    let mut finished = false;
    for i in 0..20_000 {
        canvas.clear();
        let events = game.frame(i as f64 * 16.0, &mut canvas);
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::ModeChanged { to: Mode::GameOver, .. }))
        {
            finished = true;
            break;
        }
    }

    assert!(finished, "attract mode should eventually lose");
    let score = game.state().session.score;
    assert!(score > 1);
    assert!(canvas.texts().any(|t| t == "GAME OVER"));

    let board = shared.0.borrow().leaderboard();
    assert_eq!(board.top_score(), Some(score));
    assert_eq!(board.entries.len(), 2);
}
