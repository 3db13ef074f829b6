//! Per-frame simulation tick
//!
//! Core game loop: input, entity updates, formation, projectile resolution and
//! end conditions, in that order. Later phases observe earlier mutations.

use rand::Rng;

use super::collision::overlaps;
use super::formation::{column_shooters, update_formation};
use super::mode::Mode;
use super::state::{Cue, GameEvent, GameState, Player, spawn_formation};
use crate::consts::*;

/// Logical commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Fire request (reload and the projectile cap still apply)
    pub fire: bool,
    /// Pause toggle (already debounced by the input layer)
    pub pause: bool,
    /// Start a new run; ignored unless the run has finished
    pub restart: bool,
    /// Attract mode - the autopilot flies the ship
    pub idle_mode: bool,
}

/// Advance the game by one frame
///
/// `elapsed_ms` is wall time since the previous frame and only feeds the
/// formation timer; every other countdown is in frames.
pub fn tick(state: &mut GameState, input: &TickInput, elapsed_ms: f32) {
    // Handle pause toggle
    if input.pause {
        match state.mode.current() {
            Mode::Playing => {
                state.set_mode(Mode::Paused);
                return;
            }
            Mode::Paused => state.set_mode(Mode::Playing),
            _ => {}
        }
    }

    if input.restart && state.mode.is_finished() {
        state.restart();
        return;
    }

    // Nothing runs outside of Playing
    if !state.mode.is_playing() {
        return;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }

    step(state, &input, elapsed_ms);
}

/// One Playing frame
fn step(state: &mut GameState, input: &TickInput, elapsed_ms: f32) {
    apply_input(state, input);
    state.player.update();
    update_bonus(state);
    update_formation(state, elapsed_ms);
    resolve_player_shots(state);
    resolve_enemy_shots(state);

    // A fatal hit above already ended the run
    if state.mode.is_playing() {
        evaluate_end_conditions(state);
    }

    state.session.frame_count += 1;
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    let speed = state.tuning.player_speed;
    if input.move_left {
        state.player.move_by(-speed);
    }
    if input.move_right {
        state.player.move_by(speed);
    }

    if input.fire
        && state.player.can_fire()
        && state.player_shots.active_len() < state.tuning.max_player_projectiles
    {
        let muzzle = state.player.muzzle();
        let handle = state.player_shots.acquire();
        state
            .player_shots
            .get_mut(handle)
            .launch(muzzle, state.tuning.player_projectile_speed);
        state.player.reload = state.tuning.reload_frames;
        state.events.push(GameEvent::Play {
            cue: Cue::Shoot,
            restart: true,
        });
    }
}

fn update_bonus(state: &mut GameState) {
    if !state.bonus.active {
        if state.rng.random::<f32>() < state.tuning.bonus_spawn_chance {
            state.bonus.activate();
            log::debug!("Bonus craft launched");
            state.events.push(GameEvent::Play {
                cue: Cue::BonusHum,
                restart: false,
            });
        }
        return;
    }

    if state.bonus.advance() {
        state.events.push(GameEvent::Stop { cue: Cue::BonusHum });
    } else {
        // Re-requested every frame; the audio layer ignores a running loop
        state.events.push(GameEvent::Play {
            cue: Cue::BonusHum,
            restart: false,
        });
    }
}

/// Player shots: move, then enemies, bonus craft and barriers in that order
fn resolve_player_shots(state: &mut GameState) {
    for n in (0..state.player_shots.active_len()).rev() {
        let Some(handle) = state.player_shots.active_handle(n) else {
            continue;
        };
        let shot = state.player_shots.get_mut(handle);
        shot.advance();
        if shot.is_off_field() {
            state.player_shots.release(handle);
            continue;
        }
        let rect = shot.rect;

        // First match in roster order wins
        if let Some(idx) = state.enemies.iter().position(|e| overlaps(&rect, &e.rect)) {
            let enemy = state.enemies.remove(idx);
            let points = enemy.points();
            state.session.award(points);
            state.events.push(GameEvent::Play {
                cue: Cue::InvaderKilled,
                restart: true,
            });
            state.events.push(GameEvent::EnemyDestroyed {
                tier: enemy.tier,
                points,
            });
            state.player_shots.release(handle);
            continue;
        }

        if state.bonus.active && overlaps(&rect, &state.bonus.rect) {
            let rewards = &state.tuning.bonus_rewards;
            let points = match rewards.len() {
                0 => 0,
                n => rewards[state.rng.random_range(0..n)],
            };
            state.session.award(points);
            state.bonus.active = false;
            state.events.push(GameEvent::Play {
                cue: Cue::Explosion,
                restart: true,
            });
            state.events.push(GameEvent::Stop { cue: Cue::BonusHum });
            state.events.push(GameEvent::BonusDestroyed { points });
            state.player_shots.release(handle);
            continue;
        }

        if state.barriers.iter_mut().any(|b| b.test_hit(&rect)) {
            state.player_shots.release(handle);
        }
    }
}

/// Enemy shots: move, then the ship and barriers
fn resolve_enemy_shots(state: &mut GameState) {
    for n in (0..state.enemy_shots.active_len()).rev() {
        let Some(handle) = state.enemy_shots.active_handle(n) else {
            continue;
        };
        let shot = state.enemy_shots.get_mut(handle);
        shot.advance();
        if shot.is_off_field() {
            state.enemy_shots.release(handle);
            continue;
        }
        let rect = shot.rect;

        if overlaps(&rect, &state.player.rect) {
            state.events.push(GameEvent::Play {
                cue: Cue::Explosion,
                restart: true,
            });
            if state
                .player
                .take_damage(state.tuning.damage_invincibility_frames)
            {
                state.events.push(GameEvent::PlayerHit {
                    health: state.player.health,
                });
            }
            state.enemy_shots.release(handle);

            if state.player.is_destroyed() {
                lose_life(state);
                // The field is cleared (or the run is over); nothing left to scan
                break;
            }
            continue;
        }

        if state.barriers.iter_mut().any(|b| b.test_hit(&rect)) {
            state.enemy_shots.release(handle);
        }
    }
}

fn lose_life(state: &mut GameState) {
    state.session.lives = state.session.lives.saturating_sub(1);
    state.events.push(GameEvent::LifeLost {
        lives: state.session.lives,
    });
    log::info!("Ship destroyed, {} lives left", state.session.lives);

    if state.session.lives == 0 {
        state.set_mode(Mode::GameOver);
        return;
    }

    let mut player = Player::default();
    player.make_invincible(state.tuning.respawn_invincibility_frames);
    state.player = player;
    state.enemy_shots.release_all();
}

fn evaluate_end_conditions(state: &mut GameState) {
    let danger_line = state.player.rect.top() - INVASION_MARGIN;
    if state.enemies.iter().any(|e| e.rect.bottom() >= danger_line) {
        log::info!("Formation reached the ship");
        state.set_mode(Mode::GameOver);
        return;
    }

    if state.enemies.is_empty() {
        advance_level(state);
        return;
    }

    if state.session.lives == 0 {
        state.set_mode(Mode::GameOver);
    }
}

/// Next level: faster, shorter interval, fresh formation, clear bonus
fn advance_level(state: &mut GameState) {
    let session = &mut state.session;
    session.level += 1;
    let level = session.level;

    state.formation.speed_multiplier += state.tuning.speed_increment_per_level;
    state.formation.move_interval_ms = state.tuning.move_interval_for_level(level);
    state.enemies = spawn_formation();

    let bonus = level as u64 * state.tuning.level_clear_bonus;
    state.session.award(bonus);
    state.events.push(GameEvent::LevelCleared { level, bonus });
    log::info!(
        "Level {} (speed x{:.1}, interval {}ms)",
        level,
        state.formation.speed_multiplier,
        state.formation.move_interval_ms
    );
}

/// Attract-mode pilot: dodge shots overhead, otherwise line up under the
/// nearest column-bottom enemy and fire when aligned
fn autopilot(state: &GameState, input: &mut TickInput) {
    let ship = &state.player.rect;
    let ship_x = ship.center_x();

    input.move_left = false;
    input.move_right = false;
    input.fire = false;

    // Nearest incoming shot above the ship and inside its lane
    let threat = state
        .enemy_shots
        .active()
        .filter(|s| s.rect.bottom() < ship.top() && ship.top() - s.rect.bottom() < 120.0)
        .filter(|s| s.rect.right() > ship.left() - 10.0 && s.rect.left() < ship.right() + 10.0)
        .map(|s| s.rect.center_x())
        .next();

    if let Some(shot_x) = threat {
        let flee_left = if ship.left() < PLAYER_WIDTH {
            false
        } else if ship.right() > FIELD_WIDTH - PLAYER_WIDTH {
            true
        } else {
            shot_x >= ship_x
        };
        input.move_left = flee_left;
        input.move_right = !flee_left;
        return;
    }

    let target = column_shooters(&state.enemies)
        .into_iter()
        .map(|i| state.enemies[i].rect.center_x())
        .min_by(|a, b| {
            (a - ship_x)
                .abs()
                .partial_cmp(&(b - ship_x).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(x) = target {
        let dx = x - ship_x;
        if dx.abs() > state.tuning.player_speed {
            input.move_left = dx < 0.0;
            input.move_right = dx > 0.0;
        }
        input.fire = dx.abs() < ENEMY_WIDTH / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Enemy;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn fire() -> TickInput {
        TickInput {
            fire: true,
            ..Default::default()
        }
    }

    /// A game with nothing random going on
    fn quiet_state(seed: u64) -> GameState {
        let mut tuning = Tuning::default();
        tuning.base_fire_chance = 0.0;
        tuning.fire_chance_per_level = 0.0;
        tuning.bonus_spawn_chance = 0.0;
        GameState::with_tuning(seed, tuning)
    }

    fn place_enemy_shot(state: &mut GameState, x: f32, y: f32) {
        let h = state.enemy_shots.acquire();
        let shot = state.enemy_shots.get_mut(h);
        shot.launch(Vec2::new(x, y), 5.0);
    }

    #[test]
    fn test_fire_respects_reload() {
        let mut state = quiet_state(1);
        tick(&mut state, &fire(), 16.0);
        assert_eq!(state.player_shots.active_len(), 1);
        assert!(
            state
                .events
                .contains(&GameEvent::Play { cue: Cue::Shoot, restart: true })
        );

        tick(&mut state, &fire(), 16.0);
        assert_eq!(state.player_shots.active_len(), 1);
    }

    #[test]
    fn test_fire_respects_cap() {
        let mut tuning = Tuning::default();
        tuning.reload_frames = 0;
        tuning.max_player_projectiles = 2;
        tuning.base_fire_chance = 0.0;
        tuning.fire_chance_per_level = 0.0;
        let mut state = GameState::with_tuning(1, tuning);
        for _ in 0..5 {
            tick(&mut state, &fire(), 16.0);
        }
        assert_eq!(state.player_shots.active_len(), 2);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = quiet_state(2);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, 16.0);
        assert_eq!(state.mode.current(), Mode::Paused);

        let frames = state.session.frame_count;
        let x = state.enemies[0].rect.pos.x;
        for _ in 0..50 {
            tick(&mut state, &TickInput::default(), 100.0);
        }
        assert_eq!(state.session.frame_count, frames);
        assert_eq!(state.enemies[0].rect.pos.x, x);

        tick(&mut state, &pause, 16.0);
        assert_eq!(state.mode.current(), Mode::Playing);
        assert_eq!(state.session.frame_count, frames + 1);
    }

    #[test]
    fn test_restart_only_when_finished() {
        let mut state = quiet_state(3);
        state.session.score = 40;
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, 16.0);
        assert_eq!(state.session.score, 40);

        state.set_mode(Mode::GameOver);
        tick(&mut state, &restart, 16.0);
        assert_eq!(state.mode.current(), Mode::Playing);
        assert_eq!(state.session.score, 0);
    }

    #[test]
    fn test_shot_kills_first_enemy_in_roster_order() {
        let mut state = quiet_state(4);
        // Two enemies stacked on the same spot
        state.enemies = vec![Enemy::new(200.0, 300.0, 1), Enemy::new(200.0, 300.0, 3)];
        let h = state.player_shots.acquire();
        state
            .player_shots
            .get_mut(h)
            .launch(Vec2::new(220.0, 320.0), 8.0);

        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].tier, 3);
        assert_eq!(state.session.score, 10);
        assert_eq!(state.player_shots.active_len(), 0);
    }

    #[test]
    fn test_shot_hits_bonus() {
        let mut state = quiet_state(5);
        state.bonus.activate();
        state.bonus.rect.pos.x = 300.0;
        let h = state.player_shots.acquire();
        state
            .player_shots
            .get_mut(h)
            .launch(Vec2::new(332.0, BONUS_Y + 20.0), 8.0);

        tick(&mut state, &TickInput::default(), 0.0);
        assert!(!state.bonus.active);
        assert!(state.tuning.bonus_rewards.contains(&state.session.score));
        assert!(state.events.contains(&GameEvent::Stop { cue: Cue::BonusHum }));
    }

    fn hum_requests(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::Play { cue: Cue::BonusHum, .. }))
            .count()
    }

    #[test]
    fn test_bonus_hum_requested_every_active_frame() {
        let mut tuning = Tuning::default();
        tuning.base_fire_chance = 0.0;
        tuning.fire_chance_per_level = 0.0;
        tuning.bonus_spawn_chance = 1.0;
        let mut state = GameState::with_tuning(11, tuning);

        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), 0.0);
            let events = state.drain_events();
            assert!(state.bonus.active);
            assert_eq!(hum_requests(&events), 1);
        }
    }

    #[test]
    fn test_bonus_hum_stops_on_exit_frame() {
        let mut state = quiet_state(12);
        state.bonus.activate();
        state.bonus.rect.pos.x = FIELD_WIDTH - state.bonus.speed / 2.0;
        state.drain_events();

        tick(&mut state, &TickInput::default(), 0.0);
        let events = state.drain_events();
        assert!(!state.bonus.active);
        assert!(events.contains(&GameEvent::Stop { cue: Cue::BonusHum }));
        assert_eq!(hum_requests(&events), 0);

        // Gone for good until the next launch
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(hum_requests(&state.drain_events()), 0);
    }

    #[test]
    fn test_shot_chips_barrier() {
        let mut state = quiet_state(6);
        let barrier = &state.barriers[0];
        let target = barrier.segments[10].rect;
        let h = state.player_shots.acquire();
        state
            .player_shots
            .get_mut(h)
            .launch(Vec2::new(target.center_x(), target.top() + 8.0), 8.0);

        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.player_shots.active_len(), 0);
        assert!(
            state.barriers[0]
                .segments
                .iter()
                .any(|s| s.integrity < SEGMENT_INTEGRITY)
        );
    }

    #[test]
    fn test_enemy_shot_damages_player() {
        let mut state = quiet_state(7);
        let p = state.player.rect;
        place_enemy_shot(&mut state, p.center_x(), p.top());

        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH - 1);
        assert!(state.player.invincible);
        assert_eq!(state.enemy_shots.active_len(), 0);
    }

    #[test]
    fn test_death_respawns_and_clears_enemy_fire() {
        let mut state = quiet_state(8);
        state.player.health = 1;
        let p = state.player.rect;
        place_enemy_shot(&mut state, p.center_x(), p.top());
        place_enemy_shot(&mut state, 50.0, 100.0);
        place_enemy_shot(&mut state, 700.0, 200.0);

        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.session.lives, 2);
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH);
        assert!(state.player.invincible);
        assert_eq!(state.player.invincible_ticks, 180);
        assert_eq!(state.enemy_shots.active_len(), 0);
        assert_eq!(state.mode.current(), Mode::Playing);
    }

    #[test]
    fn test_invasion_ends_run() {
        let mut state = quiet_state(9);
        state.session.lives = 3;
        let line = state.player.rect.top() - INVASION_MARGIN;
        state.enemies = vec![Enemy::new(300.0, line - ENEMY_HEIGHT, 1)];

        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.mode.current(), Mode::GameOver);
    }

    #[test]
    fn test_level_clear() {
        let mut state = quiet_state(10);
        state.enemies.clear();
        let speed = state.formation.speed_multiplier;

        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.session.level, 2);
        assert_eq!(state.session.score, 200);
        assert_eq!(state.enemies.len(), ENEMY_ROWS * ENEMY_COLS);
        assert!((state.formation.speed_multiplier - (speed + 0.2)).abs() < 1e-6);
        assert_eq!(state.formation.move_interval_ms, 54.0);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99999);
        let mut b = GameState::new(99999);
        let inputs = [
            TickInput { fire: true, ..Default::default() },
            TickInput { move_left: true, fire: true, ..Default::default() },
            TickInput { move_right: true, ..Default::default() },
            TickInput::default(),
        ];
        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input, 16.0);
            tick(&mut b, input, 16.0);
        }
        assert_eq!(a.session.score, b.session.score);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.player.rect, b.player.rect);
        assert_eq!(a.enemy_shots.active_len(), b.enemy_shots.active_len());
    }

    #[test]
    fn test_autopilot_scores() {
        let mut state = GameState::new(4242);
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..2000 {
            tick(&mut state, &idle, 16.0);
        }
        assert!(state.session.score > 0);
    }
}
