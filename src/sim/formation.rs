//! Formation choreography
//!
//! Enemies move as one timed block: every move interval the whole formation
//! either steps sideways or, if any member is at the edge, drops and reverses.
//! Only the bottom enemy of each column may fire.

use rand::Rng;

use super::state::{Cue, Enemy, FormationState, GameEvent, GameState};
use crate::consts::*;

/// True if any enemy sits within the edge margin in the travel direction
pub fn edge_reached(enemies: &[Enemy], direction: f32) -> bool {
    enemies.iter().any(|e| {
        (direction > 0.0 && e.rect.right() >= FIELD_WIDTH - FORMATION_EDGE_MARGIN)
            || (direction < 0.0 && e.rect.left() <= FORMATION_EDGE_MARGIN)
    })
}

/// Move the whole formation one step
///
/// Returns true if the formation dropped and reversed instead of stepping
/// sideways.
pub fn march(enemies: &mut [Enemy], formation: &mut FormationState) -> bool {
    if edge_reached(enemies, formation.direction) {
        formation.direction = -formation.direction;
        for enemy in enemies.iter_mut() {
            enemy.rect.pos.y += FORMATION_DROP;
        }
        true
    } else {
        let dx = FORMATION_STEP * formation.direction * formation.speed_multiplier;
        for enemy in enemies.iter_mut() {
            enemy.rect.pos.x += dx;
        }
        false
    }
}

/// Indices of the bottom-most enemy of every column
///
/// Enemies share a column when their x positions differ by less than
/// `COLUMN_TOLERANCE`. Ties on y go to the later roster entry.
pub fn column_shooters(enemies: &[Enemy]) -> Vec<usize> {
    enemies
        .iter()
        .enumerate()
        .filter(|&(i, e)| {
            !enemies.iter().enumerate().any(|(j, other)| {
                j != i
                    && (other.rect.pos.x - e.rect.pos.x).abs() < COLUMN_TOLERANCE
                    && (other.rect.pos.y > e.rect.pos.y
                        || (other.rect.pos.y == e.rect.pos.y && j > i))
            })
        })
        .map(|(i, _)| i)
        .collect()
}

/// Advance the formation timer and, when it expires, step the block and
/// maybe fire
pub fn update_formation(state: &mut GameState, elapsed_ms: f32) {
    let formation = &mut state.formation;
    formation.move_timer_ms += elapsed_ms;
    if formation.move_timer_ms < formation.move_interval_ms {
        return;
    }
    formation.move_timer_ms = 0.0;

    if !state.enemies.is_empty() {
        let footstep = ((state.session.frame_count / 10) % 4) as u8 + 1;
        state.events.push(GameEvent::Play {
            cue: Cue::March(footstep),
            restart: true,
        });
    }

    if march(&mut state.enemies, &mut state.formation) {
        log::debug!(
            "Formation reversed, now heading {}",
            if state.formation.direction > 0.0 { "right" } else { "left" }
        );
    }
    state.formation.anim_toggle = !state.formation.anim_toggle;

    if state.enemies.is_empty() {
        return;
    }
    let chance = state.tuning.fire_chance_for_level(state.session.level);
    if state.rng.random::<f32>() >= chance {
        return;
    }

    let shooters = column_shooters(&state.enemies);
    if shooters.is_empty() {
        return;
    }
    let pick = shooters[state.rng.random_range(0..shooters.len())];
    let shooter = &state.enemies[pick];
    let muzzle = glam::Vec2::new(shooter.rect.center_x(), shooter.rect.bottom());

    let handle = state.enemy_shots.acquire();
    state
        .enemy_shots
        .get_mut(handle)
        .launch(muzzle, state.tuning.enemy_projectile_speed);
}
