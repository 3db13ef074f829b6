//! Game state and core simulation types
//!
//! The simulation owns everything here exclusively. Nothing holds a reference
//! back into the state; outcomes leave through the `events` queue.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::barrier::{Barrier, standard_barriers};
use super::mode::{Mode, ModeMachine};
use super::pool::ObjectPool;
use super::rect::Rect;
use crate::consts::*;
use crate::tuning::Tuning;

/// Sound identities the simulation can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    Shoot,
    Explosion,
    InvaderKilled,
    /// Looped while the bonus craft is on screen
    BonusHum,
    /// Formation footstep, 1..=4
    March(u8),
}

impl Cue {
    pub fn is_looped(&self) -> bool {
        matches!(self, Cue::BonusHum)
    }
}

/// Side-effect intents and notable outcomes of a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Start a sound; `restart` rewinds it if already playing
    Play { cue: Cue, restart: bool },
    Stop { cue: Cue },
    ModeChanged { from: Mode, to: Mode },
    EnemyDestroyed { tier: u8, points: u64 },
    BonusDestroyed { points: u64 },
    PlayerHit { health: u8 },
    LifeLost { lives: u8 },
    LevelCleared { level: u32, bonus: u64 },
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    pub health: u8,
    pub max_health: u8,
    /// Frames until the next shot is accepted
    pub reload: u32,
    pub invincible: bool,
    /// Frames of invincibility left
    pub invincible_ticks: u32,
    /// Advances while invincible; drives the blink
    pub blink: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y)
    }
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            rect: Rect::new(x, y, PLAYER_WIDTH, PLAYER_HEIGHT),
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            reload: 0,
            invincible: false,
            invincible_ticks: 0,
            blink: 0,
        }
    }

    /// Move horizontally, clamped to the playfield
    pub fn move_by(&mut self, dx: f32) {
        let max_x = FIELD_WIDTH - self.rect.size.x;
        self.rect.pos.x = (self.rect.pos.x + dx).clamp(0.0, max_x);
    }

    /// Per-frame countdowns
    pub fn update(&mut self) {
        self.reload = self.reload.saturating_sub(1);

        if self.invincible {
            self.invincible_ticks = self.invincible_ticks.saturating_sub(1);
            self.blink += 1;
            if self.invincible_ticks == 0 {
                self.invincible = false;
                self.blink = 0;
            }
        }
    }

    /// Start an invincibility window of `frames`
    pub fn make_invincible(&mut self, frames: u32) {
        self.invincible = frames > 0;
        self.invincible_ticks = frames;
        self.blink = 0;
    }

    /// Lose one health point unless invincible
    ///
    /// Returns false (and changes nothing) while invincible. A landed hit
    /// opens a fresh invincibility window of `window` frames.
    pub fn take_damage(&mut self, window: u32) -> bool {
        if self.invincible {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        self.make_invincible(window);
        true
    }

    pub fn is_destroyed(&self) -> bool {
        self.health == 0
    }

    pub fn can_fire(&self) -> bool {
        self.reload == 0
    }

    /// Top-center of the ship, where shots leave
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.rect.center_x(), self.rect.top())
    }

    /// Blink phase: hidden for half of every 10-frame cycle while invincible
    pub fn is_visible(&self) -> bool {
        !self.invincible || self.blink % 10 < 5
    }
}

/// A formation member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub rect: Rect,
    /// Point class, 1..=3
    pub tier: u8,
}

impl Enemy {
    pub fn new(x: f32, y: f32, tier: u8) -> Self {
        Self {
            rect: Rect::new(x, y, ENEMY_WIDTH, ENEMY_HEIGHT),
            tier: tier.clamp(1, 3),
        }
    }

    pub fn points(&self) -> u64 {
        self.tier as u64 * 10
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Player,
    Enemy,
}

impl ProjectileKind {
    /// Vertical direction sign: player shots go up, enemy shots come down
    pub fn direction(&self) -> f32 {
        match self {
            ProjectileKind::Player => -1.0,
            ProjectileKind::Enemy => 1.0,
        }
    }
}

/// A pooled shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub rect: Rect,
    pub kind: ProjectileKind,
    /// Speed magnitude (px/frame); direction comes from `kind`
    pub speed: f32,
    pub active: bool,
}

impl Projectile {
    fn inert(kind: ProjectileKind, speed: f32) -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
            kind,
            speed,
            active: false,
        }
    }

    /// Pool factory for player shots
    pub fn inert_player() -> Self {
        Self::inert(ProjectileKind::Player, 8.0)
    }

    /// Pool factory for enemy shots
    pub fn inert_enemy() -> Self {
        Self::inert(ProjectileKind::Enemy, 5.0)
    }

    /// Pool reset routine
    pub fn reset(&mut self) {
        self.rect.pos = Vec2::ZERO;
        self.active = false;
    }

    /// Put the shot in play with its top-center at `muzzle`
    pub fn launch(&mut self, muzzle: Vec2, speed: f32) {
        self.rect.pos = Vec2::new(muzzle.x - self.rect.size.x / 2.0, muzzle.y);
        self.speed = speed;
        self.active = true;
    }

    pub fn advance(&mut self) {
        self.rect.pos.y += self.speed * self.kind.direction();
    }

    /// Past the top edge (player) or the bottom edge (enemy)
    pub fn is_off_field(&self) -> bool {
        match self.kind {
            ProjectileKind::Player => self.rect.top() < 0.0,
            ProjectileKind::Enemy => self.rect.top() > FIELD_HEIGHT,
        }
    }
}

/// The occasional high-value target crossing the top of the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusCraft {
    pub rect: Rect,
    pub active: bool,
    /// Horizontal speed (px/frame)
    pub speed: f32,
}

impl BonusCraft {
    pub fn new(speed: f32) -> Self {
        Self {
            rect: Rect::new(-BONUS_WIDTH, BONUS_Y, BONUS_WIDTH, BONUS_HEIGHT),
            active: false,
            speed,
        }
    }

    /// Enter from just past the left edge
    pub fn activate(&mut self) {
        self.rect.pos.x = -self.rect.size.x;
        self.active = true;
    }

    /// Move right; returns true on the frame it leaves the field
    pub fn advance(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.rect.pos.x += self.speed;
        if self.rect.left() > FIELD_WIDTH {
            self.active = false;
            return true;
        }
        false
    }
}

/// Shared state of the marching block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationState {
    /// +1 right, -1 left
    pub direction: f32,
    /// Horizontal step multiplier, grows per level
    pub speed_multiplier: f32,
    /// Accumulated ms since the last step
    pub move_timer_ms: f32,
    /// ms between steps
    pub move_interval_ms: f32,
    /// Animation phase, flipped on every step (rendering only)
    pub anim_toggle: bool,
}

impl FormationState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            direction: 1.0,
            speed_multiplier: tuning.starting_speed_multiplier,
            move_timer_ms: 0.0,
            move_interval_ms: tuning.base_move_interval_ms,
            anim_toggle: false,
        }
    }
}

/// Score, lives and difficulty level of the current run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    pub lives: u8,
    pub level: u32,
    /// Simulation frames since the run started
    pub frame_count: u64,
}

impl SessionState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            lives: tuning.starting_lives,
            level: 1,
            frame_count: 0,
        }
    }

    pub fn award(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }
}

/// Build the full formation
///
/// Layout is the same every level; difficulty comes from formation speed,
/// interval and fire chance.
pub fn spawn_formation() -> Vec<Enemy> {
    let mut enemies = Vec::with_capacity(ENEMY_ROWS * ENEMY_COLS);
    for row in 0..ENEMY_ROWS {
        let tier = match row {
            0 => 3,
            1 | 2 => 2,
            _ => 1,
        };
        for col in 0..ENEMY_COLS {
            enemies.push(Enemy::new(
                FORMATION_ORIGIN_X + col as f32 * ENEMY_SPACING_X,
                FORMATION_ORIGIN_Y + row as f32 * ENEMY_SPACING_Y,
                tier,
            ));
        }
    }
    enemies
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed
    pub seed: u64,
    pub tuning: Tuning,
    pub mode: ModeMachine,
    pub session: SessionState,
    pub formation: FormationState,
    pub player: Player,
    /// Formation roster; order is the collision tie-break
    pub enemies: Vec<Enemy>,
    pub barriers: Vec<Barrier>,
    pub bonus: BonusCraft,
    pub player_shots: ObjectPool<Projectile>,
    pub enemy_shots: ObjectPool<Projectile>,
    pub rng: Pcg32,
    /// Outcomes of the last ticks, drained by the host
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a new game; initialization goes straight to Playing
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            session: SessionState::new(&tuning),
            formation: FormationState::new(&tuning),
            player: Player::default(),
            enemies: spawn_formation(),
            barriers: standard_barriers(),
            bonus: BonusCraft::new(tuning.bonus_speed),
            player_shots: ObjectPool::new(
                Projectile::inert_player,
                Projectile::reset,
                tuning.max_player_projectiles,
            ),
            enemy_shots: ObjectPool::new(
                Projectile::inert_enemy,
                Projectile::reset,
                tuning.enemy_projectile_prewarm,
            ),
            rng: Pcg32::seed_from_u64(seed),
            mode: ModeMachine::default(),
            tuning,
            events: Vec::new(),
        };
        state.set_mode(Mode::Playing);
        state
    }

    /// Reinitialize session, formation and entities for a new run
    ///
    /// Pools are kept (released, not reallocated) and the RNG keeps its stream.
    pub fn restart(&mut self) {
        self.player_shots.release_all();
        self.enemy_shots.release_all();
        if self.bonus.active {
            self.events.push(GameEvent::Stop { cue: Cue::BonusHum });
        }

        self.session = SessionState::new(&self.tuning);
        self.formation = FormationState::new(&self.tuning);
        self.player = Player::default();
        self.enemies = spawn_formation();
        self.barriers = standard_barriers();
        self.bonus = BonusCraft::new(self.tuning.bonus_speed);

        log::info!("Game restarted (seed {})", self.seed);
        self.set_mode(Mode::Playing);
    }

    /// Change mode and report it
    pub fn set_mode(&mut self, next: Mode) {
        let from = self.mode.set(next);
        self.events.push(GameEvent::ModeChanged { from, to: next });
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Live objects, for diagnostics
    pub fn object_count(&self) -> usize {
        self.player_shots.active_len() + self.enemy_shots.active_len() + self.enemies.len()
    }
}
