//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of side effects:
//! - Seeded RNG only
//! - Stable iteration order (roster order for enemies, handle order for shots)
//! - No rendering, audio or platform dependencies; those are requested
//!   through `GameEvent`s

pub mod barrier;
pub mod collision;
pub mod formation;
pub mod mode;
pub mod pool;
pub mod rect;
pub mod state;
pub mod tick;

pub use barrier::{Barrier, Segment, segment_tint, standard_barriers};
pub use collision::{overlaps, overlaps_with_tolerance};
pub use formation::{column_shooters, edge_reached, march, update_formation};
pub use mode::{Mode, ModeMachine};
pub use pool::{ObjectPool, PoolHandle};
pub use rect::Rect;
pub use state::{
    BonusCraft, Cue, Enemy, FormationState, GameEvent, GameState, Player, Projectile,
    ProjectileKind, SessionState, spawn_formation,
};
pub use tick::{TickInput, tick};
