//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Seeded RNG only
//! - Stable iteration order (insertion order of entities)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod phase;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{HitResolution, Rect, resolve_hit};
pub use spawner::{SpawnBlocked, can_spawn, place_opening_gift, random_gift, spawn_gift};
pub use state::{
    Avatar, ComboState, Facing, FallingGift, GameEvent, GameState, GiftColor, GiftState,
    Projectile, ScorePopup, SessionPhase, SessionSummary, TrailPoint, Viewport,
};
pub use tick::{MoveIntent, TickInput, fire, move_avatar, step};
