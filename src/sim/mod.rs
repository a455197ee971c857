//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed frame per tick
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{PipeHit, Rect, circle_circle_overlap, circle_rect_overlap, obstacle_hit};
pub use state::{
    DeathCause, GameEvent, GamePhase, GameState, Obstacle, Particle, Player, PowerUp, RunOutcome,
    BOTTOM_LABELS, DEATH_MESSAGES, FLOOR_DEATH_MESSAGE, PLAYER_GLYPHS, TOP_LABELS,
};
pub use tick::{TickInput, jump, tick};
