//! Read-only view of the game for the presentation layer
//!
//! A renderer never touches `GameState`; it gets one of these per frame.
//! Serializes to JSON for hosts that draw outside Rust.

use glam::Vec2;
use serde::Serialize;

use crate::sim::{GamePhase, GameState, Obstacle, PLAYER_GLYPHS, Particle, PowerUp, RunOutcome};

/// Grid cell size of the scrolling background
pub const GRID_SIZE: u64 = 50;

/// Glyph shown while the developer cheat is on
pub const DEV_MODE_GLYPH: &str = "😎";
/// Glyph shown while a power-up is running
pub const POWER_UP_GLYPH: &str = "🦄";

/// Glow drawn around the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Aura {
    None,
    DevMode,
    /// Rainbow glow cycling through `hue` (degrees)
    PowerUp { hue: u32, frames_left: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub velocity: f32,
    pub radius: f32,
    /// Radians, nose-down positive
    pub tilt: f32,
    pub glyph: &'static str,
    pub aura: Aura,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub frames: u64,
    pub score: u32,
    pub best_score: u32,
    pub speed: f32,
    pub outcome: Option<RunOutcome>,
    pub player: PlayerView,
    pub obstacles: Vec<Obstacle>,
    /// Uncollected only
    pub power_ups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    /// Horizontal offset of the background grid
    pub grid_offset: u64,
    /// Music could not be started on this device
    pub audio_unavailable: bool,
}

impl Snapshot {
    pub fn capture(state: &GameState, audio_unavailable: bool) -> Self {
        let aura = if state.dev_invincible {
            Aura::DevMode
        } else if state.power_up_frames > 0 {
            Aura::PowerUp {
                hue: ((state.frames * 5) % 360) as u32,
                frames_left: state.power_up_frames,
            }
        } else {
            Aura::None
        };

        let glyph = match aura {
            Aura::DevMode => DEV_MODE_GLYPH,
            Aura::PowerUp { .. } => POWER_UP_GLYPH,
            Aura::None => PLAYER_GLYPHS[state.player.glyph % PLAYER_GLYPHS.len()],
        };

        Self {
            phase: state.phase,
            frames: state.frames,
            score: state.score,
            best_score: state.best_score,
            speed: state.speed,
            outcome: state.outcome.clone(),
            player: PlayerView {
                pos: state.player.pos,
                velocity: state.player.vel,
                radius: state.player.radius,
                tilt: state.player.tilt(),
                glyph,
                aura,
            },
            obstacles: state.obstacles.clone(),
            power_ups: state.power_ups.iter().filter(|c| !c.collected).cloned().collect(),
            particles: state.particles.clone(),
            grid_offset: state.frames % GRID_SIZE,
            audio_unavailable,
        }
    }

    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self)
            .map_err(|e| log::warn!("Failed to serialize snapshot: {}", e))
            .ok()
    }
}
