//! Data-driven game balance
//!
//! Defaults mirror `consts`; hosts may override individual fields from JSON.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Simulation knobs and viewport size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Playfield width (obstacles spawn at this x)
    pub width: f32,
    /// Playfield height (the floor)
    pub height: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub player_x: f32,
    pub player_radius: f32,
    pub hitbox_scale: f32,
    /// Frames between obstacle spawns
    pub spawn_interval: u64,
    pub obstacle_width: f32,
    pub obstacle_gap: f32,
    pub power_up_chance: f64,
    pub power_up_frames: u32,
    pub base_speed: f32,
    pub speed_step: f32,
    pub speed_up_every: u32,
    pub win_score: u32,
    pub trail_interval: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: VIEW_WIDTH,
            height: VIEW_HEIGHT,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            player_x: PLAYER_X,
            player_radius: PLAYER_RADIUS,
            hitbox_scale: HITBOX_SCALE,
            spawn_interval: SPAWN_INTERVAL,
            obstacle_width: OBSTACLE_WIDTH,
            obstacle_gap: OBSTACLE_GAP,
            power_up_chance: POWER_UP_CHANCE,
            power_up_frames: POWER_UP_FRAMES,
            base_speed: BASE_SPEED,
            speed_step: SPEED_STEP,
            speed_up_every: SPEED_UP_EVERY,
            win_score: WIN_SCORE,
            trail_interval: TRAIL_INTERVAL,
        }
    }
}

impl Tuning {
    /// Default balance on a viewport of the given size
    pub fn with_viewport(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Parse overrides; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(tuning) => Some(tuning),
            Err(e) => {
                log::warn!("Ignoring invalid tuning: {}", e);
                None
            }
        }
    }

    /// Collision radius used against obstacles
    #[inline]
    pub fn hitbox_radius(&self) -> f32 {
        self.player_radius * self.hitbox_scale
    }

    /// Vertical range the top of the gap is sampled from
    pub fn gap_top_range(&self) -> (f32, f32) {
        let span = (self.height - self.obstacle_gap - GAP_TOTAL_MARGIN).max(0.0);
        (GAP_TOP_MARGIN, GAP_TOP_MARGIN + span)
    }

    /// Scroll speed for a given score
    pub fn speed_for_score(&self, score: u32) -> f32 {
        let steps = score.checked_div(self.speed_up_every).unwrap_or(0);
        self.base_speed + steps as f32 * self.speed_step
    }

    /// Ticks a player released from rest at mid-screen needs to touch the floor.
    /// `None` when gravity never pulls the player down.
    pub fn free_fall_ticks(&self) -> Option<u64> {
        if self.gravity.is_nan() || self.gravity <= 0.0 {
            return None;
        }
        let drop = self.height / 2.0 - self.player_radius;
        let mut y = 0.0f32;
        let mut vel = 0.0f32;
        let mut ticks = 0;
        while y < drop {
            vel += self.gravity;
            y += vel;
            ticks += 1;
        }
        Some(ticks)
    }
}
