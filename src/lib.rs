//! Vibe Flap - a side-scrolling "flappy" arcade core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, scoring)
//! - `audio`: Procedural music with a lookahead scheduler and additive layers
//! - `game`: Context object tying the simulation, music and best score together
//! - `snapshot`: Read-only view handed to the presentation layer
//! - `tuning`: Data-driven game balance
//! - `settings`: Player audio preferences

pub mod audio;
pub mod best_score;
pub mod game;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use best_score::BestScore;
pub use game::Game;
pub use settings::Settings;
pub use snapshot::Snapshot;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest wall-clock gap fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default viewport (portrait phone-ish canvas)
    pub const VIEW_WIDTH: f32 = 480.0;
    pub const VIEW_HEIGHT: f32 = 800.0;

    /// Player physics, per frame
    pub const GRAVITY: f32 = 0.25;
    pub const JUMP_VELOCITY: f32 = -6.0;
    pub const PLAYER_X: f32 = 80.0;
    pub const PLAYER_RADIUS: f32 = 40.0;
    /// Forgiving hitbox, relative to the drawn radius
    pub const HITBOX_SCALE: f32 = 0.6;

    /// Obstacles
    pub const SPAWN_INTERVAL: u64 = 160;
    pub const OBSTACLE_WIDTH: f32 = 80.0;
    pub const OBSTACLE_GAP: f32 = 240.0;
    /// Minimum distance between the gap and the top edge
    pub const GAP_TOP_MARGIN: f32 = 50.0;
    /// Top plus bottom margin kept clear around the gap
    pub const GAP_TOTAL_MARGIN: f32 = 100.0;

    /// Power-ups ("cakes")
    pub const POWER_UP_CHANCE: f64 = 0.2;
    pub const POWER_UP_SIZE: f32 = 40.0;
    /// 5 seconds at 60 fps
    pub const POWER_UP_FRAMES: u32 = 300;
    pub const POWER_UP_CULL_X: f32 = -50.0;

    /// Difficulty
    pub const BASE_SPEED: f32 = 3.0;
    pub const SPEED_STEP: f32 = 0.2;
    pub const SPEED_UP_EVERY: u32 = 5;
    pub const WIN_SCORE: u32 = 100;

    /// Particles
    pub const BURST_PARTICLES: usize = 5;
    pub const TRAIL_INTERVAL: u64 = 15;
    pub const PARTICLE_DECAY: f32 = 0.02;
    pub const GLYPH_CHANGE_CHANCE: f64 = 0.1;

    /// Ignore restart input this long after a run ends
    pub const RESTART_COOLDOWN_MS: f64 = 500.0;
    /// Title clicks that flip the developer cheat
    pub const CHEAT_CLICKS: u32 = 5;

    /// Music
    pub const TEMPO_BPM: f64 = 120.0;
    pub const LOOKAHEAD_SECS: f64 = 0.1;
    /// Gain every envelope decays toward
    pub const ENVELOPE_FLOOR: f32 = 0.001;
}
