//! Game state and core simulation types
//!
//! Everything a run owns lives in `GameState`; nothing is global.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collision::{PipeHit, Rect};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Title screen, waiting for the first input
    Start,
    /// Active gameplay
    Playing,
    /// Run ended (crash or win), waiting for restart
    GameOver,
}

/// Player glyphs; jumping occasionally swaps between them
pub const PLAYER_GLYPHS: [&str; 5] = ["🧑‍💻", "👩‍💻", "👨‍💻", "🤓", "🥲"];

/// Labels painted on the upper half of an obstacle
pub const TOP_LABELS: [&str; 4] = ["LEGACY", "TECH DEBT", "SPAGHETTI", "ANY TYPE"];
/// Labels painted on the lower half of an obstacle
pub const BOTTOM_LABELS: [&str; 4] = ["DEADLINE", "MEETING", "BUGS", "REFACTOR"];

/// Shown when the player hits the floor
pub const FLOOR_DEATH_MESSAGE: &str = "Hit rock bottom (burnout)";

/// One of these is shown when the player hits an obstacle
pub const DEATH_MESSAGES: [&str; 10] = [
    "Error: undefined is not a function",
    "Senior dev rejected your PR",
    "Merge conflict in production",
    "Stack Overflow is down",
    "npm audit found 99 vulnerabilities",
    "Forgot to await an async function",
    "CSS refuses to center",
    "ChatGPT is at capacity",
    "Layoffs hit the vibe coding department",
    "Your free trial has ended",
];

/// The player ("vibe coder")
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub pos: Vec2,
    /// Vertical velocity (pixels/frame, positive is down)
    pub vel: f32,
    pub radius: f32,
    /// Index into `PLAYER_GLYPHS`
    pub glyph: usize,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.player_x, tuning.height / 2.0),
            vel: 0.0,
            radius: tuning.player_radius,
            glyph: 0,
        }
    }

    /// Lower edge of the drawn player
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }

    /// Upper edge of the drawn player
    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.radius
    }

    /// Visual lean based on vertical velocity (radians)
    pub fn tilt(&self) -> f32 {
        use std::f32::consts::FRAC_PI_4;
        (self.vel * 0.1).clamp(-FRAC_PI_4, FRAC_PI_4)
    }
}

/// A pair of pipes with a gap between them
#[derive(Debug, Clone, Serialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge
    pub x: f32,
    pub width: f32,
    /// Height of the top pipe; the gap starts here
    pub top_height: f32,
    pub gap: f32,
    /// Already scored
    pub passed: bool,
    pub label_top: &'static str,
    pub label_bottom: &'static str,
}

impl Obstacle {
    /// Spawn at the right edge with a random gap position
    pub fn spawn(id: u32, tuning: &Tuning, rng: &mut Pcg32) -> Self {
        let (lo, hi) = tuning.gap_top_range();
        let top_height = lo + rng.random::<f32>() * (hi - lo);
        Self {
            id,
            x: tuning.width,
            width: tuning.obstacle_width,
            top_height,
            gap: tuning.obstacle_gap,
            passed: false,
            label_top: TOP_LABELS[rng.random_range(0..TOP_LABELS.len())],
            label_bottom: BOTTOM_LABELS[rng.random_range(0..BOTTOM_LABELS.len())],
        }
    }

    #[inline]
    pub fn right_edge(&self) -> f32 {
        self.x + self.width
    }

    /// Where the gap ends and the bottom pipe begins
    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.top_height + self.gap
    }

    #[inline]
    pub fn gap_center(&self) -> f32 {
        self.top_height + self.gap / 2.0
    }

    /// Upper pipe, from the ceiling down to the gap
    pub fn top_rect(&self) -> Rect {
        Rect::new(Vec2::new(self.x, 0.0), Vec2::new(self.right_edge(), self.top_height))
    }

    /// Lower pipe, from the gap down to the floor
    pub fn bottom_rect(&self, floor: f32) -> Rect {
        Rect::new(
            Vec2::new(self.x, self.gap_bottom()),
            Vec2::new(self.right_edge(), floor.max(self.gap_bottom())),
        )
    }
}

/// A temporary-invincibility pickup ("cake")
#[derive(Debug, Clone, Serialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub collected: bool,
}

impl PowerUp {
    /// Centered in the obstacle's gap
    pub fn in_gap(id: u32, obstacle: &Obstacle) -> Self {
        Self {
            id,
            pos: Vec2::new(obstacle.x + obstacle.width / 2.0, obstacle.gap_center()),
            size: POWER_UP_SIZE,
            collected: false,
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Local drift on top of the world scroll
    pub drift: Vec2,
    pub size: f32,
    /// 0-1, decreases over time
    pub life: f32,
}

impl Particle {
    pub fn spawn(pos: Vec2, rng: &mut Pcg32) -> Self {
        Self {
            pos,
            drift: Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)),
            size: rng.random_range(10.0..20.0),
            life: 1.0,
        }
    }
}

/// Why a crashed run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeathCause {
    Floor,
    Obstacle { pipe: PipeHit },
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum RunOutcome {
    Crashed {
        cause: DeathCause,
        message: &'static str,
        score: u32,
    },
    Won {
        score: u32,
    },
}

impl RunOutcome {
    pub fn score(&self) -> u32 {
        match self {
            RunOutcome::Crashed { score, .. } | RunOutcome::Won { score } => *score,
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, RunOutcome::Won { .. })
    }
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    RunStarted,
    Jumped,
    ObstacleSpawned { id: u32, power_up: bool },
    PowerUpCollected { id: u32 },
    Scored { score: u32 },
    SpeedUp { speed: f32 },
    RunEnded { outcome: RunOutcome, new_best: bool },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Balance and viewport
    pub tuning: Tuning,
    /// Current phase
    pub phase: GamePhase,
    /// Simulation frame counter (reset each run)
    pub frames: u64,
    pub score: u32,
    pub best_score: u32,
    /// Global scroll speed (pixels/frame)
    pub speed: f32,
    pub player: Player,
    /// Active obstacles, oldest first
    pub obstacles: Vec<Obstacle>,
    pub power_ups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Developer cheat, survives restarts
    pub dev_invincible: bool,
    /// Remaining frames of power-up invincibility
    pub power_up_frames: u32,
    /// How the last run ended
    pub outcome: Option<RunOutcome>,
    /// Pending events for the host
    pub events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a new game state on the title screen
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            player: Player::new(&tuning),
            speed: tuning.base_speed,
            tuning,
            phase: GamePhase::Start,
            frames: 0,
            score: 0,
            best_score: 0,
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            dev_invincible: false,
            power_up_frames: 0,
            outcome: None,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Reset everything run-scoped and start playing
    pub fn init(&mut self) {
        self.phase = GamePhase::Playing;
        self.player = Player::new(&self.tuning);
        self.frames = 0;
        self.score = 0;
        self.speed = self.tuning.base_speed;
        self.power_up_frames = 0;
        self.outcome = None;
        self.clear_entities();
        self.events.push(GameEvent::RunStarted);
    }

    /// Either kind of invincibility is active
    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.dev_invincible || self.power_up_frames > 0
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Push a burst of particles at `pos`
    pub(crate) fn burst(&mut self, pos: Vec2) {
        for _ in 0..BURST_PARTICLES {
            let particle = Particle::spawn(pos, &mut self.rng);
            self.particles.push(particle);
        }
    }

    /// Commit the end of a run
    pub(crate) fn end_run(&mut self, outcome: RunOutcome) {
        let new_best = self.score > self.best_score;
        if new_best {
            self.best_score = self.score;
        }
        match &outcome {
            RunOutcome::Won { score } => log::info!("Run won with {} points", score),
            RunOutcome::Crashed { cause, message, score } => {
                log::info!("Run crashed ({:?}) with {} points: {}", cause, score, message)
            }
        }
        self.phase = GamePhase::GameOver;
        self.outcome = Some(outcome.clone());
        self.clear_entities();
        self.events.push(GameEvent::RunEnded { outcome, new_best });
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn clear_entities(&mut self) {
        self.obstacles.clear();
        self.power_ups.clear();
        self.particles.clear();
    }
}
