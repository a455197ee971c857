//! Fixed timestep simulation tick
//!
//! One call advances the run by exactly one frame. Stage order matters:
//! physics, spawning, scrolling, collision, pickups, scoring, then pruning.

use rand::Rng;

use super::collision::{PipeHit, circle_circle_overlap, obstacle_hit};
use super::state::{
    DEATH_MESSAGES, DeathCause, FLOOR_DEATH_MESSAGE, GameEvent, GamePhase, GameState, Obstacle,
    PLAYER_GLYPHS, Particle, PowerUp, RunOutcome,
};
use crate::consts::*;

/// Standing input modes for a tick (jumps are applied immediately via `jump`)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Idle/demo mode - the autopilot decides when to jump
    pub idle_mode: bool,
}

/// Apply the jump impulse (ignored unless playing)
pub fn jump(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.player.vel = state.tuning.jump_velocity;
    let pos = state.player.pos;
    state.burst(pos);

    // Shifting vibes
    if state.rng_mut().random_bool(GLYPH_CHANGE_CHANCE) {
        state.player.glyph = state.rng_mut().random_range(0..PLAYER_GLYPHS.len());
    }
    state.events.push(GameEvent::Jumped);
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.phase != GamePhase::Playing {
        return;
    }

    if input.idle_mode && autopilot_wants_jump(state) {
        jump(state);
    }

    update_player(state);
    if state.phase != GamePhase::Playing {
        return;
    }

    spawn(state);

    // Everything scrolls left at the same speed
    let speed = state.speed;
    for obs in &mut state.obstacles {
        obs.x -= speed;
    }
    for cake in &mut state.power_ups {
        cake.pos.x -= speed;
    }

    let hit = if state.is_invincible() {
        None
    } else {
        first_obstacle_hit(state)
    };
    if let Some(pipe) = hit {
        let idx = state.rng_mut().random_range(0..DEATH_MESSAGES.len());
        let score = state.score;
        state.end_run(RunOutcome::Crashed {
            cause: DeathCause::Obstacle { pipe },
            message: DEATH_MESSAGES[idx],
            score,
        });
        return;
    }

    collect_power_ups(state);

    score_passed(state);
    if state.phase != GamePhase::Playing {
        return;
    }

    if state.power_up_frames > 0 {
        state.power_up_frames -= 1;
    }

    update_particles(state);

    state.obstacles.retain(|o| o.right_edge() >= 0.0);
    state
        .power_ups
        .retain(|c| !c.collected && c.pos.x >= POWER_UP_CULL_X);

    state.frames += 1;
}

/// Gravity, then floor and ceiling
fn update_player(state: &mut GameState) {
    let floor = state.tuning.height;
    let player = &mut state.player;
    player.vel += state.tuning.gravity;
    player.pos.y += player.vel;

    if player.bottom() >= floor {
        player.pos.y = floor - player.radius;
        if state.dev_invincible || state.power_up_frames > 0 {
            player.vel = 0.0;
        } else {
            let score = state.score;
            state.end_run(RunOutcome::Crashed {
                cause: DeathCause::Floor,
                message: FLOOR_DEATH_MESSAGE,
                score,
            });
            return;
        }
    }

    if player.top() <= 0.0 {
        player.pos.y = player.radius;
        player.vel = 0.0;
    }
}

/// Obstacles (and maybe a cake) on the spawn interval, trail on its own
fn spawn(state: &mut GameState) {
    if state.frames % state.tuning.trail_interval.max(1) == 0 {
        let pos = state.player.pos;
        let particle = Particle::spawn(pos, state.rng_mut());
        state.particles.push(particle);
    }

    if state.frames % state.tuning.spawn_interval.max(1) != 0 {
        return;
    }

    let id = state.next_entity_id();
    let tuning = state.tuning.clone();
    let obs = Obstacle::spawn(id, &tuning, state.rng_mut());
    let with_cake = state.rng_mut().random_bool(tuning.power_up_chance.clamp(0.0, 1.0));
    if with_cake {
        let cake_id = state.next_entity_id();
        state.power_ups.push(PowerUp::in_gap(cake_id, &obs));
    }
    log::debug!(
        "Spawned obstacle {} (gap {:.0}..{:.0}, cake: {})",
        id,
        obs.top_height,
        obs.gap_bottom(),
        with_cake
    );
    state.obstacles.push(obs);
    state.events.push(GameEvent::ObstacleSpawned {
        id,
        power_up: with_cake,
    });
}

/// Pipe the player's hitbox overlaps, oldest obstacle first
fn first_obstacle_hit(state: &GameState) -> Option<PipeHit> {
    let center = state.player.pos;
    let hitbox = state.tuning.hitbox_radius();
    let floor = state.tuning.height;
    state
        .obstacles
        .iter()
        .find_map(|obs| obstacle_hit(center, hitbox, obs, floor))
}

fn collect_power_ups(state: &mut GameState) {
    let player = state.player.pos;
    let radius = state.player.radius;
    let mut collected = Vec::new();
    for cake in &mut state.power_ups {
        if !cake.collected && circle_circle_overlap(player, radius, cake.pos, cake.size / 2.0) {
            cake.collected = true;
            collected.push((cake.id, cake.pos));
        }
    }
    for (id, pos) in collected {
        state.power_up_frames = state.tuning.power_up_frames;
        state.burst(pos);
        state.events.push(GameEvent::PowerUpCollected { id });
    }
}

/// Count obstacles whose trailing edge is behind the player
fn score_passed(state: &mut GameState) {
    let player_x = state.player.pos.x;
    let mut newly_passed = 0u32;
    for obs in &mut state.obstacles {
        if !obs.passed && obs.right_edge() < player_x {
            obs.passed = true;
            newly_passed += 1;
        }
    }

    for _ in 0..newly_passed {
        state.score += 1;
        let score = state.score;
        state.events.push(GameEvent::Scored { score });

        if state.tuning.speed_up_every > 0 && score % state.tuning.speed_up_every == 0 {
            state.speed += state.tuning.speed_step;
            log::info!("Speed up to {:.1} at {} points", state.speed, score);
            state.events.push(GameEvent::SpeedUp { speed: state.speed });
        }

        if score >= state.tuning.win_score {
            state.end_run(RunOutcome::Won { score });
            return;
        }
    }
}

fn update_particles(state: &mut GameState) {
    let speed = state.speed;
    for particle in &mut state.particles {
        particle.pos.x -= speed;
        particle.pos += particle.drift;
        particle.life -= PARTICLE_DECAY;
    }
    state.particles.retain(|p| p.life > 0.0);
}

/// Jump when falling below the next gap's center
fn autopilot_wants_jump(state: &GameState) -> bool {
    let player = &state.player;
    let margin = state.tuning.hitbox_radius();
    let target = state
        .obstacles
        .iter()
        .find(|o| o.right_edge() + margin >= player.pos.x)
        .map(|o| o.gap_center())
        .unwrap_or(state.tuning.height / 2.0);
    player.vel >= 0.0 && player.pos.y > target + 20.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Tuning::default());
        state.init();
        state.drain_events();
        state
    }

    /// Obstacle placed so its gap is centered on the player
    fn gap_obstacle(state: &mut GameState, x: f32) -> u32 {
        let id = state.next_entity_id();
        let top_height = state.player.pos.y - 120.0;
        state.obstacles.push(Obstacle {
            id,
            x,
            width: 80.0,
            top_height,
            gap: 240.0,
            passed: false,
            label_top: "LEGACY",
            label_bottom: "BUGS",
        });
        id
    }

    /// Hover the player: cancel gravity before each tick
    fn hover(state: &mut GameState) {
        state.player.vel = -state.tuning.gravity;
    }

    #[test]
    fn test_tick_ignored_outside_playing() {
        let mut state = GameState::new(1, Tuning::default());
        tick(&mut state, &TickInput::default());
        assert_eq!(state.frames, 0);
        assert_eq!(state.phase, GamePhase::Start);
    }

    #[test]
    fn test_jump_ignored_outside_playing() {
        let mut state = GameState::new(1, Tuning::default());
        jump(&mut state);
        assert_eq!(state.player.vel, 0.0);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_jump_sets_velocity_and_bursts() {
        let mut state = playing(5);
        jump(&mut state);
        assert_eq!(state.player.vel, JUMP_VELOCITY);
        assert_eq!(state.particles.len(), BURST_PARTICLES);
        assert!(state.player.glyph < PLAYER_GLYPHS.len());
        assert_eq!(state.events, vec![GameEvent::Jumped]);
    }

    #[test]
    fn test_first_tick_spawns_obstacle_and_trail() {
        let mut state = playing(11);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.particles.len(), 1);
        assert_eq!(state.frames, 1);
        // Spawned at the right edge, then scrolled once
        assert_eq!(state.obstacles[0].x, VIEW_WIDTH - BASE_SPEED);
    }

    #[test]
    fn test_free_fall_dies_on_floor() {
        let mut state = playing(2024);
        let expected = state.tuning.free_fall_ticks().unwrap();
        let mut ticks = 0;
        while state.phase == GamePhase::Playing && ticks < 500 {
            tick(&mut state, &TickInput::default());
            ticks += 1;
        }
        assert_eq!(ticks, expected);
        assert!(matches!(
            state.outcome,
            Some(RunOutcome::Crashed {
                cause: DeathCause::Floor,
                ..
            })
        ));
        assert!(state.obstacles.is_empty());
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_dev_invincible_survives_floor() {
        let mut state = playing(2024);
        state.dev_invincible = true;
        for _ in 0..100 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.bottom(), state.tuning.height);
        assert_eq!(state.player.vel, 0.0);
    }

    #[test]
    fn test_ceiling_clamps_without_death() {
        let mut state = playing(8);
        state.player.pos.y = 45.0;
        state.player.vel = -20.0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.pos.y, state.player.radius);
        assert_eq!(state.player.vel, 0.0);
    }

    #[test]
    fn test_overlap_ends_run() {
        let mut state = playing(4);
        state.frames = 1; // skip the spawn on frame 0
        let id = state.next_entity_id();
        let y = state.player.pos.y;
        // Top pipe reaches down past the player
        state.obstacles.push(Obstacle {
            id,
            x: 70.0,
            width: 80.0,
            top_height: y + 50.0,
            gap: 240.0,
            passed: false,
            label_top: "LEGACY",
            label_bottom: "BUGS",
        });
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        match state.outcome {
            Some(RunOutcome::Crashed { cause, message, .. }) => {
                assert_eq!(cause, DeathCause::Obstacle { pipe: PipeHit::Top });
                assert!(DEATH_MESSAGES.contains(&message));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_power_up_invincibility_ignores_overlap() {
        let mut state = playing(4);
        state.frames = 1;
        state.power_up_frames = 10;
        let id = state.next_entity_id();
        let y = state.player.pos.y;
        state.obstacles.push(Obstacle {
            id,
            x: 70.0,
            width: 80.0,
            top_height: y + 50.0,
            gap: 240.0,
            passed: false,
            label_top: "LEGACY",
            label_bottom: "BUGS",
        });
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.power_up_frames, 9);
    }

    #[test]
    fn test_pass_through_gap_scores_once() {
        let mut state = playing(21);
        state.frames = 1;
        let id = gap_obstacle(&mut state, 100.0);

        let mut scored_at = None;
        for i in 0..80 {
            hover(&mut state);
            tick(&mut state, &TickInput::default());
            assert_eq!(state.phase, GamePhase::Playing, "died on tick {}", i);
            let obs = state.obstacles.iter().find(|o| o.id == id);
            if let Some(obs) = obs {
                if obs.passed && scored_at.is_none() {
                    scored_at = Some(i);
                    assert!(obs.right_edge() < state.player.pos.x);
                }
            }
        }
        // 100 + 80 - 3k < 80 first at k = 34
        assert_eq!(scored_at, Some(33));
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_power_up_pickup() {
        let mut state = playing(6);
        state.frames = 1;
        let id = state.next_entity_id();
        state.power_ups.push(PowerUp {
            id,
            pos: state.player.pos + Vec2::new(30.0, 0.0),
            size: POWER_UP_SIZE,
            collected: false,
        });
        hover(&mut state);
        tick(&mut state, &TickInput::default());
        // Timer set to full, then decremented once this tick
        assert_eq!(state.power_up_frames, POWER_UP_FRAMES - 1);
        assert!(state.power_ups.is_empty());
        assert_eq!(state.particles.len(), BURST_PARTICLES);
        assert!(
            state
                .events
                .contains(&GameEvent::PowerUpCollected { id })
        );
    }

    #[test]
    fn test_speed_up_every_five_points() {
        let mut state = playing(13);
        state.frames = 1;
        state.score = 4;
        gap_obstacle(&mut state, -5.0);
        hover(&mut state);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.score, 5);
        assert!((state.speed - (BASE_SPEED + SPEED_STEP)).abs() < 1e-6);
    }

    #[test]
    fn test_reaching_target_wins() {
        let mut state = playing(13);
        state.frames = 1;
        state.score = WIN_SCORE - 1;
        state.best_score = 12;
        gap_obstacle(&mut state, -5.0);
        hover(&mut state);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.outcome, Some(RunOutcome::Won { score: WIN_SCORE }));
        assert_eq!(state.best_score, WIN_SCORE);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_particles_decay_and_prune() {
        let mut state = playing(17);
        state.dev_invincible = true;
        jump(&mut state);
        for _ in 0..60 {
            tick(&mut state, &TickInput::default());
        }
        // Burst from the jump is gone, only recent trail particles remain
        assert!(state.particles.iter().all(|p| p.life > 0.0));
        assert!(state.particles.len() <= 4);
    }

    #[test]
    fn test_offscreen_obstacles_pruned() {
        let mut state = playing(19);
        state.frames = 1;
        state.dev_invincible = true;
        gap_obstacle(&mut state, -79.0);
        tick(&mut state, &TickInput::default());
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_autopilot_stays_airborne_before_first_obstacle() {
        let mut state = playing(77);
        let input = TickInput { idle_mode: true };
        for _ in 0..120 {
            tick(&mut state, &input);
        }
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_determinism() {
        let mut a = playing(99999);
        let mut b = playing(99999);
        let input = TickInput::default();
        for _ in 0..40 {
            for press in [false, true, false] {
                if press {
                    jump(&mut a);
                    jump(&mut b);
                }
                tick(&mut a, &input);
                tick(&mut b, &input);
            }
        }
        assert_eq!(a.frames, b.frames);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        assert_eq!(a.player.glyph, b.player.glyph);
    }

    proptest! {
        #[test]
        fn prop_score_and_speed_monotonic(
            seed in any::<u64>(),
            presses in proptest::collection::vec(any::<bool>(), 1..1500),
        ) {
            let mut state = playing(seed);
            for press in presses {
                let before_score = state.score;
                let before_speed = state.speed;
                let unscored = state.obstacles.iter().filter(|o| !o.passed).count() as u32;
                if press {
                    jump(&mut state);
                }
                tick(&mut state, &TickInput::default());

                prop_assert!(state.score >= before_score);
                prop_assert!(state.score - before_score <= unscored);
                prop_assert!(state.speed >= before_speed);
                prop_assert!((state.speed - state.tuning.speed_for_score(state.score)).abs() < 1e-3);
                if state.phase != GamePhase::Playing {
                    break;
                }
            }
        }

        #[test]
        fn prop_overlap_always_kills(seed in any::<u64>(), offset in -20.0f32..20.0) {
            let mut state = playing(seed);
            state.frames = 1;
            let id = state.next_entity_id();
            let y = state.player.pos.y;
            // Bottom pipe starts well above the player's center
            state.obstacles.push(Obstacle {
                id,
                x: 60.0 + offset,
                width: 80.0,
                top_height: y - 300.0,
                gap: 240.0,
                passed: false,
                label_top: "LEGACY",
                label_bottom: "BUGS",
            });
            tick(&mut state, &TickInput::default());
            prop_assert_eq!(state.phase, GamePhase::GameOver);
            let bottom_hit = matches!(
                state.outcome,
                Some(RunOutcome::Crashed {
                    cause: DeathCause::Obstacle { pipe: PipeHit::Bottom },
                    ..
                })
            );
            prop_assert!(bottom_hit);
        }
    }
}
