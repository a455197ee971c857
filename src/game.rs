//! Game context
//!
//! Owns one simulation, its music and the persisted best score, and turns
//! host callbacks (animation frames, presses, toggles) into ticks and audio
//! pumps. Hosts hold exactly one of these; there is no global state.

use crate::audio::{AudioSink, MusicScheduler};
use crate::best_score::BestScore;
use crate::consts::*;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, jump, tick};
use crate::snapshot::Snapshot;
use crate::tuning::Tuning;

pub struct Game {
    state: GameState,
    music: MusicScheduler,
    audio: Option<Box<dyn AudioSink>>,
    best: BestScore,
    input: TickInput,
    accumulator: f32,
    last_frame_ms: Option<f64>,
    /// Latest host timestamp seen (ms)
    clock_ms: f64,
    /// When the last run ended (ms), for the restart cooldown
    ended_at_ms: Option<f64>,
    /// Events handled since the host last asked
    events: Vec<GameEvent>,
    /// Title clicks toward the cheat toggle
    title_clicks: u32,
}

/// Elements with their own click handling; presses on them are not jumps
pub fn is_ui_control(tag_name: &str) -> bool {
    tag_name.eq_ignore_ascii_case("BUTTON") || tag_name.eq_ignore_ascii_case("H1")
}

impl Game {
    /// New game on the title screen; `audio` is `None` when no output exists
    pub fn new(
        seed: u64,
        tuning: Tuning,
        best: BestScore,
        audio: Option<Box<dyn AudioSink>>,
    ) -> Self {
        let mut state = GameState::new(seed, tuning);
        state.best_score = best.value();
        Self {
            state,
            music: MusicScheduler::new(seed.wrapping_add(1)),
            audio,
            best,
            input: TickInput::default(),
            accumulator: 0.0,
            last_frame_ms: None,
            clock_ms: 0.0,
            ended_at_ms: None,
            events: Vec::new(),
            title_clicks: 0,
        }
    }

    /// (Re)start a run and its music
    pub fn init(&mut self, now_ms: f64) {
        self.clock_ms = now_ms;
        self.state.best_score = self.best.value();
        self.state.init();
        self.ended_at_ms = None;
        self.accumulator = 0.0;
        // A crash already stopped the music; restart it from the top
        self.stop_music();
        self.start_music();
        self.handle_events();
        log::info!("Run started (best {})", self.best.value());
    }

    /// Advance exactly one simulation frame
    pub fn tick(&mut self) {
        tick(&mut self.state, &self.input);
        self.handle_events();
    }

    /// Jump impulse, ignored unless playing
    pub fn on_jump(&mut self) {
        jump(&mut self.state);
        self.handle_events();
    }

    /// Single-button input routed by phase; returns whether it did anything
    pub fn press(&mut self, now_ms: f64) -> bool {
        self.clock_ms = self.clock_ms.max(now_ms);
        match self.state.phase {
            GamePhase::Start => {
                self.init(now_ms);
                true
            }
            GamePhase::Playing => {
                self.on_jump();
                true
            }
            GamePhase::GameOver => {
                let cooled = self
                    .ended_at_ms
                    .is_none_or(|ended| now_ms - ended > RESTART_COOLDOWN_MS);
                if cooled {
                    self.init(now_ms);
                } else {
                    log::debug!("Restart ignored during cooldown");
                }
                cooled
            }
        }
    }

    /// Animation frame: run due ticks, then feed the music scheduler.
    /// Returns the number of ticks run.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_frame_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_frame_ms = Some(now_ms);
        self.clock_ms = now_ms;

        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        self.pump_audio();
        substeps
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.audio_unavailable())
    }

    /// Start the music at the current audio time; no-op while running
    pub fn start_music(&mut self) -> bool {
        let now = self.audio_now();
        self.music.start(now)
    }

    pub fn stop_music(&mut self) {
        self.music.stop();
    }

    /// Schedule any music due within the lookahead window
    pub fn pump_audio(&mut self) -> usize {
        let Some(sink) = self.audio.as_mut() else {
            return 0;
        };
        let now = sink.clock().unwrap_or(self.clock_ms / 1000.0);
        self.music.pump(now, &mut **sink)
    }

    /// Wake the audio output (call from a user gesture)
    pub fn resume_audio(&self) {
        if let Some(sink) = &self.audio {
            sink.resume();
        }
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        if let Some(sink) = self.audio.as_mut() {
            sink.set_volume(volume);
        }
    }

    /// Developer cheat: flip invincibility
    pub fn toggle_dev_invincible(&mut self) -> bool {
        let on = !self.state.dev_invincible;
        self.set_dev_invincible(on);
        on
    }

    /// Hidden cheat: every `CHEAT_CLICKS`th title click flips invincibility.
    /// Returns whether this click flipped it.
    pub fn title_click(&mut self) -> bool {
        self.title_clicks += 1;
        if self.title_clicks < CHEAT_CLICKS {
            return false;
        }
        self.title_clicks = 0;
        self.toggle_dev_invincible();
        true
    }

    pub fn set_dev_invincible(&mut self, on: bool) {
        if self.state.dev_invincible != on {
            log::info!("Dev invincibility: {}", on);
        }
        self.state.dev_invincible = on;
    }

    pub fn set_idle_mode(&mut self, on: bool) {
        if self.input.idle_mode != on {
            log::info!("Idle mode: {}", on);
        }
        self.input.idle_mode = on;
    }

    pub fn idle_mode(&self) -> bool {
        self.input.idle_mode
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn best_score(&self) -> u32 {
        self.best.value()
    }

    pub fn music(&self) -> &MusicScheduler {
        &self.music
    }

    pub fn audio_unavailable(&self) -> bool {
        self.audio.is_none()
    }

    /// Events handled since the last call, oldest first
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn audio_now(&self) -> f64 {
        self.audio
            .as_ref()
            .and_then(|sink| sink.clock())
            .unwrap_or(self.clock_ms / 1000.0)
    }

    fn handle_events(&mut self) {
        for event in self.state.drain_events() {
            if let GameEvent::RunEnded { outcome, .. } = &event {
                self.stop_music();
                self.ended_at_ms = Some(self.clock_ms);
                if self.best.record(outcome.score()) {
                    self.best.save();
                }
            }
            self.events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Layer, VoiceRecorder};
    use crate::sim::RunOutcome;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn game_with_recorder() -> (Game, VoiceRecorder) {
        let recorder = VoiceRecorder::new();
        let game = Game::new(
            1,
            Tuning::default(),
            BestScore::default(),
            Some(Box::new(recorder.clone())),
        );
        (game, recorder)
    }

    /// Run frames until the phase leaves `Playing`; returns the time it did
    fn frames_until_over(game: &mut Game, mut t: f64) -> f64 {
        for _ in 0..10_000 {
            t += FRAME_MS;
            game.frame(t);
            if game.phase() != GamePhase::Playing {
                return t;
            }
        }
        panic!("run never ended");
    }

    #[test]
    fn test_press_routes_by_phase() {
        let (mut game, _) = game_with_recorder();
        assert_eq!(game.phase(), GamePhase::Start);

        assert!(game.press(0.0));
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.music().is_running());

        game.frame(0.0);
        assert!(game.press(20.0));
        assert_eq!(game.state().player.vel, -6.0);
        assert!(game.take_events().contains(&GameEvent::Jumped));
    }

    #[test]
    fn test_press_jumps_once() {
        let (mut game, _) = game_with_recorder();
        game.press(0.0);
        game.press(10.0);
        assert_eq!(game.state().player.vel, JUMP_VELOCITY);
        // The next tick only applies gravity
        game.tick();
        assert_eq!(game.state().player.vel, JUMP_VELOCITY + GRAVITY);
        let jumps = game.take_events().iter().filter(|e| **e == GameEvent::Jumped).count();
        assert_eq!(jumps, 1);
    }

    #[test]
    fn test_title_clicks_toggle_cheat() {
        let (mut game, _) = game_with_recorder();
        for _ in 1..CHEAT_CLICKS {
            assert!(!game.title_click());
        }
        assert!(!game.state().dev_invincible);
        assert!(game.title_click());
        assert!(game.state().dev_invincible);
        // Clicking the title never starts a run
        assert_eq!(game.phase(), GamePhase::Start);

        for _ in 0..CHEAT_CLICKS {
            game.title_click();
        }
        assert!(!game.state().dev_invincible);
    }

    #[test]
    fn test_ui_controls_are_not_presses() {
        assert!(is_ui_control("BUTTON"));
        assert!(is_ui_control("H1"));
        assert!(is_ui_control("h1"));
        assert!(!is_ui_control("CANVAS"));
        assert!(!is_ui_control("BODY"));
        assert!(!is_ui_control("H2"));
    }

    #[test]
    fn test_jump_ignored_outside_playing() {
        let (mut game, _) = game_with_recorder();
        game.on_jump();
        assert_eq!(game.state().player.vel, 0.0);
        assert!(game.take_events().is_empty());
    }

    #[test]
    fn test_frame_accumulator() {
        let (mut game, _) = game_with_recorder();
        game.press(0.0);
        // First frame runs a single tick
        assert_eq!(game.frame(1000.0), 1);
        // A long stall is capped
        let ran = game.frame(6000.0);
        assert!((5..=6).contains(&ran), "ran {ran}");
        assert!(ran <= MAX_SUBSTEPS);
        // Short frames only spend what is left over
        assert!(game.frame(6005.0) <= 1);
    }

    #[test]
    fn test_restart_cooldown() {
        let (mut game, _) = game_with_recorder();
        game.press(0.0);
        let ended = frames_until_over(&mut game, 0.0);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(!game.music().is_running());

        assert!(!game.press(ended + 100.0));
        assert!(!game.press(ended + RESTART_COOLDOWN_MS));
        assert_eq!(game.phase(), GamePhase::GameOver);

        assert!(game.press(ended + RESTART_COOLDOWN_MS + 1.0));
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.state().score, 0);
        assert!(game.state().obstacles.is_empty());
        assert!(game.music().is_running());
    }

    #[test]
    fn test_crash_records_new_best() {
        let (mut game, _) = game_with_recorder();
        game.press(0.0);
        game.state.score = 7;
        frames_until_over(&mut game, 0.0);

        assert_eq!(game.best_score(), 7);
        let ended = game.take_events().into_iter().find_map(|e| match e {
            GameEvent::RunEnded { outcome, new_best } => Some((outcome, new_best)),
            _ => None,
        });
        let (outcome, new_best) = ended.expect("run ended");
        assert!(new_best);
        assert!(matches!(outcome, RunOutcome::Crashed { score: 7, .. }));

        // A worse run leaves the best alone
        game.press(10_000.0);
        game.state.score = 3;
        frames_until_over(&mut game, 10_000.0);
        assert_eq!(game.best_score(), 7);
        assert_eq!(game.snapshot().best_score, 7);
    }

    #[test]
    fn test_music_follows_game_clock_without_audio_clock() {
        let (mut game, recorder) = game_with_recorder();
        game.press(2000.0);
        assert_eq!(game.music().next_event_time(), 2.0);

        let mut t = 2000.0;
        for _ in 0..60 {
            t += FRAME_MS;
            game.frame(t);
        }
        assert!(!recorder.is_empty());
        assert!(recorder.voices().iter().all(|v| v.at >= 2.0 && v.at < t / 1000.0 + 0.1));
        assert_eq!(recorder.count_layer(Layer::BaseMelody), recorder.len());
    }

    #[test]
    fn test_no_audio_sink() {
        let mut game = Game::new(3, Tuning::default(), BestScore::default(), None);
        game.press(0.0);
        assert!(game.audio_unavailable());
        assert!(game.snapshot().audio_unavailable);
        assert_eq!(game.pump_audio(), 0);
    }

    #[test]
    fn test_dev_toggle_survives_floor() {
        let (mut game, _) = game_with_recorder();
        assert!(game.toggle_dev_invincible());
        game.press(0.0);
        for _ in 0..120 {
            game.tick();
        }
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(!game.toggle_dev_invincible());
    }

    #[test]
    fn test_start_music_is_idempotent() {
        let (mut game, _) = game_with_recorder();
        game.press(1000.0);
        assert!(!game.start_music());
        game.stop_music();
        assert!(game.start_music());
    }
}
