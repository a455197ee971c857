//! Lookahead music scheduler
//!
//! `pump` is a cooperative task: each call commits every step whose start
//! time falls inside the lookahead window, hands the voices to the sink with
//! their exact start times, and returns. Call it from every animation frame;
//! a coarse calling cadence does not affect timing precision.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::layers::{Layer, loop_index, step_seconds};
use super::voice::Voice;
use crate::consts::LOOKAHEAD_SECS;

/// A voice committed to a point on the audio clock
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledVoice {
    /// Start time on the audio clock (seconds)
    pub at: f64,
    /// Scheduler step that produced it
    pub step: u64,
    pub layer: Layer,
    pub voice: Voice,
}

/// Where scheduled voices go
pub trait AudioSink {
    /// Current output clock in seconds, if the sink has one
    fn clock(&self) -> Option<f64> {
        None
    }

    /// Commit a voice; it cannot be retracted afterwards
    fn play(&mut self, voice: &ScheduledVoice);

    /// Wake the output after a user gesture
    fn resume(&self) {}

    /// Output gain for voices committed from now on (0.0 - 1.0)
    fn set_volume(&mut self, _volume: f32) {}
}

/// Background music state
#[derive(Debug, Clone)]
pub struct MusicScheduler {
    next_event_time: f64,
    step: u64,
    running: bool,
    lookahead: f64,
    rng: Pcg32,
    /// Highest loop index already announced in the log
    announced_layers: usize,
    scratch: Vec<Voice>,
}

impl MusicScheduler {
    pub fn new(seed: u64) -> Self {
        Self {
            next_event_time: 0.0,
            step: 0,
            running: false,
            lookahead: LOOKAHEAD_SECS,
            rng: Pcg32::seed_from_u64(seed),
            announced_layers: 0,
            scratch: Vec::new(),
        }
    }

    /// Begin from the top at `now`; no-op while already running
    pub fn start(&mut self, now: f64) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.step = 0;
        self.next_event_time = now;
        self.announced_layers = 0;
        log::info!("Music started at {:.3}s", now);
        true
    }

    /// Stop scheduling; voices already committed play out
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Music stopped after {} steps", self.step);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Steps scheduled since the last start
    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn loop_index(&self) -> u64 {
        loop_index(self.step)
    }

    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    /// Commit all steps due before `now + lookahead`; returns voices emitted
    pub fn pump(&mut self, now: f64, sink: &mut dyn AudioSink) -> usize {
        if !self.running {
            return 0;
        }

        let mut emitted = 0;
        while self.next_event_time < now + self.lookahead {
            let loop_idx = self.loop_index();
            self.announce_layers(loop_idx);

            for layer in Layer::active(loop_idx) {
                self.scratch.clear();
                layer.voices(self.step, &mut self.rng, &mut self.scratch);
                for voice in self.scratch.drain(..) {
                    sink.play(&ScheduledVoice {
                        at: self.next_event_time,
                        step: self.step,
                        layer,
                        voice,
                    });
                    emitted += 1;
                }
            }

            self.next_event_time += step_seconds();
            self.step += 1;
        }
        emitted
    }

    fn announce_layers(&mut self, loop_idx: u64) {
        let active = Layer::active(loop_idx).count();
        if active > self.announced_layers {
            for layer in &Layer::ALL[self.announced_layers..active] {
                log::info!("Music layer unlocked: {} (loop {})", layer.name(), loop_idx);
            }
            self.announced_layers = active;
        }
    }
}
