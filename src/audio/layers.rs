//! Additive music layers
//!
//! Layer 1 is the base melody and always plays. Every three loops another
//! layer joins; once active a layer never drops out. The later layers roll
//! dice every step, so the track turns from tidy chiptune into chaos the
//! longer a run lasts.

use rand::Rng;
use serde::Serialize;

use super::voice::{Voice, Waveform};
use crate::consts::TEMPO_BPM;

/// Steps in one melody loop
pub const PATTERN_LEN: u64 = 16;

/// Cmaj7 twice, then Dm7 twice
pub const MELODY: [f32; PATTERN_LEN as usize] = [
    261.63, 329.63, 392.00, 493.88, // Cmaj7
    261.63, 329.63, 392.00, 493.88, //
    293.66, 349.23, 440.00, 523.25, // Dm7
    293.66, 349.23, 440.00, 523.25, //
];

/// C2 for the first half of the loop, D2 for the second
const BASS_ROOTS: [f32; 2] = [65.41, 73.42];
/// C1 sub-bass drone
const DRONE_FREQ: f32 = 32.70;
/// C5, E5, G5, C6
const ASCENSION_CHORD: [f32; 4] = [523.25, 659.25, 783.99, 1046.50];

/// Length of one beat in seconds
pub fn seconds_per_beat() -> f64 {
    60.0 / TEMPO_BPM
}

/// Scheduler step length (an eighth note)
pub fn step_seconds() -> f64 {
    seconds_per_beat() * 0.5
}

/// Loop index for a step counter
#[inline]
pub fn loop_index(step: u64) -> u64 {
    step / PATTERN_LEN
}

/// One additive musical part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Layer {
    BaseMelody,
    Bass,
    AnxietyArp,
    Burnout,
    LegacyCore,
    CodeReview,
    ReleaseDay,
    DeployToProd,
    Hotfix,
    KernelPanic,
    Singularity,
}

impl Layer {
    /// All layers in activation order
    pub const ALL: [Layer; 11] = [
        Layer::BaseMelody,
        Layer::Bass,
        Layer::AnxietyArp,
        Layer::Burnout,
        Layer::LegacyCore,
        Layer::CodeReview,
        Layer::ReleaseDay,
        Layer::DeployToProd,
        Layer::Hotfix,
        Layer::KernelPanic,
        Layer::Singularity,
    ];

    /// Loop index at which this layer joins
    pub const fn threshold(self) -> u64 {
        match self {
            Layer::BaseMelody => 0,
            Layer::Bass => 3,
            Layer::AnxietyArp => 6,
            Layer::Burnout => 9,
            Layer::LegacyCore => 12,
            Layer::CodeReview => 15,
            Layer::ReleaseDay => 18,
            Layer::DeployToProd => 21,
            Layer::Hotfix => 24,
            Layer::KernelPanic => 27,
            Layer::Singularity => 30,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Layer::BaseMelody => "base melody",
            Layer::Bass => "bass",
            Layer::AnxietyArp => "anxiety arp",
            Layer::Burnout => "burnout",
            Layer::LegacyCore => "legacy core",
            Layer::CodeReview => "code review",
            Layer::ReleaseDay => "release day",
            Layer::DeployToProd => "deploy to prod",
            Layer::Hotfix => "hotfix",
            Layer::KernelPanic => "kernel panic",
            Layer::Singularity => "singularity",
        }
    }

    #[inline]
    pub fn is_active(self, loop_index: u64) -> bool {
        loop_index >= self.threshold()
    }

    /// Layers whose thresholds have been reached
    pub fn active(loop_index: u64) -> impl Iterator<Item = Layer> {
        Layer::ALL.into_iter().filter(move |l| l.is_active(loop_index))
    }

    /// Append this layer's voices for `step` to `out`
    pub fn voices<R: Rng>(self, step: u64, rng: &mut R, out: &mut Vec<Voice>) {
        use Waveform::*;

        let beat = (step % PATTERN_LEN) as usize;
        let note = MELODY[beat];

        match self {
            Layer::BaseMelody => {
                out.push(Voice::tone(note, seconds_per_beat() * 0.5, Square, 0.04));
            }
            Layer::Bass => {
                if step % 2 == 0 {
                    let root = if beat < 8 { BASS_ROOTS[0] } else { BASS_ROOTS[1] };
                    out.push(Voice::tone(root, seconds_per_beat(), Triangle, 0.08));
                }
            }
            Layer::AnxietyArp => {
                // A fifth above, fast and staccato
                out.push(Voice::tone(note * 1.5, 0.1, Sawtooth, 0.02));
            }
            Layer::Burnout => {
                if step % 2 == 1 {
                    out.push(Voice::noise(0.05, 0.03));
                }
                if rng.random::<f32>() > 0.8 {
                    let cents = rng.random::<f32>() * 200.0 - 100.0;
                    out.push(Voice::tone(note * 2.0, 0.2, Sawtooth, 0.02).detuned(cents));
                }
            }
            Layer::LegacyCore => {
                if step % 16 == 0 {
                    let cents = rng.random::<f32>() * 10.0;
                    out.push(Voice::tone(DRONE_FREQ, 2.0, Sawtooth, 0.15).detuned(cents));
                }
                if rng.random::<f32>() > 0.5 {
                    out.push(Voice::tone(note * 0.95, 0.1, Square, 0.03));
                }
            }
            Layer::CodeReview => {
                let octave = if step % 2 == 0 { 2.0 } else { 4.0 };
                out.push(Voice::tone(note * octave, 0.05, Sine, 0.05));
            }
            Layer::ReleaseDay => {
                if step % 3 == 0 {
                    let counter = MELODY[(beat + 2) % MELODY.len()];
                    out.push(Voice::tone(counter * 4.0, 0.1, Square, 0.03));
                }
            }
            Layer::DeployToProd => {
                if step % 4 == 0 {
                    out.push(Voice::noise(0.1, 0.08));
                }
            }
            Layer::Hotfix => {
                // Tritone over the melody
                out.push(Voice::tone(note * 1.414, 0.2, Sawtooth, 0.04));
            }
            Layer::KernelPanic => {
                let freq = rng.random::<f32>() * 1000.0 + 100.0;
                let cents = rng.random::<f32>() * 1000.0;
                out.push(Voice::tone(freq, 0.05, Square, 0.05).detuned(cents));
                if rng.random::<f32>() > 0.5 {
                    let scream = rng.random::<f32>() * 5000.0;
                    out.push(Voice::tone(scream, 0.02, Sawtooth, 0.05));
                }
            }
            Layer::Singularity => {
                if step % 4 == 0 {
                    for freq in ASCENSION_CHORD {
                        out.push(Voice::tone(freq, 2.0, Sine, 0.1));
                    }
                }
            }
        }
    }
}
