//! Sound primitives: tones and noise bursts with an exponential decay envelope

use rand::Rng;
use serde::Serialize;

use crate::consts::ENVELOPE_FLOOR;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// A pitched oscillator note
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tone {
    /// Frequency in Hz
    pub freq: f32,
    /// Seconds
    pub duration: f64,
    pub waveform: Waveform,
    /// Gain at the attack
    pub peak: f32,
    /// Cents
    pub detune: f32,
}

/// A burst of white noise
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoiseBurst {
    /// Seconds
    pub duration: f64,
    /// Gain at the attack
    pub peak: f32,
}

/// Anything the scheduler can ask the output to play
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Voice {
    Tone(Tone),
    Noise(NoiseBurst),
}

impl Voice {
    pub fn tone(freq: f32, duration: f64, waveform: Waveform, peak: f32) -> Self {
        Voice::Tone(Tone {
            freq,
            duration,
            waveform,
            peak,
            detune: 0.0,
        })
    }

    pub fn noise(duration: f64, peak: f32) -> Self {
        Voice::Noise(NoiseBurst { duration, peak })
    }

    /// Same voice, detuned by `cents` (noise is unaffected)
    pub fn detuned(self, cents: f32) -> Self {
        match self {
            Voice::Tone(tone) => Voice::Tone(Tone {
                detune: cents,
                ..tone
            }),
            noise => noise,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            Voice::Tone(t) => t.duration,
            Voice::Noise(n) => n.duration,
        }
    }

    pub fn peak(&self) -> f32 {
        match self {
            Voice::Tone(t) => t.peak,
            Voice::Noise(n) => n.peak,
        }
    }

    pub fn envelope(&self) -> Envelope {
        Envelope::new(self.peak(), self.duration())
    }
}

/// Sharp attack at `peak`, exponential decay to `ENVELOPE_FLOOR` over `duration`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub peak: f32,
    pub duration: f64,
}

impl Envelope {
    pub fn new(peak: f32, duration: f64) -> Self {
        Self { peak, duration }
    }

    /// Gain `t` seconds after the attack
    pub fn gain_at(&self, t: f64) -> f32 {
        if self.peak <= ENVELOPE_FLOOR || self.duration <= 0.0 {
            return ENVELOPE_FLOOR;
        }
        let progress = (t / self.duration).clamp(0.0, 1.0) as f32;
        self.peak * (ENVELOPE_FLOOR / self.peak).powf(progress)
    }

    /// Final gain (where the ramp lands)
    pub fn floor(&self) -> f32 {
        ENVELOPE_FLOOR
    }
}

/// Uniform white noise in [-1, 1) for a burst of `duration` seconds
pub fn noise_samples<R: Rng>(rng: &mut R, sample_rate: f32, duration: f64) -> Vec<f32> {
    let len = (sample_rate as f64 * duration).max(1.0) as usize;
    (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
}
