//! Web Audio output
//!
//! Every voice becomes its own short-lived node graph, started at the exact
//! time the scheduler committed it to.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorType};

use super::scheduler::{AudioSink, ScheduledVoice};
use super::voice::{NoiseBurst, Tone, Voice, Waveform, noise_samples};
use crate::consts::ENVELOPE_FLOOR;
use crate::settings::Settings;

impl Waveform {
    fn oscillator_type(self) -> OscillatorType {
        match self {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        }
    }
}

/// Sink backed by a browser `AudioContext`
pub struct WebAudioSink {
    ctx: AudioContext,
    volume: f32,
    rng: Pcg32,
}

impl WebAudioSink {
    /// `None` when the browser refuses an audio context
    pub fn new(settings: &Settings, seed: u64) -> Option<Self> {
        let Ok(ctx) = AudioContext::new() else {
            log::warn!("Failed to create AudioContext - music disabled");
            return None;
        };
        Some(Self {
            ctx,
            volume: settings.effective_music_volume(),
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    /// Gain node wired to the destination with the voice envelope applied
    fn envelope(&self, peak: f32, at: f64, duration: f64) -> Option<GainNode> {
        let gain = self.ctx.create_gain().ok()?;
        let peak = (peak * self.volume).max(ENVELOPE_FLOOR);
        gain.gain().set_value_at_time(peak, at).ok()?;
        gain.gain()
            .exponential_ramp_to_value_at_time(ENVELOPE_FLOOR, at + duration)
            .ok()?;
        gain.connect_with_audio_node(&self.ctx.destination()).ok()?;
        Some(gain)
    }

    fn play_tone(&self, tone: &Tone, at: f64) -> Option<()> {
        let osc = self.ctx.create_oscillator().ok()?;
        osc.set_type(tone.waveform.oscillator_type());
        osc.frequency().set_value_at_time(tone.freq, at).ok()?;
        if tone.detune != 0.0 {
            osc.detune().set_value_at_time(tone.detune, at).ok()?;
        }

        let gain = self.envelope(tone.peak, at, tone.duration)?;
        osc.connect_with_audio_node(&gain).ok()?;
        osc.start_with_when(at).ok()?;
        osc.stop_with_when(at + tone.duration).ok()?;
        Some(())
    }

    fn play_noise(&mut self, noise: &NoiseBurst, at: f64) -> Option<()> {
        let sample_rate = self.ctx.sample_rate();
        let mut samples = noise_samples(&mut self.rng, sample_rate, noise.duration);
        let buffer = self
            .ctx
            .create_buffer(1, samples.len() as u32, sample_rate)
            .ok()?;
        buffer.copy_to_channel(&mut samples, 0).ok()?;

        let source = self.ctx.create_buffer_source().ok()?;
        source.set_buffer(Some(&buffer));

        let gain = self.envelope(noise.peak, at, noise.duration)?;
        source.connect_with_audio_node(&gain).ok()?;
        source.start_with_when(at).ok()?;
        Some(())
    }
}

impl AudioSink for WebAudioSink {
    fn clock(&self) -> Option<f64> {
        Some(self.ctx.current_time())
    }

    fn play(&mut self, scheduled: &ScheduledVoice) {
        if self.volume <= 0.0 {
            return;
        }
        let played = match &scheduled.voice {
            Voice::Tone(tone) => self.play_tone(tone, scheduled.at),
            Voice::Noise(noise) => self.play_noise(noise, scheduled.at),
        };
        if played.is_none() {
            log::debug!("Dropped {} voice at {:.3}s", scheduled.layer.name(), scheduled.at);
        }
    }

    fn resume(&self) {
        if self.ctx.state() == AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}
