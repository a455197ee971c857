//! Procedural background music
//!
//! No sample files: every note is an oscillator or a noise burst with an
//! exponential decay. The scheduler decides what plays and when; a sink
//! turns scheduled voices into sound (Web Audio in the browser, a recorder
//! elsewhere).

pub mod layers;
pub mod recorder;
pub mod scheduler;
pub mod voice;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use layers::{Layer, PATTERN_LEN, loop_index, step_seconds};
pub use recorder::VoiceRecorder;
pub use scheduler::{AudioSink, MusicScheduler, ScheduledVoice};
pub use voice::{Envelope, NoiseBurst, Tone, Voice, Waveform};
#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;
