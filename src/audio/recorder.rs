//! In-memory audio sink
//!
//! Used by the native demo and by tests. Clones share one buffer so a host
//! can keep a handle after boxing the sink into a `Game`.

use std::cell::RefCell;
use std::rc::Rc;

use super::layers::Layer;
use super::scheduler::{AudioSink, ScheduledVoice};

#[derive(Debug, Clone, Default)]
pub struct VoiceRecorder {
    voices: Rc<RefCell<Vec<ScheduledVoice>>>,
}

impl VoiceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn voices(&self) -> Vec<ScheduledVoice> {
        self.voices.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.voices.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.borrow().is_empty()
    }

    pub fn count_layer(&self, layer: Layer) -> usize {
        self.voices.borrow().iter().filter(|v| v.layer == layer).count()
    }

    pub fn clear(&self) {
        self.voices.borrow_mut().clear();
    }
}

impl AudioSink for VoiceRecorder {
    fn play(&mut self, voice: &ScheduledVoice) {
        self.voices.borrow_mut().push(voice.clone());
    }
}
