//! Best score persistence
//!
//! Stored in LocalStorage as a plain decimal string so older builds and
//! hand edits stay readable.

/// Highest score reached on this device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScore {
    value: u32,
}

impl BestScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    pub const STORAGE_KEY: &'static str = "vibe_best_score";

    pub fn new(value: u32) -> Self {
        Self { value }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Keep `score` if it beats the current best; returns whether it did
    pub fn record(&mut self, score: u32) -> bool {
        if score > self.value {
            self.value = score;
            true
        } else {
            false
        }
    }

    /// Parse a stored value; anything but a non-negative integer is rejected
    pub fn parse(raw: &str) -> Option<u32> {
        let raw = raw.trim();
        match raw.parse::<u32>() {
            Ok(v) => Some(v),
            Err(_) => {
                log::warn!("Ignoring unreadable best score {:?}", raw);
                None
            }
        }
    }

    /// Load the best score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::warn!("LocalStorage unavailable, best score will not persist");
            return Self::default();
        };

        if let Ok(Some(raw)) = storage.get_item(Self::STORAGE_KEY) {
            if let Some(value) = Self::parse(&raw) {
                log::info!("Loaded best score {}", value);
                return Self::new(value);
            }
        }

        log::info!("No best score found, starting fresh");
        Self::default()
    }

    /// Save the best score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if storage
                .set_item(Self::STORAGE_KEY, &self.value.to_string())
                .is_ok()
            {
                log::info!("Best score saved ({})", self.value);
            } else {
                log::warn!("Failed to save best score");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // In-memory only on native
    }
}
