//! Shared state for the video panel.
//!
//! The store is the single source of truth for what the panel shows. It is
//! owned by the application and mutated only through the transitions below;
//! the controller notices source changes through [`VideoStore::instance_key`].

use crate::controller::InstanceKey;

#[derive(Debug, Clone)]
pub struct VideoStore {
    idle_clip: String,
    active_source: String,
    playing_intent: bool,
    instance_key: InstanceKey,
}

impl VideoStore {
    pub fn new(idle_clip: impl Into<String>) -> Self {
        let idle_clip = idle_clip.into();
        VideoStore {
            active_source: idle_clip.clone(),
            idle_clip,
            playing_intent: false,
            instance_key: 0,
        }
    }

    /// Switch the panel to `source`. Returns false when nothing changed.
    pub fn select_clip(&mut self, source: &str) -> bool {
        if source.is_empty() {
            log::warn!("Ignoring clip selection with an empty source");
            return false;
        }
        if source == self.active_source {
            log::debug!("Clip already active, ignoring reselection: {}", source);
            return false;
        }

        self.instance_key += 1;
        self.active_source = source.to_string();
        self.playing_intent = true;
        log::info!(
            "Selected clip: key={}, source={}",
            self.instance_key,
            self.active_source
        );
        true
    }

    pub fn set_playing_intent(&mut self, playing: bool) {
        log::debug!("Playing intent: {}", playing);
        self.playing_intent = playing;
    }

    /// Go back to the idle clip. Always bumps the key, even when already idle.
    pub fn reset_to_idle(&mut self) {
        self.active_source = self.idle_clip.clone();
        self.playing_intent = false;
        self.instance_key += 1;
        log::info!("Reset to idle clip: key={}", self.instance_key);
    }

    pub fn active_source(&self) -> &str {
        &self.active_source
    }

    pub fn playing_intent(&self) -> bool {
        self.playing_intent
    }

    pub fn instance_key(&self) -> InstanceKey {
        self.instance_key
    }

    pub fn is_idle_clip(&self) -> bool {
        self.active_source == self.idle_clip
    }
}
