use super::{load_settings, FormatList, Settings};
use anyhow::Result;
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tokio::sync::{broadcast, watch};

const CHANNEL_CAPACITY: usize = 64;

/// Observable settings: a readiness flag resolved once after load, and a
/// change bus carrying the names of keys whose values changed.
pub struct ConfigStore {
    settings: RwLock<Settings>,
    loaded: watch::Sender<bool>,
    changes: broadcast::Sender<String>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let (loaded, _) = watch::channel(false);
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            settings: RwLock::new(settings),
            loaded,
            changes,
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn formats(&self) -> FormatList {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .copy_to_clipboard_formats
            .clone()
    }

    pub fn load_from(&self, path: &Path) -> Result<()> {
        let settings = load_settings(path)?;
        self.apply(settings);
        self.mark_loaded();
        Ok(())
    }

    pub fn mark_loaded(&self) {
        self.loaded.send_replace(true);
    }

    /// Resolves once the settings have been loaded.
    pub async fn loaded(&self) {
        let mut rx = self.loaded.subscribe();
        let _ = rx.wait_for(|loaded| *loaded).await;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }

    /// Replaces the settings and notifies observers of every key that changed.
    pub fn apply(&self, next: Settings) {
        let changed = {
            let mut guard = self.settings.write().unwrap_or_else(PoisonError::into_inner);
            let changed = guard.changed_keys(&next);
            *guard = next;
            changed
        };

        for key in changed {
            log::debug!("Setting changed: {}", key);
            let _ = self.changes.send(key.to_string());
        }
    }

    pub fn set_formats(&self, formats: FormatList) {
        self.update(|s| s.copy_to_clipboard_formats = formats);
    }

    pub fn set_show_for_single_tab(&self, enabled: bool) {
        self.update(|s| s.show_context_command_for_single_tab = enabled);
    }

    pub fn set_clear_selection(&self, enabled: bool) {
        self.update(|s| s.clear_selection_after_command_invoked = enabled);
    }

    fn update(&self, f: impl FnOnce(&mut Settings)) {
        let mut next = self.settings();
        f(&mut next);
        self.apply(next);
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
