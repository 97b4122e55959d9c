use crate::host::{Localizer, MenuUpdate};
use std::sync::{Mutex, PoisonError};

pub const PLURAL_LABEL_KEY: &str = "context_copyTabs_label";
pub const SINGULAR_LABEL_KEY: &str = "context_copyTab_label";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootState {
    pub visible: bool,
    pub title: String,
}

impl RootState {
    pub fn compute(
        format_count: usize,
        selected_count: usize,
        show_for_single_tab: bool,
        i18n: &dyn Localizer,
    ) -> Self {
        let multiple = selected_count > 1;
        let key = if multiple { PLURAL_LABEL_KEY } else { SINGULAR_LABEL_KEY };
        Self {
            visible: format_count > 0 && (multiple || show_for_single_tab),
            title: i18n.message(key),
        }
    }
}

/// Last known visibility and title of the root item. Comparisons are made
/// against this cache; the host is never read back.
pub struct RootEntry {
    state: Mutex<RootState>,
}

impl RootEntry {
    pub fn new(initial: RootState) -> Self {
        Self {
            state: Mutex::new(initial),
        }
    }

    pub fn current(&self) -> RootState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn title(&self) -> String {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).title.clone()
    }

    /// Stores `next`, returning the update to push when it differs from the cache.
    pub fn transition(&self, next: RootState) -> Option<MenuUpdate> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == next {
            return None;
        }
        *state = next;
        Some(MenuUpdate {
            visible: state.visible,
            title: state.title.clone(),
        })
    }
}
