use super::registry::MenuRegistry;
use crate::config::{ConfigStore, FormatList};
use crate::host::MenuItemDescriptor;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::{Arc, Mutex, PoisonError};

pub const ROOT_ID: &str = "clipboard";
pub const FORMAT_ID_PREFIX: &str = "clipboard:";

static INDEX_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+):").expect("valid index pattern"));

pub fn format_item_id(index: usize, label: &str) -> String {
    format!("{}{}:{}", FORMAT_ID_PREFIX, index, label)
}

pub fn format_item(index: usize, label: &str) -> MenuItemDescriptor {
    MenuItemDescriptor {
        id: format_item_id(index, label),
        parent_id: Some(ROOT_ID.to_string()),
        kind: None,
        title: label.to_string(),
        visible: true,
        contexts: None,
        icons: None,
    }
}

/// Maps a clicked format item id back to its format string. List-shaped
/// configs are indexed by the leading number, table-shaped ones are looked up
/// by the label after it.
pub fn resolve_format<'a>(menu_item_id: &str, formats: &'a FormatList) -> Option<&'a str> {
    let id = menu_item_id.strip_prefix(FORMAT_ID_PREFIX)?;

    let entry = match formats {
        FormatList::List(items) => {
            let index: usize = INDEX_PREFIX.captures(id)?.get(1)?.as_str().parse().ok()?;
            items.get(index)?
        }
        FormatList::Map(items) => {
            let label = INDEX_PREFIX.replace(id, "");
            items.iter().find(|f| f.label == label)?
        }
    };
    Some(entry.format.as_str())
}

/// Keeps one child menu item per configured clipboard format.
pub struct FormatSynchronizer {
    registry: Arc<MenuRegistry>,
    config: Arc<ConfigStore>,
    tracked: Mutex<Vec<MenuItemDescriptor>>,
    refreshing: tokio::sync::Mutex<()>,
}

impl FormatSynchronizer {
    pub fn new(registry: Arc<MenuRegistry>, config: Arc<ConfigStore>) -> Self {
        Self {
            registry,
            config,
            tracked: Mutex::new(Vec::new()),
            refreshing: tokio::sync::Mutex::new(()),
        }
    }

    /// Number of format items currently registered.
    pub fn count(&self) -> usize {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn ids(&self) -> Vec<String> {
        self.tracked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|item| item.id.clone())
            .collect()
    }

    /// Removes every tracked item, then recreates one per configured format
    /// in order, each registered before the next.
    pub async fn refresh(&self, root_title: &str) -> Result<()> {
        let _guard = self.refreshing.lock().await;

        let stale: Vec<MenuItemDescriptor> = self
            .tracked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for item in &stale {
            if let Err(e) = self.registry.remove_entry(&item.id).await {
                log::warn!("Failed to remove menu item {}: {:#}", item.id, e);
            }
        }

        let formats = self.config.formats();
        log::debug!("Rebuilding {} clipboard format items", formats.len());
        for (index, format) in formats.entries().iter().enumerate() {
            let item = format_item(index, &format.label);
            self.registry.create_entry(&item, root_title).await?;
            self.tracked
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(item);
        }
        Ok(())
    }
}
