mod formats;
mod store;

pub use formats::{ClipboardFormat, FormatList};
pub use store::ConfigStore;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FORMATS_KEY: &str = "copy_to_clipboard_formats";
pub const SHOW_FOR_SINGLE_TAB_KEY: &str = "show_context_command_for_single_tab";
pub const CLEAR_SELECTION_KEY: &str = "clear_selection_after_command_invoked";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub copy_to_clipboard_formats: FormatList,
    pub show_context_command_for_single_tab: bool,
    pub clear_selection_after_command_invoked: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            copy_to_clipboard_formats: FormatList::List(vec![
                ClipboardFormat::new("Title and URL", "%TITLE%%EOL%%URL%"),
                ClipboardFormat::new("Title (URL)", "%TITLE% (%URL%)"),
                ClipboardFormat::new(
                    "HTML Link",
                    "<a title=\"%TITLE_HTML%\" href=\"%URL_HTML%\">%TITLE_HTML%</a>",
                ),
                ClipboardFormat::new("Markdown", "[%TITLE%](%URL% \"%TITLE%\")"),
            ]),
            show_context_command_for_single_tab: false,
            clear_selection_after_command_invoked: false,
        }
    }
}

impl Settings {
    /// Keys whose values differ between `self` and `other`.
    pub fn changed_keys(&self, other: &Settings) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.copy_to_clipboard_formats != other.copy_to_clipboard_formats {
            keys.push(FORMATS_KEY);
        }
        if self.show_context_command_for_single_tab != other.show_context_command_for_single_tab {
            keys.push(SHOW_FOR_SINGLE_TAB_KEY);
        }
        if self.clear_selection_after_command_invoked != other.clear_selection_after_command_invoked {
            keys.push(CLEAR_SELECTION_KEY);
        }
        keys
    }
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        log::info!("No settings file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {:?}", path))?;
    let settings: Settings = toml::from_str(&content)
        .with_context(|| format!("Failed to parse settings in {:?}", path))?;
    Ok(settings)
}
