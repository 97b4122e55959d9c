//! Line-oriented JSON host used by the binary: host events arrive one per
//! line on stdin, host calls are written one per line to stdout.

use super::{
    ClickInfo, Localizer, MenuHost, MenuItemDescriptor, MenuUpdate, PeerMessenger, SendError, Tab,
    TabCommands, TabsHost,
};
use crate::config::FormatList;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Icons declared by the extension manifest, keyed by pixel size.
const MANIFEST_ICONS: &[(&str, &str)] = &[
    ("16", "/resources/16x16.svg"),
    ("32", "/resources/32x32.svg"),
];

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Shown {
        #[serde(default)]
        info: Value,
        #[serde(default)]
        tab: Option<Tab>,
    },
    Clicked {
        info: ClickInfo,
        #[serde(default)]
        tab: Option<Tab>,
    },
    External {
        sender: String,
        message: Value,
    },
    Select {
        tabs: Vec<Tab>,
    },
    SetFormats {
        formats: FormatList,
    },
}

pub struct StdioHost<W: Write + Send> {
    out: Mutex<W>,
    selection: Mutex<Vec<Tab>>,
    messages: HashMap<String, String>,
}

impl StdioHost<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> StdioHost<W> {
    pub fn new(out: W) -> Self {
        let messages = [
            ("context_copyTabs_label", "Copy Tabs to Clipboard"),
            ("context_copyTab_label", "Copy Tab to Clipboard"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            out: Mutex::new(out),
            selection: Mutex::new(Vec::new()),
            messages,
        }
    }

    pub fn manifest_icons(&self) -> BTreeMap<String, String> {
        MANIFEST_ICONS
            .iter()
            .map(|(size, path)| (size.to_string(), path.to_string()))
            .collect()
    }

    pub fn set_selection(&self, tabs: Vec<Tab>) {
        *self.selection.lock().unwrap_or_else(PoisonError::into_inner) = tabs;
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, call: Value) -> Result<()> {
        let line = serde_json::to_string(&call)?;
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{}", line).context("Failed to write host call")?;
        out.flush()?;
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send> MenuHost for StdioHost<W> {
    async fn create(&self, item: &MenuItemDescriptor) -> Result<()> {
        self.emit(json!({ "call": "menus.create", "item": item }))
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.emit(json!({ "call": "menus.remove", "id": id }))
    }

    async fn update(&self, id: &str, update: &MenuUpdate) -> Result<()> {
        self.emit(json!({ "call": "menus.update", "id": id, "params": update }))
    }

    async fn refresh(&self) -> Result<()> {
        self.emit(json!({ "call": "menus.refresh" }))
    }
}

#[async_trait]
impl<W: Write + Send> TabsHost for StdioHost<W> {
    async fn highlight(&self, window_id: u64, indices: &[u32]) -> Result<()> {
        self.emit(json!({ "call": "tabs.highlight", "windowId": window_id, "tabs": indices }))
    }
}

#[async_trait]
impl<W: Write + Send> PeerMessenger for StdioHost<W> {
    async fn send(&self, peer_id: &str, message: Value) -> Result<(), SendError> {
        self.emit(json!({ "call": "runtime.sendMessage", "peer": peer_id, "message": message }))
            .map_err(|e| SendError::Failed(e.to_string()))
    }
}

#[async_trait]
impl<W: Write + Send> TabCommands for StdioHost<W> {
    async fn get_multiselected_tabs(&self, tab: Option<&Tab>) -> Result<Vec<Tab>> {
        let selection = self.selection.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if selection.is_empty() {
            return Ok(tab.cloned().into_iter().collect());
        }
        Ok(selection)
    }

    async fn copy_to_clipboard(&self, tabs: &[Tab], format: &str) -> Result<()> {
        self.emit(json!({ "call": "commands.copyToClipboard", "tabs": tabs, "format": format }))
    }
}

impl<W: Write + Send> Localizer for StdioHost<W> {
    fn message(&self, key: &str) -> String {
        self.messages.get(key).cloned().unwrap_or_else(|| key.to_string())
    }
}
