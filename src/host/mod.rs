//! Ports onto the browser host: menus, tabs, cross-extension messaging,
//! localized strings and the tab commands this crate delegates to.

pub mod stdio;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: u64,
    pub index: u32,
    pub window_id: u64,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub title: String,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<BTreeMap<String, String>>,
}

/// Partial descriptor pushed on every visibility/title change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuUpdate {
    pub visible: bool,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickInfo {
    pub menu_item_id: String,
}

impl ClickInfo {
    pub fn new(menu_item_id: impl Into<String>) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Could not establish connection. Receiving end does not exist.")]
    ReceiverMissing,
    #[error("message delivery failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait MenuHost: Send + Sync {
    async fn create(&self, item: &MenuItemDescriptor) -> Result<()>;
    async fn remove(&self, id: &str) -> Result<()>;
    async fn update(&self, id: &str, update: &MenuUpdate) -> Result<()>;
    async fn refresh(&self) -> Result<()>;
}

#[async_trait]
pub trait TabsHost: Send + Sync {
    async fn highlight(&self, window_id: u64, indices: &[u32]) -> Result<()>;
}

#[async_trait]
pub trait PeerMessenger: Send + Sync {
    async fn send(&self, peer_id: &str, message: Value) -> Result<(), SendError>;
}

#[async_trait]
pub trait TabCommands: Send + Sync {
    async fn get_multiselected_tabs(&self, tab: Option<&Tab>) -> Result<Vec<Tab>>;
    async fn copy_to_clipboard(&self, tabs: &[Tab], format: &str) -> Result<()>;
}

pub trait Localizer: Send + Sync {
    fn message(&self, key: &str) -> String;
}

/// Everything the controller needs from its host, bundled.
#[derive(Clone)]
pub struct HostPorts {
    pub menus: Arc<dyn MenuHost>,
    pub tabs: Arc<dyn TabsHost>,
    pub messenger: Arc<dyn PeerMessenger>,
    pub commands: Arc<dyn TabCommands>,
    pub i18n: Arc<dyn Localizer>,
    pub icons: Option<BTreeMap<String, String>>,
}

impl HostPorts {
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: MenuHost + TabsHost + PeerMessenger + TabCommands + Localizer + 'static,
    {
        Self {
            menus: host.clone(),
            tabs: host.clone(),
            messenger: host.clone(),
            commands: host.clone(),
            i18n: host,
            icons: None,
        }
    }

    pub fn with_icons(mut self, icons: BTreeMap<String, String>) -> Self {
        self.icons = Some(icons);
        self
    }
}
