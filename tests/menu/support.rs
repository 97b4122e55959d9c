use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tab_clipboard_menu::config::{ClipboardFormat, ConfigStore, FormatList, Settings};
use tab_clipboard_menu::host::{
    HostPorts, Localizer, MenuHost, MenuItemDescriptor, MenuUpdate, PeerMessenger, SendError, Tab,
    TabCommands, TabsHost,
};
use tab_clipboard_menu::menu::ContextMenuController;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(MenuItemDescriptor),
    Remove(String),
    Update(String, MenuUpdate),
    Refresh,
    Highlight(u64, Vec<u32>),
    Copy(Vec<Tab>, String),
    SelectionQuery,
}

#[derive(Default)]
pub struct FakeHost {
    calls: Mutex<Vec<Call>>,
    sent: Mutex<Vec<(String, Value)>>,
    selection: Mutex<Vec<Tab>>,
    missing_peers: Mutex<HashSet<String>>,
    hung_peers: Mutex<HashSet<String>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn select(&self, tabs: Vec<Tab>) {
        *self.selection.lock().unwrap() = tabs;
    }

    pub fn peer_missing(&self, peer_id: &str) {
        self.missing_peers.lock().unwrap().insert(peer_id.to_string());
    }

    pub fn peer_hangs(&self, peer_id: &str) {
        self.hung_peers.lock().unwrap().insert(peer_id.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
        self.sent.lock().unwrap().clear();
    }

    /// Messages that reached a listening peer.
    pub fn sent_to(&self, peer_id: &str) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(peer, _)| peer == peer_id)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MenuHost for FakeHost {
    async fn create(&self, item: &MenuItemDescriptor) -> Result<()> {
        self.record(Call::Create(item.clone()));
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.record(Call::Remove(id.to_string()));
        Ok(())
    }

    async fn update(&self, id: &str, update: &MenuUpdate) -> Result<()> {
        self.record(Call::Update(id.to_string(), update.clone()));
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        self.record(Call::Refresh);
        Ok(())
    }
}

#[async_trait]
impl TabsHost for FakeHost {
    async fn highlight(&self, window_id: u64, indices: &[u32]) -> Result<()> {
        self.record(Call::Highlight(window_id, indices.to_vec()));
        Ok(())
    }
}

#[async_trait]
impl PeerMessenger for FakeHost {
    async fn send(&self, peer_id: &str, message: Value) -> Result<(), SendError> {
        let hung = self.hung_peers.lock().unwrap().contains(peer_id);
        if hung {
            std::future::pending::<()>().await;
        }
        let missing = self.missing_peers.lock().unwrap().contains(peer_id);
        if missing {
            return Err(SendError::ReceiverMissing);
        }
        self.sent.lock().unwrap().push((peer_id.to_string(), message));
        Ok(())
    }
}

#[async_trait]
impl TabCommands for FakeHost {
    async fn get_multiselected_tabs(&self, tab: Option<&Tab>) -> Result<Vec<Tab>> {
        self.record(Call::SelectionQuery);
        let selection = self.selection.lock().unwrap().clone();
        if selection.is_empty() {
            return Ok(tab.cloned().into_iter().collect());
        }
        Ok(selection)
    }

    async fn copy_to_clipboard(&self, tabs: &[Tab], format: &str) -> Result<()> {
        self.record(Call::Copy(tabs.to_vec(), format.to_string()));
        Ok(())
    }
}

impl Localizer for FakeHost {
    fn message(&self, key: &str) -> String {
        match key {
            "context_copyTabs_label" => "Copy Tabs".to_string(),
            "context_copyTab_label" => "Copy Tab".to_string(),
            other => other.to_string(),
        }
    }
}

pub fn tab(id: u64, index: u32, active: bool) -> Tab {
    Tab {
        id,
        index,
        window_id: 1,
        active,
    }
}

pub fn formats(labels: &[&str]) -> FormatList {
    FormatList::List(
        labels
            .iter()
            .map(|label| ClipboardFormat::new(*label, format!("<{}>", label)))
            .collect(),
    )
}

/// Lets spawned relay and refresh tasks run to completion.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub struct Harness {
    pub host: Arc<FakeHost>,
    pub config: Arc<ConfigStore>,
    pub controller: Arc<ContextMenuController>,
}

impl Harness {
    pub fn new(settings: Settings) -> Self {
        Self::build(settings, |ports| ports)
    }

    pub fn with_icons(settings: Settings, icons: BTreeMap<String, String>) -> Self {
        Self::build(settings, |ports| ports.with_icons(icons))
    }

    fn build(settings: Settings, ports: impl FnOnce(HostPorts) -> HostPorts) -> Self {
        let host = FakeHost::new();
        let config = Arc::new(ConfigStore::with_settings(settings));
        let ports = ports(HostPorts::from_host(Arc::clone(&host)));
        let controller = ContextMenuController::new(ports, Arc::clone(&config));
        Self { host, config, controller }
    }

    pub fn with_formats(labels: &[&str]) -> Self {
        Self::new(Settings {
            copy_to_clipboard_formats: formats(labels),
            ..Settings::default()
        })
    }

    /// Initializes, loads settings and waits for the first format build.
    pub async fn started(self) -> Self {
        self.controller.init().await.unwrap();
        self.config.mark_loaded();
        settle().await;
        self
    }
}
