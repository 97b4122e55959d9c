use super::debounce::{Debouncer, REFRESH_DELAY};
use super::formats::{resolve_format, FormatSynchronizer, FORMAT_ID_PREFIX, ROOT_ID};
use super::registry::MenuRegistry;
use super::router::MessageRouter;
use super::visibility::{RootEntry, RootState, PLURAL_LABEL_KEY};
use crate::config::{ConfigStore, FORMATS_KEY};
use crate::host::{ClickInfo, HostPorts, Localizer, MenuItemDescriptor, Tab, TabCommands, TabsHost};
use crate::relay::{inbound_router, InboundCommand, Relay};
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Owns the "copy tabs" root item, its per-format children and the peer relay.
pub struct ContextMenuController {
    registry: Arc<MenuRegistry>,
    formats: FormatSynchronizer,
    root: RootEntry,
    root_item: MenuItemDescriptor,
    config: Arc<ConfigStore>,
    commands: Arc<dyn TabCommands>,
    tabs: Arc<dyn TabsHost>,
    i18n: Arc<dyn Localizer>,
    router: MessageRouter<InboundCommand>,
    debouncer: Debouncer,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    initialized: AtomicBool,
}

impl ContextMenuController {
    pub fn new(ports: HostPorts, config: Arc<ConfigStore>) -> Arc<Self> {
        let relay = Relay::new(ports.messenger);
        let registry = Arc::new(MenuRegistry::new(ports.menus, relay));
        let title = ports.i18n.message(PLURAL_LABEL_KEY);

        let root_item = MenuItemDescriptor {
            id: ROOT_ID.to_string(),
            parent_id: None,
            kind: Some("normal".to_string()),
            title: title.clone(),
            visible: true,
            contexts: Some(vec!["tab".to_string(), "page".to_string()]),
            icons: ports.icons,
        };

        Arc::new(Self {
            formats: FormatSynchronizer::new(Arc::clone(&registry), Arc::clone(&config)),
            registry,
            root: RootEntry::new(RootState { visible: true, title }),
            root_item,
            config,
            commands: ports.commands,
            tabs: ports.tabs,
            i18n: ports.i18n,
            router: inbound_router(),
            debouncer: Debouncer::new(REFRESH_DELAY),
            tasks: Mutex::new(Vec::new()),
            initialized: AtomicBool::new(false),
        })
    }

    /// Registers the root item, then builds the format items once settings
    /// have loaded and rebuilds them (debounced) whenever the format list changes.
    pub async fn init(self: &Arc<Self>) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            log::warn!("Context menu already initialized");
            return Ok(());
        }

        self.registry
            .create_entry(&self.root_item, &self.root_item.title)
            .await
            .context("Failed to register root menu item")?;

        let weak = Arc::downgrade(self);
        let config = Arc::clone(&self.config);
        let initial = tokio::spawn(async move {
            config.loaded().await;
            if let Some(controller) = weak.upgrade() {
                controller.refresh_format_items().await;
            }
        });

        let observer = tokio::spawn(observe_format_changes(
            Arc::downgrade(self),
            self.config.subscribe(),
        ));

        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend([initial, observer]);

        log::info!("Context menu initialized");
        Ok(())
    }

    pub fn shutdown(&self) {
        self.debouncer.cancel();
        for task in self.tasks.lock().unwrap_or_else(PoisonError::into_inner).drain(..) {
            task.abort();
        }
        log::info!("Context menu shut down");
    }

    pub fn format_item_ids(&self) -> Vec<String> {
        self.formats.ids()
    }

    pub fn root_state(&self) -> RootState {
        self.root.current()
    }

    pub async fn refresh_format_items(&self) {
        if let Err(e) = self.formats.refresh(&self.root.title()).await {
            log::warn!("Failed to rebuild clipboard format items: {:#}", e);
        }
    }

    fn reserve_refresh(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.debouncer.schedule(async move {
            if let Some(controller) = weak.upgrade() {
                controller.refresh_format_items().await;
            }
        });
    }

    pub async fn on_shown(&self, info: &Value, tab: Option<&Tab>) -> Result<()> {
        log::debug!("Context menu shown: {} {:?}", info, tab);
        let tabs = self.commands.get_multiselected_tabs(tab).await?;
        let show_for_single_tab = self.config.settings().show_context_command_for_single_tab;

        let next = RootState::compute(
            self.formats.count(),
            tabs.len(),
            show_for_single_tab,
            self.i18n.as_ref(),
        );
        let Some(update) = self.root.transition(next) else {
            return Ok(());
        };

        self.registry.update_entry(ROOT_ID, &update).await
    }

    /// Copies the selected tabs with the clicked item's format. `selection`
    /// overrides the host lookup when a peer already resolved the tabs.
    pub async fn on_click(
        &self,
        info: &ClickInfo,
        tab: Option<&Tab>,
        selection: Option<Vec<Tab>>,
    ) -> Result<()> {
        log::debug!("Context menu item clicked: {:?} {:?}", info, tab);
        if !info.menu_item_id.starts_with(FORMAT_ID_PREFIX) {
            return Ok(());
        }

        let settings = self.config.settings();
        let format = resolve_format(&info.menu_item_id, &settings.copy_to_clipboard_formats)
            .with_context(|| format!("No clipboard format for menu item {}", info.menu_item_id))?
            .to_string();

        let tabs = match selection {
            Some(tabs) => tabs,
            None => self.commands.get_multiselected_tabs(tab).await?,
        };
        log::debug!("Tabs: {:?}", tabs);

        self.commands.copy_to_clipboard(&tabs, &format).await?;

        if settings.clear_selection_after_command_invoked && tabs.len() > 1 {
            if let Some(active) = tabs.iter().find(|t| t.active) {
                self.tabs.highlight(active.window_id, &[active.index]).await?;
            }
        }
        Ok(())
    }

    /// `None` when the sender or message type is not one this extension handles.
    pub async fn on_message_external(&self, sender: &str, message: &Value) -> Option<Result<()>> {
        log::debug!("External message from {}: {}", sender, message);
        let command = match self.router.route(sender, message)? {
            Ok(command) => command,
            Err(e) => return Some(Err(e)),
        };

        let result = match command {
            InboundCommand::Click { info, tab, selection } => {
                self.on_click(&info, tab.as_ref(), selection).await
            }
            InboundCommand::Shown { info, tab } => self.on_shown(&info, tab.as_ref()).await,
        };
        Some(result)
    }
}

async fn observe_format_changes(
    controller: Weak<ContextMenuController>,
    changes: tokio::sync::broadcast::Receiver<String>,
) {
    let mut changes = BroadcastStream::new(changes);
    while let Some(change) = changes.next().await {
        let Some(controller) = controller.upgrade() else {
            break;
        };
        match change {
            Ok(key) if key == FORMATS_KEY => controller.reserve_refresh(),
            Ok(_) => {}
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                log::debug!("Missed {} setting changes, rebuilding format items", skipped);
                controller.reserve_refresh();
            }
        }
    }
}
