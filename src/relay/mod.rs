//! Mirrors menu state to the peer extensions and decodes their inbound
//! commands.

pub mod messages;

use crate::host::{ClickInfo, MenuItemDescriptor, MenuUpdate, PeerMessenger, SendError, Tab};
use crate::menu::router::{MessageRoute, MessageRouter};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

pub use messages::{mth, tst};

/// Funnels a peer-send outcome: a missing receiver means the peer is not
/// installed or not listening yet and is not an error.
pub fn handle_missing_receiver(peer_id: &str, result: Result<(), SendError>) -> Result<(), SendError> {
    match result {
        Ok(()) | Err(SendError::ReceiverMissing) => Ok(()),
        Err(e) => {
            log::debug!("Message to {} failed: {}", peer_id, e);
            Err(e)
        }
    }
}

/// Fire-and-forget outbound channel to both peers. Each peer gets one outbox
/// drained by its own task, which keeps per-peer send order.
#[derive(Clone)]
pub struct Relay {
    outboxes: Arc<HashMap<&'static str, mpsc::UnboundedSender<Value>>>,
}

impl Relay {
    pub fn new(messenger: Arc<dyn PeerMessenger>) -> Self {
        let outboxes = [tst::ID, mth::ID]
            .into_iter()
            .map(|peer_id| (peer_id, spawn_outbox(peer_id, Arc::clone(&messenger))))
            .collect();
        Self {
            outboxes: Arc::new(outboxes),
        }
    }

    pub fn notify(&self, peer_id: &str, message: Value) {
        let Some(outbox) = self.outboxes.get(peer_id) else {
            log::debug!("No outbox for peer: {}", peer_id);
            return;
        };
        if outbox.send(message).is_err() {
            log::debug!("Outbox for {} is closed", peer_id);
        }
    }

    pub fn menu_created(&self, item: &MenuItemDescriptor, root_id: &str, root_title: &str) {
        self.notify(
            tst::ID,
            json!({ "type": tst::CONTEXT_MENU_CREATE, "params": item }),
        );

        if item.id == root_id {
            return;
        }
        match mth_command(item, root_title) {
            Ok(message) => self.notify(mth::ID, message),
            Err(e) => log::debug!("Skipping {} relay for {}: {}", mth::ID, item.id, e),
        }
    }

    pub fn menu_removed(&self, id: &str) {
        self.notify(
            tst::ID,
            json!({ "type": tst::CONTEXT_MENU_REMOVE, "params": id }),
        );
        self.notify(
            mth::ID,
            json!({ "type": mth::REMOVE_SELECTED_TAB_COMMAND, "id": id }),
        );
    }

    pub fn menu_updated(&self, id: &str, update: &MenuUpdate) {
        self.notify(
            tst::ID,
            json!({ "type": tst::CONTEXT_MENU_UPDATE, "params": [id, update] }),
        );
    }
}

fn spawn_outbox(
    peer_id: &'static str,
    messenger: Arc<dyn PeerMessenger>,
) -> mpsc::UnboundedSender<Value> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let result = messenger.send(peer_id, message).await;
            // Best effort: the failure has already been logged.
            let _ = handle_missing_receiver(peer_id, result);
        }
    });
    tx
}

fn mth_command(item: &MenuItemDescriptor, root_title: &str) -> Result<Value> {
    let mut message = serde_json::to_value(item)?;
    let fields = message
        .as_object_mut()
        .context("menu item did not serialize to an object")?;
    fields.insert("type".into(), json!(mth::ADD_SELECTED_TAB_COMMAND));
    fields.insert("title".into(), json!(format!("{}:{}", root_title, item.title)));
    Ok(message)
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundCommand {
    Click {
        info: ClickInfo,
        tab: Option<Tab>,
        selection: Option<Vec<Tab>>,
    },
    Shown {
        info: Value,
        tab: Option<Tab>,
    },
}

#[derive(Deserialize)]
struct TstClick {
    info: ClickInfo,
    #[serde(default)]
    tab: Option<Tab>,
}

#[derive(Deserialize)]
struct TstShown {
    #[serde(default)]
    info: Value,
    #[serde(default)]
    tab: Option<Tab>,
}

#[derive(Deserialize)]
struct MthInvoke {
    id: String,
    selection: MthSelection,
}

#[derive(Deserialize)]
struct MthSelection {
    #[serde(default)]
    selected: Vec<Tab>,
}

/// Routing table for messages addressed to this extension by its peers.
pub fn inbound_router() -> MessageRouter<InboundCommand> {
    MessageRouter::new(vec![
        MessageRoute::new(tst::ID, tst::CONTEXT_MENU_CLICK, |message| {
            let click: TstClick = serde_json::from_value(message.clone())?;
            Ok(InboundCommand::Click {
                info: click.info,
                tab: click.tab,
                selection: None,
            })
        }),
        MessageRoute::new(tst::ID, tst::CONTEXT_MENU_SHOWN, |message| {
            let shown: TstShown = serde_json::from_value(message.clone())?;
            Ok(InboundCommand::Shown {
                info: shown.info,
                tab: shown.tab,
            })
        }),
        MessageRoute::new(mth::ID, mth::INVOKE_SELECTED_TAB_COMMAND, |message| {
            let invoke: MthInvoke = serde_json::from_value(message.clone())?;
            Ok(InboundCommand::Click {
                info: ClickInfo::new(invoke.id),
                tab: None,
                selection: Some(invoke.selection.selected),
            })
        }),
    ])
}
