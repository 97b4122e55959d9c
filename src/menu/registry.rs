use super::formats::ROOT_ID;
use crate::host::{MenuHost, MenuItemDescriptor, MenuUpdate};
use crate::relay::Relay;
use anyhow::Result;
use std::sync::Arc;

/// Registers menu items with the host and mirrors each change to the peers.
/// Host failures propagate; peer failures never do.
pub struct MenuRegistry {
    menus: Arc<dyn MenuHost>,
    relay: Relay,
}

impl MenuRegistry {
    pub fn new(menus: Arc<dyn MenuHost>, relay: Relay) -> Self {
        Self { menus, relay }
    }

    pub async fn create_entry(&self, item: &MenuItemDescriptor, root_title: &str) -> Result<()> {
        self.menus.create(item).await?;
        self.relay.menu_created(item, ROOT_ID, root_title);
        Ok(())
    }

    pub async fn remove_entry(&self, id: &str) -> Result<()> {
        self.menus.remove(id).await?;
        self.relay.menu_removed(id);
        Ok(())
    }

    pub async fn update_entry(&self, id: &str, update: &MenuUpdate) -> Result<()> {
        self.menus.update(id, update).await?;
        self.menus.refresh().await?;
        self.relay.menu_updated(id, update);
        Ok(())
    }
}
