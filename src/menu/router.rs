use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;

pub type MessageHandler<T> = Box<dyn Fn(&Value) -> Result<T> + Send + Sync>;

pub struct MessageRoute<T> {
    pub sender: String,
    pub message_type: String,
    pub handler: MessageHandler<T>,
}

impl<T> MessageRoute<T> {
    pub fn new(
        sender: impl Into<String>,
        message_type: impl Into<String>,
        handler: impl Fn(&Value) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            sender: sender.into(),
            message_type: message_type.into(),
            handler: Box::new(handler),
        }
    }
}

/// Dispatches by sender identity, then by the message's `type` field.
pub struct MessageRouter<T> {
    routes: HashMap<String, HashMap<String, MessageHandler<T>>>,
}

impl<T> MessageRouter<T> {
    pub fn new(routes: Vec<MessageRoute<T>>) -> Self {
        let mut table: HashMap<String, HashMap<String, MessageHandler<T>>> = HashMap::new();
        for route in routes {
            let by_type = table.entry(route.sender).or_default();
            if by_type.contains_key(&route.message_type) {
                log::warn!("Duplicate route for message type: {}", route.message_type);
                continue;
            }
            by_type.insert(route.message_type, route.handler);
        }
        Self { routes: table }
    }

    /// `None` means "not handled here", leaving the message to other listeners.
    pub fn route(&self, sender: &str, message: &Value) -> Option<Result<T>> {
        let message_type = message.get("type")?.as_str()?;

        let Some(by_type) = self.routes.get(sender) else {
            log::debug!("No routes for sender: {}", sender);
            return None;
        };
        let Some(handler) = by_type.get(message_type) else {
            log::debug!("No route for {} message: {}", sender, message_type);
            return None;
        };

        Some(handler(message))
    }
}
