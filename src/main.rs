use anyhow::Result;
use std::sync::Arc;
use tab_clipboard_menu::config::ConfigStore;
use tab_clipboard_menu::host::stdio::{HostEvent, StdioHost};
use tab_clipboard_menu::host::HostPorts;
use tab_clipboard_menu::menu::ContextMenuController;
use tab_clipboard_menu::paths;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("Starting tab clipboard menu...");

    let config = Arc::new(ConfigStore::new());
    match paths::settings_path() {
        Ok(path) => {
            if let Err(e) = config.load_from(&path) {
                log::warn!("Failed to load settings: {:#}", e);
                config.mark_loaded();
            }
        }
        Err(e) => {
            log::warn!("{}, using default settings", e);
            config.mark_loaded();
        }
    }

    let host = Arc::new(StdioHost::stdout());
    let ports = HostPorts::from_host(Arc::clone(&host)).with_icons(host.manifest_icons());
    let controller = ContextMenuController::new(ports, Arc::clone(&config));
    controller.init().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let event: HostEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Ignoring malformed host event: {}", e);
                continue;
            }
        };

        let result = match event {
            HostEvent::Shown { info, tab } => controller.on_shown(&info, tab.as_ref()).await,
            HostEvent::Clicked { info, tab } => controller.on_click(&info, tab.as_ref(), None).await,
            HostEvent::External { sender, message } => {
                match controller.on_message_external(&sender, &message).await {
                    Some(result) => result,
                    None => {
                        log::debug!("External message from {} not handled", sender);
                        Ok(())
                    }
                }
            }
            HostEvent::Select { tabs } => {
                host.set_selection(tabs);
                Ok(())
            }
            HostEvent::SetFormats { formats } => {
                config.set_formats(formats);
                Ok(())
            }
        };

        if let Err(e) = result {
            log::warn!("Host event failed: {:#}", e);
        }
    }

    controller.shutdown();
    log::info!("Input closed, exiting...");
    Ok(())
}
