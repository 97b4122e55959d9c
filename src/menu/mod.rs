pub mod controller;
pub mod debounce;
pub mod formats;
pub mod registry;
pub mod router;
pub mod visibility;

pub use controller::ContextMenuController;
pub use debounce::Debouncer;
pub use formats::{format_item_id, resolve_format, FormatSynchronizer, FORMAT_ID_PREFIX, ROOT_ID};
pub use registry::MenuRegistry;
pub use visibility::{RootEntry, RootState};
