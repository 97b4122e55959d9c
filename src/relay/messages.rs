/// Tree Style Tab API.
pub mod tst {
    pub const ID: &str = "treestyletab@piro.sakura.ne.jp";

    pub const CONTEXT_MENU_CREATE: &str = "fake-contextMenu-create";
    pub const CONTEXT_MENU_REMOVE: &str = "fake-contextMenu-remove";
    pub const CONTEXT_MENU_UPDATE: &str = "fake-contextMenu-update";
    pub const CONTEXT_MENU_CLICK: &str = "fake-contextMenu-click";
    pub const CONTEXT_MENU_SHOWN: &str = "fake-contextMenu-shown";
}

/// Multiple Tab Handler API.
pub mod mth {
    pub const ID: &str = "multipletab@piro.sakura.ne.jp";

    pub const ADD_SELECTED_TAB_COMMAND: &str = "add-selected-tab-command";
    pub const REMOVE_SELECTED_TAB_COMMAND: &str = "remove-selected-tab-command";
    pub const INVOKE_SELECTED_TAB_COMMAND: &str = "invoke-selected-tab-command";
}
