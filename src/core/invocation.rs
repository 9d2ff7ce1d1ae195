/// How the tool was entered
///
/// The host launches us with the code of the command the user picked. That
/// code decides which screen to show, so it travels as a value instead of
/// living in process-wide state.

use crate::config::{COMMAND_PREFIX, SETTINGS_CODE};

/// Registry code for a tracked item
pub fn feature_code(item_id: &str) -> String {
    format!("{}{}", COMMAND_PREFIX, item_id)
}

/// Item id behind a registry code, if the code is one of ours
pub fn item_id(code: &str) -> Option<&str> {
    code.strip_prefix(COMMAND_PREFIX).filter(|id| !id.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Manage which items get commands
    Settings,
    /// Browse recent documents of one item
    Search { item_id: String },
}

impl Invocation {
    /// Interpret a command code handed over by the host
    pub fn from_code(code: &str) -> Option<Self> {
        if code == SETTINGS_CODE {
            return Some(Invocation::Settings);
        }

        item_id(code).map(|id| Invocation::Search {
            item_id: id.to_string(),
        })
    }
}
