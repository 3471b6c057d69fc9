//! Change notifications

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::items::CartItem;

/// Why a cart changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeReason {
    /// Items were added
    Add,

    /// The cart was emptied
    Clear,

    /// Items were removed
    Remove,

    /// An item title changed
    Title,

    /// Items or promotions were updated
    Update,
}

impl ChangeReason {
    /// Lowercase name of the reason.
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeReason::Add => "add",
            ChangeReason::Clear => "clear",
            ChangeReason::Remove => "remove",
            ChangeReason::Title => "title",
            ChangeReason::Update => "update",
        }
    }
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback invoked after every successful cart mutation with the affected items.
pub type ChangeHandler = Box<dyn FnMut(ChangeReason, &[CartItem])>;

pub(crate) fn emit(handler: Option<&mut ChangeHandler>, reason: ChangeReason, items: &[CartItem]) {
    if let Some(handler) = handler {
        handler(reason, items);
    }
}
