//! Prelude module for convenient imports.
//!
//! ```ignore
//! use rvbutton::prelude::*;
//! ```

pub use crate::button::{Phase, RvButton, Targets};
pub use crate::config::{Config, Icon, IconPosition, OptionsOverride};
pub use crate::error::ToggleError;
pub use crate::events::{Gate, GateFuture, HookError, Notify, gate_hook, proceed};
pub use crate::group::RvGroup;

// Host side
pub use rvdom::{Document, Element, ElementId, Host};
