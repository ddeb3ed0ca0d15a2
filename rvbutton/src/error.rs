use rvdom::DomError;
use thiserror::Error;

use crate::events::HookError;

/// Errors surfaced by a toggle controller.
#[derive(Debug, Error)]
pub enum ToggleError {
    /// A `beforeOpen`/`beforeClose` hook rejected; the sequence was aborted
    /// before the open state changed.
    #[error("lifecycle hook rejected: {0}")]
    Hook(#[from] HookError),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
