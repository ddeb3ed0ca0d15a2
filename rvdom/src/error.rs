use thiserror::Error;

use crate::element::ElementId;

/// Errors raised by a host document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The handle does not refer to an element in the document.
    #[error("element {0} is not part of the document")]
    UnknownElement(ElementId),

    /// The element is not attached to a parent node.
    #[error("element {0} has no parent node")]
    DetachedElement(ElementId),

    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("element {element} is not wrapped by {wrapper}")]
    NotWrapped {
        element: ElementId,
        wrapper: ElementId,
    },

    /// Slides schedule their timers on the ambient tokio runtime.
    #[error("no tokio runtime is running")]
    NoRuntime,
}
