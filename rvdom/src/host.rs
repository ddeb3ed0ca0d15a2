//! The visual-state contract the slide engine and widgets are written
//! against.

use std::sync::Arc;

use crate::element::ElementId;
use crate::error::DomError;
use crate::types::{Display, StylePatch};

/// Registration handle returned by the listener methods of [`Host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// A pointer activation delivered to click listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    target: ElementId,
    default_prevented: bool,
}

impl ClickEvent {
    pub fn new(target: ElementId) -> Self {
        Self {
            target,
            default_prevented: false,
        }
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    /// Suppress the host's default action (e.g. following a link).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub type ClickListener = Arc<dyn Fn(&mut ClickEvent) + Send + Sync>;

/// Called with the new viewport width.
pub type ResizeListener = Arc<dyn Fn(u32) + Send + Sync>;

/// A host environment able to measure and restyle elements.
///
/// Style writes are batched by the host until the next layout read or
/// [`Host::reflow`]; a timed transition only runs when the start value was
/// flushed before the end value was written.
pub trait Host: Send + Sync {
    /// Resolve a selector against the whole document, in document order.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>, DomError>;

    fn contains(&self, el: ElementId) -> bool;

    fn parent(&self, el: ElementId) -> Result<Option<ElementId>, DomError>;

    /// Rendered border-box height at the current instant.
    fn offset_height(&self, el: ElementId) -> Result<f32, DomError>;

    /// The element's own computed display mode.
    fn computed_display(&self, el: ElementId) -> Result<Display, DomError>;

    fn set_style(&self, el: ElementId, patch: StylePatch) -> Result<(), DomError>;

    /// Force a synchronous style recalculation.
    fn reflow(&self, el: ElementId) -> Result<(), DomError>;

    fn add_class(&self, el: ElementId, class: &str) -> Result<(), DomError>;

    fn remove_class(&self, el: ElementId, class: &str) -> Result<(), DomError>;

    fn has_class(&self, el: ElementId, class: &str) -> Result<bool, DomError>;

    fn set_attribute(&self, el: ElementId, name: &str, value: &str) -> Result<(), DomError>;

    /// Detach the element and its subtree from the document.
    fn remove_element(&self, el: ElementId) -> Result<(), DomError>;

    /// Put a new `div` in the element's place and move the element into
    /// it. Returns the wrapper.
    fn wrap_element(&self, el: ElementId) -> Result<ElementId, DomError>;

    /// Move the children of `wrapper` back into its place and drop it.
    fn unwrap_element(&self, el: ElementId, wrapper: ElementId) -> Result<(), DomError>;

    fn viewport_width(&self) -> u32;

    fn add_click_listener(
        &self,
        el: ElementId,
        listener: ClickListener,
    ) -> Result<ListenerId, DomError>;

    fn add_resize_listener(&self, listener: ResizeListener) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);
}
