use super::{BoxSizing, Display, Overflow};
use crate::transitions::Transition;

/// One inline property write: leave it, assign it, or remove it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T> Patch<T> {
    fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Set(value) => *slot = Some(value),
            Patch::Clear => *slot = None,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }
}

/// Inline style overrides currently set on an element.
///
/// `padding` and `margin` are block-axis values applied to both the top
/// and bottom edge.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InlineStyle {
    pub display: Option<Display>,
    pub box_sizing: Option<BoxSizing>,
    pub overflow: Option<Overflow>,
    pub height: Option<f32>,
    pub padding: Option<f32>,
    pub margin: Option<f32>,
    pub transition: Option<Transition>,
}

impl InlineStyle {
    pub fn apply(&mut self, patch: StylePatch) {
        patch.display.apply_to(&mut self.display);
        patch.box_sizing.apply_to(&mut self.box_sizing);
        patch.overflow.apply_to(&mut self.overflow);
        patch.height.apply_to(&mut self.height);
        patch.padding.apply_to(&mut self.padding);
        patch.margin.apply_to(&mut self.margin);
        patch.transition.apply_to(&mut self.transition);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A batch of inline style writes applied in one call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StylePatch {
    pub display: Patch<Display>,
    pub box_sizing: Patch<BoxSizing>,
    pub overflow: Patch<Overflow>,
    pub height: Patch<f32>,
    pub padding: Patch<f32>,
    pub margin: Patch<f32>,
    pub transition: Patch<Transition>,
}

impl StylePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(mut self, display: Display) -> Self {
        self.display = Patch::Set(display);
        self
    }

    pub fn clear_display(mut self) -> Self {
        self.display = Patch::Clear;
        self
    }

    pub fn box_sizing(mut self, box_sizing: BoxSizing) -> Self {
        self.box_sizing = Patch::Set(box_sizing);
        self
    }

    pub fn clear_box_sizing(mut self) -> Self {
        self.box_sizing = Patch::Clear;
        self
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = Patch::Set(overflow);
        self
    }

    pub fn clear_overflow(mut self) -> Self {
        self.overflow = Patch::Clear;
        self
    }

    pub fn height(mut self, px: f32) -> Self {
        self.height = Patch::Set(px);
        self
    }

    pub fn clear_height(mut self) -> Self {
        self.height = Patch::Clear;
        self
    }

    pub fn padding(mut self, px: f32) -> Self {
        self.padding = Patch::Set(px);
        self
    }

    pub fn clear_padding(mut self) -> Self {
        self.padding = Patch::Clear;
        self
    }

    pub fn margin(mut self, px: f32) -> Self {
        self.margin = Patch::Set(px);
        self
    }

    pub fn clear_margin(mut self) -> Self {
        self.margin = Patch::Clear;
        self
    }

    pub fn transition(mut self, transition: Transition) -> Self {
        self.transition = Patch::Set(transition);
        self
    }

    pub fn clear_transition(mut self) -> Self {
        self.transition = Patch::Clear;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
