use std::time::Duration;

/// Box property a transition animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionProperty {
    Height,
    Margin,
    Padding,
}

/// A timed, linear transition over a set of box properties.
///
/// Equivalent to an inline `transition-property` / `transition-duration`
/// pair. Only linear timing exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub properties: Vec<TransitionProperty>,
    pub duration: Duration,
}

impl Transition {
    pub fn new(duration: Duration) -> Self {
        Self {
            properties: Vec::new(),
            duration,
        }
    }

    pub fn height(self) -> Self {
        self.property(TransitionProperty::Height)
    }

    pub fn margin(self) -> Self {
        self.property(TransitionProperty::Margin)
    }

    pub fn padding(self) -> Self {
        self.property(TransitionProperty::Padding)
    }

    fn property(mut self, property: TransitionProperty) -> Self {
        if !self.properties.contains(&property) {
            self.properties.push(property);
        }
        self
    }

    /// Height, margin and padding: everything a slide moves.
    pub fn block_size(duration: Duration) -> Self {
        Self::new(duration).height().margin().padding()
    }

    pub fn applies_to(&self, property: TransitionProperty) -> bool {
        self.properties.contains(&property)
    }

    /// Linear progress (0.0 to 1.0) after `elapsed`.
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        }
    }
}
