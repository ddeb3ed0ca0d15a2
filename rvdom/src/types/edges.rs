/// Block-axis box edges in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: f32,
    pub bottom: f32,
}

impl Edges {
    pub const fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub const fn all(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
        }
    }

    pub const fn top(value: f32) -> Self {
        Self {
            top: value,
            bottom: 0.0,
        }
    }

    pub const fn bottom(value: f32) -> Self {
        Self {
            top: 0.0,
            bottom: value,
        }
    }

    pub fn total(&self) -> f32 {
        self.top + self.bottom
    }
}
