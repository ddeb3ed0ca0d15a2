mod edges;
mod enums;
mod style;

pub use edges::Edges;
pub use enums::{BoxSizing, Display, Overflow};
pub use style::{InlineStyle, Patch, StylePatch};
