pub mod document;
pub mod element;
pub mod error;
pub mod host;
pub mod selector;
pub mod slide;
pub mod transitions;
pub mod types;

pub use document::Document;
pub use element::{Element, ElementId};
pub use error::DomError;
pub use host::{ClickEvent, ClickListener, Host, ListenerId, ResizeListener};
pub use slide::{
    SlideDirection, SlideEngine, SlideTransition, TransitionOutcome, DEFAULT_DURATION,
};
pub use transitions::{Transition, TransitionProperty};
pub use types::*;
