use std::collections::BTreeMap;

use crate::types::{Display, Edges};

/// Template for an element subtree, mounted with [`crate::Document::mount`].
#[derive(Debug, Clone)]
pub struct Element {
    // Identity
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,

    // Stylesheet values (what remains once inline overrides are removed)
    pub display: Display,
    pub padding: Edges,
    pub margin: Edges,

    /// Height of the element's own content, excluding padding and children.
    pub content_height: f32,

    pub children: Vec<Element>,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            tag: "div".into(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            display: Display::Block,
            padding: Edges::default(),
            margin: Edges::default(),
            content_height: 0.0,
            children: Vec::new(),
        }
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn div() -> Self {
        Self::new("div")
    }

    pub fn button() -> Self {
        Self {
            tag: "button".into(),
            display: Display::InlineBlock,
            ..Default::default()
        }
    }

    pub fn link() -> Self {
        Self {
            tag: "a".into(),
            display: Display::Inline,
            ..Default::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn display(mut self, display: Display) -> Self {
        self.display = display;
        self
    }

    pub fn hidden(self) -> Self {
        self.display(Display::None)
    }

    pub fn padding(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    pub fn margin(mut self, margin: Edges) -> Self {
        self.margin = margin;
        self
    }

    pub fn content_height(mut self, px: f32) -> Self {
        self.content_height = px;
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }
}
