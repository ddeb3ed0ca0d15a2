//! In-memory host document.
//!
//! Models just enough of a rendering engine for disclosure widgets: a node
//! tree, stylesheet plus inline styles, block-axis layout and linear height
//! transitions driven by the tokio clock.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use tokio::time::Instant;

use crate::element::{Element, ElementId};
use crate::error::DomError;
use crate::host::{ClickEvent, ClickListener, Host, ListenerId, ResizeListener};
use crate::selector::Selector;
use crate::transitions::{Transition, TransitionProperty};
use crate::types::{BoxSizing, Display, Edges, InlineStyle, StylePatch};

#[derive(Debug, Clone)]
struct HeightAnimation {
    from: f32,
    to: f32,
    start: Instant,
    transition: Transition,
}

impl HeightAnimation {
    fn value_at(&self, now: Instant) -> f32 {
        let t = self
            .transition
            .progress(now.saturating_duration_since(self.start));
        self.from + (self.to - self.from) * t
    }
}

#[derive(Debug)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,

    sheet_display: Display,
    sheet_padding: Edges,
    sheet_margin: Edges,
    content_height: f32,

    inline: InlineStyle,
    /// Explicit height as of the last style recalculation.
    committed_height: Option<f32>,
    /// Set by the first style write after a recalculation.
    dirty_since: Option<Instant>,
    animation: Option<HeightAnimation>,
}

impl Node {
    fn from_template(template: &Element, parent: Option<ElementId>) -> Self {
        Self {
            tag: template.tag.clone(),
            id: template.id.clone(),
            classes: template.classes.clone(),
            attributes: template.attributes.clone(),
            parent,
            children: Vec::new(),
            sheet_display: template.display,
            sheet_padding: template.padding,
            sheet_margin: template.margin,
            content_height: template.content_height,
            inline: InlineStyle::default(),
            committed_height: None,
            dirty_since: None,
            animation: None,
        }
    }

    fn display(&self) -> Display {
        self.inline.display.unwrap_or(self.sheet_display)
    }

    fn padding_total(&self) -> f32 {
        self.inline
            .padding
            .map(|p| p * 2.0)
            .unwrap_or_else(|| self.sheet_padding.total())
    }

    fn margin_total(&self) -> f32 {
        self.inline
            .margin
            .map(|m| m * 2.0)
            .unwrap_or_else(|| self.sheet_margin.total())
    }

    /// Apply batched style writes, starting a height transition when an
    /// explicit height changes under an active height transition.
    fn recalc(&mut self) {
        let Some(since) = self.dirty_since.take() else {
            return;
        };

        let target = self.inline.height;
        let transition = self
            .inline
            .transition
            .clone()
            .filter(|t| t.applies_to(TransitionProperty::Height) && !t.duration.is_zero());

        match (self.committed_height, target, transition) {
            (Some(prev), Some(next), Some(transition))
                if prev != next && !self.display().is_none() =>
            {
                // Interrupted transitions continue from where they are.
                let from = self
                    .animation
                    .as_ref()
                    .map(|a| a.value_at(since))
                    .unwrap_or(prev);
                self.animation = Some(HeightAnimation {
                    from,
                    to: next,
                    start: since,
                    transition,
                });
            }
            (Some(prev), Some(next), Some(_)) if prev == next => {}
            _ => self.animation = None,
        }

        self.committed_height = target;
    }
}

enum Registered {
    Click(ElementId, ClickListener),
    Resize(ResizeListener),
}

struct Inner {
    nodes: HashMap<ElementId, Node>,
    root: ElementId,
    next_id: u64,
    viewport_width: u32,
    listeners: Vec<(ListenerId, Registered)>,
    next_listener: u64,
}

impl Inner {
    fn node(&self, el: ElementId) -> Result<&Node, DomError> {
        self.nodes.get(&el).ok_or(DomError::UnknownElement(el))
    }

    fn node_mut(&mut self, el: ElementId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(&el).ok_or(DomError::UnknownElement(el))
    }

    fn insert(&mut self, template: &Element, parent: ElementId) -> ElementId {
        let id = ElementId::from_raw(self.next_id);
        self.next_id += 1;

        self.nodes
            .insert(id, Node::from_template(template, Some(parent)));
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.push(id);
        }

        for child in &template.children {
            self.insert(child, id);
        }
        id
    }

    fn is_hidden(&self, el: ElementId) -> Result<bool, DomError> {
        let mut current = Some(el);
        while let Some(id) = current {
            let node = self.node(id)?;
            if node.display().is_none() {
                return Ok(true);
            }
            current = node.parent;
        }
        Ok(false)
    }

    fn offset_height(&mut self, el: ElementId, now: Instant) -> Result<f32, DomError> {
        if self.is_hidden(el)? {
            return Ok(0.0);
        }

        let node = self.node_mut(el)?;
        node.recalc();
        let padding = node.padding_total();

        if let Some(explicit) = node.inline.height {
            let height = node
                .animation
                .as_ref()
                .map(|a| a.value_at(now))
                .unwrap_or(explicit);
            return Ok(match node.inline.box_sizing.unwrap_or_default() {
                BoxSizing::BorderBox => height.max(padding),
                BoxSizing::ContentBox => height + padding,
            });
        }

        let mut content = node.content_height;
        let children = node.children.clone();
        for child in children {
            let (hidden, margin) = {
                let child_node = self.node(child)?;
                (child_node.display().is_none(), child_node.margin_total())
            };
            if hidden {
                continue;
            }
            content += self.offset_height(child, now)? + margin;
        }

        Ok(content + padding)
    }

    fn collect_subtree(&self, el: ElementId, out: &mut Vec<ElementId>) {
        out.push(el);
        if let Some(node) = self.nodes.get(&el) {
            for child in &node.children {
                self.collect_subtree(*child, out);
            }
        }
    }

    fn document_order(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect_subtree(self.root, &mut out);
        out
    }

    fn add_listener(&mut self, registered: Registered) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, registered));
        id
    }
}

/// An in-memory [`Host`] implementation.
pub struct Document {
    inner: Mutex<Inner>,
}

impl Document {
    /// Create an empty document with a `body` root.
    pub fn new(viewport_width: u32) -> Self {
        let root = ElementId::from_raw(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::from_template(&Element::new("body"), None));

        Self {
            inner: Mutex::new(Inner {
                nodes,
                root,
                next_id: 1,
                viewport_width,
                listeners: Vec::new(),
                next_listener: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn body(&self) -> ElementId {
        self.lock().root
    }

    /// Mount a template subtree as the last child of `parent`.
    pub fn mount(&self, parent: ElementId, template: Element) -> Result<ElementId, DomError> {
        let mut inner = self.lock();
        inner.node(parent)?;
        Ok(inner.insert(&template, parent))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        let inner = self.lock();
        inner
            .document_order()
            .into_iter()
            .find(|el| inner.nodes.get(el).and_then(|n| n.id.as_deref()) == Some(id))
    }

    pub fn inline_style(&self, el: ElementId) -> Result<InlineStyle, DomError> {
        Ok(self.lock().node(el)?.inline.clone())
    }

    pub fn classes(&self, el: ElementId) -> Result<Vec<String>, DomError> {
        Ok(self.lock().node(el)?.classes.clone())
    }

    pub fn attribute(&self, el: ElementId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.lock().node(el)?.attributes.get(name).cloned())
    }

    pub fn children(&self, el: ElementId) -> Result<Vec<ElementId>, DomError> {
        Ok(self.lock().node(el)?.children.clone())
    }

    /// Whether the element or an ancestor has display `none`.
    pub fn is_hidden(&self, el: ElementId) -> Result<bool, DomError> {
        self.lock().is_hidden(el)
    }

    /// Number of registered listeners of any kind.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Dispatch a pointer activation to the element's click listeners.
    ///
    /// Returns `true` if a listener prevented the default action.
    pub fn click(&self, el: ElementId) -> Result<bool, DomError> {
        let listeners: Vec<ClickListener> = {
            let inner = self.lock();
            inner.node(el)?;
            inner
                .listeners
                .iter()
                .filter_map(|(_, registered)| match registered {
                    Registered::Click(target, listener) if *target == el => Some(listener.clone()),
                    _ => None,
                })
                .collect()
        };

        log::trace!("[dom] click on {} ({} listeners)", el, listeners.len());
        let mut event = ClickEvent::new(el);
        for listener in listeners {
            listener(&mut event);
        }
        Ok(event.default_prevented())
    }

    /// Change the viewport width and notify resize listeners.
    pub fn resize(&self, width: u32) {
        let listeners: Vec<ResizeListener> = {
            let mut inner = self.lock();
            inner.viewport_width = width;
            inner
                .listeners
                .iter()
                .filter_map(|(_, registered)| match registered {
                    Registered::Resize(listener) => Some(listener.clone()),
                    _ => None,
                })
                .collect()
        };

        log::trace!("[dom] viewport resized to {width}");
        for listener in listeners {
            listener(width);
        }
    }
}

impl Host for Document {
    fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>, DomError> {
        let selector = Selector::parse(selector)?;
        let inner = self.lock();
        Ok(inner
            .document_order()
            .into_iter()
            .filter(|el| el != &inner.root)
            .filter(|el| {
                inner.nodes.get(el).is_some_and(|node| {
                    selector.matches(&node.tag, node.id.as_deref(), &node.classes)
                })
            })
            .collect())
    }

    fn contains(&self, el: ElementId) -> bool {
        self.lock().nodes.contains_key(&el)
    }

    fn parent(&self, el: ElementId) -> Result<Option<ElementId>, DomError> {
        Ok(self.lock().node(el)?.parent)
    }

    fn offset_height(&self, el: ElementId) -> Result<f32, DomError> {
        self.lock().offset_height(el, Instant::now())
    }

    fn computed_display(&self, el: ElementId) -> Result<Display, DomError> {
        Ok(self.lock().node(el)?.display())
    }

    fn set_style(&self, el: ElementId, patch: StylePatch) -> Result<(), DomError> {
        let mut inner = self.lock();
        let node = inner.node_mut(el)?;
        node.inline.apply(patch);
        node.dirty_since.get_or_insert_with(Instant::now);
        Ok(())
    }

    fn reflow(&self, el: ElementId) -> Result<(), DomError> {
        let mut inner = self.lock();
        inner.node(el)?;
        for node in inner.nodes.values_mut() {
            node.recalc();
        }
        Ok(())
    }

    fn add_class(&self, el: ElementId, class: &str) -> Result<(), DomError> {
        let mut inner = self.lock();
        let node = inner.node_mut(el)?;
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&self, el: ElementId, class: &str) -> Result<(), DomError> {
        let mut inner = self.lock();
        inner.node_mut(el)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn has_class(&self, el: ElementId, class: &str) -> Result<bool, DomError> {
        Ok(self.lock().node(el)?.classes.iter().any(|c| c == class))
    }

    fn set_attribute(&self, el: ElementId, name: &str, value: &str) -> Result<(), DomError> {
        let mut inner = self.lock();
        inner
            .node_mut(el)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_element(&self, el: ElementId) -> Result<(), DomError> {
        let mut inner = self.lock();
        let parent = inner.node(el)?.parent.ok_or(DomError::DetachedElement(el))?;
        if let Some(parent) = inner.nodes.get_mut(&parent) {
            parent.children.retain(|child| *child != el);
        }

        let mut subtree = Vec::new();
        inner.collect_subtree(el, &mut subtree);
        for id in &subtree {
            inner.nodes.remove(id);
        }
        inner.listeners.retain(|(_, registered)| match registered {
            Registered::Click(target, _) => !subtree.contains(target),
            Registered::Resize(_) => true,
        });

        log::trace!("[dom] removed {} ({} nodes)", el, subtree.len());
        Ok(())
    }

    fn wrap_element(&self, el: ElementId) -> Result<ElementId, DomError> {
        let mut inner = self.lock();
        let parent = inner.node(el)?.parent.ok_or(DomError::DetachedElement(el))?;

        let wrapper = ElementId::from_raw(inner.next_id);
        inner.next_id += 1;
        let mut node = Node::from_template(&Element::div(), Some(parent));
        node.children.push(el);
        inner.nodes.insert(wrapper, node);

        if let Some(slot) = inner
            .node_mut(parent)?
            .children
            .iter_mut()
            .find(|child| **child == el)
        {
            *slot = wrapper;
        }
        inner.node_mut(el)?.parent = Some(wrapper);

        log::trace!("[dom] wrapped {} in {}", el, wrapper);
        Ok(wrapper)
    }

    fn unwrap_element(&self, el: ElementId, wrapper: ElementId) -> Result<(), DomError> {
        let mut inner = self.lock();
        if inner.node(el)?.parent != Some(wrapper) {
            return Err(DomError::NotWrapped {
                element: el,
                wrapper,
            });
        }
        let parent = inner
            .node(wrapper)?
            .parent
            .ok_or(DomError::DetachedElement(wrapper))?;

        let children = inner.node(wrapper)?.children.clone();
        for child in &children {
            inner.node_mut(*child)?.parent = Some(parent);
        }
        let siblings = &mut inner.node_mut(parent)?.children;
        if let Some(index) = siblings.iter().position(|child| *child == wrapper) {
            siblings.splice(index..=index, children);
        }

        inner.nodes.remove(&wrapper);
        inner.listeners.retain(|(_, registered)| match registered {
            Registered::Click(target, _) => *target != wrapper,
            Registered::Resize(_) => true,
        });

        log::trace!("[dom] unwrapped {} from {}", el, wrapper);
        Ok(())
    }

    fn viewport_width(&self) -> u32 {
        self.lock().viewport_width
    }

    fn add_click_listener(
        &self,
        el: ElementId,
        listener: ClickListener,
    ) -> Result<ListenerId, DomError> {
        let mut inner = self.lock();
        inner.node(el)?;
        Ok(inner.add_listener(Registered::Click(el, listener)))
    }

    fn add_resize_listener(&self, listener: ResizeListener) -> ListenerId {
        self.lock().add_listener(Registered::Resize(listener))
    }

    fn remove_listener(&self, id: ListenerId) {
        self.lock().listeners.retain(|(listener, _)| *listener != id);
    }
}
