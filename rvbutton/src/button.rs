//! The toggle controller.
//!
//! An [`RvButton`] ties a set of trigger elements to a set of content
//! elements. Opening runs `beforeOpen` (awaited), `open`, flips the state,
//! expands every content element, updates trigger classes and icons and
//! finally publishes `afterOpen`. Closing mirrors it.
//!
//! Sequences on one controller never interleave: each `open`, `close` or
//! `toggle` waits for the previous one to finish before it starts.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use futures::future::join_all;
use rvdom::{
    ClickEvent, Display, DomError, ElementId, Host, ListenerId, SlideEngine, StylePatch,
    TransitionOutcome,
};
use tokio::sync::Mutex as SequenceLock;

use crate::config::{Config, Options};
use crate::emitter::{Handler, Subscription};
use crate::error::ToggleError;
use crate::events::{Gate, Hooks, Notify, ToggleEvent};

const CLASS_BUTTON: &str = "rv-button";
const CLASS_OPENED: &str = "opened";
const CLASS_CLOSED: &str = "closed";
const CLASS_CUSTOM_ICON: &str = "custom-icon";

/// Where a controller is in its open/close cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Opening,
    Open,
    Closing,
}

impl Phase {
    fn resting(is_open: bool) -> Self {
        if is_open { Phase::Open } else { Phase::Closed }
    }

    pub fn is_moving(self) -> bool {
        matches!(self, Phase::Opening | Phase::Closing)
    }
}

/// Elements a controller is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    Element(ElementId),
    Elements(Vec<ElementId>),
    /// Resolved against the host when the controller is built.
    Selector(String),
}

impl From<ElementId> for Targets {
    fn from(el: ElementId) -> Self {
        Targets::Element(el)
    }
}

impl From<Vec<ElementId>> for Targets {
    fn from(els: Vec<ElementId>) -> Self {
        Targets::Elements(els)
    }
}

impl From<&[ElementId]> for Targets {
    fn from(els: &[ElementId]) -> Self {
        Targets::Elements(els.to_vec())
    }
}

impl From<&str> for Targets {
    fn from(selector: &str) -> Self {
        Targets::Selector(selector.to_string())
    }
}

impl From<String> for Targets {
    fn from(selector: String) -> Self {
        Targets::Selector(selector)
    }
}

impl Targets {
    /// Resolve to elements known to `host`.
    ///
    /// Never fails: anything unusable is logged and yields an empty set.
    pub fn resolve(&self, host: &dyn Host) -> Vec<ElementId> {
        let elements = match self {
            Targets::Element(el) => vec![*el],
            Targets::Elements(els) => els.clone(),
            Targets::Selector(selector) => match host.query_selector_all(selector) {
                Ok(els) => els,
                Err(err) => {
                    log::error!("[rvbutton] {}", err);
                    Vec::new()
                }
            },
        };
        let elements: Vec<ElementId> = elements.into_iter().filter(|el| host.contains(*el)).collect();

        if elements.is_empty() {
            log::error!("[rvbutton] No element found for {:?}", self);
        }
        elements
    }
}

/// The fixed parts of one direction of the cycle.
struct Step {
    open: bool,
    gate: Gate,
    notify: Notify,
    after: Notify,
    moving: Phase,
    add: &'static str,
    remove: &'static str,
}

const OPEN: Step = Step {
    open: true,
    gate: Gate::BeforeOpen,
    notify: Notify::Open,
    after: Notify::AfterOpen,
    moving: Phase::Opening,
    add: CLASS_OPENED,
    remove: CLASS_CLOSED,
};

const CLOSE: Step = Step {
    open: false,
    gate: Gate::BeforeClose,
    notify: Notify::Close,
    after: Notify::AfterClose,
    moving: Phase::Closing,
    add: CLASS_CLOSED,
    remove: CLASS_OPENED,
};

struct State {
    triggers: Vec<ElementId>,
    options: Options,
    is_open: bool,
    is_active: bool,
    phase: Phase,
    breakpoint: Option<u32>,
    width: u32,
    clicks: Vec<ListenerId>,
    resize: Option<ListenerId>,
}

struct Inner {
    engine: SlideEngine,
    contents: Vec<ElementId>,
    config: Config,
    hooks: Hooks,
    state: Mutex<State>,
    sequence: SequenceLock<()>,
}

/// A disclosure widget controller.
///
/// Cheap to clone; clones drive the same controller.
#[derive(Clone)]
pub struct RvButton {
    inner: Arc<Inner>,
}

/// A non-owning handle to an [`RvButton`].
#[derive(Debug, Clone)]
pub struct WeakRvButton {
    inner: Weak<Inner>,
}

impl WeakRvButton {
    pub fn upgrade(&self) -> Option<RvButton> {
        self.inner.upgrade().map(|inner| RvButton { inner })
    }
}

impl PartialEq for RvButton {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for RvButton {}

impl fmt::Debug for RvButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("RvButton")
            .field("triggers", &state.triggers)
            .field("contents", &self.inner.contents)
            .field("phase", &state.phase)
            .field("is_active", &state.is_active)
            .finish()
    }
}

impl RvButton {
    /// Build a controller with its own slide engine.
    pub fn new(
        host: Arc<dyn Host>,
        triggers: impl Into<Targets>,
        contents: impl Into<Targets>,
        config: Config,
    ) -> Result<Self, ToggleError> {
        Self::with_engine(SlideEngine::new(host), triggers, contents, config)
    }

    /// Build a controller that animates through `engine`.
    ///
    /// The initial state is applied without animating.
    pub fn with_engine(
        engine: SlideEngine,
        triggers: impl Into<Targets>,
        contents: impl Into<Targets>,
        config: Config,
    ) -> Result<Self, ToggleError> {
        let host = engine.host().clone();
        let triggers = triggers.into().resolve(host.as_ref());
        let contents = contents.into().resolve(host.as_ref());

        let width = host.viewport_width();
        let breakpoint = config.breakpoint_for(width);
        let options = config.resolve_breakpoint(breakpoint);

        let hooks = Hooks::new();
        config.register_listeners(&hooks);

        let button = Self {
            inner: Arc::new(Inner {
                engine,
                contents,
                config,
                hooks,
                state: Mutex::new(State {
                    triggers,
                    is_open: options.is_open,
                    is_active: options.is_active,
                    phase: Phase::resting(options.is_open),
                    options,
                    breakpoint,
                    width,
                    clicks: Vec::new(),
                    resize: None,
                }),
                sequence: SequenceLock::new(()),
            }),
        };

        button.apply_state()?;
        button.register_dom_events()?;

        log::debug!(
            "[rvbutton] created: {} trigger(s), {} content element(s), breakpoint {:?}",
            button.state().triggers.len(),
            button.inner.contents.len(),
            breakpoint
        );
        Ok(button)
    }

    /// Build one controller per `(trigger selector, content selector)` pair.
    /// All of them share one slide engine.
    pub fn create<'a, I>(
        host: Arc<dyn Host>,
        pairs: I,
        config: Config,
    ) -> Result<Vec<RvButton>, ToggleError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let engine = SlideEngine::new(host);
        pairs
            .into_iter()
            .map(|(triggers, contents)| {
                Self::with_engine(engine.clone(), triggers, contents, config.clone())
            })
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn host(&self) -> &Arc<dyn Host> {
        self.inner.engine.host()
    }

    pub async fn open(&self) -> Result<(), ToggleError> {
        let _sequence = self.inner.sequence.lock().await;
        self.run(&OPEN).await
    }

    pub async fn close(&self) -> Result<(), ToggleError> {
        let _sequence = self.inner.sequence.lock().await;
        self.run(&CLOSE).await
    }

    /// Close if open, open otherwise. The direction is decided once any
    /// earlier sequence has finished.
    pub async fn toggle(&self) -> Result<(), ToggleError> {
        let _sequence = self.inner.sequence.lock().await;
        let step = if self.is_open() { &CLOSE } else { &OPEN };
        self.run(step).await
    }

    async fn run(&self, step: &Step) -> Result<(), ToggleError> {
        if !self.is_active() {
            log::trace!("[rvbutton] inactive, skipping {}", step.gate);
            return Ok(());
        }

        self.state().phase = step.moving;
        if let Err(err) = self.inner.hooks.gate(step.gate).await {
            log::debug!("[rvbutton] {} rejected: {}", step.gate, err);
            self.settle();
            return Err(err.into());
        }
        self.inner.hooks.notify(step.notify);

        let duration = {
            let mut state = self.state();
            state.is_open = step.open;
            state.options.duration
        };

        let result = self.animate(step, duration).await;
        self.settle();
        if result? {
            self.inner.hooks.notify(step.after);
        }
        Ok(())
    }

    /// Slide the contents and update the triggers. Returns `false` when a
    /// breakpoint change re-initialised the state in the meantime; the
    /// re-initialisation has already applied classes and icons then.
    async fn animate(&self, step: &Step, duration: Duration) -> Result<bool, DomError> {
        let engine = &self.inner.engine;
        let slides = self
            .inner
            .contents
            .iter()
            .map(|&el| {
                if step.open {
                    engine.expand(el, duration)
                } else {
                    engine.collapse(el, duration)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let superseded = join_all(slides)
            .await
            .into_iter()
            .filter(|outcome| *outcome == TransitionOutcome::Superseded)
            .count();
        if superseded > 0 {
            log::debug!("[rvbutton] {} slide(s) superseded", superseded);
        }

        let (triggers, options) = {
            let state = self.state();
            if state.is_open != step.open {
                log::debug!(
                    "[rvbutton] re-initialised during {}, leaving triggers as they are",
                    step.gate
                );
                return Ok(false);
            }
            (state.triggers.clone(), state.options.clone())
        };

        let host = self.host();
        for &trigger in &triggers {
            host.remove_class(trigger, step.remove)?;
            host.add_class(trigger, step.add)?;
        }

        if step.open && options.once {
            self.remove_triggers(duration);
        }

        update_icon(host.as_ref(), &triggers, &options, step.open)?;
        Ok(true)
    }

    fn settle(&self) {
        let mut state = self.state();
        state.phase = Phase::resting(state.is_open);
    }

    /// Detach the triggers for good: their listeners go now, the elements
    /// once they have slid away.
    fn remove_triggers(&self, duration: Duration) {
        let (triggers, clicks) = {
            let mut state = self.state();
            (
                std::mem::take(&mut state.triggers),
                std::mem::take(&mut state.clicks),
            )
        };

        let host = self.host().clone();
        for id in clicks {
            host.remove_listener(id);
        }

        let mut slides = Vec::with_capacity(triggers.len());
        for &trigger in &triggers {
            match self.inner.engine.collapse(trigger, duration) {
                Ok(slide) => slides.push(slide),
                Err(err) => {
                    log::error!("[rvbutton] could not slide trigger {} away: {}", trigger, err)
                }
            }
        }

        log::debug!("[rvbutton] removing {} trigger(s)", slides.len());
        tokio::spawn(async move {
            for slide in slides {
                let trigger = slide.element();
                if slide.await != TransitionOutcome::Completed {
                    log::debug!("[rvbutton] trigger {} kept, its slide was superseded", trigger);
                    continue;
                }
                if let Err(err) = host.remove_element(trigger) {
                    log::error!("[rvbutton] could not remove trigger {}: {}", trigger, err);
                }
            }
        });
    }

    /// Apply open/active state to the elements without animating.
    fn apply_state(&self) -> Result<(), DomError> {
        let (triggers, options, is_open, is_active) = {
            let state = self.state();
            (
                state.triggers.clone(),
                state.options.clone(),
                state.is_open,
                state.is_active,
            )
        };

        let host = self.host();
        for &content in &self.inner.contents {
            self.inner.engine.cancel(content)?;
            host.set_style(content, visibility(is_open))?;
        }

        let (add, remove) = if is_open {
            (CLASS_OPENED, CLASS_CLOSED)
        } else {
            (CLASS_CLOSED, CLASS_OPENED)
        };
        for &trigger in &triggers {
            host.add_class(trigger, CLASS_BUTTON)?;
            host.add_class(trigger, add)?;
            host.remove_class(trigger, remove)?;
            host.set_style(trigger, visibility(is_active))?;
        }

        update_icon(host.as_ref(), &triggers, &options, is_open)
    }

    fn register_dom_events(&self) -> Result<(), DomError> {
        let host = self.host();

        let weak = self.downgrade();
        let resize = host.add_resize_listener(Arc::new(move |width: u32| {
            let Some(button) = weak.upgrade() else {
                return;
            };
            if let Err(err) = button.viewport_changed(width) {
                log::error!("[rvbutton] re-initialising at {}px failed: {}", width, err);
            }
        }));
        self.state().resize = Some(resize);

        for trigger in self.triggers() {
            let weak = self.downgrade();
            let id = host.add_click_listener(
                trigger,
                Arc::new(move |event: &mut ClickEvent| {
                    event.prevent_default();
                    if let Some(button) = weak.upgrade() {
                        button.spawn_toggle();
                    }
                }),
            )?;
            self.state().clicks.push(id);
        }
        Ok(())
    }

    fn spawn_toggle(self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = self.toggle().await {
                        log::error!("[rvbutton] toggle failed: {}", err);
                    }
                });
            }
            Err(_) => log::error!("[rvbutton] click ignored, no tokio runtime is running"),
        }
    }

    /// Viewport width signal. When the width falls into a different
    /// breakpoint, the options are re-derived and the state re-applied
    /// without animating. Returns whether that happened.
    pub fn viewport_changed(&self, width: u32) -> Result<bool, DomError> {
        let breakpoint = self.inner.config.breakpoint_for(width);
        {
            let mut state = self.state();
            state.width = width;
            if state.breakpoint == breakpoint {
                return Ok(false);
            }

            let options = self.inner.config.resolve_breakpoint(breakpoint);
            log::debug!(
                "[rvbutton] breakpoint {:?} -> {:?} at {}px",
                state.breakpoint,
                breakpoint,
                width
            );
            state.breakpoint = breakpoint;
            state.is_open = options.is_open;
            state.is_active = options.is_active;
            state.phase = Phase::resting(options.is_open);
            state.options = options;
        }

        self.apply_state()?;
        Ok(true)
    }

    /// Detach every host listener this controller registered.
    pub fn destroy(&self) {
        let (clicks, resize) = {
            let mut state = self.state();
            (std::mem::take(&mut state.clicks), state.resize.take())
        };
        let host = self.host();
        for id in clicks.into_iter().chain(resize) {
            host.remove_listener(id);
        }
        log::debug!("[rvbutton] destroyed");
    }

    /// Listen to one of the lifecycle events.
    pub fn add_event_listener<E, F>(&self, event: E, handler: F) -> Subscription<E>
    where
        E: ToggleEvent,
        F: Fn() -> E::Output + Send + Sync + 'static,
    {
        self.inner.hooks.on(event, handler)
    }

    pub fn subscribe<E: ToggleEvent>(&self, event: E, handler: Handler<E>) -> Subscription<E> {
        self.inner.hooks.subscribe(event, handler)
    }

    /// The intended state; it flips as soon as a transition starts.
    pub fn is_open(&self) -> bool {
        self.state().is_open
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    /// The options currently in effect.
    pub fn options(&self) -> Options {
        self.state().options.clone()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn breakpoint(&self) -> Option<u32> {
        self.state().breakpoint
    }

    /// Last viewport width seen.
    pub fn viewport_width(&self) -> u32 {
        self.state().width
    }

    pub fn triggers(&self) -> Vec<ElementId> {
        self.state().triggers.clone()
    }

    pub fn contents(&self) -> &[ElementId] {
        &self.inner.contents
    }

    pub fn engine(&self) -> &SlideEngine {
        &self.inner.engine
    }

    pub fn downgrade(&self) -> WeakRvButton {
        WeakRvButton {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

fn visibility(shown: bool) -> StylePatch {
    if shown {
        StylePatch::new().clear_display()
    } else {
        StylePatch::new().display(Display::None)
    }
}

fn update_icon(
    host: &dyn Host,
    triggers: &[ElementId],
    options: &Options,
    is_open: bool,
) -> Result<(), DomError> {
    let Some(icon) = &options.icon else {
        return Ok(());
    };

    for &trigger in triggers {
        if !host.has_class(trigger, CLASS_CUSTOM_ICON)? {
            host.add_class(trigger, CLASS_CUSTOM_ICON)?;
        }
        host.set_attribute(trigger, icon.position.attribute(), icon.for_state(is_open))?;
    }
    Ok(())
}
