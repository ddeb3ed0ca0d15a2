//! Slide transitions: animate an element's height between zero and its
//! natural size.
//!
//! Every slide installs a timer that finishes the transition once the
//! duration has elapsed. The engine keeps at most one pending timer per
//! element; starting a new slide on an element aborts the previous timer
//! before any style is touched, so the latest request always wins.
//!
//! [`SlideEngine::collapse`] and [`SlideEngine::expand`] animate the element
//! itself and overwrite its padding and margin while running.
//! [`SlideEngine::hide`] and [`SlideEngine::show`] animate a temporary
//! wrapper instead and leave the element's own box alone.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

use crate::element::ElementId;
use crate::error::DomError;
use crate::host::Host;
use crate::transitions::Transition;
use crate::types::{BoxSizing, Display, Overflow, StylePatch};

/// Slide duration used when none is configured.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideDirection {
    Expand,
    Collapse,
}

/// How a slide ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The timer fired and the final styles were applied.
    Completed,
    /// A later slide on the same element (or a cancel) took over.
    Superseded,
}

/// Completion signal of a slide. Resolves once the transition finishes or
/// is superseded.
#[derive(Debug)]
pub struct SlideTransition {
    element: ElementId,
    direction: SlideDirection,
    rx: oneshot::Receiver<TransitionOutcome>,
}

impl SlideTransition {
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn direction(&self) -> SlideDirection {
        self.direction
    }
}

impl Future for SlideTransition {
    type Output = TransitionOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // The timer task was aborted by a newer slide.
            Poll::Ready(Err(_)) => Poll::Ready(TransitionOutcome::Superseded),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[derive(Debug)]
struct Pending {
    token: u64,
    direction: SlideDirection,
    /// Set for slides animating a wrapper around the element.
    wrapper: Option<ElementId>,
    task: AbortHandle,
}

struct Inner {
    host: Arc<dyn Host>,
    pending: Mutex<HashMap<ElementId, Pending>>,
    next_token: AtomicU64,
}

impl Inner {
    fn lock_pending(&self) -> MutexGuard<'_, HashMap<ElementId, Pending>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Timer callback. A no-op unless `token` still owns the element.
    fn finish(&self, el: ElementId, token: u64, direction: SlideDirection) -> TransitionOutcome {
        let wrapper = {
            let mut pending = self.lock_pending();
            match pending.get(&el) {
                Some(entry) if entry.token == token => {}
                _ => {
                    log::trace!("[slide] stale {:?} timer on {} ignored", direction, el);
                    return TransitionOutcome::Superseded;
                }
            }
            pending.remove(&el).and_then(|entry| entry.wrapper)
        };

        let result = match (direction, wrapper) {
            (SlideDirection::Collapse, None) => self.host.set_style(
                el,
                StylePatch::new()
                    .display(Display::None)
                    .clear_transition()
                    .clear_box_sizing()
                    .clear_overflow()
                    .clear_height()
                    .clear_padding()
                    .clear_margin(),
            ),
            (SlideDirection::Expand, None) => self.host.set_style(
                el,
                StylePatch::new()
                    .clear_transition()
                    .clear_box_sizing()
                    .clear_overflow()
                    .clear_height(),
            ),
            (SlideDirection::Collapse, Some(wrapper)) => self
                .host
                .set_style(el, StylePatch::new().display(Display::None))
                .and_then(|()| self.host.unwrap_element(el, wrapper)),
            (SlideDirection::Expand, Some(wrapper)) => self.host.unwrap_element(el, wrapper),
        };
        if let Err(err) = result {
            log::warn!("[slide] could not finish {:?} on {}: {}", direction, el, err);
        }

        log::debug!("[slide] {:?} on {} completed", direction, el);
        TransitionOutcome::Completed
    }
}

/// Drives slide transitions against a [`Host`].
///
/// Cheap to clone; clones share the pending-timer registry. Slides spawn
/// their timers on the ambient tokio runtime and fail with
/// [`DomError::NoRuntime`] outside one.
#[derive(Clone)]
pub struct SlideEngine {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SlideEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideEngine")
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl SlideEngine {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            inner: Arc::new(Inner {
                host,
                pending: Mutex::new(HashMap::new()),
                next_token: AtomicU64::new(0),
            }),
        }
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.inner.host
    }

    /// Animate the element from its current rendered height to zero, then
    /// mark it not rendered.
    ///
    /// Collapsing an element that is already sliding starts from its
    /// current, possibly partial, height.
    pub fn collapse(
        &self,
        el: ElementId,
        duration: Duration,
    ) -> Result<SlideTransition, DomError> {
        let runtime = runtime()?;
        self.ensure_attached(el)?;
        self.release(el)?;

        self.start_collapse(el, duration)?;
        Ok(self.schedule(&runtime, el, None, duration, SlideDirection::Collapse))
    }

    /// Make the element rendered and animate it from zero to its natural
    /// height.
    pub fn expand(&self, el: ElementId, duration: Duration) -> Result<SlideTransition, DomError> {
        let runtime = runtime()?;
        self.ensure_attached(el)?;
        self.release(el)?;

        self.start_expand(el, el, duration)?;
        Ok(self.schedule(&runtime, el, None, duration, SlideDirection::Expand))
    }

    /// Expand if the element is not rendered, collapse otherwise.
    pub fn toggle(&self, el: ElementId, duration: Duration) -> Result<SlideTransition, DomError> {
        if self.host().computed_display(el)?.is_none() {
            self.expand(el, duration)
        } else {
            self.collapse(el, duration)
        }
    }

    /// Like [`collapse`](Self::collapse), but animates a wrapper put around
    /// the element. Once done the element is marked not rendered and the
    /// wrapper is removed.
    pub fn hide(&self, el: ElementId, duration: Duration) -> Result<SlideTransition, DomError> {
        let runtime = runtime()?;
        self.ensure_attached(el)?;
        let wrapper = self.take_wrapper(el)?;

        self.start_collapse(wrapper, duration)?;
        Ok(self.schedule(
            &runtime,
            el,
            Some(wrapper),
            duration,
            SlideDirection::Collapse,
        ))
    }

    /// Like [`expand`](Self::expand), but animates a wrapper put around the
    /// element. The wrapper is removed once done.
    pub fn show(&self, el: ElementId, duration: Duration) -> Result<SlideTransition, DomError> {
        let runtime = runtime()?;
        self.ensure_attached(el)?;
        let wrapper = self.take_wrapper(el)?;

        self.start_expand(el, wrapper, duration)?;
        Ok(self.schedule(
            &runtime,
            el,
            Some(wrapper),
            duration,
            SlideDirection::Expand,
        ))
    }

    /// Abort the pending slide on `el`, if any, and strip its transition
    /// overrides (or its wrapper). Display is left as it is.
    pub fn cancel(&self, el: ElementId) -> Result<bool, DomError> {
        let Some(stale) = self.abort_pending(el) else {
            return Ok(false);
        };
        match stale.wrapper {
            Some(wrapper) => self.host().unwrap_element(el, wrapper)?,
            None => self.host().set_style(
                el,
                StylePatch::new()
                    .clear_transition()
                    .clear_box_sizing()
                    .clear_overflow()
                    .clear_height()
                    .clear_padding()
                    .clear_margin(),
            )?,
        }
        Ok(true)
    }

    pub fn is_pending(&self, el: ElementId) -> bool {
        self.inner.lock_pending().contains_key(&el)
    }

    pub fn pending_direction(&self, el: ElementId) -> Option<SlideDirection> {
        self.inner.lock_pending().get(&el).map(|p| p.direction)
    }

    /// The wrapper currently animated for `el`, if a hide or show is running.
    pub fn pending_wrapper(&self, el: ElementId) -> Option<ElementId> {
        self.inner.lock_pending().get(&el).and_then(|p| p.wrapper)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock_pending().len()
    }

    fn start_collapse(&self, animated: ElementId, duration: Duration) -> Result<(), DomError> {
        let host = self.host();
        let height = host.offset_height(animated)?;
        host.set_style(
            animated,
            StylePatch::new()
                .transition(Transition::block_size(duration))
                .box_sizing(BoxSizing::BorderBox)
                .height(height),
        )?;
        // Flush so the start height is observed before the end height.
        host.reflow(animated)?;
        host.set_style(
            animated,
            StylePatch::new()
                .overflow(Overflow::Hidden)
                .height(0.0)
                .padding(0.0)
                .margin(0.0),
        )?;

        log::debug!(
            "[slide] collapse {} from {}px over {:?}",
            animated,
            height,
            duration
        );
        Ok(())
    }

    /// Render `el` and grow `animated` (the element or its wrapper) to its
    /// natural height.
    fn start_expand(
        &self,
        el: ElementId,
        animated: ElementId,
        duration: Duration,
    ) -> Result<(), DomError> {
        let host = self.host();
        host.set_style(
            animated,
            StylePatch::new()
                .clear_transition()
                .clear_overflow()
                .clear_height()
                .clear_padding()
                .clear_margin(),
        )?;
        host.set_style(el, StylePatch::new().clear_display())?;
        let display = match host.computed_display(el)? {
            Display::None => Display::Block,
            display => display,
        };
        host.set_style(el, StylePatch::new().display(display))?;

        let height = host.offset_height(animated)?;
        host.set_style(
            animated,
            StylePatch::new()
                .overflow(Overflow::Hidden)
                .height(0.0)
                .padding(0.0)
                .margin(0.0),
        )?;
        host.reflow(animated)?;
        host.set_style(
            animated,
            StylePatch::new()
                .box_sizing(BoxSizing::BorderBox)
                .transition(Transition::block_size(duration))
                .height(height)
                .clear_padding()
                .clear_margin(),
        )?;

        log::debug!(
            "[slide] expand {} to {}px over {:?}",
            animated,
            height,
            duration
        );
        Ok(())
    }

    fn ensure_attached(&self, el: ElementId) -> Result<(), DomError> {
        self.host()
            .parent(el)?
            .map(|_| ())
            .ok_or(DomError::DetachedElement(el))
    }

    fn abort_pending(&self, el: ElementId) -> Option<Pending> {
        let stale = self.inner.lock_pending().remove(&el)?;
        stale.task.abort();
        log::trace!("[slide] superseding {:?} on {}", stale.direction, el);
        Some(stale)
    }

    /// Abort any pending slide and take the element out of a stale wrapper.
    fn release(&self, el: ElementId) -> Result<(), DomError> {
        if let Some(wrapper) = self.abort_pending(el).and_then(|stale| stale.wrapper) {
            self.host().unwrap_element(el, wrapper)?;
        }
        Ok(())
    }

    /// Abort any pending slide, reusing its wrapper if it had one.
    fn take_wrapper(&self, el: ElementId) -> Result<ElementId, DomError> {
        match self.abort_pending(el).and_then(|stale| stale.wrapper) {
            Some(wrapper) => Ok(wrapper),
            None => self.host().wrap_element(el),
        }
    }

    fn schedule(
        &self,
        runtime: &Handle,
        el: ElementId,
        wrapper: Option<ElementId>,
        duration: Duration,
        direction: SlideDirection,
    ) -> SlideTransition {
        let (tx, rx) = oneshot::channel();
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);

        // Registered before the timer can possibly fire.
        let mut pending = self.inner.lock_pending();
        let inner = self.inner.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            let outcome = inner.finish(el, token, direction);
            let _ = tx.send(outcome);
        });
        pending.insert(
            el,
            Pending {
                token,
                direction,
                wrapper,
                task: task.abort_handle(),
            },
        );

        SlideTransition {
            element: el,
            direction,
            rx,
        }
    }
}

fn runtime() -> Result<Handle, DomError> {
    Handle::try_current().map_err(|_| DomError::NoRuntime)
}
