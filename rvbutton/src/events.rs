//! Lifecycle events of a toggle controller.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use thiserror::Error;

use crate::emitter::{Emitter, EventName, Handler, Subscription};

/// Returned by gate hooks; the sequence waits for it to settle.
pub type GateFuture = BoxFuture<'static, Result<(), HookError>>;

/// Events whose handlers can hold up (or veto) a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    BeforeOpen,
    BeforeClose,
}

impl EventName for Gate {
    type Output = GateFuture;
}

/// Fire-and-forget notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notify {
    Open,
    Close,
    AfterOpen,
    AfterClose,
}

impl EventName for Notify {
    type Output = ();
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gate::BeforeOpen => "beforeOpen",
            Gate::BeforeClose => "beforeClose",
        })
    }
}

impl fmt::Display for Notify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Notify::Open => "open",
            Notify::Close => "close",
            Notify::AfterOpen => "afterOpen",
            Notify::AfterClose => "afterClose",
        })
    }
}

/// Rejection raised by a gate hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Resolve a gate immediately.
pub fn proceed() -> GateFuture {
    Box::pin(async { Ok(()) })
}

/// Adapt an async closure into a gate handler.
///
/// ```ignore
/// button.add_event_listener(Gate::BeforeOpen, gate_hook(|| async { Ok(()) }));
/// ```
pub fn gate_hook<F, Fut>(hook: F) -> impl Fn() -> GateFuture + Send + Sync + 'static
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HookError>> + Send + 'static,
{
    move || hook().boxed()
}

/// The lifecycle bus owned by one controller.
#[derive(Debug, Default)]
pub struct Hooks {
    gates: Emitter<Gate>,
    notices: Emitter<Notify>,
}

/// An event that can be listened to on [`Hooks`]; routes each event type to
/// its emitter.
pub trait ToggleEvent: EventName + fmt::Display {
    fn emitter(hooks: &Hooks) -> &Emitter<Self>;
}

impl ToggleEvent for Gate {
    fn emitter(hooks: &Hooks) -> &Emitter<Self> {
        &hooks.gates
    }
}

impl ToggleEvent for Notify {
    fn emitter(hooks: &Hooks) -> &Emitter<Self> {
        &hooks.notices
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<E: ToggleEvent>(&self, event: E, handler: Handler<E>) -> Subscription<E> {
        E::emitter(self).subscribe(event, handler)
    }

    pub fn on<E, F>(&self, event: E, handler: F) -> Subscription<E>
    where
        E: ToggleEvent,
        F: Fn() -> E::Output + Send + Sync + 'static,
    {
        self.subscribe(event, Arc::new(handler))
    }

    pub fn listener_count<E: ToggleEvent>(&self, event: E) -> usize {
        E::emitter(self).listener_count(event)
    }

    /// Publish a gate and wait for every returned future. The first
    /// rejection wins.
    pub async fn gate(&self, gate: Gate) -> Result<(), HookError> {
        let pending = self.gates.publish(gate);
        if !pending.is_empty() {
            log::trace!("[rvbutton] waiting on {} {} hooks", pending.len(), gate);
        }
        try_join_all(pending).await?;
        Ok(())
    }

    pub fn notify(&self, event: Notify) {
        self.notices.publish(event);
    }
}
