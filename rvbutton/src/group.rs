//! Accordion behaviour: at most one open controller in a group.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::button::{RvButton, WeakRvButton};
use crate::emitter::Subscription;
use crate::error::ToggleError;
use crate::events::Notify;

/// Closes every other member whenever one member opens.
///
/// Sibling closes are spawned on the ambient tokio runtime, in member
/// order. Dropping the group stops the coordination.
pub struct RvGroup {
    buttons: Vec<RvButton>,
    subscriptions: Vec<Subscription<Notify>>,
}

impl RvGroup {
    pub fn new(buttons: Vec<RvButton>) -> Self {
        let members: Arc<[WeakRvButton]> = buttons.iter().map(RvButton::downgrade).collect();

        let subscriptions = buttons
            .iter()
            .enumerate()
            .map(|(index, button)| {
                let members = members.clone();
                button.add_event_listener(Notify::Open, move || close_siblings(&members, index))
            })
            .collect();

        log::debug!("[group] coordinating {} button(s)", buttons.len());
        Self {
            buttons,
            subscriptions,
        }
    }

    pub fn buttons(&self) -> &[RvButton] {
        &self.buttons
    }

    /// Whether any member is open.
    pub fn is_open(&self) -> bool {
        self.buttons.iter().any(RvButton::is_open)
    }

    /// Close every member not listed in `except`.
    pub async fn close_all(&self, except: &[RvButton]) -> Result<(), ToggleError> {
        try_join_all(
            self.buttons
                .iter()
                .filter(|button| !except.contains(button))
                .map(RvButton::close),
        )
        .await?;
        Ok(())
    }

    /// Open every member. Each open still closes its siblings, so this is
    /// mostly useful on a group whose coordination has been torn down.
    pub async fn open_all(&self) -> Result<(), ToggleError> {
        try_join_all(self.buttons.iter().map(RvButton::open)).await?;
        Ok(())
    }
}

impl Drop for RvGroup {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}

impl std::fmt::Debug for RvGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RvGroup")
            .field("buttons", &self.buttons)
            .finish()
    }
}

fn close_siblings(members: &[WeakRvButton], opened: usize) {
    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            log::error!("[group] cannot close siblings, no tokio runtime is running");
            return;
        }
    };

    for (index, member) in members.iter().enumerate() {
        if index == opened {
            continue;
        }
        let Some(button) = member.upgrade() else {
            continue;
        };
        handle.spawn(async move {
            if let Err(err) = button.close().await {
                log::error!("[group] closing sibling failed: {}", err);
            }
        });
    }
}
