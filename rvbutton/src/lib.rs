pub mod button;
pub mod config;
pub mod emitter;
pub mod error;
pub mod events;
pub mod group;
pub mod prelude;

pub use button::{Phase, RvButton, Targets, WeakRvButton};
pub use config::{Config, Icon, IconPosition, Options, OptionsOverride};
pub use error::ToggleError;
pub use events::{Gate, GateFuture, HookError, Hooks, Notify};
pub use group::RvGroup;
