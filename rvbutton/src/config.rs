//! Controller configuration and responsive overrides.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::emitter::Handler;
use crate::events::{Hooks, ToggleEvent};
use rvdom::DEFAULT_DURATION;

/// Which pseudo-element attribute carries the icon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconPosition {
    #[default]
    Before,
    After,
}

impl IconPosition {
    /// Attribute written on every trigger.
    pub fn attribute(self) -> &'static str {
        match self {
            IconPosition::Before => "data-before",
            IconPosition::After => "data-after",
        }
    }
}

/// Icons shown on the triggers for each state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub position: IconPosition,
    pub open: String,
    pub close: String,
}

impl Icon {
    pub fn new(position: IconPosition, open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            position,
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn for_state(&self, is_open: bool) -> &str {
        if is_open { &self.open } else { &self.close }
    }
}

/// The options in effect for a controller at a given viewport width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Remove the triggers after the first open.
    pub once: bool,
    pub is_open: bool,
    /// When false the triggers are hidden and open/close do nothing.
    pub is_active: bool,
    pub icon: Option<Icon>,
    #[serde(with = "millis")]
    pub duration: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            once: false,
            is_open: false,
            is_active: true,
            icon: None,
            duration: DEFAULT_DURATION,
        }
    }
}

/// A partial set of options applied on top of the base configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub once: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(with = "millis::option", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

impl OptionsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = Some(once);
        self
    }

    pub fn open(mut self, is_open: bool) -> Self {
        self.is_open = Some(is_open);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Shallow merge: every field set here replaces the base value.
    pub fn apply_to(&self, base: &Options) -> Options {
        Options {
            once: self.once.unwrap_or(base.once),
            is_open: self.is_open.unwrap_or(base.is_open),
            is_active: self.is_active.unwrap_or(base.is_active),
            icon: self.icon.clone().or_else(|| base.icon.clone()),
            duration: self.duration.unwrap_or(base.duration),
        }
    }
}

type Listener = Arc<dyn Fn(&Hooks) + Send + Sync>;

/// Configuration supplied when a controller is built.
///
/// Responsive overrides are keyed by the maximum viewport width they apply
/// up to. Event listeners registered here are attached to every controller
/// built from the config and are not serialized.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub once: bool,
    pub is_open: bool,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(with = "millis")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub responsive: BTreeMap<u32, OptionsOverride>,
    #[serde(skip)]
    listeners: Vec<Listener>,
}

impl Default for Config {
    fn default() -> Self {
        let base = Options::default();
        Self {
            once: base.once,
            is_open: base.is_open,
            is_active: base.is_active,
            icon: base.icon,
            duration: base.duration,
            responsive: BTreeMap::new(),
            listeners: Vec::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("options", &self.options())
            .field("responsive", &self.responsive)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON. Breakpoint keys are written as strings
    /// (`{"responsive": {"480": {"isActive": false}}}`).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an override for viewports up to `max_width` wide.
    pub fn responsive(mut self, max_width: u32, options: OptionsOverride) -> Self {
        self.responsive.insert(max_width, options);
        self
    }

    /// Attach a lifecycle listener to every controller built from this
    /// config.
    pub fn on<E, F>(mut self, event: E, handler: F) -> Self
    where
        E: ToggleEvent,
        F: Fn() -> E::Output + Send + Sync + 'static,
    {
        let handler: Handler<E> = Arc::new(handler);
        self.listeners.push(Arc::new(move |hooks: &Hooks| {
            hooks.subscribe(event, handler.clone());
        }));
        self
    }

    pub(crate) fn register_listeners(&self, hooks: &Hooks) {
        for listener in &self.listeners {
            listener(hooks);
        }
    }

    /// The base options, without any override.
    pub fn options(&self) -> Options {
        Options {
            once: self.once,
            is_open: self.is_open,
            is_active: self.is_active,
            icon: self.icon.clone(),
            duration: self.duration,
        }
    }

    /// The smallest breakpoint that is at least `width`, if any.
    pub fn breakpoint_for(&self, width: u32) -> Option<u32> {
        self.responsive.range(width..).next().map(|(key, _)| *key)
    }

    /// Options in effect at a viewport `width`.
    pub fn resolve(&self, width: u32) -> Options {
        self.resolve_breakpoint(self.breakpoint_for(width))
    }

    pub fn resolve_breakpoint(&self, breakpoint: Option<u32>) -> Options {
        let base = self.options();
        match breakpoint.and_then(|key| self.responsive.get(&key)) {
            Some(overrides) => overrides.apply_to(&base),
            None => base,
        }
    }
}

/// Durations as whole milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }

    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            duration: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match duration {
                Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config::new()
            .responsive(480, OptionsOverride::new().active(false))
            .responsive(1024, OptionsOverride::new().active(true).open(true))
    }

    #[test]
    fn test_breakpoint_is_smallest_key_not_below_width() {
        let config = sample();
        assert_eq!(config.breakpoint_for(320), Some(480));
        assert_eq!(config.breakpoint_for(480), Some(480));
        assert_eq!(config.breakpoint_for(481), Some(1024));
        assert_eq!(config.breakpoint_for(1025), None);
    }

    #[test]
    fn test_no_overrides_means_no_breakpoint() {
        assert_eq!(Config::new().breakpoint_for(0), None);
    }

    #[test]
    fn test_override_only_replaces_set_fields() {
        let base = Options {
            once: true,
            ..Options::default()
        };
        let merged = OptionsOverride::new().open(true).apply_to(&base);
        assert!(merged.once);
        assert!(merged.is_open);
        assert!(merged.is_active);
        assert_eq!(merged.duration, DEFAULT_DURATION);
    }

    #[test]
    fn test_icon_for_state() {
        let icon = Icon::new(IconPosition::After, "-", "+");
        assert_eq!(icon.for_state(true), "-");
        assert_eq!(icon.for_state(false), "+");
        assert_eq!(icon.position.attribute(), "data-after");
    }
}
