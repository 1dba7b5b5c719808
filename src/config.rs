//! Inspector configuration.

use std::time::Duration;

use crate::object::frame_clock::FRAME_HISTORY;

/// Environment variable naming a separate display for the inspector window.
pub const DISPLAY_ENV: &str = "GILT_INSPECTOR_DISPLAY";

// ---------------------------------------------------------------------------
// InspectorConfig
// ---------------------------------------------------------------------------

/// Configuration for an [`Inspector`](crate::inspector::Inspector).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig {
    /// Display connection for the inspector window. `None` shares the
    /// inspected application's display.
    pub display: Option<String>,
    /// Period of the misc-info refresher.
    pub refresh_interval: Duration,
    /// Install the global map/unmap observer on startup.
    pub install_map_hooks: bool,
    /// Frame timestamps used for the fps estimate, in `2..=FRAME_HISTORY`.
    pub frame_history: usize,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            display: None,
            refresh_interval: Duration::from_secs(1),
            install_map_hooks: true,
            frame_history: FRAME_HISTORY,
        }
    }
}

impl InspectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the display taken from [`DISPLAY_ENV`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults, with the display taken from `lookup(DISPLAY_ENV)`. Empty
    /// values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let display = lookup(DISPLAY_ENV).filter(|name| !name.trim().is_empty());
        Self {
            display,
            ..Self::default()
        }
    }

    /// Set the display name (builder).
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Set the refresher period (builder).
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Enable or disable the map/unmap observer (builder).
    pub fn with_map_hooks(mut self, install: bool) -> Self {
        self.install_map_hooks = install;
        self
    }

    /// Set the frame history length (builder). Clamped to
    /// `2..=FRAME_HISTORY`, the size of a frame clock's timestamp ring.
    pub fn with_frame_history(mut self, frames: usize) -> Self {
        self.frame_history = frames.clamp(2, FRAME_HISTORY);
        self
    }
}
