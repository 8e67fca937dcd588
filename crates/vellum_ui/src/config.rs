//! Runtime configuration.
//!
//! Loaded once at startup, usually from a TOML file:
//!
//! ```toml
//! state_eviction_frames = 120
//! window_reap_frames = 0
//! drag_threshold = 6.0
//! error_policy = "recover"
//!
//! [style]
//! item_spacing = { x = 6.0, y = 3.0 }
//! ```
//!
//! Every field has a default, so a file only lists what it changes.

use crate::error::{ErrorPolicy, UiError, UiResult};
use crate::style::Style;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a [`Context`](crate::Context).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Persistent widget state untouched for this many frames is evicted.
    pub state_eviction_frames: u64,
    /// Windows unreferenced for this many frames are destroyed. 0 keeps them forever.
    pub window_reap_frames: u64,
    /// Pointer travel (pixels) before a press counts as a drag.
    pub drag_threshold: f32,
    /// Maximum seconds between two clicks of a double-click.
    pub double_click_time: f32,
    /// Maximum pointer travel (pixels) between two clicks of a double-click.
    pub double_click_max_dist: f32,
    /// Seconds a key must be held before it starts repeating.
    pub key_repeat_delay: f32,
    /// Seconds between repeats once repeating.
    pub key_repeat_rate: f32,
    /// Pixels scrolled per wheel notch, as a multiple of the font size.
    pub wheel_scroll_lines: f32,
    /// Maximum deferred calls run while flushing one frame.
    pub max_deferred_calls: usize,
    /// Reaction to programming errors.
    pub error_policy: ErrorPolicy,
    /// Metrics and palette.
    pub style: Style,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            state_eviction_frames: 60,
            window_reap_frames: 0,
            drag_threshold: 6.0,
            double_click_time: 0.30,
            double_click_max_dist: 6.0,
            key_repeat_delay: 0.275,
            key_repeat_rate: 0.050,
            wheel_scroll_lines: 5.0,
            max_deferred_calls: 1024,
            error_policy: ErrorPolicy::default(),
            style: Style::default(),
        }
    }
}

impl UiConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidConfig`] if the text is not valid TOML or a
    /// field has the wrong type.
    pub fn from_toml_str(text: &str) -> UiResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| UiError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::ConfigIo`] if the file cannot be read, otherwise see
    /// [`UiConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> UiResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| UiError::ConfigIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidConfig`] if a value cannot be represented.
    pub fn to_toml_string(&self) -> UiResult<String> {
        toml::to_string(self).map_err(|e| UiError::InvalidConfig(e.to_string()))
    }

    /// Replaces values the frame core cannot work with.
    ///
    /// Bad floats fall back to their defaults and a zero
    /// `state_eviction_frames` becomes 1. Each replacement is logged.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        fn non_negative(field: &'static str, value: &mut f32, fallback: f32) {
            if !value.is_finite() || *value < 0.0 {
                tracing::warn!(field, value = *value, fallback, "invalid config value replaced");
                *value = fallback;
            }
        }

        let defaults = Self::default();
        non_negative("drag_threshold", &mut self.drag_threshold, defaults.drag_threshold);
        non_negative("double_click_time", &mut self.double_click_time, defaults.double_click_time);
        non_negative(
            "double_click_max_dist",
            &mut self.double_click_max_dist,
            defaults.double_click_max_dist,
        );
        non_negative("key_repeat_delay", &mut self.key_repeat_delay, defaults.key_repeat_delay);
        non_negative("wheel_scroll_lines", &mut self.wheel_scroll_lines, defaults.wheel_scroll_lines);
        if !self.key_repeat_rate.is_finite() || self.key_repeat_rate <= 0.0 {
            tracing::warn!(value = self.key_repeat_rate, "invalid key_repeat_rate replaced");
            self.key_repeat_rate = defaults.key_repeat_rate;
        }
        if self.state_eviction_frames == 0 {
            tracing::warn!("state_eviction_frames of 0 raised to 1");
            self.state_eviction_frames = 1;
        }
        self
    }

    /// Rejects values the frame core cannot work with.
    fn validate(&self) -> UiResult<()> {
        let non_negative = [
            ("drag_threshold", self.drag_threshold),
            ("double_click_time", self.double_click_time),
            ("double_click_max_dist", self.double_click_max_dist),
            ("key_repeat_delay", self.key_repeat_delay),
            ("wheel_scroll_lines", self.wheel_scroll_lines),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(UiError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        if !self.key_repeat_rate.is_finite() || self.key_repeat_rate <= 0.0 {
            return Err(UiError::InvalidConfig(format!(
                "key_repeat_rate must be positive (got {})",
                self.key_repeat_rate
            )));
        }
        if self.state_eviction_frames == 0 {
            return Err(UiError::InvalidConfig(
                "state_eviction_frames must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
