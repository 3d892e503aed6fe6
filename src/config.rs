//! Configuration for navigation and theme behavior.
//!
//! Every field has a default matching the server templates, so an empty
//! JSON object (or no config at all) yields a working setup. The browser
//! host reads overrides from an inline `<script type="application/json">`
//! block; see [`CONFIG_ELEMENT_ID`].

use std::time::Duration;

use serde::Deserialize;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// Element id of the optional inline JSON config block.
pub const CONFIG_ELEMENT_ID: &str = "tabs-pjax-config";

pub const DEFAULT_MAIN_SELECTOR: &str = "main.app-main";
pub const DEFAULT_TAB_SELECTOR: &str = ".tabs .tab-link";
pub const DEFAULT_PROGRESS_SELECTOR: &str = "#pjaxProgress";
pub const DEFAULT_CACHE_TTL_MS: u64 = 30_000;
pub const DEFAULT_PREFETCH_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_IDLE_FALLBACK_MS: u32 = 600;
pub const DEFAULT_RELEASE_DELAY_MS: u32 = 50;
pub const DEFAULT_MIN_PINNED_HEIGHT_PX: f64 = 200.0;

/// Longest delay `setTimeout` honors; larger values fire immediately.
pub const MAX_TIMER_DELAY_MS: u64 = 2_147_483_647;

/// Errors produced while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The raw config was not valid JSON for [`Config`].
    #[error("config parse failed: {0}")]
    Parse(String),

    /// A field parsed but holds an unusable value.
    #[error("invalid config field {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub nav: NavConfig,
    pub theme: ThemeConfig,
}

/// Selectors and timings used by the navigation layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Selector of the content region swapped on navigation.
    pub main_selector: String,
    /// Selector of the links that are intercepted and prefetched.
    pub tab_selector: String,
    /// Selector of the optional progress bar element.
    pub progress_selector: String,
    pub cache_ttl_ms: u64,
    pub prefetch_timeout_ms: u64,
    /// Delay used for idle prefetch when `requestIdleCallback` is missing.
    pub idle_fallback_ms: u32,
    /// Delay after the next animation frame before the height pin is released.
    pub release_delay_ms: u32,
    pub min_pinned_height_px: f64,
    /// Path the site root is served under.
    pub root_path: String,
    /// Tab path that is marked active when the root path is shown.
    pub root_alias: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            main_selector: DEFAULT_MAIN_SELECTOR.to_owned(),
            tab_selector: DEFAULT_TAB_SELECTOR.to_owned(),
            progress_selector: DEFAULT_PROGRESS_SELECTOR.to_owned(),
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            prefetch_timeout_ms: DEFAULT_PREFETCH_TIMEOUT_MS,
            idle_fallback_ms: DEFAULT_IDLE_FALLBACK_MS,
            release_delay_ms: DEFAULT_RELEASE_DELAY_MS,
            min_pinned_height_px: DEFAULT_MIN_PINNED_HEIGHT_PX,
            root_path: "/".to_owned(),
            root_alias: "/main".to_owned(),
        }
    }
}

impl NavConfig {
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    #[must_use]
    pub fn prefetch_timeout(&self) -> Duration {
        Duration::from_millis(self.prefetch_timeout_ms)
    }
}

/// Names used by the theme controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Local storage key holding `"dark"` or `"light"`.
    pub storage_key: String,
    /// Element id of the toggle checkbox.
    pub toggle_id: String,
    /// Attribute set on the document element.
    pub attribute: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "theme".to_owned(),
            toggle_id: "themeToggle".to_owned(),
            attribute: "data-theme".to_owned(),
        }
    }
}

impl Config {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a field fails validation.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check invariants that serde defaults cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let selectors = [
            ("nav.main_selector", &self.nav.main_selector),
            ("nav.tab_selector", &self.nav.tab_selector),
            ("nav.progress_selector", &self.nav.progress_selector),
            ("theme.storage_key", &self.theme.storage_key),
            ("theme.toggle_id", &self.theme.toggle_id),
            ("theme.attribute", &self.theme.attribute),
        ];
        for (field, value) in selectors {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid { field, reason: "must not be empty".to_owned() });
            }
        }
        if self.nav.cache_ttl_ms == 0 {
            return Err(ConfigError::Invalid { field: "nav.cache_ttl_ms", reason: "must be positive".to_owned() });
        }
        if self.nav.prefetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "nav.prefetch_timeout_ms",
                reason: "must be positive".to_owned(),
            });
        }
        let timers = [
            ("nav.prefetch_timeout_ms", self.nav.prefetch_timeout_ms),
            ("nav.idle_fallback_ms", u64::from(self.nav.idle_fallback_ms)),
            ("nav.release_delay_ms", u64::from(self.nav.release_delay_ms)),
        ];
        for (field, value) in timers {
            if value > MAX_TIMER_DELAY_MS {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("timer delay {value} exceeds {MAX_TIMER_DELAY_MS} ms"),
                });
            }
        }
        if !self.nav.min_pinned_height_px.is_finite() || self.nav.min_pinned_height_px < 0.0 {
            return Err(ConfigError::Invalid {
                field: "nav.min_pinned_height_px",
                reason: format!("expected a non-negative number, got {}", self.nav.min_pinned_height_px),
            });
        }
        if !self.nav.root_path.starts_with('/') || !self.nav.root_alias.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "nav.root_path",
                reason: "root path and alias must start with '/'".to_owned(),
            });
        }
        Ok(())
    }
}
