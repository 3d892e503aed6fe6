//! Dark/light theme initialization and toggle.
//!
//! Reads the user's preference from local storage and applies it as an
//! attribute on the document element. Toggle changes write back to storage.
//! All browser access goes through [`ThemeHost`] so the selection logic can
//! be tested natively.
//!
//! TRADE-OFFS
//! ==========
//! Persistence is best-effort: blocked or disabled storage only means the
//! preference does not survive a reload, so storage errors are logged and
//! otherwise ignored.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

/// Visual mode applied to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    /// Normalize a stored or requested value. Only the literal `"light"`
    /// selects light mode; anything else is dark.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        if raw == "light" { Self::Light } else { Self::Dark }
    }

    /// Mode selected by the toggle checkbox (checked means dark).
    #[must_use]
    pub fn from_toggle(checked: bool) -> Self {
        if checked { Self::Dark } else { Self::Light }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Checked state the toggle checkbox should show for this mode.
    #[must_use]
    pub fn toggle_checked(self) -> bool {
        self == Self::Dark
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeError {
    /// Local storage is missing, disabled, or threw on access.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Browser surface the theme controller needs.
pub trait ThemeHost {
    /// Read the persisted preference, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::StorageUnavailable`] when storage cannot be read.
    fn load_preference(&self) -> Result<Option<String>, ThemeError>;

    /// Persist the preference.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::StorageUnavailable`] when storage cannot be written.
    fn store_preference(&self, mode: ThemeMode) -> Result<(), ThemeError>;

    /// `Some(matches)` for `(prefers-color-scheme: dark)`, `None` without a
    /// media query API.
    fn system_prefers_dark(&self) -> Option<bool>;

    fn set_mode_attribute(&self, mode: ThemeMode);

    /// Sync the toggle checkbox. Returns `false` when no toggle is present.
    fn sync_toggle(&self, checked: bool) -> bool;
}

/// Applies and persists the theme through a [`ThemeHost`].
pub struct ThemeController<H> {
    host: H,
}

impl<H: ThemeHost> ThemeController<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Set the document attribute, persist, and sync the toggle if present.
    pub fn apply(&self, mode: ThemeMode) {
        self.host.set_mode_attribute(mode);
        if let Err(e) = self.host.store_preference(mode) {
            log::debug!("theme preference not persisted: {e}");
        }
        self.host.sync_toggle(mode.toggle_checked());
    }

    /// Persisted preference, else system preference, else dark.
    pub fn initial_mode(&self) -> ThemeMode {
        match self.host.load_preference() {
            Ok(Some(saved)) if !saved.is_empty() => return ThemeMode::normalize(&saved),
            Ok(_) => {}
            Err(e) => log::debug!("theme preference not readable: {e}"),
        }
        match self.host.system_prefers_dark() {
            Some(true) | None => ThemeMode::Dark,
            Some(false) => ThemeMode::Light,
        }
    }

    /// Determine and apply the initial mode. The host binds the toggle's
    /// change listener to [`Self::on_toggle_change`] afterwards.
    pub fn initialize(&self) -> ThemeMode {
        let mode = self.initial_mode();
        self.apply(mode);
        mode
    }

    /// Handle a change event from the toggle checkbox.
    pub fn on_toggle_change(&self, checked: bool) -> ThemeMode {
        let mode = ThemeMode::from_toggle(checked);
        self.apply(mode);
        mode
    }
}

/// The toggle element currently carrying the change listener.
///
/// Re-running the theme setup after a swap must not stack listeners on a
/// toggle that survived it; a replaced toggle hands back the old binding so
/// the host can detach it.
#[derive(Debug)]
pub struct ToggleBinding<T> {
    current: Option<T>,
}

impl<T> Default for ToggleBinding<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T> ToggleBinding<T> {
    pub fn is_bound_to(&self, same: impl FnOnce(&T) -> bool) -> bool {
        self.current.as_ref().is_some_and(same)
    }

    /// Record a new binding, returning the one it replaces.
    pub fn replace(&mut self, next: T) -> Option<T> {
        self.current.replace(next)
    }
}
