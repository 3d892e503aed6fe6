//! Click filtering for link interception.
//!
//! The browser host distills a DOM click into a [`ClickInfo`]; this module
//! decides whether it should become an in-page navigation.

use super::url::is_fragment_only;

#[cfg(test)]
#[path = "click_test.rs"]
mod click_test;

/// Keyboard modifier keys held during a click.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    #[must_use]
    pub fn any(self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
    Other(i16),
}

impl Button {
    /// Map a DOM `MouseEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// A click on (or inside) an anchor element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickInfo {
    /// Raw `href` attribute of the closest anchor.
    pub href: Option<String>,
    /// Whether the anchor matches the tab-link selector.
    pub is_tab_link: bool,
    pub button: Button,
    pub modifiers: Modifiers,
    /// Another handler already called `preventDefault`.
    pub default_prevented: bool,
}

impl ClickInfo {
    /// The href to navigate to in-page, or `None` to leave the click alone.
    #[must_use]
    pub fn intercepted_href(&self) -> Option<&str> {
        if !self.is_tab_link || self.default_prevented {
            return None;
        }
        if self.button != Button::Primary || self.modifiers.any() {
            return None;
        }
        let href = self.href.as_deref()?;
        if href.is_empty() || is_fragment_only(href) {
            return None;
        }
        Some(href)
    }
}
