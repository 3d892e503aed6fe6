//! web-sys implementation of [`ThemeHost`] and the toggle binding.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use web_sys::{HtmlInputElement, Node, Storage};

use super::{THEME_HOOK, document, set_global};
use crate::config::ThemeConfig;
use crate::theme::{ThemeController, ThemeError, ThemeHost, ThemeMode, ToggleBinding};

struct BoundToggle {
    input: HtmlInputElement,
    listener: Closure<dyn FnMut()>,
}

thread_local! {
    static THEME_CONFIG: RefCell<ThemeConfig> = RefCell::new(ThemeConfig::default());
    static BOUND_TOGGLE: RefCell<ToggleBinding<BoundToggle>> = RefCell::new(ToggleBinding::default());
}

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

pub struct BrowserThemeHost {
    config: ThemeConfig,
}

impl BrowserThemeHost {
    pub fn new(config: ThemeConfig) -> Self {
        Self { config }
    }

    fn toggle(&self) -> Option<HtmlInputElement> {
        document()?
            .get_element_by_id(&self.config.toggle_id)?
            .dyn_ref::<HtmlInputElement>()
            .cloned()
    }
}

fn local_storage() -> Result<Storage, ThemeError> {
    let window = web_sys::window().ok_or_else(|| ThemeError::StorageUnavailable("no window".to_owned()))?;
    match window.local_storage() {
        Ok(Some(storage)) => Ok(storage),
        Ok(None) => Err(ThemeError::StorageUnavailable("localStorage missing".to_owned())),
        Err(e) => Err(ThemeError::StorageUnavailable(format!("{e:?}"))),
    }
}

impl ThemeHost for BrowserThemeHost {
    fn load_preference(&self) -> Result<Option<String>, ThemeError> {
        local_storage()?
            .get_item(&self.config.storage_key)
            .map_err(|e| ThemeError::StorageUnavailable(format!("{e:?}")))
    }

    fn store_preference(&self, mode: ThemeMode) -> Result<(), ThemeError> {
        local_storage()?
            .set_item(&self.config.storage_key, mode.as_str())
            .map_err(|e| ThemeError::StorageUnavailable(format!("{e:?}")))
    }

    fn system_prefers_dark(&self) -> Option<bool> {
        match web_sys::window()?.match_media(DARK_QUERY) {
            Ok(Some(mq)) => Some(mq.matches()),
            _ => None,
        }
    }

    fn set_mode_attribute(&self, mode: ThemeMode) {
        let Some(root) = document().and_then(|d| d.document_element()) else {
            return;
        };
        if let Err(e) = root.set_attribute(&self.config.attribute, mode.as_str()) {
            log::warn!("theme: could not set {}: {e:?}", self.config.attribute);
        }
    }

    fn sync_toggle(&self, checked: bool) -> bool {
        let Some(toggle) = self.toggle() else {
            return false;
        };
        toggle.set_checked(checked);
        true
    }
}

/// Apply the initial theme and bind the toggle's change listener.
///
/// Also exposed as `window.__applyThemeToggle`; call it again after the
/// toggle element has been replaced.
#[wasm_bindgen(js_name = applyThemeToggle)]
pub fn apply_theme_toggle() {
    let config = THEME_CONFIG.with(|c| c.borrow().clone());
    let controller = ThemeController::new(BrowserThemeHost::new(config));
    let mode = controller.initialize();
    log::debug!("theme: applied {}", mode.as_str());

    let Some(toggle) = controller.host().toggle() else {
        return;
    };
    let node: &Node = toggle.as_ref();
    if BOUND_TOGGLE.with(|b| b.borrow().is_bound_to(|bound| bound.input.is_same_node(Some(node)))) {
        return;
    }

    let input = toggle.clone();
    let listener = Closure::<dyn FnMut()>::new(move || {
        controller.on_toggle_change(input.checked());
    });
    if let Err(e) = toggle.add_event_listener_with_callback("change", listener.as_ref().unchecked_ref()) {
        log::warn!("theme: toggle listener failed: {e:?}");
        return;
    }
    let previous = BOUND_TOGGLE.with(|b| b.borrow_mut().replace(BoundToggle { input: toggle, listener }));
    if let Some(old) = previous
        && let Err(e) = old.input.remove_event_listener_with_callback("change", old.listener.as_ref().unchecked_ref())
    {
        log::debug!("theme: detaching old toggle listener failed: {e:?}");
    }
}

/// Store the config and expose the re-initialization hook.
pub fn install(config: ThemeConfig) {
    THEME_CONFIG.with(|c| *c.borrow_mut() = config);
    let Some(window) = web_sys::window() else {
        return;
    };
    let hook = Closure::<dyn FnMut()>::new(apply_theme_toggle);
    set_global(&window, THEME_HOOK, hook.as_ref());
    hook.forget();
}
