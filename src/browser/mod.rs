//! Browser host: wires DOM events into the theme controller and the
//! navigation core, and performs the actions they return.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the only module that touches `web-sys`. It is compiled with the
//! `browser` feature and started from the wasm module's start function. The
//! theme and navigation halves only talk through the two window hooks below,
//! so pages that load other scripts can call or replace them.

mod dom;
mod fetch;
mod forms;
mod runtime;
mod theme;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

use crate::config::{CONFIG_ELEMENT_ID, Config};

pub use forms::add_form_event_listener;
pub use theme::apply_theme_toggle;

/// Window property holding the theme re-initialization function.
pub const THEME_HOOK: &str = "__applyThemeToggle";
/// Window property other scripts may set to rebind handlers after a swap.
pub const REBIND_HOOK: &str = "__rebindAfterSwap";

/// Module entry point.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    if let Err(e) = console_log::init_with_level(level) {
        web_sys::console::warn_1(&format!("tabs-pjax: logger not installed: {e}").into());
    }

    let config = load_config();
    theme::install(config.theme.clone());
    on_dom_ready(move || {
        apply_theme_toggle();
        runtime::NavRuntime::install(config.nav);
    });
}

fn load_config() -> Config {
    let raw = document()
        .and_then(|doc| doc.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());
    let Some(raw) = raw else {
        return Config::default();
    };
    match Config::from_json(&raw) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("tabs-pjax: ignoring #{CONFIG_ELEMENT_ID}: {e}");
            Config::default()
        }
    }
}

/// Run `f` once the document is parsed.
fn on_dom_ready(f: impl FnOnce() + 'static) {
    let Some(document) = document() else {
        return;
    };
    if document.ready_state() != "loading" {
        f();
        return;
    }
    let cb = Closure::once_into_js(f);
    if let Err(e) = document.add_event_listener_with_callback("DOMContentLoaded", cb.unchecked_ref()) {
        log::warn!("tabs-pjax: DOMContentLoaded listener failed: {e:?}");
    }
}

pub(crate) fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

/// Wall-clock milliseconds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn now_ms() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}

/// Call `window[name]()` if it is a function.
pub(crate) fn call_global_hook(window: &Window, name: &str) -> Result<(), JsValue> {
    let hook = js_sys::Reflect::get(window, &JsValue::from_str(name))?;
    if let Some(func) = hook.dyn_ref::<js_sys::Function>() {
        func.call0(window)?;
    }
    Ok(())
}

pub(crate) fn set_global(window: &Window, name: &str, value: &JsValue) {
    if let Err(e) = js_sys::Reflect::set(window, &JsValue::from_str(name), value) {
        log::warn!("tabs-pjax: could not expose window.{name}: {e:?}");
    }
}
