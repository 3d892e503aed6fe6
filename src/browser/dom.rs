//! DOM mutations: tab classes, progress bar, and the main-region swap.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, Window};

use super::{REBIND_HOOK, THEME_HOOK, call_global_hook};
use crate::nav::PagePayload;

const ACTIVE_CLASS: &str = "active";
const LOADING_CLASS: &str = "is-loading";
const PROGRESS_ACTIVE_CLASS: &str = "is-active";
const PIN_PROPERTY: &str = "--main-min-height";

/// All elements matching `selector`.
pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_ref::<Element>().cloned())
        .collect()
}

pub fn query_html(document: &Document, selector: &str) -> Option<HtmlElement> {
    match document.query_selector(selector) {
        Ok(Some(el)) => el.dyn_ref::<HtmlElement>().cloned(),
        _ => None,
    }
}

fn set_class(el: &Element, class: &str, on: bool) {
    if let Err(e) = el.class_list().toggle_with_force(class, on) {
        log::warn!("dom: toggling .{class} failed: {e:?}");
    }
}

/// Mark the tabs whose href satisfies `matches` active, all others inactive.
pub fn mark_active(tabs: &[Element], matches: impl Fn(&str) -> bool) {
    for tab in tabs {
        let href = tab.get_attribute("href").unwrap_or_default();
        set_class(tab, ACTIVE_CLASS, matches(&href));
    }
}

/// Set the loading class on matching tabs and clear it everywhere else.
pub fn mark_loading(tabs: &[Element], matches: impl Fn(&str) -> bool, loading: bool) {
    for tab in tabs {
        let href = tab.get_attribute("href").unwrap_or_default();
        set_class(tab, LOADING_CLASS, loading && matches(&href));
    }
}

pub fn show_progress(document: &Document, selector: &str, on: bool) {
    if let Ok(Some(bar)) = document.query_selector(selector) {
        set_class(&bar, PROGRESS_ACTIVE_CLASS, on);
    }
}

/// Content replacement deferred into a view transition when available.
struct SwapJob {
    window: Window,
    document: Document,
    main: HtmlElement,
    payload: PagePayload,
    release_delay_ms: u32,
}

impl SwapJob {
    fn run(self) {
        self.main.set_inner_html(&self.payload.html);
        if !self.payload.title.is_empty() {
            self.document.set_title(&self.payload.title);
        }
        for hook in [THEME_HOOK, REBIND_HOOK] {
            if let Err(e) = call_global_hook(&self.window, hook) {
                log::warn!("dom: {hook} threw after swap: {e:?}");
            }
        }
        release_pin_after_paint(&self.window, self.main, self.release_delay_ms);
    }
}

/// Replace the main region's content with `payload`.
///
/// The region's height is pinned to `pinned_height` px for the duration so
/// the page does not collapse while the new markup lays out.
pub fn swap_into_main(
    window: &Window,
    document: &Document,
    main: HtmlElement,
    payload: PagePayload,
    pinned_height: f64,
    release_delay_ms: u32,
) {
    if let Err(e) = main.style().set_property(PIN_PROPERTY, &format!("{pinned_height}px")) {
        log::warn!("dom: could not pin main height: {e:?}");
    }

    let job = Rc::new(RefCell::new(Some(SwapJob {
        window: window.clone(),
        document: document.clone(),
        main,
        payload,
        release_delay_ms,
    })));

    let started = match view_transition(document) {
        Some(start) => {
            let pending = Rc::clone(&job);
            let cb = Closure::once_into_js(move || {
                if let Some(job) = pending.borrow_mut().take() {
                    job.run();
                }
            });
            match start.call1(document, &cb) {
                Ok(_) => true,
                Err(e) => {
                    log::debug!("dom: view transition unavailable: {e:?}");
                    false
                }
            }
        }
        None => false,
    };

    if !started {
        let job = job.borrow_mut().take();
        if let Some(job) = job {
            job.run();
        }
    }
}

fn view_transition(document: &Document) -> Option<js_sys::Function> {
    let Ok(start) = js_sys::Reflect::get(document, &JsValue::from_str("startViewTransition")) else {
        return None;
    };
    start.dyn_ref::<js_sys::Function>().cloned()
}

fn release_pin_after_paint(window: &Window, main: HtmlElement, delay_ms: u32) {
    let for_frame = main.clone();
    let cb = Closure::once_into_js(move || {
        Timeout::new(delay_ms, move || release_pin(&for_frame)).forget();
    });
    if let Err(e) = window.request_animation_frame(cb.unchecked_ref()) {
        log::debug!("dom: requestAnimationFrame failed: {e:?}");
        release_pin(&main);
    }
}

fn release_pin(main: &HtmlElement) {
    if let Err(e) = main.style().remove_property(PIN_PROPERTY) {
        log::warn!("dom: could not release main height: {e:?}");
    }
}
