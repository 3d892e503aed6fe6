//! Event wiring and action execution for the navigation core.
//!
//! `NavRuntime` is shared by every listener through an `Rc`. The core sits
//! in a `RefCell` and is only borrowed for the duration of one decision;
//! nothing holds a borrow across an `.await` or while running actions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{AbortController, AddEventListenerOptions, Document, Element, Event, HtmlElement, MouseEvent, Window};

use super::{dom, fetch, now_ms};
use crate::config::{MAX_TIMER_DELAY_MS, NavConfig};
use crate::nav::{
    Action, Button, ClickInfo, FetchPurpose, Modifiers, NavContext, NavCore, NavError, PagePayload, RequestId,
};

pub struct NavRuntime {
    window: Window,
    document: Document,
    core: RefCell<NavCore>,
    controllers: RefCell<HashMap<RequestId, AbortController>>,
}

impl NavRuntime {
    /// Create the runtime, mark the current tab, and bind all listeners.
    pub fn install(config: NavConfig) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let this = Rc::new(Self {
            window,
            document,
            core: RefCell::new(NavCore::new(config)),
            controllers: RefCell::new(HashMap::new()),
        });

        let initial = this.core.borrow().initial_actions(&this.location());
        this.run(initial, None);
        this.bind_click();
        this.bind_popstate();
        this.bind_prefetch();
        log::debug!("nav: installed");
    }

    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn main(&self) -> Option<HtmlElement> {
        let selector = self.core.borrow().config().main_selector.clone();
        dom::query_html(&self.document, &selector)
    }

    fn tabs(&self) -> Vec<Element> {
        let selector = self.core.borrow().config().tab_selector.clone();
        dom::query_all(&self.document, &selector)
    }

    /// Build a context snapshot and run one core decision.
    fn decide<R>(&self, f: impl FnOnce(&mut NavCore, NavContext<'_>) -> R) -> R {
        let location = self.location();
        let has_main = self.main().is_some();
        let ctx = NavContext { location: &location, has_main, now_ms: now_ms() };
        f(&mut self.core.borrow_mut(), ctx)
    }

    fn run(self: &Rc<Self>, actions: Vec<Action>, event: Option<&Event>) {
        for action in actions {
            match action {
                Action::FullNavigation { url } => {
                    if let Err(e) = self.window.location().set_href(&url) {
                        log::warn!("nav: full navigation to {url} failed: {e:?}");
                    }
                }
                Action::PreventDefault => {
                    if let Some(event) = event {
                        event.prevent_default();
                    }
                }
                Action::MarkActive { path } => {
                    let location = self.location();
                    let core = self.core.borrow();
                    dom::mark_active(&self.tabs(), |href| core.tab_matches(href, &path, &location));
                }
                Action::MarkLoading { path, loading } => {
                    let location = self.location();
                    let core = self.core.borrow();
                    dom::mark_loading(&self.tabs(), |href| core.tab_matches(href, &path, &location), loading);
                }
                Action::ShowProgress(on) => {
                    let selector = self.core.borrow().config().progress_selector.clone();
                    dom::show_progress(&self.document, &selector, on);
                }
                Action::AbortRequest(id) => {
                    let controller = self.controllers.borrow_mut().remove(&id);
                    if let Some(controller) = controller {
                        controller.abort();
                    }
                }
                Action::Fetch { id, url, purpose, timeout } => {
                    self.spawn_fetch(id, url, purpose, timeout.map(|t| t.as_millis()));
                }
                Action::Swap(payload) => self.swap(payload),
                Action::PushHistory { url } => self.push_history(&url),
            }
        }
    }

    fn swap(&self, payload: PagePayload) {
        let Some(main) = self.main() else {
            log::warn!("nav: main region vanished before swap");
            return;
        };
        let (pinned, release_delay_ms) = {
            let core = self.core.borrow();
            let height = main.get_bounding_client_rect().height();
            (core.pinned_min_height(height), core.config().release_delay_ms)
        };
        dom::swap_into_main(&self.window, &self.document, main, payload, pinned, release_delay_ms);
    }

    fn push_history(&self, url: &str) {
        let Ok(history) = self.window.history() else {
            return;
        };
        let state = js_sys::Object::new();
        if let Err(e) = js_sys::Reflect::set(&state, &JsValue::from_str("pjax"), &JsValue::TRUE) {
            log::warn!("nav: history state not built: {e:?}");
        }
        if let Err(e) = history.push_state_with_url(&state, "", Some(url)) {
            log::warn!("nav: pushState failed: {e:?}");
        }
    }

    fn spawn_fetch(self: &Rc<Self>, id: RequestId, url: String, purpose: FetchPurpose, timeout_ms: Option<u128>) {
        let controller = match AbortController::new() {
            Ok(controller) => controller,
            Err(e) => {
                let actions = self.core.borrow_mut().fetch_resolved(
                    id,
                    Err(NavError::Transport(format!("AbortController: {e:?}"))),
                    now_ms(),
                );
                self.run(actions, None);
                return;
            }
        };
        let signal = controller.signal();
        let deadline = timeout_ms.map(|ms| {
            let on_timeout = controller.clone();
            let delay = u32::try_from(ms.min(u128::from(MAX_TIMER_DELAY_MS))).unwrap_or(u32::MAX);
            Timeout::new(delay, move || on_timeout.abort())
        });
        self.controllers.borrow_mut().insert(id, controller);

        let selector = self.core.borrow().config().main_selector.clone();
        let this = Rc::clone(self);
        spawn_local(async move {
            let result = fetch::fetch_page(&url, &signal, &selector).await;
            drop(deadline);
            this.controllers.borrow_mut().remove(&id);
            if let (FetchPurpose::Navigation, Err(e)) = (purpose, &result) {
                log::debug!("nav: request {} for {url} failed: {e}", id.0);
            }
            let actions = this.core.borrow_mut().fetch_resolved(id, result, now_ms());
            this.run(actions, None);
        });
    }

    fn bind_click(self: &Rc<Self>) {
        let this = Rc::clone(self);
        let cb = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
            let Some(info) = this.click_info(&ev) else {
                return;
            };
            let actions = this.decide(|core, ctx| core.click(&info, ctx));
            this.run(actions, Some(ev.as_ref()));
        });
        if let Err(e) = self.window.add_event_listener_with_callback_and_bool("click", cb.as_ref().unchecked_ref(), true)
        {
            log::warn!("nav: click listener failed: {e:?}");
        }
        cb.forget();
    }

    fn click_info(&self, ev: &MouseEvent) -> Option<ClickInfo> {
        let target = ev.target()?;
        let anchor = match target.dyn_ref::<Element>()?.closest("a") {
            Ok(Some(anchor)) => anchor,
            _ => return None,
        };
        let selector = self.core.borrow().config().tab_selector.clone();
        Some(ClickInfo {
            href: anchor.get_attribute("href"),
            is_tab_link: anchor.matches(&selector).unwrap_or(false),
            button: Button::from_dom(ev.button()),
            modifiers: Modifiers { shift: ev.shift_key(), ctrl: ev.ctrl_key(), alt: ev.alt_key(), meta: ev.meta_key() },
            default_prevented: ev.default_prevented(),
        })
    }

    fn bind_popstate(self: &Rc<Self>) {
        let this = Rc::clone(self);
        let cb = Closure::<dyn FnMut()>::new(move || {
            let actions = this.decide(NavCore::popstate);
            this.run(actions, None);
        });
        if let Err(e) = self.window.add_event_listener_with_callback("popstate", cb.as_ref().unchecked_ref()) {
            log::warn!("nav: popstate listener failed: {e:?}");
        }
        cb.forget();
    }

    fn bind_prefetch(self: &Rc<Self>) {
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        for tab in self.tabs() {
            let href = tab.get_attribute("href").unwrap_or_default();
            let this = Rc::clone(self);
            let cb = Closure::<dyn FnMut()>::new(move || {
                let actions = this.decide(|core, ctx| core.prefetch(&href, ctx));
                this.run(actions, None);
            });
            for event in ["mouseenter", "touchstart"] {
                if let Err(e) = tab.add_event_listener_with_callback_and_add_event_listener_options(
                    event,
                    cb.as_ref().unchecked_ref(),
                    &options,
                ) {
                    log::warn!("nav: {event} listener failed: {e:?}");
                }
            }
            cb.forget();
        }

        let this = Rc::clone(self);
        let idle = Closure::once_into_js(move || this.idle_prefetch());
        if self.window.request_idle_callback(idle.unchecked_ref()).is_err() {
            let this = Rc::clone(self);
            let delay = self.core.borrow().config().idle_fallback_ms;
            Timeout::new(delay, move || this.idle_prefetch()).forget();
        }
    }

    fn idle_prefetch(self: &Rc<Self>) {
        let hrefs: Vec<String> = self.tabs().iter().filter_map(|tab| tab.get_attribute("href")).collect();
        let actions = self.decide(|core, ctx| core.idle_prefetch(hrefs.iter().map(String::as_str), ctx));
        self.run(actions, None);
    }
}
