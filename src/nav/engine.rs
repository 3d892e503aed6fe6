//! Navigation state machine.
//!
//! [`NavCore`] owns the page cache and the in-flight request token. Each
//! entry point takes the event plus a [`NavContext`] snapshot of the page and
//! returns the [`Action`]s the host must perform, in order. The core never
//! touches the DOM or the network, so every navigation path is testable
//! natively.
//!
//! Only one navigation request is live at a time. Starting a navigation
//! asks the host to abort the previous request and replaces the token; a
//! completion carrying any other token is dropped without touching the cache
//! or the page. Prefetches carry their own tokens and only ever fill the
//! cache.

use std::collections::HashMap;
use std::time::Duration;

use super::cache::{PageCache, PagePayload};
use super::click::ClickInfo;
use super::error::NavError;
use super::url::{is_same_origin, path_of, tab_matches};
use crate::config::NavConfig;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Token identifying one fetch issued by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
    /// User-visible navigation; may be aborted by a newer one.
    Navigation,
    /// Background cache fill; bounded by a timeout, failures ignored.
    Prefetch,
}

/// Side effects for the host to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Leave interception and let the browser load `url`.
    FullNavigation { url: String },
    /// Cancel the default handling of the triggering click.
    PreventDefault,
    /// Mark the tab matching `path` active and every other tab inactive.
    MarkActive { path: String },
    /// Set the loading indicator of the tab matching `path` to `loading`
    /// and clear it on every other tab.
    MarkLoading { path: String, loading: bool },
    ShowProgress(bool),
    /// Abort a request that was superseded.
    AbortRequest(RequestId),
    /// Start fetching `url`; report the outcome via [`NavCore::fetch_resolved`].
    Fetch { id: RequestId, url: String, purpose: FetchPurpose, timeout: Option<Duration> },
    /// Replace the main region content and title.
    Swap(PagePayload),
    /// Push a history entry for `url` carrying the interception marker.
    PushHistory { url: String },
}

/// Outcome of the most recent navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavPhase {
    #[default]
    Idle,
    Loading { id: RequestId, path: String },
    Swapped { path: String },
    FailedFallback { url: String },
}

/// Page state the core needs for a decision.
#[derive(Debug, Clone, Copy)]
pub struct NavContext<'a> {
    /// Current `location.href`.
    pub location: &'a str,
    /// Whether the current document has a main content region.
    pub has_main: bool,
    /// Wall-clock milliseconds.
    pub now_ms: u64,
}

#[derive(Debug, Clone)]
struct InFlight {
    id: RequestId,
    url: String,
    path: String,
    push: bool,
}

pub struct NavCore {
    config: NavConfig,
    cache: PageCache,
    in_flight: Option<InFlight>,
    prefetching: HashMap<RequestId, String>,
    phase: NavPhase,
    next_id: u64,
}

impl NavCore {
    #[must_use]
    pub fn new(config: NavConfig) -> Self {
        let cache = PageCache::new(config.cache_ttl());
        Self { config, cache, in_flight: None, prefetching: HashMap::new(), phase: NavPhase::Idle, next_id: 1 }
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> &NavPhase {
        &self.phase
    }

    #[must_use]
    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut PageCache {
        &mut self.cache
    }

    /// Token of the live navigation request, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight.as_ref().map(|f| f.id)
    }

    /// Number of prefetches awaiting completion.
    #[must_use]
    pub fn pending_prefetches(&self) -> usize {
        self.prefetching.len()
    }

    /// Whether a tab linking to `tab_href` represents `url_path`.
    #[must_use]
    pub fn tab_matches(&self, tab_href: &str, url_path: &str, location: &str) -> bool {
        let tab_path = path_of(tab_href, location);
        tab_matches(&tab_path, url_path, &self.config.root_path, &self.config.root_alias)
    }

    /// Height in px to pin the main region at while its content is replaced.
    #[must_use]
    pub fn pinned_min_height(&self, rendered_height: f64) -> f64 {
        rendered_height.max(self.config.min_pinned_height_px)
    }

    // --- Events ---

    /// Actions for the initial page load.
    #[must_use]
    pub fn initial_actions(&self, location: &str) -> Vec<Action> {
        vec![Action::MarkActive { path: path_of(location, location) }]
    }

    /// Navigate to `url`, pushing a history entry when `push` is set.
    pub fn navigate(&mut self, url: &str, push: bool, ctx: NavContext<'_>) -> Vec<Action> {
        if !is_same_origin(url, ctx.location) {
            log::debug!("nav: {url} is cross-origin, full navigation");
            return vec![Action::FullNavigation { url: url.to_owned() }];
        }
        if !ctx.has_main {
            log::debug!("nav: no main region, full navigation to {url}");
            return vec![Action::FullNavigation { url: url.to_owned() }];
        }

        let path = path_of(url, ctx.location);
        let mut actions = vec![
            Action::MarkActive { path: path.clone() },
            Action::MarkLoading { path: path.clone(), loading: true },
            Action::ShowProgress(true),
        ];

        if let Some(prev) = self.in_flight.take() {
            actions.push(Action::AbortRequest(prev.id));
        }

        if let Some(payload) = self.cache.get(&path, ctx.now_ms) {
            log::debug!("nav: cache hit for {path}");
            actions.push(Action::Swap(payload.clone()));
            if push {
                actions.push(Action::PushHistory { url: url.to_owned() });
            }
            actions.extend(Self::clear_indicators(&path));
            self.phase = NavPhase::Swapped { path };
            return actions;
        }

        log::debug!("nav: cache miss for {path}, fetching");
        let id = self.next_request_id();
        actions.push(Action::Fetch { id, url: url.to_owned(), purpose: FetchPurpose::Navigation, timeout: None });
        self.phase = NavPhase::Loading { id, path: path.clone() };
        self.in_flight = Some(InFlight { id, url: url.to_owned(), path, push });
        actions
    }

    /// Browser back/forward: replay the navigation without a new history entry.
    pub fn popstate(&mut self, ctx: NavContext<'_>) -> Vec<Action> {
        self.navigate(ctx.location, false, ctx)
    }

    /// Document-level click. Intercepted tab clicks become navigations.
    pub fn click(&mut self, click: &ClickInfo, ctx: NavContext<'_>) -> Vec<Action> {
        let Some(href) = click.intercepted_href() else {
            return Vec::new();
        };
        let mut actions = vec![Action::PreventDefault];
        actions.extend(self.navigate(href, true, ctx));
        actions
    }

    /// Start a background fetch of `href` unless it is cross-origin, already
    /// cached fresh, or already being prefetched.
    pub fn prefetch(&mut self, href: &str, ctx: NavContext<'_>) -> Vec<Action> {
        if href.is_empty() || !is_same_origin(href, ctx.location) {
            return Vec::new();
        }
        let path = path_of(href, ctx.location);
        if path.is_empty() || self.cache.contains_fresh(&path, ctx.now_ms) {
            return Vec::new();
        }
        let pending = self.prefetching.values().any(|p| *p == path);
        let navigating = self.in_flight.as_ref().is_some_and(|f| f.path == path);
        if pending || navigating {
            return Vec::new();
        }

        let id = self.next_request_id();
        self.prefetching.insert(id, path);
        vec![Action::Fetch {
            id,
            url: href.to_owned(),
            purpose: FetchPurpose::Prefetch,
            timeout: Some(self.config.prefetch_timeout()),
        }]
    }

    /// Prefetch every tab link once the page is idle.
    pub fn idle_prefetch<'h>(&mut self, hrefs: impl IntoIterator<Item = &'h str>, ctx: NavContext<'_>) -> Vec<Action> {
        hrefs.into_iter().flat_map(|href| self.prefetch(href, ctx)).collect()
    }

    /// Feed back the outcome of a [`Action::Fetch`].
    pub fn fetch_resolved(&mut self, id: RequestId, result: Result<PagePayload, NavError>, now_ms: u64) -> Vec<Action> {
        if let Some(path) = self.prefetching.remove(&id) {
            match result {
                Ok(_) if self.cache.contains_fresh(&path, now_ms) => {
                    log::debug!("nav: prefetch of {path} arrived after a fresher copy");
                }
                Ok(payload) => {
                    log::debug!("nav: prefetched {path}");
                    self.cache.insert(path, payload, now_ms);
                }
                Err(e) => log::debug!("nav: prefetch of {path} dropped: {e}"),
            }
            return Vec::new();
        }

        let Some(flight) = self.in_flight.take_if(|f| f.id == id) else {
            log::debug!("nav: ignoring superseded request {}", id.0);
            return Vec::new();
        };

        match result {
            Ok(payload) => {
                self.cache.insert(flight.path.clone(), payload.clone(), now_ms);
                let mut actions = vec![Action::Swap(payload)];
                if flight.push {
                    actions.push(Action::PushHistory { url: flight.url });
                }
                actions.extend(Self::clear_indicators(&flight.path));
                self.phase = NavPhase::Swapped { path: flight.path };
                actions
            }
            Err(e) if !e.falls_back() => {
                log::debug!("nav: {} dropped ({})", flight.url, e.error_code());
                self.phase = NavPhase::Idle;
                Vec::new()
            }
            Err(e) => {
                log::info!("nav: {} failed [{}] ({e}), falling back to full navigation", flight.url, e.error_code());
                let mut actions = vec![Action::FullNavigation { url: flight.url.clone() }];
                actions.extend(Self::clear_indicators(&flight.path));
                self.phase = NavPhase::FailedFallback { url: flight.url };
                actions
            }
        }
    }

    fn clear_indicators(path: &str) -> [Action; 2] {
        [Action::MarkLoading { path: path.to_owned(), loading: false }, Action::ShowProgress(false)]
    }

    fn next_request_id(&mut self) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        id
    }
}
