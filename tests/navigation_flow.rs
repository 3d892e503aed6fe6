//! End-to-end navigation flows against a simulated page and server.
//!
//! `FakePage` plays the browser host: it executes the core's actions against
//! an in-memory page, records network requests, and resolves them when the
//! test says so.

use std::collections::HashMap;

use tabs_pjax::config::NavConfig;
use tabs_pjax::nav::{Action, Button, ClickInfo, Modifiers, NavContext, NavCore, NavError, PagePayload, RequestId};

const ORIGIN: &str = "https://scanner.local";

#[derive(Default)]
struct FakePage {
    location: String,
    main_html: String,
    title: String,
    history: Vec<String>,
    active: Option<String>,
    loading: Option<String>,
    progress: bool,
    requests: Vec<(RequestId, String)>,
    aborted: Vec<RequestId>,
    full_navigations: Vec<String>,
    default_prevented: bool,
}

impl FakePage {
    fn at(path: &str) -> Self {
        Self { location: format!("{ORIGIN}{path}"), main_html: "<p>start</p>".into(), ..Self::default() }
    }

    fn ctx(&self, now_ms: u64) -> NavContext<'_> {
        NavContext { location: &self.location, has_main: true, now_ms }
    }

    fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::FullNavigation { url } => self.full_navigations.push(url),
                Action::PreventDefault => self.default_prevented = true,
                Action::MarkActive { path } => self.active = Some(path),
                Action::MarkLoading { path, loading } => self.loading = loading.then_some(path),
                Action::ShowProgress(on) => self.progress = on,
                Action::AbortRequest(id) => self.aborted.push(id),
                Action::Fetch { id, url, .. } => self.requests.push((id, url)),
                Action::Swap(payload) => {
                    self.main_html = payload.html;
                    if !payload.title.is_empty() {
                        self.title = payload.title;
                    }
                }
                Action::PushHistory { url } => {
                    self.location = format!("{ORIGIN}{url}");
                    self.history.push(url);
                }
            }
        }
    }

    fn request_for(&self, url: &str) -> RequestId {
        self.requests
            .iter()
            .rev()
            .find(|(_, u)| u == url)
            .map(|(id, _)| *id)
            .unwrap_or_else(|| panic!("no request for {url}: {:?}", self.requests))
    }
}

fn server() -> HashMap<&'static str, Result<PagePayload, NavError>> {
    HashMap::from([
        ("/reports", Ok(PagePayload::new("<h1>Reports</h1>", "Reports"))),
        ("/settings", Ok(PagePayload::new("<h1>Settings</h1>", "Settings"))),
        ("/broken", Err(NavError::FetchFailure { status: 500 })),
        ("/login", Err(NavError::MissingFragment { selector: "main.app-main".into() })),
    ])
}

fn click(page: &mut FakePage, nav: &mut NavCore, href: &str, now_ms: u64) {
    let info = ClickInfo {
        href: Some(href.to_owned()),
        is_tab_link: true,
        button: Button::Primary,
        modifiers: Modifiers::default(),
        default_prevented: false,
    };
    let actions = nav.click(&info, page.ctx(now_ms));
    page.apply(actions);
}

fn respond(page: &mut FakePage, nav: &mut NavCore, url: &str, now_ms: u64) {
    let id = page.request_for(url);
    let path = url.split('?').next().unwrap_or(url);
    let result = server().remove(path).unwrap_or(Err(NavError::FetchFailure { status: 404 }));
    let actions = nav.fetch_resolved(id, result, now_ms);
    page.apply(actions);
}

#[test]
fn click_fetches_swaps_and_updates_history() {
    let mut page = FakePage::at("/main");
    let mut nav = NavCore::new(NavConfig::default());

    click(&mut page, &mut nav, "/reports", 0);
    assert!(page.default_prevented);
    assert_eq!(page.active.as_deref(), Some("/reports"));
    assert_eq!(page.loading.as_deref(), Some("/reports"));
    assert!(page.progress);

    respond(&mut page, &mut nav, "/reports", 120);
    assert_eq!(page.main_html, "<h1>Reports</h1>");
    assert_eq!(page.title, "Reports");
    assert_eq!(page.history, vec!["/reports".to_owned()]);
    assert!(page.loading.is_none());
    assert!(!page.progress);
}

#[test]
fn returning_within_ttl_uses_cache() {
    let mut page = FakePage::at("/main");
    let mut nav = NavCore::new(NavConfig::default());

    click(&mut page, &mut nav, "/reports", 0);
    respond(&mut page, &mut nav, "/reports", 100);
    click(&mut page, &mut nav, "/settings", 1_000);
    respond(&mut page, &mut nav, "/settings", 1_100);

    click(&mut page, &mut nav, "/reports", 11_000);
    assert_eq!(page.requests.len(), 2);
    assert_eq!(page.main_html, "<h1>Reports</h1>");
    assert_eq!(page.history.last().map(String::as_str), Some("/reports"));
}

#[test]
fn returning_after_ttl_refetches() {
    let mut page = FakePage::at("/main");
    let mut nav = NavCore::new(NavConfig::default());

    click(&mut page, &mut nav, "/reports", 0);
    respond(&mut page, &mut nav, "/reports", 0);
    click(&mut page, &mut nav, "/reports", 30_001);
    assert_eq!(page.requests.len(), 2);
}

#[test]
fn server_error_falls_back_to_full_load() {
    let mut page = FakePage::at("/main");
    let mut nav = NavCore::new(NavConfig::default());

    click(&mut page, &mut nav, "/broken", 0);
    respond(&mut page, &mut nav, "/broken", 80);
    assert_eq!(page.full_navigations, vec!["/broken".to_owned()]);
    assert_eq!(page.main_html, "<p>start</p>");
    assert!(page.history.is_empty());
    assert!(!page.progress);
}

#[test]
fn response_without_main_falls_back_to_full_load() {
    let mut page = FakePage::at("/main");
    let mut nav = NavCore::new(NavConfig::default());

    click(&mut page, &mut nav, "/login", 0);
    respond(&mut page, &mut nav, "/login", 80);
    assert_eq!(page.full_navigations, vec!["/login".to_owned()]);
}

#[test]
fn rapid_clicks_only_apply_the_last_navigation() {
    let mut page = FakePage::at("/main");
    let mut nav = NavCore::new(NavConfig::default());

    click(&mut page, &mut nav, "/reports", 0);
    let first = page.request_for("/reports");
    click(&mut page, &mut nav, "/settings", 30);
    assert_eq!(page.aborted, vec![first]);

    respond(&mut page, &mut nav, "/settings", 90);
    respond(&mut page, &mut nav, "/reports", 150);
    assert_eq!(page.main_html, "<h1>Settings</h1>");
    assert_eq!(page.history, vec!["/settings".to_owned()]);
    assert_eq!(nav.cache().len(), 1);
}

#[test]
fn hover_prefetch_makes_click_free() {
    let mut page = FakePage::at("/main");
    let mut nav = NavCore::new(NavConfig::default());

    let actions = nav.prefetch("/settings", page.ctx(0));
    page.apply(actions);
    assert_eq!(page.requests.len(), 1);
    assert!(!page.progress);
    respond(&mut page, &mut nav, "/settings", 250);
    assert_eq!(page.main_html, "<p>start</p>");

    click(&mut page, &mut nav, "/settings", 5_000);
    assert_eq!(page.requests.len(), 1);
    assert_eq!(page.main_html, "<h1>Settings</h1>");
}

#[test]
fn back_button_replays_without_new_history() {
    let mut page = FakePage::at("/main");
    let mut nav = NavCore::new(NavConfig::default());

    click(&mut page, &mut nav, "/reports", 0);
    respond(&mut page, &mut nav, "/reports", 50);
    click(&mut page, &mut nav, "/settings", 1_000);
    respond(&mut page, &mut nav, "/settings", 1_050);

    page.location = format!("{ORIGIN}/reports");
    let actions = nav.popstate(page.ctx(2_000));
    page.apply(actions);
    assert_eq!(page.main_html, "<h1>Reports</h1>");
    assert_eq!(page.history.len(), 2);
    assert_eq!(page.active.as_deref(), Some("/reports"));
}

#[test]
fn external_link_is_never_fetched() {
    let mut page = FakePage::at("/main");
    let mut nav = NavCore::new(NavConfig::default());

    click(&mut page, &mut nav, "https://docs.clamav.net/", 0);
    assert!(page.requests.is_empty());
    assert_eq!(page.full_navigations, vec!["https://docs.clamav.net/".to_owned()]);
}
