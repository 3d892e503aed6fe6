//! Page fetching and fragment extraction.
//!
//! ERROR HANDLING
//! ==============
//! Every failure maps onto [`NavError`]; the navigation core decides whether
//! it means fallback (status, missing fragment, transport) or silence
//! (abort).

use gloo_net::http::Request;
use wasm_bindgen::JsValue;
use web_sys::{AbortSignal, DomParser, RequestCache, RequestCredentials, SupportedType};

use crate::nav::error::check_status;
use crate::nav::{NavError, PagePayload};

/// Header value that tells the server this is a fragment request.
pub const REQUESTED_WITH: &str = "PJAX";

/// GET `url` as a navigation fragment request and extract the main region.
pub async fn fetch_page(url: &str, signal: &AbortSignal, main_selector: &str) -> Result<PagePayload, NavError> {
    let resp = Request::get(url)
        .header("X-Requested-With", REQUESTED_WITH)
        .header("Accept", "text/html")
        .cache(RequestCache::NoStore)
        .credentials(RequestCredentials::SameOrigin)
        .abort_signal(Some(signal))
        .send()
        .await
        .map_err(request_error)?;
    check_status(resp.status())?;
    let html = resp.text().await.map_err(request_error)?;
    parse_page(&html, main_selector)
}

/// Parse a full HTML document and pull out the main region and title.
pub fn parse_page(html: &str, main_selector: &str) -> Result<PagePayload, NavError> {
    let parser = DomParser::new().map_err(js_error)?;
    let doc = parser.parse_from_string(html, SupportedType::TextHtml).map_err(js_error)?;
    let main = doc
        .query_selector(main_selector)
        .map_err(js_error)?
        .ok_or_else(|| NavError::MissingFragment { selector: main_selector.to_owned() })?;
    let title = doc
        .query_selector("title")
        .map_err(js_error)?
        .and_then(|el| el.text_content())
        .unwrap_or_default();
    Ok(PagePayload { html: main.inner_html(), title })
}

fn request_error(err: gloo_net::Error) -> NavError {
    match err {
        gloo_net::Error::JsError(js) if js.name == "AbortError" => NavError::Cancelled,
        other => NavError::Transport(other.to_string()),
    }
}

fn js_error(err: JsValue) -> NavError {
    NavError::Transport(format!("{err:?}"))
}
