//! Waiting-screen helper for long-running form submits.
//!
//! Kept under its original JS name so existing templates can keep calling
//! `addFormEventListener(formId, waitingId, buttonId)` from inline scripts.

use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use super::document;

/// On submit of `form_id`, show `waiting_id` and disable `button_id`.
///
/// Inert when any of the three elements is missing.
#[wasm_bindgen(js_name = addFormEventListener)]
pub fn add_form_event_listener(form_id: &str, waiting_id: &str, button_id: &str) {
    let Some(document) = document() else {
        return;
    };
    let (Some(form), Some(waiting), Some(button)) = (
        document.get_element_by_id(form_id),
        document.get_element_by_id(waiting_id),
        document.get_element_by_id(button_id),
    ) else {
        return;
    };
    let Some(waiting) = waiting.dyn_ref::<HtmlElement>().cloned() else {
        return;
    };

    let cb = Closure::<dyn FnMut()>::new(move || {
        if let Err(e) = waiting.style().set_property("display", "block") {
            log::warn!("forms: waiting screen not shown: {e:?}");
        }
        if let Err(e) = button.set_attribute("disabled", "") {
            log::warn!("forms: submit button not disabled: {e:?}");
        }
    });
    if let Err(e) = form.add_event_listener_with_callback("submit", cb.as_ref().unchecked_ref()) {
        log::warn!("forms: submit listener failed on #{form_id}: {e:?}");
    }
    cb.forget();
}
