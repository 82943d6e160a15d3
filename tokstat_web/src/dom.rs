//! Direct DOM access for elements the app may or may not own.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use gloo::utils::document;
use tokstat::{Notifier, ToastState, DARK_CLASS};
use tracing::{debug, warn};
use web_sys::Element;

const TOAST_ID: &str = "toast";
const TOAST_FALLBACK_STYLE: &str =
    "position:fixed;bottom:1rem;right:1rem;padding:0.75rem 1rem;background:#333;color:#fff;border-radius:4px;z-index:1000";
const DARK_TARGETS: [&str; 3] = ["#mainContainer", "#dropZone", ".graphs-container"];

pub fn set_class(element: &Element, class: &str, on: bool) {
    if let Err(err) = element.class_list().toggle_with_force(class, on) {
        warn!(class, ?err, "could not update class list");
    }
}

/// Apply or remove the dark theme on the body and every themed container
/// currently in the document. Missing elements are skipped.
pub fn apply_dark_mode(enabled: bool) {
    let doc = document();
    if let Some(body) = doc.body() {
        set_class(&body, DARK_CLASS, enabled);
    }
    for selector in DARK_TARGETS {
        if let Ok(Some(element)) = doc.query_selector(selector) {
            set_class(&element, DARK_CLASS, enabled);
        }
    }
}

/// Busy state for pages whose markup is rendered by the server.
pub fn set_busy(busy: bool) {
    let doc = document();
    if let Some(overlay) = doc.get_element_by_id("loadingOverlay") {
        set_class(&overlay, "hidden", !busy);
    }
    if let Some(main) = doc.get_element_by_id("mainContainer") {
        set_class(&main, "blur", busy);
    }
}

pub fn navigate(path: &str) {
    if let Err(err) = gloo::utils::window().location().set_href(path) {
        warn!(path, ?err, "navigation failed");
    }
}

pub fn navigate_later(path: String, delay_ms: u32) {
    Timeout::new(delay_ms, move || navigate(&path)).forget();
}

pub fn reload() {
    if let Err(err) = gloo::utils::window().location().reload() {
        warn!(?err, "reload failed");
    }
}

/// The page's `#toast` element, created under the body when the markup
/// does not provide one.
fn toast_element() -> Option<Element> {
    let doc = document();
    if let Some(element) = doc.get_element_by_id(TOAST_ID) {
        return Some(element);
    }
    let element = doc.create_element("div").ok()?;
    element.set_id(TOAST_ID);
    element.set_class_name("toast hidden");
    // Server-rendered pages may not load the app stylesheet.
    element.set_attribute("style", TOAST_FALLBACK_STYLE).ok()?;
    doc.body()?.append_child(&element).ok()?;
    debug!("created toast element");
    Some(element)
}

fn set_toast_visible(element: &Element, visible: bool) {
    set_class(element, "hidden", !visible);
    if let Err(err) = element.toggle_attribute_with_force("hidden", !visible) {
        warn!(?err, "could not toggle toast");
    }
}

/// Toast backed by the page's `#toast` element.
#[derive(Clone)]
pub struct DomToast {
    state: Rc<RefCell<ToastState>>,
    duration_ms: u32,
}

impl DomToast {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            state: Rc::default(),
            duration_ms,
        }
    }
}

impl Notifier for DomToast {
    fn notify(&self, message: &str) {
        let Some(element) = toast_element() else {
            warn!(text = message, "could not show toast");
            return;
        };
        let generation = self.state.borrow_mut().show(message);
        element.set_text_content(Some(message));
        set_toast_visible(&element, true);

        let state = self.state.clone();
        Timeout::new(self.duration_ms, move || {
            if state.borrow_mut().expire(generation) {
                set_toast_visible(&element, false);
            }
        })
        .forget();
    }
}
