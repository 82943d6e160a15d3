//! Wiring for the server-rendered graphs page: slide carousel, theme and
//! navigation buttons. Nothing here is mounted through leptos.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::utils::document;
use js_sys::{Function, Reflect};
use serde::Serialize;
use tokstat::{reset, Carousel, ClientConfig, DarkMode, TaskGate};
use tracing::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

use crate::dom::{self, DomToast};
use crate::net::GlooApi;
use crate::storage::LocalStore;

const SLIDE_SELECTOR: &str = ".carousel-img";
const BOOTSTRAP_CAROUSEL_ID: &str = "graphCarousel";

#[derive(Serialize)]
struct CarouselOptions {
    interval: bool,
    ride: bool,
}

pub fn is_graphs_page() -> bool {
    document().get_element_by_id(BOOTSTRAP_CAROUSEL_ID).is_some()
        || !query_all(SLIDE_SELECTOR).is_empty()
}

pub fn bind(config: ClientConfig) {
    let config = Rc::new(config);
    let dark = Rc::new(RefCell::new(DarkMode::load(
        LocalStore,
        config.storage_key.clone(),
    )));
    dom::apply_dark_mode(dark.borrow().enabled());

    bind_slides();
    pause_bootstrap_carousel();

    on_click("toggleDarkModeBtn", move || {
        let enabled = dark.borrow_mut().toggle();
        dom::apply_dark_mode(enabled);
    });

    let home = config.home_path.clone();
    on_click("homeBtn", move || dom::navigate(&home));

    let gate = Rc::new(TaskGate::new(dom::set_busy));
    let toast = DomToast::new(config.toast_ms);
    on_click("resetBtn", move || {
        let (config, gate, toast) = (config.clone(), gate.clone(), toast.clone());
        wasm_bindgen_futures::spawn_local(async move {
            match reset(&GlooApi, &toast, &gate, &config).await {
                Ok(()) => dom::reload(),
                Err(_) => dom::navigate_later(config.home_path.clone(), config.toast_ms),
            }
        });
    });
}

fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
    let Some(element) = document().get_element_by_id(id) else {
        debug!(id, "button not on this page");
        return;
    };
    EventListener::new(&element, "click", move |event| {
        event.stop_propagation();
        handler();
    })
    .forget();
}

fn query_all(selector: &str) -> Vec<HtmlElement> {
    let Ok(nodes) = document().query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

fn show_slide(slides: &[HtmlElement], carousel: Carousel) {
    for (idx, slide) in slides.iter().enumerate() {
        let display = if carousel.is_visible(idx) { "block" } else { "none" };
        if let Err(err) = slide.style().set_property("display", display) {
            warn!(idx, ?err, "could not toggle slide");
        }
    }
}

fn bind_slides() {
    let slides = Rc::new(query_all(SLIDE_SELECTOR));
    if slides.is_empty() {
        return;
    }
    let state = Rc::new(Cell::new(Carousel::new(slides.len())));
    show_slide(&slides, state.get());

    for (id, forward) in [("nextBtn", true), ("prevBtn", false)] {
        let (slides, state) = (slides.clone(), state.clone());
        on_click(id, move || {
            let mut carousel = state.get();
            if forward {
                carousel.next();
            } else {
                carousel.previous();
            }
            state.set(carousel);
            show_slide(&slides, carousel);
        });
    }
    info!(slides = slides.len(), "graph carousel ready");
}

/// Hand `#graphCarousel` to Bootstrap with cycling disabled, then pause it.
fn pause_bootstrap_carousel() {
    let Some(element) = document().get_element_by_id(BOOTSTRAP_CAROUSEL_ID) else {
        return;
    };
    let ctor = Reflect::get(&js_sys::global(), &JsValue::from_str("bootstrap"))
        .and_then(|bootstrap| Reflect::get(&bootstrap, &JsValue::from_str("Carousel")))
        .and_then(|ctor| ctor.dyn_into::<Function>());
    let Ok(ctor) = ctor else {
        warn!("bootstrap.Carousel is not loaded; carousel left unmanaged");
        return;
    };
    let options = match serde_wasm_bindgen::to_value(&CarouselOptions {
        interval: false,
        ride: false,
    }) {
        Ok(options) => options,
        Err(err) => {
            warn!(error = %err, "could not build carousel options");
            return;
        }
    };

    let args = js_sys::Array::of2(&JsValue::from(element), &options);
    let paused = Reflect::construct(&ctor, &args).and_then(|carousel| {
        Reflect::get(&carousel, &JsValue::from_str("pause"))
            .and_then(|pause| pause.dyn_into::<Function>())
            .and_then(|pause| pause.call0(&carousel))
    });
    match paused {
        Ok(_) => info!("bootstrap carousel initialised and paused"),
        Err(err) => warn!(?err, "bootstrap carousel setup failed"),
    }
}
