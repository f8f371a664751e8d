use std::cell::RefCell;

use web_sys::{Element, Event, MouseEvent, PageTransitionEvent};
use yew::AppHandle;

use crate::components::spinner::LoadingOverlay;
use crate::platform::{body, document, keep, listen, query_all, set_style};

/// Outbound links that replace the current page get the spinner.
pub fn shows_spinner(href: &str, target: Option<&str>) -> bool {
    href.starts_with("http") && target != Some("_blank")
}

thread_local! {
    static OVERLAY: RefCell<Option<(Element, AppHandle<LoadingOverlay>)>> = RefCell::new(None);
}

fn overlay() -> Option<Element> {
    OVERLAY.with(|overlay| {
        let mut overlay = overlay.borrow_mut();
        if let Some((host, _)) = overlay.as_ref() {
            return Some(host.clone());
        }
        let host = document()?.create_element("div").ok()?;
        host.set_id("loadingSpinner");
        body()?.append_child(&host).ok()?;
        let app = yew::Renderer::<LoadingOverlay>::with_root(host.clone()).render();
        *overlay = Some((host.clone(), app));
        Some(host)
    })
}

pub fn show_spinner() {
    if let Some(host) = overlay() {
        set_style(&host, "display", "flex");
    }
}

pub fn hide_spinner() {
    OVERLAY.with(|overlay| {
        if let Some((host, _)) = overlay.borrow().as_ref() {
            set_style(host, "display", "none");
        }
    });
}

fn mark_loaded() {
    hide_spinner();
    if let Some(body) = body() {
        let _ = body.class_list().add_1("loaded");
    }
}

pub fn init() {
    for link in query_all("a[href^=\"http\"]") {
        let anchor = link.clone();
        keep(listen(&link, "click", move |_: MouseEvent| {
            let href = anchor.get_attribute("href").unwrap_or_default();
            let target = anchor.get_attribute("target");
            if shows_spinner(&href, target.as_deref()) {
                show_spinner();
            }
        }));
    }

    let Some(window) = web_sys::window() else {
        return;
    };
    // The module may start after the page already finished loading.
    let complete = document()
        .map(|d| d.ready_state() == "complete")
        .unwrap_or(false);
    if complete {
        mark_loaded();
    } else {
        keep(listen(&window, "load", |_: Event| mark_loaded()));
    }
    // Back/forward cache restores the page with the overlay still visible.
    keep(listen(&window, "pageshow", |event: PageTransitionEvent| {
        if event.persisted() {
            hide_spinner();
        }
    }));
}
