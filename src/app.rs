use chrono::Datelike;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;
use web_sys::js_sys::{Object, Reflect};
use web_sys::{window, ErrorEvent, Event};

use crate::notification::{notify, Severity};
use crate::platform::{document, listen, query, reset_subscriptions};
use crate::{animation, form, loading, nav, performance, pricing, scroll, templates, theme};

fn set_current_year() {
    if let Some(el) = query("#currentYear") {
        el.set_text_content(Some(&chrono::Local::now().year().to_string()));
    }
}

/// Wires every controller. Safe to call again: listeners from the previous
/// run are removed first.
pub fn initialize() {
    log::info!("Portfolio initializing");
    reset_subscriptions();

    set_current_year();
    theme::init();
    nav::init();
    scroll::init();
    animation::init();
    form::init();
    pricing::init();
    templates::init();
    loading::init();
    performance::init();

    log::info!("Portfolio initialized");
}

/// Runs [`initialize`] once the DOM is parsed.
pub fn start() {
    let Some(document) = document() else {
        log::error!("No document available, nothing to enhance");
        return;
    };
    if document.ready_state() == "loading" {
        let mut pending = Some(());
        listen(&document, "DOMContentLoaded", move |_: Event| {
            if pending.take().is_some() {
                initialize();
            }
        })
        .forget();
    } else {
        initialize();
    }
}

/// Logs anything the page fails to handle. Nothing is shown to the user.
pub fn install_error_handlers() {
    let Some(window) = window() else {
        return;
    };
    listen(&window, "error", |event: ErrorEvent| {
        log::error!("Portfolio error: {}", event.message());
        gloo_console::error!("Portfolio error:", event.error());
    })
    .forget();
    listen(&window, "unhandledrejection", |event: Event| {
        let reason = Reflect::get(&event, &"reason".into()).unwrap_or(JsValue::UNDEFINED);
        log::error!("Unhandled promise rejection");
        gloo_console::error!("Unhandled promise rejection:", reason);
    })
    .forget();
}

/// Publishes `window.Portfolio` for console and third-party scripts.
pub fn expose_public_api() {
    let Some(window) = window() else {
        return;
    };
    let api = Object::new();

    let initialize_fn = Closure::<dyn Fn()>::new(initialize).into_js_value();
    let set_theme_fn = Closure::<dyn Fn(JsValue)>::new(|value: JsValue| {
        match value.as_string() {
            Some(value) => theme::set_theme(&value),
            None => log::warn!("Portfolio.setTheme expects \"light\" or \"dark\""),
        }
    })
    .into_js_value();
    let notify_fn = Closure::<dyn Fn(JsValue, JsValue)>::new(|message: JsValue, kind: JsValue| {
        let message = message.as_string().unwrap_or_default();
        let severity = kind
            .as_string()
            .map(|kind| Severity::parse(&kind))
            .unwrap_or_default();
        notify(&message, severity);
    })
    .into_js_value();

    let entries = [
        ("initialize", initialize_fn),
        ("setTheme", set_theme_fn),
        ("showNotification", notify_fn),
    ];
    for (name, function) in entries {
        let _ = Reflect::set(&api, &name.into(), &function);
    }
    if Reflect::set(&window, &"Portfolio".into(), &api).is_err() {
        log::warn!("Could not publish window.Portfolio");
    }
}
