//! Capabilities the controllers depend on, with their browser implementations.

use std::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    window, Document, Element, Event, EventTarget, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit,
};

pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// `localStorage`, or nothing at all when the browser refuses access.
pub struct LocalStorage(Option<web_sys::Storage>);

impl LocalStorage {
    pub fn open() -> Self {
        Self(window().and_then(|w| w.local_storage().ok()).flatten())
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = &self.0 {
            if storage.set_item(key, value).is_err() {
                log::warn!("Could not persist {} to localStorage", key);
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionSpan {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionSpan {
    pub fn contains(&self, position: f64) -> bool {
        position >= self.top && position < self.top + self.height
    }
}

pub trait Viewport {
    fn scroll_y(&self) -> f64;
    fn scroll_to(&self, y: f64);
    fn sections(&self) -> Vec<SectionSpan>;
    /// Top offset of the element with the given id.
    fn element_top(&self, id: &str) -> Option<f64>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserViewport;

impl Viewport for BrowserViewport {
    fn scroll_y(&self) -> f64 {
        window().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0)
    }

    fn scroll_to(&self, y: f64) {
        if let Some(window) = window() {
            window.scroll_to_with_x_and_y(0.0, y);
        }
    }

    fn sections(&self) -> Vec<SectionSpan> {
        query_all("section[id]")
            .into_iter()
            .filter_map(|el| {
                let el = el.dyn_into::<HtmlElement>().ok()?;
                Some(SectionSpan {
                    id: el.id(),
                    top: el.offset_top() as f64,
                    height: el.client_height() as f64,
                })
            })
            .collect()
    }

    fn element_top(&self, id: &str) -> Option<f64> {
        document()?
            .get_element_by_id(id)?
            .dyn_into::<HtmlElement>()
            .ok()
            .map(|el| el.offset_top() as f64)
    }
}

pub fn document() -> Option<Document> {
    window()?.document()
}

pub fn body() -> Option<HtmlElement> {
    document()?.body()
}

pub fn query(selector: &str) -> Option<Element> {
    document()?.query_selector(selector).ok().flatten()
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let Some(document) = document() else {
        return Vec::new();
    };
    match document.query_selector_all(selector) {
        Ok(list) => (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect(),
        Err(_) => Vec::new(),
    }
}

pub fn set_style(el: &Element, property: &str, value: &str) {
    if let Some(el) = el.dyn_ref::<HtmlElement>() {
        let _ = el.style().set_property(property, value);
    }
}

/// A live registration that is torn down when dropped.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Leaves the registration in place for the lifetime of the page.
    pub fn forget(self) {
        std::mem::forget(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

pub fn listen<E, F>(target: &EventTarget, event: &'static str, mut handler: F) -> Subscription
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        handler(event.unchecked_into::<E>());
    });
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        log::warn!("Failed to attach {} listener: {:?}", event, e);
    }
    let target = target.clone();
    Subscription::new(move || {
        let _ = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    })
}

pub struct ObserverOptions<'a> {
    pub threshold: f64,
    pub root_margin: &'a str,
}

impl Default for ObserverOptions<'_> {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: "0px",
        }
    }
}

/// Watches `targets` for viewport intersection. The handler receives each
/// intersecting element and the observer, so it can stop watching it.
pub fn observe_intersections<F>(
    targets: &[Element],
    options: ObserverOptions<'_>,
    mut handler: F,
) -> Option<Subscription>
where
    F: FnMut(Element, &IntersectionObserver) + 'static,
{
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if entry.is_intersecting() {
                    handler(entry.target(), &observer);
                }
            }
        },
    );

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(options.threshold));
    init.set_root_margin(options.root_margin);

    let observer =
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => observer,
            Err(e) => {
                log::warn!("IntersectionObserver unavailable: {:?}", e);
                return None;
            }
        };
    for target in targets {
        observer.observe(target);
    }

    Some(Subscription::new(move || {
        observer.disconnect();
        drop(callback);
    }))
}

thread_local! {
    static ACTIVE: RefCell<Vec<Subscription>> = RefCell::new(Vec::new());
}

/// Keeps a subscription alive until the next [`reset_subscriptions`].
pub fn keep(subscription: Subscription) {
    ACTIVE.with(|active| active.borrow_mut().push(subscription));
}

pub fn reset_subscriptions() {
    let previous = ACTIVE.with(|active| std::mem::take(&mut *active.borrow_mut()));
    drop(previous);
}
