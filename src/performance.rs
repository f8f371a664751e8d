use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlImageElement};

use crate::config::RESIZE_DEBOUNCE_MS;
use crate::platform::{keep, listen, observe_intersections, query_all, ObserverOptions};
use crate::timing::{debounce, BrowserTimers};

/// The deferred source to load, if there is one worth loading.
pub fn deferred_source(data_src: Option<String>) -> Option<String> {
    data_src.filter(|src| !src.trim().is_empty())
}

fn init_lazy_images() {
    let images = query_all("img[data-src]");
    if images.is_empty() {
        return;
    }
    let subscription = observe_intersections(&images, ObserverOptions::default(), |el, observer| {
        if let Some(src) = deferred_source(el.get_attribute("data-src")) {
            if let Some(img) = el.dyn_ref::<HtmlImageElement>() {
                img.set_src(&src);
            }
        }
        let _ = el.class_list().remove_1("lazy");
        observer.unobserve(&el);
    });
    match subscription {
        Some(subscription) => keep(subscription),
        None => log::debug!("Lazy loading unavailable, images keep their placeholders"),
    }
}

pub fn init() {
    init_lazy_images();

    let Some(window) = web_sys::window() else {
        return;
    };
    let on_resize = debounce(BrowserTimers, RESIZE_DEBOUNCE_MS, |()| {
        let width = web_sys::window()
            .and_then(|w| w.inner_width().ok())
            .and_then(|w| w.as_f64())
            .unwrap_or_default();
        log::debug!("Viewport resized to {}px", width);
    });
    keep(listen(&window, "resize", move |_: Event| on_resize.call(())));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deferred_source() {
        assert_eq!(
            deferred_source(Some("/img/hero.webp".into())).as_deref(),
            Some("/img/hero.webp")
        );
        assert_eq!(deferred_source(Some("  ".into())), None);
        assert_eq!(deferred_source(None), None);
    }
}
