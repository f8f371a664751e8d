use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, Event, MouseEvent};

use crate::config::{NAV_PROBE_OFFSET, NAV_SCROLL_DEBOUNCE_MS};
use crate::platform::{
    keep, listen, query, query_all, set_style, BrowserViewport, SectionSpan, Viewport,
};
use crate::scroll::scroll_to_section;
use crate::timing::{debounce, BrowserTimers};

/// The last section whose span contains `scroll_y + 100`. Nothing is active
/// above the first section.
pub fn active_section(sections: &[SectionSpan], scroll_y: f64) -> Option<&SectionSpan> {
    let probe = scroll_y + NAV_PROBE_OFFSET;
    sections.iter().filter(|s| s.contains(probe)).last()
}

/// The section id an in-page link points at.
pub fn link_target(href: &str) -> Option<&str> {
    let id = href.strip_prefix('#')?;
    (!id.is_empty()).then_some(id)
}

/// Inline style for each of the three hamburger bars.
pub struct BarStyle {
    pub property: &'static str,
    pub value: &'static str,
}

const BARS_OPEN: [BarStyle; 3] = [
    BarStyle { property: "transform", value: "rotate(45deg) translate(6px, 6px)" },
    BarStyle { property: "opacity", value: "0" },
    BarStyle { property: "transform", value: "rotate(-45deg) translate(6px, -6px)" },
];

const BARS_CLOSED: [BarStyle; 3] = [
    BarStyle { property: "transform", value: "none" },
    BarStyle { property: "opacity", value: "1" },
    BarStyle { property: "transform", value: "none" },
];

#[derive(Debug, Default)]
pub struct NavState {
    active: Option<String>,
    menu_open: bool,
}

impl NavState {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn update(&mut self, viewport: &impl Viewport) -> Option<&str> {
        let sections = viewport.sections();
        self.active = active_section(&sections, viewport.scroll_y()).map(|s| s.id.clone());
        self.active()
    }

    pub fn activate(&mut self, id: &str) {
        self.active = Some(id.to_string());
    }

    pub fn is_active(&self, href: &str) -> bool {
        match (self.active(), link_target(href)) {
            (Some(active), Some(target)) => active == target,
            _ => false,
        }
    }

    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    pub fn bar_styles(&self) -> &'static [BarStyle; 3] {
        if self.menu_open {
            &BARS_OPEN
        } else {
            &BARS_CLOSED
        }
    }
}

fn render_links(state: &NavState, links: &[Element]) {
    for link in links {
        let href = link.get_attribute("href").unwrap_or_default();
        let _ = link.class_list().toggle_with_force("active", state.is_active(&href));
    }
}

fn render_menu(state: &NavState, toggle: &Element, container: &Element) {
    let open = state.menu_open();
    let _ = toggle.set_attribute("aria-expanded", if open { "true" } else { "false" });
    let _ = container.class_list().toggle_with_force("nav-open", open);
    let Ok(bars) = toggle.query_selector_all("span") else {
        return;
    };
    for (i, style) in state.bar_styles().iter().enumerate() {
        if let Some(bar) = bars.item(i as u32).and_then(|n| n.dyn_into::<Element>().ok()) {
            set_style(&bar, style.property, style.value);
        }
    }
}

pub fn init() {
    let Some(container) = query(".nav-container") else {
        log::debug!("No .nav-container, skipping navigation controller");
        return;
    };
    let links = Rc::new(query_all(".nav-link"));
    let toggle = query(".mobile-menu-toggle");
    let state = Rc::new(RefCell::new(NavState::default()));

    if let Some(toggle) = toggle.clone() {
        let state = state.clone();
        let container = container.clone();
        let target = toggle.clone();
        keep(listen(&target, "click", move |_: MouseEvent| {
            let mut state = state.borrow_mut();
            state.toggle_menu();
            render_menu(&state, &toggle, &container);
        }));
    }

    for link in links.iter() {
        let state = state.clone();
        let links = links.clone();
        let toggle = toggle.clone();
        let container = container.clone();
        let anchor = link.clone();
        keep(listen(link, "click", move |event: MouseEvent| {
            let href = anchor.get_attribute("href").unwrap_or_default();
            if !href.starts_with('#') {
                return;
            }
            event.prevent_default();
            let Some(id) = link_target(&href) else {
                return;
            };
            if BrowserViewport.element_top(id).is_none() {
                return;
            }

            let mut state = state.borrow_mut();
            state.activate(id);
            render_links(&state, &links);
            if state.menu_open() {
                if let Some(toggle) = &toggle {
                    state.toggle_menu();
                    render_menu(&state, toggle, &container);
                }
            }
            drop(state);
            scroll_to_section(id);
        }));
    }

    let on_scroll = {
        let state = state.clone();
        let links = links.clone();
        debounce(BrowserTimers, NAV_SCROLL_DEBOUNCE_MS, move |()| {
            let mut state = state.borrow_mut();
            state.update(&BrowserViewport);
            render_links(&state, &links);
        })
    };
    if let Some(window) = web_sys::window() {
        keep(listen(&window, "scroll", move |_: Event| on_scroll.call(())));
    }
}
